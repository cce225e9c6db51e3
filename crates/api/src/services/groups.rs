//! Group lifecycle and membership.

use domain::models::{Group, GroupDetails, GroupMembership, GroupSummary};
use domain::{DomainError, SchedulerConfig};
use persistence::repositories::{GroupRepository, LedgerRepository};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct GroupService {
    groups: GroupRepository,
    ledger: LedgerRepository,
    config: SchedulerConfig,
}

impl GroupService {
    pub fn new(pool: PgPool, config: SchedulerConfig) -> Self {
        Self {
            groups: GroupRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool),
            config,
        }
    }

    /// Creates a group with the creator as its first member.
    pub async fn create_group(&self, name: &str, creator_id: Uuid) -> Result<Group, DomainError> {
        let group = self
            .groups
            .create_group(name.trim(), creator_id, self.config.starting_balance)
            .await?;

        info!(group_id = %group.id, user_id = %creator_id, "Group created");
        Ok(group.into())
    }

    pub async fn list_my_groups(&self, user_id: Uuid) -> Result<Vec<GroupSummary>, DomainError> {
        let groups = self.groups.find_user_groups(user_id).await?;
        Ok(groups.into_iter().map(Into::into).collect())
    }

    async fn find_group(&self, group_id: Uuid) -> Result<Group, DomainError> {
        self.groups
            .find_by_id(group_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::NotFound("Group not found".to_string()))
    }

    pub async fn group_details(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupDetails, DomainError> {
        let group = self.find_group(group_id).await?;
        let my_coins = self
            .ledger
            .balance(user_id, group_id)
            .await?
            .ok_or_else(|| DomainError::Forbidden("Not a member of this group".to_string()))?;

        let members: Vec<GroupMembership> = self
            .groups
            .find_members(group_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(GroupDetails {
            group,
            members,
            my_coins,
        })
    }

    /// Adds a user to the group. Only the creator may invite.
    pub async fn invite_member(
        &self,
        group_id: Uuid,
        requester_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupMembership, DomainError> {
        let group = self.find_group(group_id).await?;
        if !group.is_creator(requester_id) {
            return Err(DomainError::Forbidden(
                "Only the group creator can invite members".to_string(),
            ));
        }

        let membership = self
            .ledger
            .add_member(group_id, user_id, self.config.starting_balance)
            .await?
            .ok_or_else(|| DomainError::BadRequest("User is already a member".to_string()))?;

        info!(group_id = %group_id, user_id = %user_id, invited_by = %requester_id, "Member added");
        Ok(membership.into())
    }

    /// Removes the caller's membership. The creator must delete the group instead.
    pub async fn leave_group(&self, group_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let group = self.find_group(group_id).await?;
        if group.is_creator(user_id) {
            return Err(DomainError::BadRequest(
                "Group creator cannot leave the group. Delete the group instead.".to_string(),
            ));
        }

        if !self.ledger.remove_member(group_id, user_id).await? {
            return Err(DomainError::Forbidden(
                "Not a member of this group".to_string(),
            ));
        }

        info!(group_id = %group_id, user_id = %user_id, "Member left group");
        Ok(())
    }

    pub async fn delete_group(&self, group_id: Uuid, requester_id: Uuid) -> Result<(), DomainError> {
        let group = self.find_group(group_id).await?;
        if !group.is_creator(requester_id) {
            return Err(DomainError::Forbidden(
                "Only the group creator can delete the group".to_string(),
            ));
        }

        self.groups.delete_group(group_id).await?;
        info!(group_id = %group_id, user_id = %requester_id, "Group deleted");
        Ok(())
    }
}
