//! Group and membership entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the group_members table (ledger accounts).
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipEntity {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub coins: i32,
    pub joined_at: DateTime<Utc>,
}

impl From<GroupMembershipEntity> for domain::models::GroupMembership {
    fn from(entity: GroupMembershipEntity) -> Self {
        Self {
            user_id: entity.user_id,
            group_id: entity.group_id,
            coins: entity.coins,
            joined_at: entity.joined_at,
        }
    }
}

/// A group joined with the viewer's membership and the member count.
#[derive(Debug, Clone, FromRow)]
pub struct GroupSummaryEntity {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub my_coins: i32,
    pub member_count: i64,
}

impl From<GroupSummaryEntity> for domain::models::GroupSummary {
    fn from(entity: GroupSummaryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_by: entity.created_by,
            created_at: entity.created_at,
            my_coins: entity.my_coins,
            member_count: entity.member_count,
        }
    }
}
