//! Group and membership models.
//!
//! A membership row doubles as the member's ledger account: it carries the
//! coin balance for that (user, group) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A collection of users sharing tasks and a coin economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }
}

/// A user's membership in a group, holding their coin balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupMembership {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub coins: i32,
    pub joined_at: DateTime<Utc>,
}

/// A group as listed for one of its members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub my_coins: i32,
    pub member_count: i64,
}

/// Group view with its members and the caller's balance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<GroupMembership>,
    pub my_coins: i32,
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,
}

/// Request payload for adding a user to a group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteMemberRequest {
    pub user_id: Uuid,
}
