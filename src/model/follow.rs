use crate::errors::{bad_request, ApiError};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Who a follow row points at.
///
/// A claimed target is an existing user or brand, addressed by id. An
/// unclaimed target is a brand known only by its display name. A row holds
/// exactly one of the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowTarget {
    Claimed(String),
    Unclaimed(String),
}

impl FollowTarget {
    /// Splits the target into the `(following_id, following_name)` column pair.
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            FollowTarget::Claimed(id) => (Some(id.as_str()), None),
            FollowTarget::Unclaimed(name) => (None, Some(name.as_str())),
        }
    }
}

/// Body or query addressing a follow target: `targetId` or `targetName`, never both.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetParams {
    pub target_id: Option<String>,
    pub target_name: Option<String>,
}

impl TryFrom<TargetParams> for FollowTarget {
    type Error = ApiError;

    fn try_from(params: TargetParams) -> Result<Self, Self::Error> {
        let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        match (non_blank(params.target_id), non_blank(params.target_name)) {
            (Some(id), None) => Ok(FollowTarget::Claimed(id)),
            (None, Some(name)) => Ok(FollowTarget::Unclaimed(name)),
            (Some(_), Some(_)) => Err(bad_request("Provide either targetId or targetName, not both")),
            (None, None) => Err(bad_request("Target ID required")),
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct Follow {
    pub id: i64,
    pub follower_id: String,
    pub following_id: Option<String>,
    pub following_name: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
pub struct FollowCreated {
    pub success: bool,
    pub follow: Follow,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFollowing {
    pub is_following: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub is_following: bool,
    pub followers_count: i64,
}
