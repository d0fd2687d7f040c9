//! Board domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user within one board. Independent of [`super::auth::GlobalRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    Admin,
    Member,
}

impl BoardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardRole::Admin => "admin",
            BoardRole::Member => "member",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "admin" => BoardRole::Admin,
            _ => BoardRole::Member,
        }
    }
}

/// One entry in a board's member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardMember {
    pub user_id: String,
    pub role: BoardRole,
}

/// A board with its full member list. This is the snapshot the
/// authorization gates evaluate against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub color: String,
    /// The designated admin. Always also present in `members` with
    /// role `admin` (enforced at creation and by the removal guard).
    pub admin_id: String,
    pub members: Vec<BoardMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
