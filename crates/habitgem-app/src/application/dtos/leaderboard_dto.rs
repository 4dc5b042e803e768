use serde::{Deserialize, Serialize};

use habitgem_domain::sync::LeaderboardEntry;

/// Name shown for owners who never registered a profile.
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntryDto {
    /// 1-based position in the ranking
    pub rank: u32,
    pub owner_id: String,
    pub display_name: String,
    pub total_diamonds: u32,
    pub last_updated: Option<String>, // RFC 3339
    pub is_current_owner: bool,
}

impl LeaderboardEntryDto {
    pub fn from_entry(rank: u32, entry: LeaderboardEntry, current_owner: Option<&str>) -> Self {
        let is_current_owner = current_owner == Some(entry.owner_id.as_str());
        Self {
            rank,
            display_name: entry
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_string()),
            owner_id: entry.owner_id.to_string(),
            total_diamonds: entry.total_diamonds,
            last_updated: entry.last_updated_timestamp.map(|ts| ts.to_rfc3339()),
            is_current_owner,
        }
    }
}
