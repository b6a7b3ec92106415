// List-detail selector building blocks shared by every view.
// Each panel owns its own state; results that arrive for a superseded request
// are dropped by comparing generation counters when they resolve.

pub mod detail;
pub mod list;
pub mod matches;
pub mod pager;

use serde::Serialize;

pub use detail::{DetailLoader, DetailSnapshot};
pub use list::{ListSnapshot, ListSource, PageRequest, PageSlice, PaginatedList};
pub use matches::MatchPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Proof of a request issued for `id` at a given generation.
/// Only the ticket from the latest request can apply its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    generation: u64,
}

/// Minimal projection used to render list rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub display_label: String,
}

impl ListItem {
    /// Prefers a human-readable name; falls back to the raw id when the name
    /// is unknown, blank, or still loading.
    pub fn resolve(id: &str, name: Option<&str>) -> Self {
        let display_label = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id)
            .to_string();
        Self {
            id: id.to_string(),
            display_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_name() {
        assert_eq!(
            ListItem::resolve("cv-1", Some("Jane Smith")).display_label,
            "Jane Smith"
        );
    }

    #[test]
    fn test_label_falls_back_to_id() {
        assert_eq!(ListItem::resolve("cv-1", None).display_label, "cv-1");
        assert_eq!(ListItem::resolve("cv-1", Some("  ")).display_label, "cv-1");
    }
}
