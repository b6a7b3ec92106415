//! Detail loader with single-flight selection.
//!
//! `select` and `refresh` hand out a `Ticket`; `resolve` applies a result only
//! when its ticket is still the latest one. A slow response for an id the user
//! has already moved away from is dropped, whatever order responses arrive in.

use serde::Serialize;

use super::{LoadState, Ticket};

/// Owned copy of a loader's state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSnapshot<T> {
    pub selected_id: Option<String>,
    pub state: LoadState,
    pub detail: Option<T>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DetailLoader<T> {
    selected_id: Option<String>,
    generation: u64,
    state: LoadState,
    detail: Option<T>,
    error: Option<String>,
}

impl<T> Default for DetailLoader<T> {
    fn default() -> Self {
        Self {
            selected_id: None,
            generation: 0,
            state: LoadState::Idle,
            detail: None,
            error: None,
        }
    }
}

impl<T> DetailLoader<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id`. Returns `None` when `id` is already selected: re-selecting
    /// is a no-op, use `refresh` to fetch again.
    pub fn select(&mut self, id: &str) -> Option<Ticket> {
        if self.selected_id.as_deref() == Some(id) {
            return None;
        }
        self.selected_id = Some(id.to_string());
        self.detail = None;
        Some(self.issue())
    }

    /// Re-fetches the current selection. The shown detail stays until the new one arrives.
    pub fn refresh(&mut self) -> Option<Ticket> {
        self.selected_id.as_ref()?;
        Some(self.issue())
    }

    /// Applies a fetch result. Returns `false` if the ticket was superseded.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<T, String>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        match result {
            Ok(detail) => {
                self.detail = Some(detail);
                self.state = LoadState::Loaded;
                self.error = None;
            }
            Err(message) => {
                // A failed refresh keeps the detail of the same selection on screen.
                self.state = LoadState::Error;
                self.error = Some(message);
            }
        }
        true
    }

    /// Replaces the detail of the current selection with a fresher copy
    /// obtained elsewhere (e.g. a reloaded list page).
    pub fn replace_detail(&mut self, id: &str, detail: T) -> bool {
        if self.selected_id.as_deref() != Some(id) || self.state == LoadState::Loading {
            return false;
        }
        self.detail = Some(detail);
        self.state = LoadState::Loaded;
        self.error = None;
        true
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.selected_id = None;
        self.detail = None;
        self.error = None;
        self.state = LoadState::Idle;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn detail(&self) -> Option<&T> {
        self.detail.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> DetailSnapshot<T>
    where
        T: Clone,
    {
        DetailSnapshot {
            selected_id: self.selected_id.clone(),
            state: self.state,
            detail: self.detail.clone(),
            error: self.error.clone(),
        }
    }

    fn issue(&mut self) -> Ticket {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.error = None;
        Ticket {
            id: self.selected_id.clone().unwrap_or_default(),
            generation: self.generation,
        }
    }
}
