//! Match panel state machine: `Idle → Loading → {Loaded, Error}`.
//!
//! `Loaded`/`Error` go back to `Loading` on a manual refresh or when the
//! target entity changes. While a request is loading, further triggers for
//! the same target are ignored.

use super::{LoadState, Ticket};

#[derive(Debug, Clone)]
pub struct MatchPanel<P> {
    target: Option<String>,
    generation: u64,
    state: LoadState,
    refreshing: bool,
    payload: Option<P>,
    error: Option<String>,
}

impl<P> Default for MatchPanel<P> {
    fn default() -> Self {
        Self {
            target: None,
            generation: 0,
            state: LoadState::Idle,
            refreshing: false,
            payload: None,
            error: None,
        }
    }
}

impl<P> MatchPanel<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests matches for `target`. Returns `None` when nothing should be fetched.
    pub fn request(&mut self, target: &str, refresh: bool) -> Option<Ticket> {
        let same_target = self.target.as_deref() == Some(target);
        if same_target {
            match self.state {
                LoadState::Loading => return None,
                LoadState::Loaded | LoadState::Error if !refresh => return None,
                _ => {}
            }
        } else {
            // Matches for another entity must never show under this one.
            self.target = Some(target.to_string());
            self.payload = None;
        }

        self.generation += 1;
        self.state = LoadState::Loading;
        self.refreshing = refresh && same_target;
        self.error = None;
        Some(Ticket {
            id: target.to_string(),
            generation: self.generation,
        })
    }

    /// Applies a fetch result. Returns `false` if the ticket was superseded.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<P, String>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.refreshing = false;
        match result {
            Ok(payload) => {
                self.payload = Some(payload);
                self.state = LoadState::Loaded;
                self.error = None;
            }
            Err(message) => {
                self.state = LoadState::Error;
                self.error = Some(message);
            }
        }
        true
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
