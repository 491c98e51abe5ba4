//! Fetch state for external waterway geometry.
//!
//! Waterways come from a network call that is slow and may fail. The loader
//! tracks that call as an explicit state machine so the segmenter only runs
//! once data (or a failure, read as "no water") is available, a scope is
//! fetched at most once, and results for an outdated scope are discarded.
//!
//! ```text
//! Idle ──request──▶ Loading ──complete(Ok)──▶ Ready
//!                     │  ▲                      │
//!                     │  └──request(new scope)──┤
//!                     └──complete(Err)──▶ Failed┘
//! ```

use log::{debug, warn};

use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::WaterFeature;

/// Identifies one fetch; completions with an older ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

/// Where the waterway fetch stands.
#[derive(Debug, Clone, PartialEq)]
pub enum WaterwayState {
    /// Nothing requested yet
    Idle,
    /// A fetch for `scope` is in flight
    Loading {
        scope: BoundingBox,
        ticket: FetchTicket,
    },
    /// Features for `scope` are available
    Ready {
        scope: BoundingBox,
        features: Vec<WaterFeature>,
    },
    /// The fetch for `scope` failed
    Failed { scope: BoundingBox, reason: String },
}

impl WaterwayState {
    /// Scope the state refers to, if any.
    pub fn scope(&self) -> Option<&BoundingBox> {
        match self {
            WaterwayState::Idle => None,
            WaterwayState::Loading { scope, .. }
            | WaterwayState::Ready { scope, .. }
            | WaterwayState::Failed { scope, .. } => Some(scope),
        }
    }
}

/// Drives [`WaterwayState`] transitions.
#[derive(Debug)]
pub struct WaterwayLoader {
    state: WaterwayState,
    next_ticket: u64,
}

impl Default for WaterwayLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterwayLoader {
    pub fn new() -> Self {
        Self {
            state: WaterwayState::Idle,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &WaterwayState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WaterwayState::Loading { .. })
    }

    /// Ask for waterways covering `scope`.
    ///
    /// Returns a ticket when a fetch should start, or `None` when `scope` is
    /// already loading, loaded, or failed. A new scope supersedes any fetch
    /// in flight.
    pub fn request(&mut self, scope: BoundingBox) -> Option<FetchTicket> {
        if self.state.scope() == Some(&scope) {
            return None;
        }

        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        debug!(
            "[WaterwayLoader] Fetch #{} for {}",
            ticket.0,
            scope.to_overpass_bbox()
        );
        self.state = WaterwayState::Loading { scope, ticket };
        Some(ticket)
    }

    /// Record the outcome of the fetch identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when the ticket is stale.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<WaterFeature>>) -> bool {
        let scope = match self.state {
            WaterwayState::Loading { scope, ticket: t } if t == ticket => scope,
            _ => {
                debug!(
                    "[WaterwayLoader] Dropping stale result for fetch #{}",
                    ticket.0
                );
                return false;
            }
        };

        self.state = match result {
            Ok(features) => WaterwayState::Ready { scope, features },
            Err(e) => {
                warn!("[WaterwayLoader] Fetch #{} failed: {}", ticket.0, e);
                WaterwayState::Failed {
                    scope,
                    reason: e.to_string(),
                }
            }
        };
        true
    }

    /// Features to segment, once the fetch has settled.
    ///
    /// `Ready` yields its features and `Failed` yields an empty slice;
    /// `Idle` and `Loading` yield `None`.
    pub fn features(&self) -> Option<&[WaterFeature]> {
        match &self.state {
            WaterwayState::Ready { features, .. } => Some(features),
            WaterwayState::Failed { .. } => Some(&[]),
            WaterwayState::Idle | WaterwayState::Loading { .. } => None,
        }
    }

    /// Forget everything, e.g. to retry a failed scope.
    pub fn reset(&mut self) {
        self.state = WaterwayState::Idle;
    }
}
