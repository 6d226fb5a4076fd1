//! Client-side accumulation of search results across pages.
//!
//! The state machine in [`state`] owns the merge, staleness, and
//! backpressure rules; the controller in [`controller`] drives it
//! against a gateway with structured cancellation.

pub mod controller;
pub mod state;

pub use controller::{LoadOutcome, SearchController};
pub use state::{PaginationState, RequestId, SearchStatus};
