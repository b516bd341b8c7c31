//! # Mailcast Dispatch
//!
//! The bulk-dispatch state machine: which contacts are selected, what will be
//! sent, and the outcome of the last send. One dispatch is in flight at most.

pub mod controller;
pub mod error;
pub mod selection;

pub use controller::{DispatchController, DispatchState, InFlightIndicator};
pub use error::{DispatchError, Result};
pub use selection::SelectionSet;
