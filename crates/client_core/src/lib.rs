//! Resilient command orchestration core for the board client.
//!
//! The interactive loop ([`session`]) owns a single state aggregate and
//! applies a pure reducer to input and result events. Remote operations are
//! described as data ([`ops::OpSpec`]), executed off the loop by the
//! [`dispatch::Dispatcher`] under the retrying executor ([`retry`]), with
//! failures classified by the ordered-rule [`classifier`]. Terminal
//! rendering, transport, and preference persistence stay behind the
//! [`snapshot::Renderer`], [`api::RemoteApi`], and
//! [`defaults::DefaultsStore`] seams.

pub mod api;
pub mod classifier;
pub mod defaults;
pub mod dispatch;
pub mod input;
pub mod ops;
pub mod outcome;
pub mod reducer;
pub mod retry;
pub mod session;
pub mod snapshot;
pub mod state;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use api::RemoteApi;
pub use classifier::classify;
pub use defaults::{DefaultsStore, ProjectDefaults};
pub use dispatch::{Dispatcher, RequestId, Slot, TerminalMessage};
pub use input::InputEvent;
pub use ops::{OpOutput, OpSpec};
pub use outcome::{ErrorKind, Outcome};
pub use reducer::{reduce, Effect, Event};
pub use retry::RetryPolicy;
pub use session::{run, SessionError};
pub use snapshot::{Renderer, Snapshot};
pub use state::{AppState, ViewState};
