//! Concurrency boundary between the interactive loop and remote work.
//!
//! Every dispatched operation runs on its own tokio task, wrapped by the
//! retry executor, and posts exactly one `TerminalMessage` back into the
//! session's queue. Workers never touch the state aggregate; the loop is the
//! single writer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::api::RemoteApi;
use crate::ops::{self, OpOutput, OpSpec};
use crate::outcome::Outcome;
use crate::retry::{self, RetryPolicy};

/// Monotonically increasing id tagging each dispatch, used to discard stale
/// results when operations race in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Logical target an operation races against. Two dispatches in the same
/// slot supersede each other; dispatches in different slots are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Startup,
    Projects,
    Items,
    Repositories,
    Mutation,
    UserSearch,
}

/// The single immutable result value a dispatched operation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalMessage {
    pub request_id: RequestId,
    pub slot: Slot,
    pub payload: Result<OpOutput, Outcome>,
}

pub struct Dispatcher {
    api: Arc<dyn RemoteApi>,
    message_tx: mpsc::UnboundedSender<TerminalMessage>,
    cancel_rx: watch::Receiver<bool>,
    next_id: u64,
}

impl Dispatcher {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        message_tx: mpsc::UnboundedSender<TerminalMessage>,
        cancel_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            message_tx,
            cancel_rx,
            next_id: 0,
        }
    }

    /// Start `spec` on a background worker and return immediately. The
    /// worker delivers exactly one message for this id, unless the whole
    /// session is torn down first.
    pub fn dispatch(&mut self, spec: OpSpec, policy: RetryPolicy) -> RequestId {
        self.next_id += 1;
        let request_id = RequestId(self.next_id);
        let slot = spec.slot();

        let api = Arc::clone(&self.api);
        let message_tx = self.message_tx.clone();
        let mut cancel_rx = self.cancel_rx.clone();

        tracing::debug!(?slot, id = request_id.0, op = op_name(&spec), "dispatching operation");

        tokio::spawn(async move {
            let on_retry = |attempt: u32, outcome: &Outcome, delay: Duration| {
                tracing::warn!(
                    ?slot,
                    id = request_id.0,
                    attempt,
                    kind = %outcome.kind,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed; backing off"
                );
            };

            let op = || ops::run(Arc::clone(&api), spec.clone());
            let payload = retry::execute(op, &policy, Some(&on_retry), &mut cancel_rx).await;

            if let Err(outcome) = &payload {
                tracing::debug!(?slot, id = request_id.0, kind = %outcome.kind, "operation failed");
            }

            // The receiver only disappears when the session is gone; there
            // is nobody left to care about this result.
            let _ = message_tx.send(TerminalMessage {
                request_id,
                slot,
                payload,
            });
        });

        request_id
    }
}

fn op_name(spec: &OpSpec) -> &'static str {
    match spec {
        OpSpec::Startup => "startup",
        OpSpec::ListProjects { .. } => "list_projects",
        OpSpec::ListItems { .. } => "list_items",
        OpSpec::SaveItem { .. } => "save_item",
        OpSpec::DeleteItem { .. } => "delete_item",
        OpSpec::ListRepositories { .. } => "list_repositories",
        OpSpec::ConvertDraft { .. } => "convert_draft",
        OpSpec::CreateProject { .. } => "create_project",
        OpSpec::SearchUsers { .. } => "search_users",
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
