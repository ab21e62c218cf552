//! The interactive loop: single writer of the state aggregate.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::api::RemoteApi;
use crate::defaults::DefaultsStore;
use crate::dispatch::{Dispatcher, Slot};
use crate::input::InputEvent;
use crate::ops::OpSpec;
use crate::outcome::Outcome;
use crate::reducer::{self, Effect, Event};
use crate::retry::RetryPolicy;
use crate::snapshot::{Renderer, Snapshot};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The remote session could not be established; nothing to show.
    #[error("failed to establish remote session: {}", .0.user_message())]
    Startup(Outcome),
}

/// Run the client until the user quits.
///
/// The loop suspends only while waiting for the next input or result
/// message; remote work, including every retry wait, runs on dispatcher
/// workers. Input events are drained ahead of queued results so the UI never
/// feels wedged behind background work.
pub async fn run<R: Renderer>(
    api: Arc<dyn RemoteApi>,
    store: Arc<dyn DefaultsStore>,
    renderer: &mut R,
    mut input_rx: mpsc::UnboundedReceiver<InputEvent>,
) -> Result<(), SessionError> {
    let (message_tx, mut message_rx) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut dispatcher = Dispatcher::new(api, message_tx, cancel_rx);

    let mut state = AppState::new(store.load());
    perform(
        &mut state,
        vec![Effect::Dispatch(OpSpec::Startup)],
        &mut dispatcher,
        store.as_ref(),
    );
    state.loading_message = Some("Initializing...".to_string());
    renderer.render(&Snapshot::capture(&state));

    loop {
        let event = tokio::select! {
            biased;
            maybe_input = input_rx.recv() => match maybe_input {
                Some(input) => Event::Input(input),
                // Input source gone: treat as quit.
                None => break,
            },
            maybe_message = message_rx.recv() => match maybe_message {
                Some(message) => Event::Message(message),
                None => break,
            },
        };

        let (next, effects) = reducer::reduce(state, event);
        state = next;
        perform(&mut state, effects, &mut dispatcher, store.as_ref());
        renderer.render(&Snapshot::capture(&state));

        if let Some(outcome) = state.fatal.take() {
            let _ = cancel_tx.send(true);
            return Err(SessionError::Startup(outcome));
        }
        if state.should_quit {
            // Abandon in-flight workers; their results have no audience.
            let _ = cancel_tx.send(true);
            break;
        }
    }

    Ok(())
}

/// Execute the effects a transition requested. Dispatch ids are recorded so
/// stale results can be recognized when they arrive.
fn perform(
    state: &mut AppState,
    effects: Vec<Effect>,
    dispatcher: &mut Dispatcher,
    store: &dyn DefaultsStore,
) {
    for effect in effects {
        match effect {
            Effect::Dispatch(spec) => {
                let slot = spec.slot();
                let policy = policy_for(slot);
                let id = dispatcher.dispatch(spec, policy);
                state.pending.track(slot, id);
            }
            Effect::PersistDefaults(defaults) => {
                // Losing a remembered default is annoying, never fatal.
                if let Err(err) = store.save(&defaults) {
                    tracing::warn!(%err, "failed to persist project defaults");
                }
            }
            Effect::Quit => {}
        }
    }
}

fn policy_for(slot: Slot) -> RetryPolicy {
    match slot {
        // Suggestion lookups are fired on every keystroke; retrying them
        // only produces stale traffic.
        Slot::UserSearch => RetryPolicy::single_attempt(),
        _ => RetryPolicy::default(),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
