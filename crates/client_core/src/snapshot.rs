//! Read-only view of the aggregate handed to the renderer.

use crate::state::{AppState, Overlay, ViewState};

/// Captured once per render tick. Rendering must not mutate anything; the
/// snapshot only borrows the aggregate.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub active_state: ViewState,
    pub state: &'a AppState,
    pub overlay: Option<&'a Overlay>,
    pub loading_message: Option<&'a str>,
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a AppState) -> Self {
        Self {
            active_state: state.active_state(),
            state,
            overlay: state.overlay.as_ref(),
            loading_message: state.loading_message.as_deref(),
        }
    }
}

/// Terminal rendering capability. Layout and styling live behind this seam.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot<'_>);
}
