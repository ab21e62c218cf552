//! Input events delivered by the terminal layer.

/// One user-facing event from the terminal. Key tokens follow the usual
/// terminal spelling: `"a"`, `"enter"`, `"esc"`, `"tab"`, `"shift+tab"`,
/// `"ctrl+s"`, `"up"`, `"down"`, `"backspace"`, `" "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(String),
    Resize { width: u16, height: u16 },
}

impl InputEvent {
    pub fn key(token: impl Into<String>) -> Self {
        Self::Key(token.into())
    }
}
