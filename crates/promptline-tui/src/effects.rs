//! Effects returned by the reducer for the runtime to execute.
//!
//! The reducer only mutates state; anything touching the outside world is
//! described here and performed by the runtime.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,
    CopyToClipboard { text: String },
}
