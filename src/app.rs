//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the current file list,
//! selection and the user-facing playback state mirror.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
