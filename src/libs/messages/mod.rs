//! User-facing message catalogue.
//!
//! [`Message`] enumerates every line orbita prints or logs; `display.rs`
//! holds the text and `macros.rs` the `msg_*!` macros that route it to the
//! terminal or to `tracing`.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
