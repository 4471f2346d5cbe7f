//! Incremental markdown rendering for streamed chat output.
//!
//! Designed for chat interfaces where markdown arrives token-by-token and
//! needs to be rendered progressively, without waiting for a heading, code
//! block or emphasis to be complete.

mod builder;
mod delimiter;
mod element;
mod error;
mod parser;
mod partial;
pub mod render;
pub mod scheduler;
mod session;

pub use builder::{document_events, TreeBuilder, TreeEvent};
pub use delimiter::{DelimiterBuffer, Toggle, Token};
pub use element::{Block, BlockKind, CodeBlock, Document, InlineSpan, InlineStyle, SpanKind};
pub use error::{Error, Result};
pub use parser::{StreamParser, DEFAULT_LANGUAGE};
pub use partial::Mode;
pub use scheduler::{
    fragment_queue, CancelHandle, Feed, Feeder, FragmentQueue, Outcome, Pacing, Scheduler,
};
pub use session::{rerender, RenderMode, Session};

#[cfg(test)]
mod tests;
