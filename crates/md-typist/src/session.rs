//! One parser session per rendered message.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::builder::TreeEvent;
use crate::element::Document;
use crate::parser::StreamParser;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// How a consumer keeps its view of the document current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Apply each tree mutation as it happens
    #[default]
    Incremental,
    /// Re-parse all accumulated text on every update
    Rerender,
}

/// Owns the parser state and document of a single streamed message.
///
/// Sessions share nothing, so any number of messages can stream at once.
#[derive(Debug, Clone)]
pub struct Session {
    id: u64,
    parser: StreamParser,

    /// Everything appended so far, for re-render mode
    source: String,

    fragments: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::with_parser(StreamParser::new())
    }

    /// A session that keeps a log of tree mutations for a renderer.
    pub fn with_events() -> Self {
        Self::with_parser(StreamParser::with_events())
    }

    fn with_parser(parser: StreamParser) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!("session {id} started");
        Self {
            id,
            parser,
            source: String::new(),
            fragments: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Append a fragment of streamed text.
    pub fn append(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        trace!(
            "session {} fragment {}: {} bytes",
            self.id,
            self.fragments,
            fragment.len()
        );
        self.fragments += 1;
        self.source.push_str(fragment);
        self.parser.push(fragment);
    }

    /// The stream is over: resolve held-back delimiters. Open constructs
    /// stay open and are reported as incomplete.
    pub fn end_stream(&mut self) {
        self.parser.end_of_stream();
        debug!(
            "session {} ended after {} fragments, complete: {}",
            self.id,
            self.fragments,
            self.parser.is_complete()
        );
    }

    /// End the stream and close whatever is still open, for a clean final
    /// render.
    pub fn finalize(&mut self) {
        self.parser.finalize();
        debug!("session {} finalized", self.id);
    }

    pub fn document(&self) -> &Document {
        self.parser.document()
    }

    /// An owned copy of the document as it stands.
    pub fn snapshot(&self) -> Document {
        self.parser.document().clone()
    }

    pub fn into_document(self) -> Document {
        self.parser.into_document()
    }

    /// Everything appended so far.
    pub fn text(&self) -> &str {
        &self.source
    }

    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }

    /// Nothing held back and nothing left open.
    pub fn is_complete(&self) -> bool {
        self.parser.is_complete()
    }

    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.parser.drain_events()
    }

    /// Re-render mode: a fresh document parsed from all text so far.
    pub fn rerender(&self) -> Document {
        rerender(&self.source)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `text` from offset 0 as a complete stream.
///
/// Matches the incremental document for the same text, except that a
/// trailing delimiter or `#` run still waiting for input in incremental mode
/// is resolved here.
pub fn rerender(text: &str) -> Document {
    let mut parser = StreamParser::new();
    parser.push(text);
    parser.end_of_stream();
    parser.into_document()
}
