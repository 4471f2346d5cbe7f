//! Output tree construction.
//!
//! The builder owns the [`Document`] and the single open sink: at most one
//! open block, and inside a heading or paragraph at most one open span.
//! Closed blocks and spans are never touched again.

use crate::element::{Block, BlockKind, CodeBlock, Document, InlineSpan, SpanKind};

/// A single mutation of the tree, in the order it happened.
///
/// Replaying the events of a session against a presentation surface
/// reproduces the session's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    OpenBlock(BlockKind),
    /// Language of the open code block, sent once
    Language(String),
    OpenSpan(SpanKind),
    Text(String),
    CloseSpan,
    CloseBlock,
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    document: Document,
    block_open: bool,
    span_open: bool,

    /// Mutation log, only kept when someone is listening
    events: Option<Vec<TreeEvent>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that also records [`TreeEvent`]s.
    pub fn with_events() -> Self {
        Self {
            events: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Take the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.events.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn record(&mut self, event: TreeEvent) {
        if let Some(events) = self.events.as_mut() {
            events.push(event);
        }
    }

    pub fn open_block_kind(&self) -> Option<BlockKind> {
        if self.block_open {
            self.document.blocks.last().map(Block::kind)
        } else {
            None
        }
    }

    pub fn open_span_kind(&self) -> Option<SpanKind> {
        if !self.span_open {
            return None;
        }
        self.document
            .blocks
            .last()
            .and_then(|b| b.inlines().last())
            .and_then(InlineSpan::kind)
    }

    /// Start a new block. Any block still open is closed first.
    pub fn open_block(&mut self, kind: BlockKind) {
        self.close_block();

        let block = match kind {
            BlockKind::Heading(level) => Block::Heading {
                level: level.clamp(1, 6),
                content: Vec::new(),
                closed: false,
            },
            BlockKind::CodeBlock => Block::CodeBlock(CodeBlock::default()),
            BlockKind::Paragraph => Block::Paragraph {
                content: Vec::new(),
                closed: false,
            },
        };

        tracing::trace!("open block {:?}", block.kind());
        self.record(TreeEvent::OpenBlock(block.kind()));
        self.document.blocks.push(block);
        self.block_open = true;
    }

    /// Set the language of the open code block. Later calls are ignored.
    pub fn set_language(&mut self, language: &str) {
        let Some(Block::CodeBlock(cb)) = self.open_block_mut() else {
            return;
        };
        if cb.language.is_some() {
            return;
        }
        cb.language = Some(language.to_string());
        self.record(TreeEvent::Language(language.to_string()));
    }

    /// Open a span in the current heading or paragraph, starting a paragraph
    /// if nothing is open.
    pub fn open_span(&mut self, kind: SpanKind) {
        if self.span_open {
            self.close_span();
        }
        if !matches!(
            self.open_block_kind(),
            Some(BlockKind::Heading(_) | BlockKind::Paragraph)
        ) {
            self.open_block(BlockKind::Paragraph);
        }

        let span = match kind {
            SpanKind::Styled(style) => InlineSpan::Styled {
                style,
                content: String::new(),
                closed: false,
            },
            SpanKind::Code => InlineSpan::Code {
                content: String::new(),
                closed: false,
            },
        };

        if let Some(inlines) = self.open_inlines_mut() {
            inlines.push(span);
            self.span_open = true;
            self.record(TreeEvent::OpenSpan(kind));
        }
    }

    /// Append text to the innermost open sink. Text with nowhere to go
    /// starts a paragraph.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.block_open {
            self.open_block(BlockKind::Paragraph);
        }

        let span_open = self.span_open;
        match self.open_block_mut() {
            Some(Block::CodeBlock(cb)) => cb.content.push_str(text),
            Some(Block::Heading { content, .. } | Block::Paragraph { content, .. }) => {
                match content.last_mut() {
                    Some(
                        InlineSpan::Styled { content, .. } | InlineSpan::Code { content, .. },
                    ) if span_open => content.push_str(text),
                    Some(InlineSpan::Text { text: existing }) => existing.push_str(text),
                    _ => content.push(InlineSpan::Text {
                        text: text.to_string(),
                    }),
                }
            }
            None => return,
        }

        self.record(TreeEvent::Text(text.to_string()));
    }

    pub fn append_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.append(c.encode_utf8(&mut buf));
    }

    /// Close the open span, if any.
    pub fn close_span(&mut self) {
        if !self.span_open {
            return;
        }
        self.span_open = false;

        if let Some(
            InlineSpan::Styled { closed, .. } | InlineSpan::Code { closed, .. },
        ) = self.open_inlines_mut().and_then(|inlines| inlines.last_mut())
        {
            *closed = true;
        }
        self.record(TreeEvent::CloseSpan);
    }

    /// Close the open block together with any span inside it.
    pub fn close_block(&mut self) {
        if !self.block_open {
            return;
        }
        self.close_span();
        self.block_open = false;

        if let Some(block) = self.document.blocks.last_mut() {
            match block {
                Block::Heading { closed, .. } | Block::Paragraph { closed, .. } => {
                    *closed = true
                }
                Block::CodeBlock(cb) => cb.closed = true,
            }
            tracing::trace!("close block {:?}", block.kind());
        }
        self.record(TreeEvent::CloseBlock);
    }

    fn open_block_mut(&mut self) -> Option<&mut Block> {
        if self.block_open {
            self.document.blocks.last_mut()
        } else {
            None
        }
    }

    fn open_inlines_mut(&mut self) -> Option<&mut Vec<InlineSpan>> {
        match self.open_block_mut()? {
            Block::Heading { content, .. } | Block::Paragraph { content, .. } => Some(content),
            Block::CodeBlock(_) => None,
        }
    }
}

/// The events that build `document` from scratch.
///
/// Used to draw a full re-render on a presentation surface.
pub fn document_events(document: &Document) -> Vec<TreeEvent> {
    let mut events = Vec::new();

    for block in &document.blocks {
        events.push(TreeEvent::OpenBlock(block.kind()));
        match block {
            Block::CodeBlock(cb) => {
                if let Some(language) = &cb.language {
                    events.push(TreeEvent::Language(language.clone()));
                }
                if !cb.content.is_empty() {
                    events.push(TreeEvent::Text(cb.content.clone()));
                }
            }
            _ => {
                for span in block.inlines() {
                    match span.kind() {
                        None => events.push(TreeEvent::Text(span.text().to_string())),
                        Some(kind) => {
                            events.push(TreeEvent::OpenSpan(kind));
                            if !span.text().is_empty() {
                                events.push(TreeEvent::Text(span.text().to_string()));
                            }
                            if span.is_closed() {
                                events.push(TreeEvent::CloseSpan);
                            }
                        }
                    }
                }
            }
        }
        if block.is_closed() {
            events.push(TreeEvent::CloseBlock);
        }
    }

    events
}
