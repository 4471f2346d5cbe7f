//! Markdown elements - the document produced by a parser session.

use serde::Serialize;

/// The rendered document of one streamed message.
///
/// Blocks are only ever appended. At most one block (the last one) is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The block currently receiving characters, if any.
    pub fn open_block(&self) -> Option<&Block> {
        self.blocks.last().filter(|b| !b.is_closed())
    }

    /// True when no block or span is left open.
    pub fn is_complete(&self) -> bool {
        self.open_block().is_none()
    }

    /// Blocks that can no longer change.
    pub fn closed_blocks(&self) -> &[Block] {
        match self.open_block() {
            Some(_) => &self.blocks[..self.blocks.len() - 1],
            None => &self.blocks,
        }
    }
}

/// A top level markdown element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// ATX heading with level (1-6) and inline content
    Heading {
        level: u8,
        content: Vec<InlineSpan>,
        closed: bool,
    },

    /// Fenced code block
    CodeBlock(CodeBlock),

    /// A line of text (may contain inline spans)
    Paragraph {
        content: Vec<InlineSpan>,
        closed: bool,
    },
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading { level, .. } => BlockKind::Heading(*level),
            Block::CodeBlock(_) => BlockKind::CodeBlock,
            Block::Paragraph { .. } => BlockKind::Paragraph,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Block::Heading { closed, .. } | Block::Paragraph { closed, .. } => *closed,
            Block::CodeBlock(cb) => cb.closed,
        }
    }

    /// Inline content of headings and paragraphs. Code blocks have none.
    pub fn inlines(&self) -> &[InlineSpan] {
        match self {
            Block::Heading { content, .. } | Block::Paragraph { content, .. } => content,
            Block::CodeBlock(_) => &[],
        }
    }

    /// Text of the block with all markup stripped.
    pub fn plain_text(&self) -> String {
        match self {
            Block::CodeBlock(cb) => cb.content.clone(),
            _ => self.inlines().iter().map(InlineSpan::text).collect(),
        }
    }
}

/// A fenced code block.
///
/// `language` stays `None` until the line holding the opening fence ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub content: String,
    pub closed: bool,
}

/// Inline elements within a heading or paragraph.
///
/// Emphasis cannot nest, so styled spans only ever hold text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineSpan {
    /// Plain text
    Text { text: String },

    /// Bold or italic text
    Styled {
        style: InlineStyle,
        content: String,
        closed: bool,
    },

    /// Inline code (`code`), stored verbatim
    Code { content: String, closed: bool },
}

impl InlineSpan {
    pub fn text(&self) -> &str {
        match self {
            InlineSpan::Text { text } => text,
            InlineSpan::Styled { content, .. } | InlineSpan::Code { content, .. } => content,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            InlineSpan::Text { .. } => true,
            InlineSpan::Styled { closed, .. } | InlineSpan::Code { closed, .. } => *closed,
        }
    }

    pub fn kind(&self) -> Option<SpanKind> {
        match self {
            InlineSpan::Text { .. } => None,
            InlineSpan::Styled { style, .. } => Some(SpanKind::Styled(*style)),
            InlineSpan::Code { .. } => Some(SpanKind::Code),
        }
    }
}

/// Inline text styles. They never combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineStyle {
    Bold,
    Italic,
}

impl InlineStyle {
    /// The delimiter that toggles this style.
    pub fn marker(&self) -> &'static str {
        match self {
            InlineStyle::Bold => "**",
            InlineStyle::Italic => "*",
        }
    }
}

/// What kind of block to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading(u8),
    CodeBlock,
    Paragraph,
}

/// What kind of span to open inside a heading or paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Styled(InlineStyle),
    Code,
}
