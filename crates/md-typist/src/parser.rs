//! Core streaming parser implementation.

use crate::builder::{TreeBuilder, TreeEvent};
use crate::delimiter::{DelimiterBuffer, Toggle, Token};
use crate::element::{BlockKind, Document, InlineStyle, SpanKind};
use crate::partial::Mode;

/// Label given to code blocks opened without a language.
pub const DEFAULT_LANGUAGE: &str = "plain text";

const MAX_HEADING_LEVEL: usize = 6;

/// Incremental markdown parser for streaming input.
///
/// Characters are consumed one at a time and every one of them is committed
/// to the tree right away, so the parser can be fed fragments split at any
/// offset. The only input held back is a marker run (backticks or asterisks)
/// or a `#` run at line start whose meaning depends on what follows.
#[derive(Debug, Clone)]
pub struct StreamParser {
    tree: TreeBuilder,
    delimiters: DelimiterBuffer,
    mode: Mode,

    /// Info string of the code fence being opened
    language: String,

    /// Are we at the start of a line? (for heading detection)
    at_line_start: bool,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::with_tree(TreeBuilder::new())
    }

    /// A parser whose tree records [`TreeEvent`]s.
    pub fn with_events() -> Self {
        Self::with_tree(TreeBuilder::with_events())
    }

    fn with_tree(tree: TreeBuilder) -> Self {
        Self {
            tree,
            delimiters: DelimiterBuffer::new(),
            mode: Mode::Normal,
            language: String::new(),
            at_line_start: true,
        }
    }

    /// Feed a fragment of any length. Empty fragments do nothing.
    pub fn push(&mut self, text: &str) {
        for c in text.chars() {
            self.push_char(c);
        }
    }

    pub fn push_char(&mut self, c: char) {
        for token in self.delimiters.push(c).into_iter().flatten() {
            self.handle(token);
        }
    }

    /// Resolve input held back waiting for more characters.
    ///
    /// Open blocks and spans stay open. Calling this more than once is
    /// harmless, and more input may still follow.
    pub fn end_of_stream(&mut self) {
        if let Some(token) = self.delimiters.finish() {
            self.handle(token);
        }
        if let Mode::HeadingHashRun(count) = self.mode {
            self.abort_hash_run(count);
        }
    }

    /// End the stream and close everything left open.
    pub fn finalize(&mut self) {
        self.end_of_stream();
        if self.mode == Mode::CodeBlockLanguage {
            self.commit_language();
        }
        self.tree.close_block();
        self.mode = Mode::Normal;
        self.at_line_start = true;
    }

    pub fn document(&self) -> &Document {
        self.tree.document()
    }

    pub fn into_document(self) -> Document {
        self.tree.into_document()
    }

    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.tree.drain_events()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Check if we're currently inside a code block.
    pub fn in_code_block(&self) -> bool {
        self.mode.in_code_block()
    }

    pub fn bold_active(&self) -> bool {
        self.tree.open_span_kind() == Some(SpanKind::Styled(InlineStyle::Bold))
    }

    pub fn italic_active(&self) -> bool {
        self.tree.open_span_kind() == Some(SpanKind::Styled(InlineStyle::Italic))
    }

    /// Is any input held back that has not reached the document yet?
    pub fn has_pending(&self) -> bool {
        !self.delimiters.is_empty() || matches!(self.mode, Mode::HeadingHashRun(_))
    }

    /// Nothing pending and nothing left open.
    pub fn is_complete(&self) -> bool {
        !self.has_pending() && self.document().is_complete()
    }

    fn handle(&mut self, token: Token) {
        match self.mode {
            Mode::CodeBlockContent => self.handle_code_content(token),
            Mode::CodeBlockLanguage => self.handle_language(token),
            Mode::HeadingHashRun(count) => self.handle_hash_run(count, token),
            Mode::InlineCode => self.handle_inline_code(token),
            Mode::Normal => self.handle_normal(token),
        }
    }

    fn handle_code_content(&mut self, token: Token) {
        match token {
            Token::Toggle(Toggle::CodeFence) => self.close_code_block(),
            Token::Toggle(toggle) => self.tree.append(toggle.as_str()),
            Token::Literal(text) => self.tree.append(&text),
            Token::Char(c) => self.tree.append_char(c),
        }
    }

    fn handle_language(&mut self, token: Token) {
        match token {
            Token::Toggle(Toggle::CodeFence) => {
                self.commit_language();
                self.close_code_block();
            }
            Token::Char('\n') => {
                // the newline ends the info string and is not content
                self.commit_language();
                self.mode = Mode::CodeBlockContent;
            }
            Token::Char(c) => self.language.push(c),
            Token::Toggle(toggle) => self.language.push_str(toggle.as_str()),
            Token::Literal(text) => self.language.push_str(&text),
        }
    }

    fn handle_hash_run(&mut self, count: usize, token: Token) {
        match token {
            Token::Char('#') => self.mode = Mode::HeadingHashRun(count + 1),
            Token::Char(' ') => {
                let level = count.min(MAX_HEADING_LEVEL) as u8;
                tracing::debug!("heading level {level}");
                self.tree.open_block(BlockKind::Heading(level));
                self.mode = Mode::Normal;
                self.at_line_start = false;
            }
            other => {
                // not a heading after all
                self.abort_hash_run(count);
                self.handle(other);
            }
        }
    }

    fn handle_inline_code(&mut self, token: Token) {
        match token {
            Token::Toggle(Toggle::InlineCode) => {
                self.tree.close_span();
                self.mode = Mode::Normal;
            }
            Token::Toggle(Toggle::CodeFence) => self.open_code_block(),
            Token::Toggle(toggle) => self.tree.append(toggle.as_str()),
            Token::Literal(text) => self.tree.append(&text),
            Token::Char('\n') if self.heading_open() => {
                self.tree.close_block();
                self.mode = Mode::Normal;
                self.at_line_start = true;
            }
            Token::Char(c) => self.tree.append_char(c),
        }
    }

    fn handle_normal(&mut self, token: Token) {
        let line_start = std::mem::replace(&mut self.at_line_start, false);

        match token {
            Token::Toggle(Toggle::CodeFence) => self.open_code_block(),
            Token::Toggle(Toggle::InlineCode) => {
                if self.tree.open_span_kind().is_some() {
                    // no room for a second span
                    self.tree.append(Toggle::InlineCode.as_str());
                } else {
                    self.tree.open_span(SpanKind::Code);
                    self.mode = Mode::InlineCode;
                }
            }
            Token::Toggle(Toggle::Bold) => self.toggle_emphasis(InlineStyle::Bold),
            Token::Toggle(Toggle::Italic) => self.toggle_emphasis(InlineStyle::Italic),
            Token::Literal(text) => self.tree.append(&text),
            Token::Char('\n') => self.newline(),
            Token::Char('#') if line_start && self.tree.open_block_kind().is_none() => {
                self.mode = Mode::HeadingHashRun(1);
            }
            Token::Char(c) => self.tree.append_char(c),
        }
    }

    fn newline(&mut self) {
        match self.tree.open_block_kind() {
            Some(BlockKind::Heading(_)) => self.tree.close_block(),
            Some(BlockKind::Paragraph) => {
                if self.tree.open_span_kind().is_some() {
                    // an open span carries the paragraph onto the next line
                    self.tree.append("\n");
                } else {
                    self.tree.close_block();
                }
            }
            Some(BlockKind::CodeBlock) => self.tree.append("\n"),
            None => {}
        }
        self.at_line_start = true;
    }

    fn toggle_emphasis(&mut self, style: InlineStyle) {
        let open = self.tree.open_span_kind();
        debug_assert!(
            open != Some(SpanKind::Code),
            "code spans are read in InlineCode mode"
        );

        match open {
            Some(SpanKind::Styled(open)) if open == style => self.tree.close_span(),
            // emphasis does not nest
            Some(SpanKind::Styled(_)) | Some(SpanKind::Code) => self.tree.append(style.marker()),
            None => self.tree.open_span(SpanKind::Styled(style)),
        }
    }

    fn heading_open(&self) -> bool {
        matches!(self.tree.open_block_kind(), Some(BlockKind::Heading(_)))
    }

    fn abort_hash_run(&mut self, count: usize) {
        self.mode = Mode::Normal;
        self.at_line_start = false;
        self.tree.append(&"#".repeat(count));
    }

    fn open_code_block(&mut self) {
        self.tree.open_block(BlockKind::CodeBlock);
        self.language.clear();
        self.mode = Mode::CodeBlockLanguage;
    }

    fn commit_language(&mut self) {
        let language = match self.language.trim() {
            "" => DEFAULT_LANGUAGE,
            lang => lang,
        };
        tracing::debug!("code block language {language}");
        self.tree.set_language(language);
        self.language.clear();
    }

    fn close_code_block(&mut self) {
        self.tree.close_block();
        self.mode = Mode::Normal;
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}
