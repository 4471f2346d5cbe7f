//! Parse modes for constructs that are still being read.

/// What the parser is in the middle of.
///
/// Heading text is read in `Normal` mode: the open heading block is the sink
/// and the newline that ends the line closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,

    /// `#` characters seen at line start, waiting for the space that makes
    /// them a heading. Holds the raw count; the level is clamped to 6.
    HeadingHashRun(usize),

    /// Opening fence seen, collecting the info string up to the newline
    CodeBlockLanguage,

    /// Inside a fenced code block, everything is verbatim
    CodeBlockContent,

    /// Inside `inline code`
    InlineCode,
}

impl Mode {
    pub fn in_code_block(&self) -> bool {
        matches!(self, Mode::CodeBlockLanguage | Mode::CodeBlockContent)
    }
}
