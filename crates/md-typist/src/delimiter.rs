//! Disambiguation of backtick and asterisk runs.
//!
//! Marker characters are held back until the run they belong to ends, since
//! a single backtick means something different from three. A run is resolved
//! by the first character that does not extend it, or by the end of the
//! stream.

/// A delimiter recognized by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// `
    InlineCode,
    /// ```
    CodeFence,
    /// *
    Italic,
    /// **
    Bold,
}

impl Toggle {
    /// Source text of the delimiter, used when it has to be shown literally.
    pub fn as_str(&self) -> &'static str {
        match self {
            Toggle::InlineCode => "`",
            Toggle::CodeFence => "```",
            Toggle::Italic => "*",
            Toggle::Bold => "**",
        }
    }
}

/// Output of the delimiter buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any non-marker character
    Char(char),
    /// A complete delimiter
    Toggle(Toggle),
    /// A marker run with no meaning at its length
    Literal(String),
}

fn is_marker(c: char) -> bool {
    c == '`' || c == '*'
}

/// Resolve a finished run of `len` copies of `marker`.
///
/// Asterisk runs of three or more are literal, like backtick runs of two or
/// more than three.
fn resolve(marker: char, len: usize) -> Token {
    match (marker, len) {
        ('`', 1) => Token::Toggle(Toggle::InlineCode),
        ('`', 3) => Token::Toggle(Toggle::CodeFence),
        ('*', 1) => Token::Toggle(Toggle::Italic),
        ('*', 2) => Token::Toggle(Toggle::Bold),
        _ => Token::Literal(std::iter::repeat_n(marker, len).collect()),
    }
}

/// Pending run of one marker character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimiterBuffer {
    run: Option<(char, usize)>,
}

impl DelimiterBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character.
    ///
    /// Returns the resolved previous run (if this character ended one)
    /// followed by the character itself (unless it starts a new run).
    pub fn push(&mut self, c: char) -> [Option<Token>; 2] {
        if let Some((marker, len)) = self.run.as_mut() {
            if *marker == c {
                *len += 1;
                return [None, None];
            }
        }

        let resolved = self.finish();
        if is_marker(c) {
            self.run = Some((c, 1));
            [resolved, None]
        } else {
            [resolved, Some(Token::Char(c))]
        }
    }

    /// Resolve whatever run is pending. Used at end of stream.
    pub fn finish(&mut self) -> Option<Token> {
        self.run.take().map(|(marker, len)| resolve(marker, len))
    }

    /// The marker and run length currently held back.
    pub fn pending(&self) -> Option<(char, usize)> {
        self.run
    }

    pub fn is_empty(&self) -> bool {
        self.run.is_none()
    }
}
