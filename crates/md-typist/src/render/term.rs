use std::io::Write;

use crate::element::{BlockKind, InlineStyle, SpanKind};
use crate::error::Result;
use crate::render::Surface;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";
const CODE: &str = "\x1b[36m";

/// Writes a document to a terminal as it streams, using ANSI styling.
///
/// Terminal output can't be taken back, so text is written exactly once and
/// re-render mode clears the screen before redrawing.
pub struct TermSurface<W> {
    out: W,
    /// Style of the open block, restored when a span ends
    block_style: &'static str,
    at_line_start: bool,
}

impl<W: Write> TermSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            block_style: "",
            at_line_start: true,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) -> Result<()> {
        if !text.is_empty() {
            self.out.write_all(text.as_bytes())?;
            self.at_line_start = text.ends_with('\n');
        }
        Ok(())
    }

    fn end_line(&mut self) -> Result<()> {
        if !self.at_line_start {
            self.write("\n")?;
        }
        Ok(())
    }
}

impl<W: Write> Surface for TermSurface<W> {
    fn clear(&mut self) -> Result<()> {
        self.block_style = "";
        self.write("\x1b[2J\x1b[H")?;
        self.at_line_start = true;
        Ok(())
    }

    fn open_block(&mut self, kind: BlockKind) -> Result<()> {
        self.end_line()?;
        match kind {
            BlockKind::Heading(level) => {
                self.block_style = BOLD;
                let marker = "#".repeat(level as usize);
                self.write(&format!("{BOLD}{marker} "))?;
            }
            BlockKind::Paragraph | BlockKind::CodeBlock => self.block_style = "",
        }
        Ok(())
    }

    fn set_language(&mut self, language: &str) -> Result<()> {
        self.write(&format!("{DIM}# {language}{RESET}\n"))
    }

    fn open_span(&mut self, kind: SpanKind) -> Result<()> {
        let style = match kind {
            SpanKind::Styled(InlineStyle::Bold) => BOLD,
            SpanKind::Styled(InlineStyle::Italic) => ITALIC,
            SpanKind::Code => CODE,
        };
        self.out.write_all(style.as_bytes())?;
        Ok(())
    }

    fn push_text(&mut self, text: &str) -> Result<()> {
        self.write(text)
    }

    fn close_span(&mut self) -> Result<()> {
        let restore = format!("{RESET}{}", self.block_style);
        self.out.write_all(restore.as_bytes())?;
        Ok(())
    }

    fn close_block(&mut self) -> Result<()> {
        if !self.block_style.is_empty() {
            self.out.write_all(RESET.as_bytes())?;
        }
        self.block_style = "";
        self.end_line()
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
