use crate::element::{BlockKind, InlineStyle, SpanKind};
use crate::error::{Error, Result};
use crate::render::Surface;

const HEADING_CLOSE: [&str; 6] = ["</h1>", "</h2>", "</h3>", "</h4>", "</h5>", "</h6>"];

/// An element that has been opened but not closed yet.
#[derive(Debug, Clone, Copy)]
struct OpenTag {
    close: &'static str,
    /// Spaces must survive whitespace collapsing
    preserve_spaces: bool,
    code_block: bool,
}

/// Builds HTML markup as events arrive.
///
/// Markup is only ever appended; [`HtmlSurface::html`] adds the closing tags
/// for whatever is still open.
#[derive(Debug, Clone)]
pub struct HtmlSurface {
    containers: Vec<String>,
    target: Option<String>,
    out: String,
    open: Vec<OpenTag>,
}

impl HtmlSurface {
    /// A page with the given container ids to bind to.
    pub fn with_containers<I, T>(containers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            containers: containers.into_iter().map(Into::into).collect(),
            target: None,
            out: String::new(),
            open: Vec::new(),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The markup so far, with open elements closed.
    pub fn html(&self) -> String {
        let mut html = self.out.clone();
        for tag in self.open.iter().rev() {
            html.push_str(tag.close);
        }
        html
    }

    fn push_open(&mut self, markup: &str, close: &'static str, preserve_spaces: bool) {
        self.out.push_str(markup);
        self.open.push(OpenTag {
            close,
            preserve_spaces,
            code_block: false,
        });
    }

    fn pop_open(&mut self) {
        if let Some(tag) = self.open.pop() {
            self.out.push_str(tag.close);
        }
    }
}

impl Default for HtmlSurface {
    fn default() -> Self {
        Self::with_containers(["markdown"])
    }
}

impl Surface for HtmlSurface {
    fn bind(&mut self, target: &str) -> Result<()> {
        if !self.containers.iter().any(|c| c == target) {
            return Err(Error::TargetNotFound(target.to_string()));
        }
        self.target = Some(target.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.out.clear();
        self.open.clear();
        Ok(())
    }

    fn open_block(&mut self, kind: BlockKind) -> Result<()> {
        match kind {
            BlockKind::Heading(level) => {
                let level = level.clamp(1, 6);
                let markup = format!("<h{level}>");
                self.push_open(&markup, HEADING_CLOSE[level as usize - 1], true);
            }
            BlockKind::Paragraph => self.push_open("<p>", "</p>", false),
            BlockKind::CodeBlock => {
                self.out.push_str("<div class=\"code-block\">");
                self.open.push(OpenTag {
                    close: "</div>",
                    preserve_spaces: false,
                    code_block: true,
                });
            }
        }
        Ok(())
    }

    fn set_language(&mut self, language: &str) -> Result<()> {
        if !self.open.last().is_some_and(|tag| tag.code_block) {
            return Ok(());
        }
        let label = html_escape::encode_text(language);
        let class = html_escape::encode_double_quoted_attribute(language);
        self.out.push_str(&format!(
            "<div class=\"code-language\">{label}</div><pre><code class=\"language-{class}\">"
        ));
        self.open.push(OpenTag {
            close: "</code></pre>",
            preserve_spaces: false,
            code_block: false,
        });
        Ok(())
    }

    fn open_span(&mut self, kind: SpanKind) -> Result<()> {
        match kind {
            SpanKind::Styled(InlineStyle::Bold) => self.push_open("<strong>", "</strong>", true),
            SpanKind::Styled(InlineStyle::Italic) => self.push_open("<em>", "</em>", true),
            SpanKind::Code => self.push_open("<code>", "</code>", false),
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) -> Result<()> {
        let escaped = html_escape::encode_text(text);
        if self.open.last().is_some_and(|tag| tag.preserve_spaces) {
            self.out.push_str(&escaped.replace(' ', "&nbsp;"));
        } else {
            self.out.push_str(&escaped);
        }
        Ok(())
    }

    fn close_span(&mut self) -> Result<()> {
        self.pop_open();
        Ok(())
    }

    fn close_block(&mut self) -> Result<()> {
        // a code block may hold the <pre><code> wrapper as well
        while let Some(tag) = self.open.last() {
            let code_block = tag.code_block;
            self.pop_open();
            if code_block || self.open.is_empty() {
                break;
            }
        }
        self.out.push('\n');
        Ok(())
    }
}
