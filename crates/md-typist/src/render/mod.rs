//! Binding documents to presentation surfaces.
//!
//! The parser never touches a surface. A [`Binder`] replays the tree
//! mutations of a session on one, so all styling stays with the surface.

mod html;
mod term;

pub use html::HtmlSurface;
pub use term::TermSurface;

use tracing::warn;

use crate::builder::{document_events, TreeEvent};
use crate::element::{BlockKind, Document, SpanKind};
use crate::error::Result;
use crate::session::{RenderMode, Session};

/// Something that can show a document, one node at a time.
///
/// Calls arrive in tree order: a block is opened, receives text and spans,
/// then is closed. Text for headings, bold and italic is presentational and
/// should keep runs of spaces visible.
pub trait Surface {
    /// Attach to the container named `target`.
    fn bind(&mut self, _target: &str) -> Result<()> {
        Ok(())
    }

    /// Drop everything shown so far, before a full re-render.
    fn clear(&mut self) -> Result<()>;

    fn open_block(&mut self, kind: BlockKind) -> Result<()>;

    /// Language label of the open code block.
    fn set_language(&mut self, language: &str) -> Result<()>;

    fn open_span(&mut self, kind: SpanKind) -> Result<()>;

    fn push_text(&mut self, text: &str) -> Result<()>;

    fn close_span(&mut self) -> Result<()>;

    fn close_block(&mut self) -> Result<()>;

    /// Called after each batch of events.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Applies tree events to a surface.
///
/// Surface failures are logged and skipped; they never reach the parser.
pub struct Binder<S> {
    surface: S,
    target: String,
}

impl<S: Surface> Binder<S> {
    /// Bind `surface` to `target`. Fails if the surface has no such
    /// container.
    pub fn attach(mut surface: S, target: &str) -> Result<Self> {
        surface.bind(target)?;
        Ok(Self {
            surface,
            target: target.to_string(),
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn apply(&mut self, events: &[TreeEvent]) {
        for event in events {
            let res = match event {
                TreeEvent::OpenBlock(kind) => self.surface.open_block(*kind),
                TreeEvent::Language(language) => self.surface.set_language(language),
                TreeEvent::OpenSpan(kind) => self.surface.open_span(*kind),
                TreeEvent::Text(text) => self.surface.push_text(text),
                TreeEvent::CloseSpan => self.surface.close_span(),
                TreeEvent::CloseBlock => self.surface.close_block(),
            };
            if let Err(err) = res {
                warn!("surface '{}' failed on {:?}: {}", self.target, event, err);
            }
        }
        if let Err(err) = self.surface.flush() {
            warn!("surface '{}' flush failed: {}", self.target, err);
        }
    }

    /// Clear the surface and draw `document` from scratch.
    pub fn replace(&mut self, document: &Document) {
        if let Err(err) = self.surface.clear() {
            warn!("surface '{}' clear failed: {}", self.target, err);
        }
        self.apply(&document_events(document));
    }
}

/// Draw a whole document on a fresh surface.
pub fn render_document<S: Surface>(surface: &mut S, document: &Document) -> Result<()> {
    for event in document_events(document) {
        match event {
            TreeEvent::OpenBlock(kind) => surface.open_block(kind)?,
            TreeEvent::Language(language) => surface.set_language(&language)?,
            TreeEvent::OpenSpan(kind) => surface.open_span(kind)?,
            TreeEvent::Text(text) => surface.push_text(&text)?,
            TreeEvent::CloseSpan => surface.close_span()?,
            TreeEvent::CloseBlock => surface.close_block()?,
        }
    }
    surface.flush()
}

/// A session bound to a surface: text goes in, the surface stays current.
pub struct Renderer<S> {
    session: Session,
    binder: Binder<S>,
    mode: RenderMode,
}

impl<S: Surface> Renderer<S> {
    pub fn attach(surface: S, target: &str, mode: RenderMode) -> Result<Self> {
        let binder = Binder::attach(surface, target)?;
        Ok(Self {
            session: Session::with_events(),
            binder,
            mode,
        })
    }

    pub fn append(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        self.session.append(fragment);
        self.sync();
    }

    pub fn end_stream(&mut self) {
        self.session.end_stream();
        self.sync();
    }

    /// Close everything left open and show the clean result.
    pub fn finalize(&mut self) {
        self.session.finalize();
        let events = self.session.drain_events();
        match self.mode {
            RenderMode::Incremental => self.binder.apply(&events),
            RenderMode::Rerender => self.binder.replace(self.session.document()),
        }
    }

    fn sync(&mut self) {
        let events = self.session.drain_events();
        match self.mode {
            RenderMode::Incremental => self.binder.apply(&events),
            RenderMode::Rerender => self.binder.replace(&self.session.rerender()),
        }
    }

    pub fn document(&self) -> &Document {
        self.session.document()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &S {
        self.binder.surface()
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn into_surface(self) -> S {
        self.binder.into_surface()
    }
}
