//! View State Machine
//!
//! Keeps exactly one view active and drives the markdown pipeline when the
//! markdown view is selected. Rendering is pull-based: every activation of
//! the markdown view re-reads the raw source.

use serde::Serialize;
use thiserror::Error;

use crate::convert::prepare_markdown;
use crate::render::{MarkdownRenderer, TypesetError, Typesetter};
use crate::view::surface::{Activator, Surface, ViewKind};

/// Errors raised while building or driving the view machine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("view '{0}' is not registered")]
    UnknownView(ViewKind),

    #[error("view '{0}' is registered more than once")]
    DuplicateView(ViewKind),

    #[error("no views registered")]
    NoViews,

    #[error("the markdown view needs a raw view to read its source from")]
    MissingSource,
}

/// A registered view: its activator plus its display surface
pub struct View {
    kind: ViewKind,
    activator: Box<dyn Activator>,
    surface: Box<dyn Surface>,
}

impl View {
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    fn select(&mut self, selected: bool) {
        self.activator.set_active(selected);
        self.surface.set_visible(selected);
    }
}

/// Rendered HTML waiting for its typesetting pass.
///
/// The generation identifies the render the ticket belongs to; a completion
/// for an older generation is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesetTicket {
    generation: u64,
    html: String,
}

impl TypesetTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// What an activation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Visibility changed only
    Shown(ViewKind),
    /// The markdown view was re-rendered and awaits typesetting
    Rendered(TypesetTicket),
}

/// Result of applying a typesetting completion
#[derive(Debug)]
pub enum TypesetOutcome {
    /// Typeset HTML replaced the rendered markdown
    Applied,
    /// A newer render superseded this pass; nothing changed
    Stale,
    /// Typesetting failed; the rendered markdown stays visible
    Failed(TypesetError),
}

/// Snapshot of one view, for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub kind: ViewKind,
    pub active: bool,
    pub visible: bool,
}

/// Builder receiving every view's elements up front
pub struct ViewStateMachineBuilder {
    views: Vec<View>,
    renderer: Box<dyn MarkdownRenderer>,
    escape_math: bool,
    initial_view: Option<ViewKind>,
}

impl ViewStateMachineBuilder {
    /// Register a view with its activator and surface
    pub fn view(
        mut self,
        kind: ViewKind,
        activator: impl Activator + 'static,
        surface: impl Surface + 'static,
    ) -> Self {
        self.views.push(View {
            kind,
            activator: Box::new(activator),
            surface: Box::new(surface),
        });
        self
    }

    /// Escape math delimiters before rendering (default: on)
    pub fn escape_math(mut self, escape_math: bool) -> Self {
        self.escape_math = escape_math;
        self
    }

    /// View to show at startup instead of the markdown view
    pub fn initial_view(mut self, initial_view: Option<ViewKind>) -> Self {
        self.initial_view = initial_view;
        self
    }

    pub fn build(self) -> Result<ViewStateMachine, ViewError> {
        if self.views.is_empty() {
            return Err(ViewError::NoViews);
        }

        for (i, view) in self.views.iter().enumerate() {
            if self.views[..i].iter().any(|other| other.kind == view.kind) {
                return Err(ViewError::DuplicateView(view.kind));
            }
        }

        let has = |kind| self.views.iter().any(|v| v.kind == kind);
        if has(ViewKind::Markdown) && !has(ViewKind::Raw) {
            return Err(ViewError::MissingSource);
        }
        if let Some(initial) = self.initial_view {
            if !has(initial) {
                return Err(ViewError::UnknownView(initial));
            }
        }

        Ok(ViewStateMachine {
            views: self.views,
            renderer: self.renderer,
            escape_math: self.escape_math,
            initial_view: self.initial_view,
            active: None,
            generation: 0,
        })
    }
}

/// Mutually exclusive view switcher
pub struct ViewStateMachine {
    views: Vec<View>,
    renderer: Box<dyn MarkdownRenderer>,
    escape_math: bool,
    initial_view: Option<ViewKind>,
    active: Option<ViewKind>,
    generation: u64,
}

impl ViewStateMachine {
    pub fn builder(renderer: impl MarkdownRenderer + 'static) -> ViewStateMachineBuilder {
        ViewStateMachineBuilder {
            views: Vec::new(),
            renderer: Box::new(renderer),
            escape_math: true,
            initial_view: None,
        }
    }

    /// Startup transition.
    ///
    /// Shows the configured initial view, otherwise the markdown view (which
    /// renders eagerly), otherwise the first registered view.
    pub fn start(&mut self) -> Result<Activation, ViewError> {
        let target = self
            .initial_view
            .or_else(|| self.contains(ViewKind::Markdown).then_some(ViewKind::Markdown))
            .or_else(|| self.views.first().map(View::kind))
            .ok_or(ViewError::NoViews)?;

        log::debug!("Starting with the {} view", target);
        self.activate(target)
    }

    /// Make `target` the only active and visible view.
    ///
    /// Activating the markdown view re-reads the raw source, renders it and
    /// returns a ticket for the typesetting pass. Activating the plain view
    /// copies the raw source into it unchanged. An unregistered target is
    /// rejected without touching any view.
    pub fn activate(&mut self, target: ViewKind) -> Result<Activation, ViewError> {
        if !self.contains(target) {
            return Err(ViewError::UnknownView(target));
        }

        for view in &mut self.views {
            view.select(view.kind == target);
        }
        self.active = Some(target);
        log::debug!("Activated the {} view", target);

        match target {
            ViewKind::Markdown => Ok(Activation::Rendered(self.render_markdown()?)),
            ViewKind::Plain => {
                self.refresh_plain();
                Ok(Activation::Shown(target))
            }
            ViewKind::Raw => Ok(Activation::Shown(target)),
        }
    }

    /// Apply the result of a typesetting pass.
    ///
    /// Completions for a superseded render are dropped. A failure is logged
    /// and leaves the rendered markdown in place.
    pub fn complete_typeset(
        &mut self,
        ticket: TypesetTicket,
        result: Result<String, TypesetError>,
    ) -> TypesetOutcome {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping typeset result for render {} (current is {})",
                ticket.generation,
                self.generation
            );
            return TypesetOutcome::Stale;
        }

        match result {
            Ok(html) => match self.view_mut(ViewKind::Markdown) {
                Some(view) => {
                    view.surface.replace_content(html);
                    TypesetOutcome::Applied
                }
                None => TypesetOutcome::Stale,
            },
            Err(e) => {
                log::warn!("Typesetting failed, keeping rendered markdown: {}", e);
                TypesetOutcome::Failed(e)
            }
        }
    }

    /// Activate `target` and, for the markdown view, run the typesetting pass.
    ///
    /// Returns `None` when no typesetting was needed.
    pub async fn activate_and_typeset<T: Typesetter>(
        &mut self,
        target: ViewKind,
        typesetter: &T,
    ) -> Result<Option<TypesetOutcome>, ViewError> {
        match self.activate(target)? {
            Activation::Shown(_) => Ok(None),
            Activation::Rendered(ticket) => {
                let result = typesetter.typeset(ticket.html.clone()).await;
                Ok(Some(self.complete_typeset(ticket, result)))
            }
        }
    }

    /// Replace the raw source text. The markdown and plain views pick it up
    /// on their next activation.
    pub fn set_source(&mut self, text: impl Into<String>) -> Result<(), ViewError> {
        let view = self
            .view_mut(ViewKind::Raw)
            .ok_or(ViewError::UnknownView(ViewKind::Raw))?;
        view.surface.replace_content(text.into());
        Ok(())
    }

    pub fn active(&self) -> Option<ViewKind> {
        self.active
    }

    /// Whether the view's activator is marked active
    pub fn is_active(&self, kind: ViewKind) -> bool {
        self.view(kind).is_some_and(|v| v.activator.is_active())
    }

    pub fn contains(&self, kind: ViewKind) -> bool {
        self.view(kind).is_some()
    }

    /// Registered views in registration order
    pub fn views(&self) -> impl Iterator<Item = ViewKind> + '_ {
        self.views.iter().map(View::kind)
    }

    pub fn surface(&self, kind: ViewKind) -> Option<&dyn Surface> {
        let view = self.view(kind)?;
        let surface: &dyn Surface = view.surface.as_ref();
        Some(surface)
    }

    pub fn surface_mut(&mut self, kind: ViewKind) -> Option<&mut dyn Surface> {
        let view = self.view_mut(kind)?;
        let surface: &mut dyn Surface = view.surface.as_mut();
        Some(surface)
    }

    /// Content of the visible surface, if any
    pub fn visible_content(&self) -> Option<String> {
        self.views
            .iter()
            .find(|v| v.surface.is_visible())
            .map(|v| v.surface.text())
    }

    /// Number of markdown renders so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn states(&self) -> Vec<ViewState> {
        self.views
            .iter()
            .map(|v| ViewState {
                kind: v.kind,
                active: v.activator.is_active(),
                visible: v.surface.is_visible(),
            })
            .collect()
    }

    fn render_markdown(&mut self) -> Result<TypesetTicket, ViewError> {
        let source = self
            .view(ViewKind::Raw)
            .ok_or(ViewError::MissingSource)?
            .surface
            .text();

        let prepared = prepare_markdown(&source, self.escape_math);
        let html = self.renderer.render(&prepared);

        self.generation += 1;
        let generation = self.generation;
        log::debug!(
            "Rendered markdown view (render {}, {} bytes)",
            generation,
            html.len()
        );

        let view = self
            .view_mut(ViewKind::Markdown)
            .ok_or(ViewError::UnknownView(ViewKind::Markdown))?;
        view.surface.replace_content(html.clone());

        Ok(TypesetTicket { generation, html })
    }

    /// Copy the raw source into the plain view verbatim. Without a raw view
    /// the plain surface keeps whatever it was given.
    fn refresh_plain(&mut self) {
        let Some(source) = self.view(ViewKind::Raw).map(|v| v.surface.text()) else {
            return;
        };
        if let Some(view) = self.view_mut(ViewKind::Plain) {
            view.surface.replace_content(source);
        }
    }

    fn view(&self, kind: ViewKind) -> Option<&View> {
        self.views.iter().find(|v| v.kind == kind)
    }

    fn view_mut(&mut self, kind: ViewKind) -> Option<&mut View> {
        self.views.iter_mut().find(|v| v.kind == kind)
    }
}
