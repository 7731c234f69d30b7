//! The remote-application boundary: element queries, gesture primitives,
//! and process control over an opaque application handle.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Scope of a lookup within the remote accessibility tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Container {
    Window,
    NavigationBar,
    TabBar,
    Collection,
    Alert,
    /// Any storage cell, regardless of identifier.
    AnyCell,
    /// A specific storage cell, by accessibility identifier.
    Cell(String),
}

/// Accessibility role of the element being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Root,
    Button,
    Cell,
    StaticText,
    TextField,
    Image,
    Alert,
    Collection,
    NavigationBar,
}

/// How the element is selected within its container and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Matcher {
    Label(String),
    Id(String),
    First,
}

/// A single accessibility-tree lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    pub container: Container,
    pub role: Role,
    pub matcher: Matcher,
}

impl ElementQuery {
    fn new(container: Container, role: Role, matcher: Matcher) -> Self {
        Self {
            container,
            role,
            matcher,
        }
    }

    /// The application's root element; observable once the process is up.
    pub fn root() -> Self {
        Self::new(Container::Window, Role::Root, Matcher::First)
    }

    pub fn nav_button(label: &str) -> Self {
        Self::new(
            Container::NavigationBar,
            Role::Button,
            Matcher::Label(label.to_owned()),
        )
    }

    /// Navigation bar matched by identifier, i.e. the open document's title.
    pub fn nav_title(title: &str) -> Self {
        Self::new(
            Container::Window,
            Role::NavigationBar,
            Matcher::Id(title.to_owned()),
        )
    }

    pub fn nav_static_text(label: &str) -> Self {
        Self::new(
            Container::NavigationBar,
            Role::StaticText,
            Matcher::Label(label.to_owned()),
        )
    }

    pub fn tab_button(label: &str) -> Self {
        Self::new(
            Container::TabBar,
            Role::Button,
            Matcher::Label(label.to_owned()),
        )
    }

    /// Storage cell in the frontmost collection view, by identifier.
    pub fn cell(identifier: &str) -> Self {
        Self::new(
            Container::Collection,
            Role::Cell,
            Matcher::Id(identifier.to_owned()),
        )
    }

    /// The collection surface itself, target of the paste long-press.
    pub fn collection_surface() -> Self {
        Self::new(Container::Window, Role::Collection, Matcher::First)
    }

    pub fn button(label: &str) -> Self {
        Self::new(
            Container::Window,
            Role::Button,
            Matcher::Label(label.to_owned()),
        )
    }

    pub fn static_text(label: &str) -> Self {
        Self::new(
            Container::Window,
            Role::StaticText,
            Matcher::Label(label.to_owned()),
        )
    }

    pub fn alert() -> Self {
        Self::new(Container::Window, Role::Alert, Matcher::First)
    }

    pub fn alert_button(label: &str) -> Self {
        Self::new(
            Container::Alert,
            Role::Button,
            Matcher::Label(label.to_owned()),
        )
    }

    pub fn text_field_with_id(identifier: &str) -> Self {
        Self::new(
            Container::Window,
            Role::TextField,
            Matcher::Id(identifier.to_owned()),
        )
    }

    pub fn first_text_field() -> Self {
        Self::new(Container::Window, Role::TextField, Matcher::First)
    }

    pub fn image_in_cell(cell_identifier: &str) -> Self {
        Self::new(
            Container::Cell(cell_identifier.to_owned()),
            Role::Image,
            Matcher::First,
        )
    }

    pub fn cell_static_text(label: &str) -> Self {
        Self::new(
            Container::AnyCell,
            Role::StaticText,
            Matcher::Label(label.to_owned()),
        )
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.container, self.role)?;
        match &self.matcher {
            Matcher::Label(label) => write!(f, "[label={label}]"),
            Matcher::Id(id) => write!(f, "[id={id}]"),
            Matcher::First => write!(f, "[first]"),
        }
    }
}

/// The four gesture primitives the driver is allowed to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    Tap,
    DoubleTap,
    LongPress { millis: u64 },
    TypeText(String),
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tap => write!(f, "tap"),
            Self::DoubleTap => write!(f, "double-tap"),
            Self::LongPress { millis } => write!(f, "long-press({millis}ms)"),
            Self::TypeText(text) => write!(f, "type {text:?}"),
        }
    }
}

/// Opaque handle to the externally-running application.
///
/// One handle is created per navigator. `terminate`/`launch` control the
/// underlying process; the handle stays valid across restarts. All state
/// questions go through `exists` at call time, never through caching.
pub trait RemoteApp {
    fn terminate(&mut self) -> Result<()>;
    fn launch(&mut self) -> Result<()>;
    fn exists(&self, query: &ElementQuery) -> Result<bool>;
    fn perform(&mut self, query: &ElementQuery, gesture: Gesture) -> Result<()>;
}

/// Ordered lookup strategies tried in sequence; the first that resolves
/// wins. Tolerates platform/version drift without branching at call sites.
pub fn first_existing<A: RemoteApp + ?Sized>(
    app: &A,
    candidates: &[ElementQuery],
) -> Result<Option<ElementQuery>> {
    for query in candidates {
        if app.exists(query)? {
            return Ok(Some(query.clone()));
        }
    }
    Ok(None)
}
