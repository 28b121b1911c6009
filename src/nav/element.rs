use std::fmt;

use super::context::Overlay;

/// Stable identifier of a focus target, unique within one focusable set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Area of the screen an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    MainList,
    Sidebar,
    CarouselRow(usize),
    Dropdown,
    Modal,
}

impl Region {
    pub fn describe(self) -> String {
        match self {
            Region::MainList => "main-list".to_string(),
            Region::Sidebar => "sidebar".to_string(),
            Region::CarouselRow(row) => format!("carousel-row-{row}"),
            Region::Dropdown => "dropdown".to_string(),
            Region::Modal => "modal".to_string(),
        }
    }
}

/// What activating the element means to the navigator.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRole<A> {
    /// Activation opens an overlay owned by the navigator.
    Opener(Overlay),
    /// Literal text entry; activation is left to the platform.
    TextInput,
    /// Activation is forwarded to the content layer.
    Action(A),
    /// Focusable but display-only.
    Inert,
}

impl<A> ElementRole<A> {
    pub fn kind(&self) -> &'static str {
        match self {
            ElementRole::Opener(_) => "opener",
            ElementRole::TextInput => "text_input",
            ElementRole::Action(_) => "action",
            ElementRole::Inert => "inert",
        }
    }
}

/// Handle to one UI target produced by the content layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusableElement<A> {
    pub id: ElementId,
    pub region: Region,
    pub ordinal: usize,
    pub grid_column: Option<usize>,
    pub label: String,
    pub role: ElementRole<A>,
    pub hidden: bool,
    pub disabled: bool,
}

impl<A> FocusableElement<A> {
    pub fn new(
        id: impl Into<ElementId>,
        region: Region,
        ordinal: usize,
        label: impl Into<String>,
        role: ElementRole<A>,
    ) -> Self {
        Self {
            id: id.into(),
            region,
            ordinal,
            grid_column: None,
            label: label.into(),
            role,
            hidden: false,
            disabled: false,
        }
    }

    pub fn action(
        id: impl Into<ElementId>,
        region: Region,
        ordinal: usize,
        label: impl Into<String>,
        action: A,
    ) -> Self {
        Self::new(id, region, ordinal, label, ElementRole::Action(action))
    }

    pub fn opener(
        id: impl Into<ElementId>,
        region: Region,
        ordinal: usize,
        label: impl Into<String>,
        overlay: Overlay,
    ) -> Self {
        Self::new(id, region, ordinal, label, ElementRole::Opener(overlay))
    }

    pub fn text_input(
        id: impl Into<ElementId>,
        region: Region,
        ordinal: usize,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, region, ordinal, label, ElementRole::TextInput)
    }

    pub fn inert(
        id: impl Into<ElementId>,
        region: Region,
        ordinal: usize,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, region, ordinal, label, ElementRole::Inert)
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.grid_column = Some(column);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_eligible(&self) -> bool {
        !self.hidden && !self.disabled
    }

    pub fn is_text_input(&self) -> bool {
        matches!(self.role, ElementRole::TextInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_or_disabled_is_ineligible() {
        let visible = FocusableElement::action("a", Region::MainList, 0, "A", ());
        assert!(visible.is_eligible());
        assert!(!visible.clone().with_hidden(true).is_eligible());
        assert!(!visible.with_disabled(true).is_eligible());
    }

    #[test]
    fn region_names_follow_rows() {
        assert_eq!(Region::CarouselRow(1).describe(), "carousel-row-1");
        assert_eq!(Region::Sidebar.describe(), "sidebar");
    }
}
