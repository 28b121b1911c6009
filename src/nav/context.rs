use super::element::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    LibrarySelection,
    Library,
    Search,
    Player,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::LibrarySelection => "library-selection",
            Screen::Library => "library",
            Screen::Search => "search",
            Screen::Player => "player",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Settings,
    BookDetails,
    ColorPicker,
    LibraryPicker,
}

impl ModalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModalKind::Settings => "settings",
            ModalKind::BookDetails => "book-details",
            ModalKind::ColorPicker => "color-picker",
            ModalKind::LibraryPicker => "library-picker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    Dropdown,
    Sidebar,
    Modal(ModalKind),
}

impl Overlay {
    /// Back-input priority; the highest rank is the innermost layer.
    pub fn rank(self) -> u8 {
        match self {
            Overlay::Dropdown => 3,
            Overlay::Sidebar => 2,
            Overlay::Modal(_) => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Overlay::Dropdown => "dropdown",
            Overlay::Sidebar => "sidebar",
            Overlay::Modal(kind) => kind.as_str(),
        }
    }
}

/// The (screen, active overlay) pair that owns the focus scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub screen: Screen,
    pub overlay: Option<Overlay>,
}

impl Scope {
    pub fn screen(screen: Screen) -> Self {
        Self {
            screen,
            overlay: None,
        }
    }

    pub fn with_overlay(screen: Screen, overlay: Overlay) -> Self {
        Self {
            screen,
            overlay: Some(overlay),
        }
    }

    pub fn describe(self) -> String {
        match self.overlay {
            Some(overlay) => format!("{}+{}", self.screen.as_str(), overlay.as_str()),
            None => self.screen.as_str().to_string(),
        }
    }
}

/// Identifies one render request. Registrations carrying an older ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTicket {
    pub scope: Scope,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayer {
    pub overlay: Overlay,
    /// Element focused when the overlay opened.
    pub origin: Option<ElementId>,
}

/// Screen, overlay stack, and the focused element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    screen: Screen,
    overlays: Vec<OverlayLayer>,
    focus: Option<ElementId>,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationContext {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            overlays: Vec::new(),
            focus: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn focused(&self) -> Option<&ElementId> {
        self.focus.as_ref()
    }

    pub fn overlays(&self) -> &[OverlayLayer] {
        &self.overlays
    }

    pub fn has_overlay(&self, overlay: Overlay) -> bool {
        self.overlays.iter().any(|layer| layer.overlay == overlay)
    }

    /// Index of the layer that owns focus and closes first on back:
    /// highest rank, latest opened on ties.
    pub fn innermost_index(&self) -> Option<usize> {
        self.overlays
            .iter()
            .enumerate()
            .max_by_key(|(index, layer)| (layer.overlay.rank(), *index))
            .map(|(index, _)| index)
    }

    pub fn active_overlay(&self) -> Option<Overlay> {
        self.innermost_index().map(|index| self.overlays[index].overlay)
    }

    pub fn scope(&self) -> Scope {
        Scope {
            screen: self.screen,
            overlay: self.active_overlay(),
        }
    }

    pub(crate) fn set_focus(&mut self, focus: Option<ElementId>) -> Option<ElementId> {
        std::mem::replace(&mut self.focus, focus)
    }

    pub(crate) fn push_overlay(&mut self, layer: OverlayLayer) {
        self.overlays.push(layer);
    }

    pub(crate) fn remove_overlay(&mut self, index: usize) -> Option<OverlayLayer> {
        (index < self.overlays.len()).then(|| self.overlays.remove(index))
    }

    /// Enter `screen` with no overlay and nothing focused.
    pub(crate) fn reset_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.overlays.clear();
        self.focus = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(overlay: Overlay) -> OverlayLayer {
        OverlayLayer {
            overlay,
            origin: None,
        }
    }

    #[test]
    fn starts_on_login_without_overlay() {
        let ctx = NavigationContext::new();
        assert_eq!(ctx.scope(), Scope::screen(Screen::Login));
        assert!(ctx.focused().is_none());
    }

    #[test]
    fn dropdown_outranks_sidebar_regardless_of_order() {
        let mut ctx = NavigationContext::new();
        ctx.push_overlay(layer(Overlay::Dropdown));
        ctx.push_overlay(layer(Overlay::Sidebar));
        assert_eq!(ctx.active_overlay(), Some(Overlay::Dropdown));
        assert_eq!(ctx.innermost_index(), Some(0));
    }

    #[test]
    fn nested_modals_resolve_to_latest() {
        let mut ctx = NavigationContext::new();
        ctx.push_overlay(layer(Overlay::Modal(ModalKind::Settings)));
        ctx.push_overlay(layer(Overlay::Modal(ModalKind::ColorPicker)));
        assert_eq!(
            ctx.active_overlay(),
            Some(Overlay::Modal(ModalKind::ColorPicker))
        );
    }

    #[test]
    fn scope_description_is_readable() {
        let scope = Scope::with_overlay(Screen::Library, Overlay::Sidebar);
        assert_eq!(scope.describe(), "library+sidebar");
    }
}
