use blake3::Hash;

use super::context::Scope;
use super::element::{ElementId, FocusableElement};
use super::layout::accepts_region;

/// Eligible focus targets for `scope`, in the order the content layer produced them.
///
/// Hidden and disabled elements are dropped, as is anything outside the regions the
/// scope owns. No matching content yields an empty set.
pub fn compute_focusables<A: Clone>(
    scope: Scope,
    raw: &[FocusableElement<A>],
) -> Vec<FocusableElement<A>> {
    raw.iter()
        .filter(|element| element.is_eligible() && accepts_region(scope, element.region))
        .cloned()
        .collect()
}

/// Focusable set of the scope that was last rendered.
#[derive(Debug)]
pub struct FocusRegistry<A> {
    scope: Option<Scope>,
    elements: Vec<FocusableElement<A>>,
    digest: Option<Hash>,
}

impl<A> Default for FocusRegistry<A> {
    fn default() -> Self {
        Self {
            scope: None,
            elements: Vec::new(),
            digest: None,
        }
    }
}

impl<A: Clone> FocusRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current set; used whenever the scope changes.
    pub fn invalidate(&mut self) {
        self.scope = None;
        self.elements.clear();
        self.digest = None;
    }

    /// Replace the set with the eligible part of `raw`. Returns `false` when the
    /// resulting set is identical to the one already held for `scope`.
    pub fn rebuild(&mut self, scope: Scope, raw: &[FocusableElement<A>]) -> bool {
        let elements = compute_focusables(scope, raw);
        let digest = digest_of(&elements);
        if self.scope == Some(scope) && self.digest == Some(digest) {
            return false;
        }
        self.scope = Some(scope);
        self.elements = elements;
        self.digest = Some(digest);
        true
    }

    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    pub fn elements(&self) -> &[FocusableElement<A>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FocusableElement<A>> {
        self.elements.get(index)
    }

    pub fn find(&self, id: &ElementId) -> Option<&FocusableElement<A>> {
        self.elements.iter().find(|element| &element.id == id)
    }

    pub fn position(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|element| &element.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.position(id).is_some()
    }

    pub fn first(&self) -> Option<&FocusableElement<A>> {
        self.elements.first()
    }

    pub fn digest(&self) -> Option<Hash> {
        self.digest
    }
}

fn digest_of<A>(elements: &[FocusableElement<A>]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for element in elements {
        let column = element
            .grid_column
            .map(|column| column.to_string())
            .unwrap_or_default();
        let line = format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\n",
            element.id,
            element.region.describe(),
            element.ordinal,
            column,
            element.role.kind(),
            element.label,
        );
        hasher.update(line.as_bytes());
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::context::{Overlay, Screen};
    use crate::nav::element::Region;

    fn login_raw() -> Vec<FocusableElement<&'static str>> {
        vec![
            FocusableElement::opener(
                "auth-type-btn",
                Region::MainList,
                0,
                "Auth",
                Overlay::Dropdown,
            ),
            FocusableElement::text_input("host-url", Region::MainList, 1, "Server"),
            FocusableElement::text_input("api-key", Region::MainList, 2, "Key").with_hidden(true),
            FocusableElement::action("connect-btn", Region::MainList, 3, "Connect", "connect"),
            FocusableElement::action("dropdown-apikey", Region::Dropdown, 0, "API Key", "apikey"),
        ]
    }

    #[test]
    fn excludes_hidden_disabled_and_foreign_regions() {
        let set = compute_focusables(Scope::screen(Screen::Login), &login_raw());
        let ids: Vec<_> = set.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["auth-type-btn", "host-url", "connect-btn"]);
    }

    #[test]
    fn overlay_scope_only_sees_its_layer() {
        let scope = Scope::with_overlay(Screen::Login, Overlay::Dropdown);
        let set = compute_focusables(scope, &login_raw());
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].id.as_str(), "dropdown-apikey");
    }

    #[test]
    fn missing_content_is_empty_not_an_error() {
        // The library screen owns only carousel rows; login content has none.
        let set = compute_focusables(Scope::screen(Screen::Library), &login_raw());
        assert!(set.is_empty());
        assert!(compute_focusables::<&str>(Scope::screen(Screen::Player), &[]).is_empty());
    }

    #[test]
    fn rebuild_detects_unchanged_content() {
        let mut registry = FocusRegistry::new();
        let scope = Scope::screen(Screen::Login);
        assert!(registry.rebuild(scope, &login_raw()));
        assert!(!registry.rebuild(scope, &login_raw()));

        let mut relabelled = login_raw();
        relabelled[3].label = "Connecting...".to_string();
        assert!(registry.rebuild(scope, &relabelled));
        assert_eq!(registry.position(&ElementId::from("connect-btn")), Some(2));
    }

    #[test]
    fn invalidate_forgets_scope() {
        let mut registry = FocusRegistry::new();
        registry.rebuild(Scope::screen(Screen::Login), &login_raw());
        registry.invalidate();
        assert!(registry.is_empty());
        assert!(registry.scope().is_none());
        assert!(registry.digest().is_none());
    }
}
