//! Content layer: what each scope draws and which elements it offers for focus.

use crate::nav::{
    ElementId, FocusableElement, ModalKind, NavigationContext, Overlay, Region, Screen,
};
use crate::render::View;

use super::format::{format_duration, format_speed, format_time, progress_bar};
use super::settings::{AuthType, ProgressColor};
use super::state::ShelfState;

/// Seconds skipped by the player's rewind and forward buttons.
pub const SEEK_STEP_SECS: i32 = 30;
/// Item-limit change per settings button press.
pub const ITEM_LIMIT_STEP: i32 = 5;

/// Work the content layer performs when an element is activated.
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfAction {
    Connect,
    ChooseAuth(AuthType),
    ToggleLibrary(String),
    ContinueWithLibraries,
    OpenBook(String),
    OpenSearch,
    OpenSettings,
    SwitchLibrary(String),
    SubmitSearch,
    OpenSearchResult(String),
    AdjustItemLimit(i32),
    /// Speed step in tenths of 1x.
    AdjustSpeed(i32),
    PickColor(ProgressColor),
    TogglePickerLibrary(String),
    CloseModal(ModalKind),
    Logout,
    Play,
    PreviousTrack,
    SeekBy(i32),
    TogglePlay,
    NextTrack,
}

type Element = FocusableElement<ShelfAction>;

/// Hands out ordinals in draw order within one region.
struct Column {
    region: Region,
    next: usize,
}

impl Column {
    fn new(region: Region) -> Self {
        Self { region, next: 0 }
    }

    fn action(
        &mut self,
        id: impl Into<ElementId>,
        label: impl Into<String>,
        action: ShelfAction,
    ) -> Element {
        let ordinal = self.bump();
        FocusableElement::action(id, self.region, ordinal, label, action)
    }

    fn opener(
        &mut self,
        id: impl Into<ElementId>,
        label: impl Into<String>,
        overlay: Overlay,
    ) -> Element {
        let ordinal = self.bump();
        FocusableElement::opener(id, self.region, ordinal, label, overlay)
    }

    fn text_input(&mut self, id: impl Into<ElementId>, label: impl Into<String>) -> Element {
        let ordinal = self.bump();
        FocusableElement::text_input(id, self.region, ordinal, label)
    }

    fn inert(&mut self, id: impl Into<ElementId>, label: impl Into<String>) -> Element {
        let ordinal = self.bump();
        FocusableElement::inert(id, self.region, ordinal, label)
    }

    fn bump(&mut self) -> usize {
        let ordinal = self.next;
        self.next += 1;
        ordinal
    }
}

/// Draw the current context: the screen, then every open overlay. Only the innermost
/// modal contributes elements so stacked modals never share a focus set.
pub fn build_view(
    state: &ShelfState,
    context: &NavigationContext,
    focus: Option<&ElementId>,
) -> View<ShelfAction> {
    let scope = context.scope();
    let mut view = View::new(scope, format!("Shelf TV · {}", screen_title(state, scope.screen)));
    if let Some(error) = &state.error {
        view.push_line(format!("! {error}"));
    }

    match scope.screen {
        Screen::Login => login(state, &mut view),
        Screen::LibrarySelection => library_selection(state, &mut view),
        Screen::Library => library(state, focus, &mut view),
        Screen::Search => search(state, &mut view),
        Screen::Player => player(state, &mut view),
    }

    for layer in context.overlays() {
        match layer.overlay {
            Overlay::Dropdown => auth_dropdown(state, &mut view),
            Overlay::Sidebar => sidebar(state, &mut view),
            Overlay::Modal(_) => {}
        }
    }
    let innermost_modal = context.overlays().iter().rev().find_map(|layer| match layer.overlay {
        Overlay::Modal(kind) => Some(kind),
        _ => None,
    });
    if let Some(kind) = innermost_modal {
        modal(state, kind, &mut view);
    }
    view
}

fn screen_title(state: &ShelfState, screen: Screen) -> String {
    match screen {
        Screen::Login => "Sign in".to_string(),
        Screen::LibrarySelection => "Choose libraries".to_string(),
        Screen::Library => state
            .current_library()
            .map(|library| library.name.clone())
            .unwrap_or_else(|| "Library".to_string()),
        Screen::Search => "Search".to_string(),
        Screen::Player => "Now playing".to_string(),
    }
}

fn masked(value: &str) -> String {
    "*".repeat(value.chars().count())
}

fn login(state: &ShelfState, view: &mut View<ShelfAction>) {
    let form = &state.login;
    let uses_key = form.auth_type == AuthType::ApiKey;
    let mut list = Column::new(Region::MainList);
    view.extend([
        list.opener(
            "auth-type-btn",
            format!("Sign in with: {}", form.auth_type.label()),
            Overlay::Dropdown,
        ),
        list.text_input("host-url", format!("Server URL: {}", form.host_url)),
        list.text_input("username", format!("Username: {}", form.username))
            .with_hidden(uses_key),
        list.text_input("password", format!("Password: {}", masked(&form.password)))
            .with_hidden(uses_key),
        list.text_input("api-key", format!("API key: {}", masked(&form.api_key)))
            .with_hidden(!uses_key),
        list.action(
            "connect-btn",
            if state.connecting { "Connecting..." } else { "Connect" },
            ShelfAction::Connect,
        ),
    ]);
}

fn auth_dropdown(state: &ShelfState, view: &mut View<ShelfAction>) {
    view.heading(Region::Dropdown, "Sign in with");
    let mut list = Column::new(Region::Dropdown);
    for (id, auth_type) in [
        ("auth-username", AuthType::Username),
        ("auth-apikey", AuthType::ApiKey),
    ] {
        let mark = if state.login.auth_type == auth_type { "(•)" } else { "( )" };
        view.push(list.action(
            id,
            format!("{mark} {}", auth_type.label()),
            ShelfAction::ChooseAuth(auth_type),
        ));
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn library_selection(state: &ShelfState, view: &mut View<ShelfAction>) {
    view.push_line("Select the libraries to browse.");
    let mut list = Column::new(Region::MainList);
    for library in &state.libraries {
        view.push(list.action(
            format!("library-{}", library.id),
            format!("{} {}", checkbox(state.is_selected(&library.id)), library.name),
            ShelfAction::ToggleLibrary(library.id.clone()),
        ));
    }
    view.push(
        list.action("library-continue-btn", "Continue", ShelfAction::ContinueWithLibraries)
            .with_disabled(state.selected_library_ids.is_empty()),
    );
}

/// Item id behind a carousel card element.
pub fn card_item_id(id: &ElementId) -> Option<&str> {
    let raw = id.as_str();
    raw.strip_prefix("continue-")
        .or_else(|| raw.strip_prefix("recent-"))
}

fn library(state: &ShelfState, focus: Option<&ElementId>, view: &mut View<ShelfAction>) {
    let focused = focus
        .and_then(card_item_id)
        .and_then(|item_id| state.find_card(item_id));
    if let Some(item) = focused {
        view.push_line(format!("{} by {}", item.title(), item.author()));
        let mut details = format_duration(item.duration());
        if item.is_in_progress() {
            details.push_str(&format!("  {:.0}% complete", item.progress() * 100.0));
        }
        if !details.is_empty() {
            view.push_line(details);
        }
    }

    if !state.continue_listening.is_empty() {
        view.heading(Region::CarouselRow(0), "Continue Listening");
        let mut row = Column::new(Region::CarouselRow(0));
        for item in &state.continue_listening {
            view.push(row.action(
                format!("continue-{}", item.id),
                item.title(),
                ShelfAction::OpenBook(item.id.clone()),
            ));
        }
    }

    if state.recent.is_empty() {
        view.push_line("No books found");
    } else {
        view.heading(Region::CarouselRow(1), "Recently Added");
        let mut row = Column::new(Region::CarouselRow(1));
        for item in &state.recent {
            view.push(row.action(
                format!("recent-{}", item.id),
                item.title(),
                ShelfAction::OpenBook(item.id.clone()),
            ));
        }
    }
}

fn sidebar(state: &ShelfState, view: &mut View<ShelfAction>) {
    view.heading(Region::Sidebar, "Menu");
    let mut list = Column::new(Region::Sidebar);
    view.push(list.action("sidebar-search", "Search", ShelfAction::OpenSearch));
    view.push(list.action("sidebar-settings", "Settings", ShelfAction::OpenSettings));
    let current = state.current_library_id.as_deref();
    for library in state.selected_libraries() {
        let mark = if current == Some(library.id.as_str()) { "• " } else { "  " };
        view.push(list.action(
            format!("sidebar-library-{}", library.id),
            format!("{mark}{}", library.name),
            ShelfAction::SwitchLibrary(library.id.clone()),
        ));
    }
}

fn search(state: &ShelfState, view: &mut View<ShelfAction>) {
    let mut list = Column::new(Region::MainList);
    view.push(list.text_input("search-input", format!("Search: {}", state.search_query)));
    view.push(list.action("search-submit-btn", "Search", ShelfAction::SubmitSearch));

    let Some(results) = &state.search_results else {
        return;
    };
    if results.is_empty() {
        view.push_line("No results found");
        return;
    }
    view.push_line(format!(
        "Books ({})  Series ({})",
        results.books.len(),
        results.series.len()
    ));
    for hit in &results.books {
        let item = &hit.library_item;
        view.push(list.action(
            format!("search-book-{}", item.id),
            format!("Book: {} by {}", item.title(), item.author()),
            ShelfAction::OpenSearchResult(item.id.clone()),
        ));
    }
    for (index, hit) in results.series.iter().enumerate() {
        let name = hit
            .series
            .as_ref()
            .map(|series| series.name.as_str())
            .unwrap_or("Unknown Series");
        view.push(list.inert(format!("search-series-{index}"), format!("Series: {name}")));
    }
}

fn player(state: &ShelfState, view: &mut View<ShelfAction>) {
    let Some(player) = &state.player else {
        view.push_line("Nothing playing");
        return;
    };
    let color = state.settings.progress_bar_color;
    view.push_line(format!("{} by {}", player.title, player.author));
    view.push_line(format!(
        "{} ({}/{})",
        player.track_title(),
        player.track_index + 1,
        player.tracks.len()
    ));
    view.push_line(format!(
        "{}{}\x1b[0m {} / {}",
        color.ansi(),
        progress_bar(player.fraction(), 30),
        format_time(player.current_time),
        format_time(player.duration)
    ));
    view.push_line(format!("Speed {}", format_speed(state.settings.playback_speed)));

    let mut list = Column::new(Region::MainList);
    view.extend([
        list.action("player-prev", "Previous track", ShelfAction::PreviousTrack),
        list.action(
            "player-rewind",
            format!("-{SEEK_STEP_SECS}s"),
            ShelfAction::SeekBy(-SEEK_STEP_SECS),
        ),
        list.action(
            "player-play",
            if player.is_playing { "Pause" } else { "Play" },
            ShelfAction::TogglePlay,
        ),
        list.action(
            "player-forward",
            format!("+{SEEK_STEP_SECS}s"),
            ShelfAction::SeekBy(SEEK_STEP_SECS),
        ),
        list.action("player-next", "Next track", ShelfAction::NextTrack),
        list.action("player-speed-down", "Slower", ShelfAction::AdjustSpeed(-1)),
        list.action("player-speed-up", "Faster", ShelfAction::AdjustSpeed(1)),
    ]);
}

fn modal(state: &ShelfState, kind: ModalKind, view: &mut View<ShelfAction>) {
    let mut list = Column::new(Region::Modal);
    match kind {
        ModalKind::Settings => {
            view.heading(Region::Modal, "Settings");
            let settings = &state.settings;
            view.extend([
                list.opener(
                    "settings-libraries-btn",
                    format!("Libraries ({} selected)", state.selected_library_ids.len()),
                    Overlay::Modal(ModalKind::LibraryPicker),
                ),
                list.action(
                    "item-limit-down",
                    format!("Items per row -{ITEM_LIMIT_STEP} ({})", settings.item_limit),
                    ShelfAction::AdjustItemLimit(-ITEM_LIMIT_STEP),
                ),
                list.action(
                    "item-limit-up",
                    format!("Items per row +{ITEM_LIMIT_STEP} ({})", settings.item_limit),
                    ShelfAction::AdjustItemLimit(ITEM_LIMIT_STEP),
                ),
                list.action(
                    "playback-speed-down",
                    format!("Speed -0.1 ({})", format_speed(settings.playback_speed)),
                    ShelfAction::AdjustSpeed(-1),
                ),
                list.action(
                    "playback-speed-up",
                    format!("Speed +0.1 ({})", format_speed(settings.playback_speed)),
                    ShelfAction::AdjustSpeed(1),
                ),
                list.opener(
                    "settings-color-btn",
                    format!("Progress colour: {}", settings.progress_bar_color.name()),
                    Overlay::Modal(ModalKind::ColorPicker),
                ),
                list.action("settings-logout-btn", "Log out", ShelfAction::Logout),
                list.action(
                    "settings-close-btn",
                    "Close",
                    ShelfAction::CloseModal(ModalKind::Settings),
                ),
            ]);
        }
        ModalKind::BookDetails => {
            view.heading(Region::Modal, "Book details");
            if let Some(item) = &state.current_book {
                let metadata = &item.media.metadata;
                view.push_line(format!("{} by {}", item.title(), item.author()));
                if !metadata.narrators.is_empty() {
                    view.push_line(format!("Narrated by {}", metadata.narrators.join(", ")));
                }
                if let Some(year) = &metadata.published_year {
                    view.push_line(format!("Published {year}"));
                }
                let duration = format_duration(item.duration());
                if !duration.is_empty() {
                    view.push_line(duration);
                }
                let progress = state
                    .current_progress
                    .as_ref()
                    .map(|progress| progress.progress)
                    .unwrap_or_else(|| item.progress());
                if progress > 0.0 {
                    view.push_line(format!("{:.0}% complete", progress * 100.0));
                }
                if let Some(description) = &metadata.description {
                    view.push_line(description.clone());
                }
            }
            view.extend([
                list.action("details-play-btn", "Play", ShelfAction::Play),
                list.action(
                    "details-close-btn",
                    "Close",
                    ShelfAction::CloseModal(ModalKind::BookDetails),
                ),
            ]);
        }
        ModalKind::ColorPicker => {
            view.heading(Region::Modal, "Progress colour");
            for (index, color) in ProgressColor::ALL.into_iter().enumerate() {
                let mark = if state.settings.progress_bar_color == color { "✓ " } else { "" };
                view.push(
                    list.action(
                        format!("color-{}", color.name()),
                        format!("{}■\x1b[0m {mark}{}", color.ansi(), color.name()),
                        ShelfAction::PickColor(color),
                    )
                    .with_column(index % 2),
                );
            }
        }
        ModalKind::LibraryPicker => {
            view.heading(Region::Modal, "Libraries");
            for library in &state.libraries {
                view.push(list.action(
                    format!("picker-library-{}", library.id),
                    format!("{} {}", checkbox(state.is_selected(&library.id)), library.name),
                    ShelfAction::TogglePickerLibrary(library.id.clone()),
                ));
            }
            view.push(list.action(
                "library-picker-close",
                "Done",
                ShelfAction::CloseModal(ModalKind::LibraryPicker),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{Navigator, RenderTicket, compute_focusables};
    use crate::shelf::api::Library;
    use crate::shelf::api::fake::book;

    fn ids(view: &View<ShelfAction>) -> Vec<String> {
        compute_focusables(view.scope, &view.elements)
            .into_iter()
            .map(|element| element.id.as_str().to_string())
            .collect()
    }

    fn state() -> ShelfState {
        ShelfState {
            libraries: vec![
                Library {
                    id: "lib-a".to_string(),
                    name: "Books".to_string(),
                    media_type: None,
                },
                Library {
                    id: "lib-b".to_string(),
                    name: "Podcasts".to_string(),
                    media_type: None,
                },
            ],
            selected_library_ids: vec!["lib-a".to_string()],
            current_library_id: Some("lib-a".to_string()),
            ..ShelfState::default()
        }
    }

    /// Navigator on `screen` with its first render registered.
    fn settled(state: &ShelfState, screen: Screen) -> Navigator<ShelfAction> {
        let mut nav = Navigator::new();
        nav.switch_screen(screen);
        register(&mut nav, state);
        nav
    }

    fn register(nav: &mut Navigator<ShelfAction>, state: &ShelfState) -> Option<RenderTicket> {
        let ticket = nav.pending_ticket()?;
        let view = build_view(state, nav.context(), nav.focused());
        nav.register_focusables(ticket, &view.elements);
        Some(ticket)
    }

    #[test]
    fn login_fields_follow_auth_type() {
        let mut state = state();
        let nav = settled(&state, Screen::Login);
        let view = build_view(&state, nav.context(), None);
        assert_eq!(
            ids(&view),
            ["auth-type-btn", "host-url", "username", "password", "connect-btn"]
        );

        state.login.auth_type = AuthType::ApiKey;
        let view = build_view(&state, nav.context(), None);
        assert_eq!(ids(&view), ["auth-type-btn", "host-url", "api-key", "connect-btn"]);
    }

    #[test]
    fn continue_disabled_without_selection() {
        let mut state = state();
        state.selected_library_ids.clear();
        let nav = settled(&state, Screen::LibrarySelection);
        let view = build_view(&state, nav.context(), None);
        assert_eq!(ids(&view), ["library-lib-a", "library-lib-b"]);
    }

    #[test]
    fn library_rows_and_empty_state() {
        let mut state = state();
        let nav = settled(&state, Screen::Library);
        let view = build_view(&state, nav.context(), None);
        assert!(ids(&view).is_empty());
        assert!(view.lines.iter().any(|line| line == "No books found"));

        state.continue_listening = vec![book("li_1", "Dune", 3600.0, 0.5)];
        state.recent = vec![book("li_1", "Dune", 3600.0, 0.5), book("li_2", "Emma", 60.0, 0.0)];
        let focus = ElementId::new("continue-li_1");
        let view = build_view(&state, nav.context(), Some(&focus));
        assert_eq!(ids(&view), ["continue-li_1", "recent-li_1", "recent-li_2"]);
        assert!(view.lines.iter().any(|line| line.contains("50% complete")));
    }

    #[test]
    fn sidebar_lists_selected_libraries() {
        let mut state = state();
        state.recent = vec![book("li_2", "Emma", 60.0, 0.0)];
        let mut nav = settled(&state, Screen::Library);
        nav.open_overlay(Overlay::Sidebar);
        register(&mut nav, &state);
        let view = build_view(&state, nav.context(), nav.focused());
        assert_eq!(
            ids(&view),
            ["sidebar-search", "sidebar-settings", "sidebar-library-lib-a"]
        );
        assert_eq!(nav.focused(), Some(&ElementId::new("sidebar-search")));
    }

    #[test]
    fn only_innermost_modal_is_focusable() {
        let state = state();
        let mut nav = settled(&state, Screen::Library);
        nav.open_overlay(Overlay::Modal(ModalKind::Settings));
        register(&mut nav, &state);
        nav.open_overlay(Overlay::Modal(ModalKind::ColorPicker));
        register(&mut nav, &state);

        let view = build_view(&state, nav.context(), nav.focused());
        let focusable = ids(&view);
        assert_eq!(focusable.len(), ProgressColor::ALL.len());
        assert!(focusable.iter().all(|id| id.starts_with("color-")));
        assert_eq!(nav.focused(), Some(&ElementId::new("color-Yellow")));
    }

    #[test]
    fn search_sections_and_empty_state() {
        let mut state = state();
        let nav = settled(&state, Screen::Search);
        state.search_results = Some(Default::default());
        let view = build_view(&state, nav.context(), None);
        assert!(view.lines.iter().any(|line| line == "No results found"));

        state.search_results = Some(crate::shelf::api::SearchResults {
            books: vec![crate::shelf::api::BookHit {
                library_item: book("li_1", "Dune", 10.0, 0.0),
            }],
            series: vec![crate::shelf::api::SeriesHit {
                series: Some(crate::shelf::api::Series {
                    id: None,
                    name: "Saga".to_string(),
                }),
            }],
        });
        let view = build_view(&state, nav.context(), None);
        assert_eq!(
            ids(&view),
            ["search-input", "search-submit-btn", "search-book-li_1", "search-series-0"]
        );
    }

    #[test]
    fn card_ids_resolve_to_items() {
        assert_eq!(card_item_id(&ElementId::new("recent-li_7")), Some("li_7"));
        assert_eq!(card_item_id(&ElementId::new("continue-li_1")), Some("li_1"));
        assert_eq!(card_item_id(&ElementId::new("sidebar-search")), None);
    }
}
