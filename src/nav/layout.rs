//! Declarative table from focus scope to region layout.
//!
//! Every (screen, overlay) pair resolves to exactly one layout, and the movement
//! policy dispatches on that layout alone.

use super::context::{ModalKind, Overlay, Scope, Screen};
use super::element::Region;
use super::input::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLayout {
    /// One ordered list. `dismiss_on` closes the owning overlay instead of moving.
    Linear { dismiss_on: Option<Direction> },
    /// Row-major grid with a fixed column count.
    Grid { columns: usize },
    /// Stacked horizontal rows, one per `Region::CarouselRow`.
    Carousel,
}

impl RegionLayout {
    pub const LIST: RegionLayout = RegionLayout::Linear { dismiss_on: None };

    pub fn as_str(self) -> &'static str {
        match self {
            RegionLayout::Linear { .. } => "linear",
            RegionLayout::Grid { .. } => "grid",
            RegionLayout::Carousel => "carousel",
        }
    }
}

pub fn layout_for(scope: Scope) -> RegionLayout {
    match (scope.screen, scope.overlay) {
        (_, Some(Overlay::Dropdown)) => RegionLayout::Linear {
            dismiss_on: Some(Direction::Left),
        },
        (_, Some(Overlay::Sidebar)) => RegionLayout::Linear {
            dismiss_on: Some(Direction::Right),
        },
        (_, Some(Overlay::Modal(ModalKind::ColorPicker))) => RegionLayout::Grid { columns: 2 },
        (_, Some(Overlay::Modal(_))) => RegionLayout::LIST,
        (Screen::Library, None) => RegionLayout::Carousel,
        (Screen::Login | Screen::LibrarySelection | Screen::Search | Screen::Player, None) => {
            RegionLayout::LIST
        }
    }
}

/// Whether an element in `region` may take focus while `scope` is active.
pub fn accepts_region(scope: Scope, region: Region) -> bool {
    match scope.overlay {
        Some(Overlay::Dropdown) => region == Region::Dropdown,
        Some(Overlay::Sidebar) => region == Region::Sidebar,
        Some(Overlay::Modal(_)) => region == Region::Modal,
        None => match scope.screen {
            Screen::Library => matches!(region, Region::CarouselRow(_)),
            _ => region == Region::MainList,
        },
    }
}
