//! Pure movement rules: given the focusable set, the focused index, and a direction,
//! decide where focus goes next.

use std::collections::BTreeMap;

use super::element::{FocusableElement, Region};
use super::input::Direction;
use super::layout::RegionLayout;

/// Result of resolving one directional input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Boundary reached; nothing changes.
    Stay,
    /// Focus the element at this index of the focusable set.
    Focus(usize),
    /// Left from the first card of a carousel row.
    OpenSidebar,
    /// The layout's dismiss direction was pressed.
    Dismiss,
}

pub fn resolve<A>(
    layout: RegionLayout,
    elements: &[FocusableElement<A>],
    current: Option<usize>,
    direction: Direction,
) -> Move {
    if let RegionLayout::Linear {
        dismiss_on: Some(dismiss),
    } = layout
    {
        if dismiss == direction {
            return Move::Dismiss;
        }
    }

    if elements.is_empty() {
        return Move::Stay;
    }

    let Some(current) = current.filter(|index| *index < elements.len()) else {
        return Move::Focus(0);
    };

    match layout {
        RegionLayout::Linear { .. } => step_clamped(elements.len(), current, direction.step()),
        RegionLayout::Grid { columns } => {
            let columns = columns.max(1) as isize;
            let delta = if direction.is_vertical() {
                direction.step() * columns
            } else {
                direction.step()
            };
            step_clamped(elements.len(), current, delta)
        }
        RegionLayout::Carousel => {
            let rows = CarouselRows::from_elements(elements);
            carousel(&rows, current, direction)
        }
    }
}

fn step_clamped(len: usize, current: usize, delta: isize) -> Move {
    let last = len.saturating_sub(1) as isize;
    let target = (current as isize + delta).clamp(0, last) as usize;
    if target == current {
        Move::Stay
    } else {
        Move::Focus(target)
    }
}

fn carousel(rows: &CarouselRows, current: usize, direction: Direction) -> Move {
    let Some((row, column)) = rows.locate(current) else {
        return Move::Stay;
    };

    // Row switches always land on the first card of the destination row.
    let target = match direction {
        Direction::Left if column == 0 => return Move::OpenSidebar,
        Direction::Left => rows.row(row).get(column - 1),
        Direction::Right => rows.row(row).get(column + 1),
        Direction::Down => rows.row(row + 1).first(),
        Direction::Up => match row.checked_sub(1) {
            Some(above) => rows.row(above).first(),
            None => None,
        },
    };

    target.copied().map(Move::Focus).unwrap_or(Move::Stay)
}

/// Indices of the focusable set grouped into carousel rows, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarouselRows {
    rows: Vec<Vec<usize>>,
}

impl CarouselRows {
    pub fn from_elements<A>(elements: &[FocusableElement<A>]) -> Self {
        let mut grouped: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
        for (index, element) in elements.iter().enumerate() {
            if let Region::CarouselRow(row) = element.region {
                grouped.entry(row).or_default().push((element.ordinal, index));
            }
        }

        let rows = grouped
            .into_values()
            .map(|mut cards| {
                cards.sort_by_key(|(ordinal, _)| *ordinal);
                cards.into_iter().map(|(_, index)| index).collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> &[usize] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// (row, column) of a focusable-set index.
    pub fn locate(&self, index: usize) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(row, cards)| {
            cards
                .iter()
                .position(|candidate| *candidate == index)
                .map(|column| (row, column))
        })
    }
}
