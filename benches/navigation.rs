use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use shelf_tv::nav::{Direction, NavInput, Region, compute_focusables};
use shelf_tv::{FocusableElement, Navigator, RendererSettings, Scope, Screen, View};

const ROW_LEN: usize = 40;

fn library_cards() -> Vec<FocusableElement<usize>> {
    (0..2u8)
        .flat_map(|row| {
            (0..ROW_LEN).map(move |i| {
                FocusableElement::action(
                    format!("card-{row}-{i}"),
                    Region::CarouselRow(row),
                    i,
                    format!("Book {i}"),
                    i,
                )
            })
        })
        .collect()
}

/// Navigator settled on the library screen with both rows registered.
fn settled_library(cards: &[FocusableElement<usize>]) -> Navigator<usize> {
    let mut nav = Navigator::new();
    let out = nav.switch_screen(Screen::Library);
    for ticket in out.render_tickets() {
        nav.register_focusables(ticket, cards);
    }
    nav
}

fn script() -> Vec<NavInput> {
    let mut inputs = Vec::new();
    for _ in 0..ROW_LEN {
        inputs.push(NavInput::Move(Direction::Right));
    }
    inputs.push(NavInput::Move(Direction::Down));
    for _ in 0..ROW_LEN {
        inputs.push(NavInput::Move(Direction::Right));
    }
    inputs.push(NavInput::Move(Direction::Up));
    inputs
}

fn carousel_moves(c: &mut Criterion) {
    let cards = library_cards();
    let inputs = script();
    c.bench_function("carousel_moves", |b| {
        b.iter(|| {
            let mut nav = settled_library(&cards);
            for input in &inputs {
                black_box(nav.handle_input(*input));
            }
        });
    });
}

fn focusable_filter(c: &mut Criterion) {
    let mut raw = library_cards();
    raw.extend((0..8).map(|i| {
        FocusableElement::action(format!("sidebar-{i}"), Region::Sidebar, i, "Menu", i)
    }));
    let scope = Scope::screen(Screen::Library);
    c.bench_function("compute_focusables", |b| {
        b.iter(|| black_box(compute_focusables(scope, black_box(&raw))));
    });
}

fn frame_layout(c: &mut Criterion) {
    let mut view = View::new(Scope::screen(Screen::Library), "Shelf TV · Audiobooks");
    view.heading(Region::CarouselRow(0), "Continue Listening");
    view.heading(Region::CarouselRow(1), "Recently Added");
    view.extend(library_cards());
    let settings = RendererSettings::default();
    let focus = view.elements.first().map(|element| element.id.clone());
    c.bench_function("frame_lines", |b| {
        b.iter(|| black_box(shelf_tv::render::frame_lines(&view, focus.as_ref(), &settings)));
    });
}

criterion_group!(benches, carousel_moves, focusable_filter, frame_layout);
criterion_main!(benches);
