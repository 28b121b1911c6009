use std::io::Write;

use crate::error::Result;
use crate::nav::{ElementId, ElementRole, FocusableElement, Region, Scope};
use crate::width::{display_width, truncate_to_width};

/// Everything the content layer wants drawn for one scope.
#[derive(Debug, Clone)]
pub struct View<A> {
    pub scope: Scope,
    pub title: String,
    /// Free text drawn above the focusables (empty states, details, errors).
    pub lines: Vec<String>,
    /// Section titles drawn above a region's elements.
    pub headings: Vec<(Region, String)>,
    /// Raw focus candidates in draw order, across every visible layer.
    pub elements: Vec<FocusableElement<A>>,
}

impl<A> View<A> {
    pub fn new(scope: Scope, title: impl Into<String>) -> Self {
        Self {
            scope,
            title: title.into(),
            lines: Vec::new(),
            headings: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn heading(&mut self, region: Region, title: impl Into<String>) {
        self.headings.push((region, title.into()));
    }

    fn heading_for(&self, region: Region) -> String {
        self.headings
            .iter()
            .find(|(candidate, _)| *candidate == region)
            .map(|(_, title)| title.clone())
            .unwrap_or_else(|| format!("[{}]", region.describe()))
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn push(&mut self, element: FocusableElement<A>) {
        self.elements.push(element);
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = FocusableElement<A>>) {
        self.elements.extend(elements);
    }
}

/// Whether the drawn content is already present when `render` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Ready,
    /// Content arrives later; the owner reports it with the ticket it was given.
    Pending,
}

/// Draws views. Implementations never move focus.
pub trait RenderBoundary<A> {
    fn render(&mut self, view: &View<A>, focus: Option<&ElementId>) -> Result<RenderStatus>;
}

/// Renderer runtime parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub width: u16,
    /// Clear the screen and home the cursor before each frame.
    pub clear: bool,
    pub focus_marker: &'static str,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            width: 80,
            clear: true,
            focus_marker: "▶ ",
        }
    }
}

/// ANSI text renderer writing whole frames to a terminal handle.
pub struct TextRenderer<W: Write> {
    writer: W,
    settings: RendererSettings,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(writer: W, settings: RendererSettings) -> Self {
        Self { writer, settings }
    }

    pub fn with_default(writer: W) -> Self {
        Self::new(writer, RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<A, W: Write> RenderBoundary<A> for TextRenderer<W> {
    fn render(&mut self, view: &View<A>, focus: Option<&ElementId>) -> Result<RenderStatus> {
        if self.settings.clear {
            write!(self.writer, "\x1b[2J\x1b[H")?;
        }
        for line in frame_lines(view, focus, &self.settings) {
            write!(self.writer, "{line}\r\n")?;
        }
        self.writer.flush()?;
        Ok(RenderStatus::Ready)
    }
}

/// Lay out a view as plain lines no wider than `settings.width`.
pub fn frame_lines<A>(
    view: &View<A>,
    focus: Option<&ElementId>,
    settings: &RendererSettings,
) -> Vec<String> {
    let width = settings.width as usize;
    let mut lines = vec![
        truncate_to_width(&view.title, width),
        "─".repeat(width.min(display_width(&view.title).max(8))),
    ];
    for line in &view.lines {
        lines.extend(wrap_to_width(line, settings.width));
    }

    let mut current_region: Option<Region> = None;
    let mut row = String::new();
    for element in view.elements.iter().filter(|element| !element.hidden) {
        let cell = element_cell(element, focus, settings.focus_marker);
        let same_row = match element.region {
            Region::CarouselRow(_) => current_region == Some(element.region),
            _ => current_region == Some(element.region) && element.grid_column.unwrap_or(0) > 0,
        };

        if current_region != Some(element.region) {
            flush_row(&mut lines, &mut row, width);
            if !matches!(element.region, Region::MainList) {
                lines.push(truncate_to_width(&view.heading_for(element.region), width));
            }
        } else if !same_row {
            flush_row(&mut lines, &mut row, width);
        }

        if !row.is_empty() {
            row.push_str("  ");
        }
        row.push_str(&cell);
        current_region = Some(element.region);
    }
    flush_row(&mut lines, &mut row, width);
    lines
}

fn element_cell<A>(
    element: &FocusableElement<A>,
    focus: Option<&ElementId>,
    marker: &str,
) -> String {
    let focused = focus == Some(&element.id);
    let label = match element.role {
        ElementRole::TextInput => format!("{}_", element.label),
        _ => element.label.clone(),
    };
    let label = if element.disabled {
        format!("\x1b[2m{label}\x1b[0m")
    } else {
        label
    };
    if focused {
        format!("\x1b[7m{marker}{label}\x1b[0m")
    } else {
        format!("{}{label}", " ".repeat(display_width(marker)))
    }
}

fn flush_row(lines: &mut Vec<String>, row: &mut String, width: usize) {
    if row.is_empty() {
        return;
    }
    lines.push(truncate_to_width(row, width));
    row.clear();
}

fn wrap_to_width(content: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for raw in content.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for ch in raw.chars() {
            if current.is_empty() && ch == ' ' {
                continue;
            }
            current.push(ch);
            let display = display_width(&current) as u16;
            if display > width {
                current.pop();
                lines.push(current.trim_start().to_string());
                current.clear();
                if ch != ' ' {
                    current.push(ch);
                }
            } else if display == width {
                lines.push(current.trim_start().to_string());
                current.clear();
            }
        }

        if !current.is_empty() {
            lines.push(current.trim_start().to_string());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{Overlay, Screen};

    fn plain(line: &str) -> String {
        String::from_utf8(strip_ansi_escapes::strip(line)).unwrap()
    }

    #[test]
    fn wrap_basic() {
        let lines = wrap_to_width("hello world", 5);
        assert_eq!(lines, vec!["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn carousel_rows_share_a_line() {
        let mut view: View<()> = View::new(Scope::screen(Screen::Library), "Library");
        view.push(FocusableElement::action("c0", Region::CarouselRow(0), 0, "Dune", ()));
        view.push(FocusableElement::action("c1", Region::CarouselRow(0), 1, "Emma", ()));
        view.push(FocusableElement::action("r0", Region::CarouselRow(1), 0, "Ulysses", ()));
        view.heading(Region::CarouselRow(1), "Recently Added");

        let focus = ElementId::from("c1");
        let lines: Vec<_> = frame_lines(&view, Some(&focus), &RendererSettings::default())
            .iter()
            .map(|line| plain(line))
            .collect();
        assert!(lines.contains(&"[carousel-row-0]".to_string()));
        assert!(lines.contains(&"  Dune  ▶ Emma".to_string()));
        assert!(lines.contains(&"Recently Added".to_string()));
        assert!(lines.contains(&"  Ulysses".to_string()));
    }

    #[test]
    fn grid_columns_pair_up_and_hidden_elements_vanish() {
        let scope = Scope::screen(Screen::Library);
        let mut view: View<()> = View::new(scope, "Colors");
        for (i, name) in ["Yellow", "Red", "Green"].iter().enumerate() {
            view.push(
                FocusableElement::action(*name, Region::Modal, i, *name, ()).with_column(i % 2),
            );
        }
        view.push(
            FocusableElement::opener("hidden", Region::Modal, 3, "Hidden", Overlay::Sidebar)
                .with_hidden(true),
        );
        let lines: Vec<_> = frame_lines(&view, None, &RendererSettings::default())
            .iter()
            .map(|line| plain(line))
            .collect();
        assert!(lines.contains(&"  Yellow    Red".to_string()));
        assert!(lines.contains(&"  Green".to_string()));
        assert!(!lines.iter().any(|line| line.contains("Hidden")));
    }

    #[test]
    fn renderer_clears_and_reports_ready() {
        let mut view: View<()> = View::new(Scope::screen(Screen::Login), "Sign in");
        view.push_line("Server unreachable");
        view.push(FocusableElement::text_input("host", Region::MainList, 0, "Server: "));

        let mut renderer = TextRenderer::with_default(Vec::new());
        let status = renderer.render(&view, None).unwrap();
        assert_eq!(status, RenderStatus::Ready);
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.starts_with("\x1b[2J\x1b[H"));
        assert!(output.contains("Sign in\r\n"));
        assert!(output.contains("Server unreachable\r\n"));
        assert!(output.contains("Server: _"));
    }
}
