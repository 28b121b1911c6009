use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// `-1` for up/left, `+1` for down/right.
    pub fn step(self) -> isize {
        match self {
            Direction::Up | Direction::Left => -1,
            Direction::Down | Direction::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// The six logical remote inputs. Raw key codes never travel past the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavInput {
    Move(Direction),
    Select,
    Back,
}

impl NavInput {
    pub const UP: NavInput = NavInput::Move(Direction::Up);
    pub const DOWN: NavInput = NavInput::Move(Direction::Down);
    pub const LEFT: NavInput = NavInput::Move(Direction::Left);
    pub const RIGHT: NavInput = NavInput::Move(Direction::Right);

    pub fn as_str(self) -> &'static str {
        match self {
            NavInput::Move(direction) => direction.as_str(),
            NavInput::Select => "select",
            NavInput::Back => "back",
        }
    }
}

pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;
pub const KEY_ENTER: u32 = 13;
pub const KEY_BACK: u32 = 461;
pub const KEY_BACKSPACE: u32 = 8;

/// Platform key code table, resolved once per key press.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<u32, NavInput>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::tv_remote()
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Codes sent by a TV remote through a browser-style key event.
    pub fn tv_remote() -> Self {
        Self::empty()
            .bind(KEY_LEFT, NavInput::LEFT)
            .bind(KEY_UP, NavInput::UP)
            .bind(KEY_RIGHT, NavInput::RIGHT)
            .bind(KEY_DOWN, NavInput::DOWN)
            .bind(KEY_ENTER, NavInput::Select)
            .bind(KEY_BACK, NavInput::Back)
            .bind(KEY_BACKSPACE, NavInput::Back)
    }

    pub fn bind(mut self, code: u32, input: NavInput) -> Self {
        self.bindings.insert(code, input);
        self
    }

    pub fn resolve(&self, code: u32) -> Option<NavInput> {
        self.bindings.get(&code).copied()
    }
}

/// Map a terminal key press to a logical input.
pub fn from_key_event(key: &KeyEvent) -> Option<NavInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(NavInput::UP),
        KeyCode::Down => Some(NavInput::DOWN),
        KeyCode::Left => Some(NavInput::LEFT),
        KeyCode::Right => Some(NavInput::RIGHT),
        KeyCode::Enter => Some(NavInput::Select),
        KeyCode::Esc | KeyCode::Backspace => Some(NavInput::Back),
        _ => None,
    }
}
