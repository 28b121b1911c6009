use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

use crate::error::ShelfError;
use crate::nav::from_key_event;
use crate::render::RenderBoundary;
use crate::shelf::ShelfApp;
use crate::shelf::api::MediaApi;
use crate::shelf::views::ShelfAction;

pub type DriverResult<T> = std::result::Result<T, CliDriverError>;

#[derive(Debug, Error)]
pub enum CliDriverError {
    #[error("runtime error: {0}")]
    Runtime(#[from] ShelfError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver that owns a [`ShelfApp`] and the server it talks to. Manages raw
/// mode and the alternate screen, feeds key presses to the app, ticks playback, and
/// runs queued server calls between inputs.
pub struct CliDriver<R, A> {
    app: ShelfApp<R>,
    api: A,
    should_exit: bool,
}

impl<R, A> CliDriver<R, A>
where
    R: RenderBoundary<ShelfAction>,
    A: MediaApi,
{
    pub fn new(app: ShelfApp<R>, api: A) -> Self {
        Self {
            app,
            api,
            should_exit: false,
        }
    }

    pub fn app(&self) -> &ShelfApp<R> {
        &self.app
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn run(mut self) -> DriverResult<()> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner();
        self.exit(&mut stdout);
        result
    }

    fn run_inner(&mut self) -> DriverResult<()> {
        self.start()?;
        let tick_interval = self.app.config().tick_interval;
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = tick_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                let event = event::read()?;
                self.handle_event(&event)?;
            }

            if last_tick.elapsed() >= tick_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.tick(elapsed)?;
            }
        }

        self.app.stop_playback();
        self.app.pump_requests(&mut self.api)?;
        Ok(())
    }

    /// Start the app and run whatever sign-in calls it queued.
    pub fn start(&mut self) -> DriverResult<()> {
        self.app.start()?;
        self.app.pump_requests(&mut self.api)?;
        Ok(())
    }

    /// Feed one terminal event. Printable keys edit the focused text field;
    /// everything else goes through the key map.
    pub fn handle_event(&mut self, event: &Event) -> DriverResult<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if is_interrupt(key) {
            self.should_exit = true;
            return Ok(());
        }

        match key.code {
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.app.insert_char(ch)?;
            }
            KeyCode::Backspace if self.app.focused_field().is_some() => {
                self.app.delete_char()?;
            }
            _ => {
                if let Some(input) = from_key_event(key) {
                    self.app.handle_input(input)?;
                }
            }
        }
        self.app.pump_requests(&mut self.api)?;
        Ok(())
    }

    pub fn tick(&mut self, elapsed: Duration) -> DriverResult<()> {
        self.app.tick(elapsed)?;
        self.app.pump_requests(&mut self.api)?;
        Ok(())
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| CliDriverError::Terminal(err.to_string()))?;
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
}
