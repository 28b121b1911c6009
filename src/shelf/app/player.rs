use std::time::Duration;

use serde_json::json;

use crate::error::Result;
use crate::logging::{LogLevel, json_kv};
use crate::nav::Screen;
use crate::render::RenderBoundary;
use crate::shelf::api::{AfterLoad, ApiCall, Session};
use crate::shelf::playback::PlayerState;
use crate::shelf::views::ShelfAction;

use super::{Outcome, ShelfApp};

impl<R: RenderBoundary<ShelfAction>> ShelfApp<R> {
    /// Advance the playback clock, the sync timer, and the metrics interval.
    pub fn tick(&mut self, elapsed: Duration) -> Result<()> {
        let was_playing = self.state.player.as_ref().is_some_and(|player| player.is_playing);
        self.advance_playback(elapsed);
        if self.sync_timer.advance(elapsed) > 0 {
            self.queue_sync();
        }

        self.since_metrics += elapsed;
        if self.since_metrics >= self.config.metrics_interval {
            self.since_metrics = Duration::ZERO;
            self.emit_metrics();
        }

        if was_playing && self.nav.screen() == Screen::Player {
            self.repaint_if_settled()?;
        }
        Ok(())
    }

    /// Cancel the sync timer, release the audio output, drop queued syncs, and close
    /// the server session. Safe to call when nothing is playing.
    pub fn stop_playback(&mut self) {
        self.sync_timer.cancel();
        self.playback.stop();
        self.outbox
            .retain(|request| !matches!(request.call, ApiCall::SyncSession { .. }));
        let Some(player) = self.state.player.take() else {
            return;
        };
        self.log(
            LogLevel::Info,
            "playback_stopped",
            [
                json_kv("session", json!(player.session_id)),
                json_kv("position", json!(player.current_time)),
            ],
        );
        self.queue(
            None,
            ApiCall::CloseSession {
                session_id: player.session_id.clone(),
                report: player.report(0.0),
            },
            AfterLoad::Nothing,
        );
    }

    pub(super) fn session_started(&mut self, session: Session) -> Outcome {
        let Some(book) = self.state.current_book.clone() else {
            return Outcome::new();
        };
        let player = match PlayerState::new(session, &book) {
            Ok(player) => player,
            Err(err) => {
                self.state.error = Some(err.to_string());
                return self.nav.refresh();
            }
        };
        self.stop_playback();
        self.log(
            LogLevel::Info,
            "playback_started",
            [
                json_kv("session", json!(player.session_id)),
                json_kv("item", json!(player.item_id)),
                json_kv("track", json!(player.track_index)),
                json_kv("position", json!(player.current_time)),
            ],
        );
        self.state.player = Some(player);
        self.reload_track();
        self.sync_timer.start();
        self.nav.switch_screen(Screen::Player)
    }

    /// Load the current track into the output at the player's position.
    fn reload_track(&mut self) {
        let Some(player) = self.state.player.as_mut() else {
            return;
        };
        let Some(track) = player.current_track() else {
            return;
        };
        let url = track.content_url.clone();
        let duration = track.duration;
        let offset = player.offset_in_track();
        match self
            .playback
            .load(&url, duration, offset, self.state.settings.playback_speed)
        {
            Ok(()) => player.is_playing = true,
            Err(err) => {
                player.is_playing = false;
                self.state.error = Some(err.to_string());
            }
        }
    }

    fn advance_playback(&mut self, elapsed: Duration) {
        let status = match &self.state.player {
            Some(player) if player.is_playing => self.playback.tick(elapsed),
            _ => return,
        };
        let Some(player) = self.state.player.as_mut() else {
            return;
        };
        player.update_position(status.position);
        if !status.ended {
            return;
        }

        if player.has_next() {
            let next = player.track_index + 1;
            player.jump_to_track(next);
            self.reload_track();
        } else {
            // Book finished: report the final position once and go idle.
            player.is_playing = false;
            self.sync_timer.cancel();
            self.queue_sync();
        }
    }

    fn queue_sync(&mut self) {
        let Some(player) = &self.state.player else {
            return;
        };
        let call = ApiCall::SyncSession {
            session_id: player.session_id.clone(),
            report: player.report(self.config.sync_listened_secs),
        };
        self.queue(None, call, AfterLoad::Nothing);
    }

    pub(super) fn toggle_play(&mut self) -> Outcome {
        let Some(player) = self.state.player.as_mut() else {
            return Outcome::new();
        };
        let result = if player.is_playing {
            self.playback.pause()
        } else {
            self.playback.play()
        };
        match result {
            Ok(()) => {
                player.is_playing = !player.is_playing;
                if player.is_playing {
                    self.sync_timer.start();
                } else {
                    self.sync_timer.cancel();
                    self.queue_sync();
                }
            }
            Err(err) => self.state.error = Some(err.to_string()),
        }
        self.nav.refresh()
    }

    /// Relative seek across track boundaries, clamped to the book.
    pub(super) fn seek_by(&mut self, seconds: i32) -> Outcome {
        let Some(player) = self.state.player.as_mut() else {
            return Outcome::new();
        };
        let target = player.seek_target(f64::from(seconds));
        let track = player
            .track_for_time(target)
            .unwrap_or_else(|| player.tracks.len().saturating_sub(1));
        let same_track = track == player.track_index;
        player.track_index = track;
        player.current_time = target;

        if same_track {
            let offset = player.offset_in_track();
            if let Err(err) = self.playback.seek(offset) {
                self.state.error = Some(err.to_string());
            }
        } else {
            self.reload_track();
        }
        self.nav.refresh()
    }

    /// Restart the previous track, or the first one when already there.
    pub(super) fn previous_track(&mut self) -> Outcome {
        let Some(player) = self.state.player.as_mut() else {
            return Outcome::new();
        };
        let index = player.track_index.saturating_sub(1);
        player.jump_to_track(index);
        self.reload_track();
        self.nav.refresh()
    }

    pub(super) fn next_track(&mut self) -> Outcome {
        let Some(player) = self.state.player.as_mut() else {
            return Outcome::new();
        };
        if !player.has_next() {
            return Outcome::new();
        }
        let index = player.track_index + 1;
        player.jump_to_track(index);
        self.reload_track();
        self.nav.refresh()
    }
}
