//! Playback boundary, multi-track position math, and the periodic sync timer.

use std::time::Duration;

use thiserror::Error;

use super::api::{AudioTrack, Item, Session, SessionReport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("session has no audio tracks")]
    NoTracks,
    #[error("audio output error: {0}")]
    Device(String),
}

/// Position within the loaded track as reported by the audio device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackStatus {
    pub position: f64,
    pub ended: bool,
}

/// Audio output plus its time source.
pub trait PlaybackBoundary {
    /// Load a track and start playing from `offset` seconds into it.
    fn load(&mut self, url: &str, track_duration: f64, offset: f64, rate: f64)
    -> Result<(), PlaybackError>;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    /// Jump to `position` seconds within the loaded track.
    fn seek(&mut self, position: f64) -> Result<(), PlaybackError>;
    fn set_rate(&mut self, rate: f64) -> Result<(), PlaybackError>;
    /// Report the current position after `elapsed` wall time.
    fn tick(&mut self, elapsed: Duration) -> PlaybackStatus;
    /// Release the output. Safe to call when nothing is loaded.
    fn stop(&mut self);
}

/// Clock-driven stand-in for an audio device: position advances with wall time
/// scaled by the playback rate.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayback {
    url: Option<String>,
    track_duration: f64,
    position: f64,
    rate: f64,
    playing: bool,
}

impl SimulatedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl PlaybackBoundary for SimulatedPlayback {
    fn load(
        &mut self,
        url: &str,
        track_duration: f64,
        offset: f64,
        rate: f64,
    ) -> Result<(), PlaybackError> {
        self.url = Some(url.to_string());
        self.track_duration = track_duration.max(0.0);
        self.position = offset.clamp(0.0, self.track_duration);
        self.rate = rate;
        self.playing = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.url.is_none() {
            return Err(PlaybackError::Device("nothing loaded".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.playing = false;
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<(), PlaybackError> {
        self.position = position.clamp(0.0, self.track_duration);
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) -> Result<(), PlaybackError> {
        self.rate = rate;
        Ok(())
    }

    fn tick(&mut self, elapsed: Duration) -> PlaybackStatus {
        if self.playing {
            let advanced = self.position + elapsed.as_secs_f64() * self.rate;
            self.position = advanced.min(self.track_duration);
        }
        let ended = self.url.is_some() && self.position >= self.track_duration;
        if ended {
            self.playing = false;
        }
        PlaybackStatus {
            position: self.position,
            ended,
        }
    }

    fn stop(&mut self) {
        self.url = None;
        self.playing = false;
        self.position = 0.0;
    }
}

/// Book-level playback position across a session's tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub session_id: String,
    pub item_id: String,
    pub title: String,
    pub author: String,
    pub tracks: Vec<AudioTrack>,
    pub duration: f64,
    pub current_time: f64,
    pub track_index: usize,
    pub is_playing: bool,
}

impl PlayerState {
    /// Start from the item's saved position.
    pub fn new(session: Session, item: &Item) -> Result<Self, PlaybackError> {
        if session.audio_tracks.is_empty() {
            return Err(PlaybackError::NoTracks);
        }
        let duration = if session.duration > 0.0 {
            session.duration
        } else {
            item.duration()
        };
        let current_time = item
            .user_media_progress
            .as_ref()
            .map(|progress| progress.current_time)
            .unwrap_or(0.0);

        let mut state = Self {
            session_id: session.id,
            item_id: item.id.clone(),
            title: item.title().to_string(),
            author: item.author().to_string(),
            tracks: session.audio_tracks,
            duration,
            current_time,
            track_index: 0,
            is_playing: false,
        };
        state.track_index = state.track_for_time(current_time).unwrap_or(0);
        Ok(state)
    }

    pub fn current_track(&self) -> Option<&AudioTrack> {
        self.tracks.get(self.track_index)
    }

    pub fn track_title(&self) -> String {
        self.current_track()
            .and_then(|track| track.title.clone())
            .unwrap_or_else(|| format!("Track {}", self.track_index + 1))
    }

    /// Sum of the durations of every track before `index`.
    pub fn track_start(&self, index: usize) -> f64 {
        self.tracks.iter().take(index).map(|track| track.duration).sum()
    }

    /// First track whose span contains `time`; `None` past the end.
    pub fn track_for_time(&self, time: f64) -> Option<usize> {
        let mut accumulated = 0.0;
        for (index, track) in self.tracks.iter().enumerate() {
            if accumulated + track.duration > time {
                return Some(index);
            }
            accumulated += track.duration;
        }
        None
    }

    /// Offset of `current_time` inside the current track.
    pub fn offset_in_track(&self) -> f64 {
        (self.current_time - self.track_start(self.track_index)).max(0.0)
    }

    /// Book time for a relative seek, clamped to the book.
    pub fn seek_target(&self, delta: f64) -> f64 {
        (self.current_time + delta).clamp(0.0, self.duration.max(0.0))
    }

    pub fn has_previous(&self) -> bool {
        self.track_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.track_index + 1 < self.tracks.len()
    }

    /// Move to the start of track `index`.
    pub fn jump_to_track(&mut self, index: usize) {
        self.track_index = index.min(self.tracks.len().saturating_sub(1));
        self.current_time = self.track_start(self.track_index);
    }

    pub fn update_position(&mut self, position_in_track: f64) {
        self.current_time = self.track_start(self.track_index) + position_in_track;
    }

    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn report(&self, time_listened: f64) -> SessionReport {
        SessionReport {
            current_time: self.current_time,
            time_listened,
            duration: self.duration,
        }
    }
}

/// Tick-driven repeating timer. Once cancelled it fires nothing until the next
/// `start`, and a restart begins a fresh interval.
#[derive(Debug, Clone)]
pub struct SyncTimer {
    interval: Duration,
    elapsed: Duration,
    armed: bool,
}

impl SyncTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            armed: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.armed = true;
    }

    /// Idempotent.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Advance by `elapsed`; returns how many intervals completed.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.armed || self.interval.is_zero() {
            return 0;
        }
        self.elapsed += elapsed;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }
}
