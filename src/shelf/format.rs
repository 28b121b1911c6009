//! Human-readable durations, clock times, and error messages.

use super::api::ApiError;

/// `"2h 5m"`, `"45m"`, or empty for zero or unknown.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return String::new();
    }
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// `"1:02:03"` or `"2:03"`; zero and invalid input read `"0:00"`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

pub fn format_speed(speed: f64) -> String {
    format!("{speed:.1}x")
}

/// Text-mode progress bar of `width` cells.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Message shown to the user for a failed server call.
pub fn error_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized => {
            "Invalid credentials. Please check your username/password or API key.".to_string()
        }
        ApiError::NotFound => "Server not found. Please check the URL.".to_string(),
        ApiError::Network(_) => {
            "Could not connect to server. Please check the URL and your network connection."
                .to_string()
        }
        other => other.to_string(),
    }
}
