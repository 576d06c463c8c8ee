use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};

use crate::types::ArtistRef;

pub const STATE_LENGTH: usize = 32;

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// `Basic base64(client_id:client_secret)` header value for the token endpoint.
pub fn basic_auth(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(credentials))
}

/// Splits a scope list written with spaces, commas or both.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_artists(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
