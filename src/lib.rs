//! Emotion sampling and mood-tagged playlists.
//!
//! Two independent pieces live here:
//!
//! - **Emotion sampling**: [`emotion::detect_emotion`] asks an
//!   [`emotion::EmotionAnalyzer`] for the dominant emotion in a
//!   [`frame::Frame`] and falls back to `"Neutral"` on any failure.
//!   [`sampler::run_sampler`] drives it over a [`frame::FrameSource`].
//! - **Playlist ranking**: [`playlist::generate_playlist`] keeps the tracks
//!   tagged with an emotion and returns the ten most popular.
//!
//! Nothing connects the two; a caller that wants a playlist for the current
//! mood feeds the sampled label into the ranker itself.
//!
//! ## Modules
//!
//! - [`emotion`] - Labels, the analyzer trait and the neutral fallback
//! - [`analyzer`] - External analyzer process
//! - [`frame`] - Frames and raw frame streams
//! - [`sampler`] - Capture/analyze/display loop
//! - [`track`] - Track records and input validation
//! - [`playlist`] - Filter, rank and truncate
//! - [`server`] - `POST /playlist` over HTTP
//!
//! ### Supporting Modules
//!
//! - [`config`] - Configuration file loading
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use moodtune::{playlist, track};
//!
//! let tracks = track::parse_tracks(r#"[
//!     {"name": "Sunny", "tags": ["Happy"], "popularity": 80},
//!     {"name": "Rain", "tags": ["Sad"], "popularity": 60},
//!     {"name": "Bright", "tags": ["Happy", "Calm"], "popularity": 95}
//! ]"#)?;
//!
//! let top = playlist::generate_playlist("Happy", &tracks);
//! let names: Vec<_> = top.iter().map(|t| t.fields()["name"].as_str().unwrap()).collect();
//! assert_eq!(names, ["Bright", "Sunny"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Application flows return `anyhow::Result`. The two library boundaries use
//! typed errors so callers can tell causes apart:
//!
//! - [`emotion::AnalysisError`] - why an analyzer produced no label
//! - [`track::TrackError`] - why a track list was rejected
//! - [`server::ApiError`] - the HTTP status and body sent for a rejected request
//!
//! ## Logging
//!
//! Uses the `log` facade; the binary installs `env_logger`, so
//! `RUST_LOG=moodtune=debug` shows fallback causes and ranking decisions.

pub mod analyzer;
pub mod cli;
pub mod completion;
pub mod config;
pub mod emotion;
pub mod frame;
pub mod playlist;
pub mod sampler;
pub mod server;
pub mod track;
