//! # Moodtune
//!
//! Command-line front end for emotion sampling and mood-tagged playlists.
//!
//! ## Usage
//!
//! ```bash
//! # Top ten "Happy" tracks
//! moodtune playlist Happy '[{"name":"A","tags":["Happy"],"popularity":80}]'
//!
//! # Read a larger library from disk
//! moodtune playlist Calm --tracks-file library.json --pretty
//!
//! # Label frames from the default camera
//! ffmpeg -f v4l2 -i /dev/video0 -f rawvideo -pix_fmt bgr24 - | moodtune detect
//!
//! # Serve POST /playlist on port 3000
//! moodtune serve
//! ```

use anyhow::{ensure, Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use moodtune::analyzer::CommandAnalyzer;
use moodtune::cli::{self, SamplingArgs};
use moodtune::config::RuntimeConfig;
use moodtune::emotion::detect_emotion;
use moodtune::frame::{FrameGeometry, FrameSource, RawFrameReader};
use moodtune::playlist::{generate_playlist_with, PlaylistConfig};
use moodtune::sampler::{run_sampler, TextDisplay};
use moodtune::server::{self, AppState};
use moodtune::{completion, track};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Main entry point.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug moodtune detect` - Show why frames fell back to Neutral
/// - `RUST_LOG=moodtune::playlist=debug moodtune playlist` - Ranking details
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Playlist { emotion, tracks, tracks_file, limit, pretty } => {
            let config = RuntimeConfig::load(args.config.as_deref())?;
            let emotion = emotion.unwrap_or(config.default_emotion);

            let json = match (tracks, tracks_file) {
                (Some(json), _) => json,
                (None, Some(path)) => read_tracks_file(&path)?,
                (None, None) => "[]".to_string(),
            };
            let tracks = track::parse_tracks(&json).context("Invalid track list")?;

            let playlist_config = PlaylistConfig {
                limit: limit.unwrap_or(config.playlist_limit),
            };
            info!("Ranking {} tracks for `{emotion}'", tracks.len());
            let playlist = generate_playlist_with(&emotion, &tracks, &playlist_config);

            let output = if pretty {
                serde_json::to_string_pretty(&playlist)?
            } else {
                serde_json::to_string(&playlist)?
            };
            println!("{output}");
        }
        cli::Command::Detect { sampling, max_frames } => {
            let config = RuntimeConfig::load(args.config.as_deref())?;
            let (source, mut analyzer) = sampling_setup(&sampling, &config)?;

            info!("Sampling emotions with analyzer `{}'", analyzer.program());
            let display = TextDisplay::new(io::stdout().lock(), max_frames);
            let report = run_sampler(source, &mut analyzer, display)?;

            match report.most_common() {
                Some(label) => info!("{} frames, most common emotion: {label}", report.frames),
                None => info!("No frames captured"),
            }
        }
        cli::Command::DetectOnce { sampling } => {
            let config = RuntimeConfig::load(args.config.as_deref())?;
            let (mut source, mut analyzer) = sampling_setup(&sampling, &config)?;

            let frame = source
                .capture()
                .context("Failed to capture frame")?
                .ok_or_else(|| anyhow::anyhow!("Input ended before a full frame was read"))?;
            println!("{}", detect_emotion(&mut analyzer, &frame));
        }
        cli::Command::Serve { bind } => {
            let config = RuntimeConfig::load(args.config.as_deref())?;
            let state = AppState::new(
                config.default_emotion,
                PlaylistConfig {
                    limit: config.playlist_limit,
                },
            );

            tokio::runtime::Runtime::new()
                .context("Failed to start async runtime")?
                .block_on(server::serve(bind, state))?;
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}

/// Reads the track array from `path`, `-` meaning stdin.
fn read_tracks_file(path: &Path) -> Result<String> {
    let mut json = String::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read tracks from stdin")?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut json))
            .with_context(|| format!("Failed to read tracks from {}", path.display()))?;
    }
    Ok(json)
}

/// Builds the frame source and analyzer from flags layered over config.
fn sampling_setup(
    sampling: &SamplingArgs,
    config: &RuntimeConfig,
) -> Result<(RawFrameReader<Box<dyn Read>>, CommandAnalyzer)> {
    let geometry = FrameGeometry {
        width: sampling.width.unwrap_or(config.frame.width),
        height: sampling.height.unwrap_or(config.frame.height),
        channels: sampling.channels.unwrap_or(config.frame.channels),
    };
    ensure!(
        geometry.byte_len() > 0,
        "Frame geometry {}x{}x{} is empty; width, height and channels must be non-zero",
        geometry.width,
        geometry.height,
        geometry.channels
    );

    let input: Box<dyn Read> = match sampling.input.as_deref() {
        None => Box::new(io::stdin()),
        Some(path) if path == Path::new("-") => Box::new(io::stdin()),
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open frame input {}", path.display()))?,
        ),
    };
    debug!("Frame geometry {geometry:?}");

    let analyzer = match &sampling.analyzer {
        Some(program) => CommandAnalyzer::new(program.clone(), sampling.analyzer_args.clone()),
        None if !sampling.analyzer_args.is_empty() => {
            CommandAnalyzer::new(config.analyzer.program.clone(), sampling.analyzer_args.clone())
        }
        None => CommandAnalyzer::new(config.analyzer.program.clone(), config.analyzer.args.clone()),
    };

    Ok((RawFrameReader::new(input, geometry), analyzer))
}
