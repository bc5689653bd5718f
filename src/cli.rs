//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `moodtune` binary.
//!
//! ## Commands
//!
//! - `playlist`: Rank mood-tagged tracks and print the top ten as JSON
//! - `detect`: Sample emotions from a raw frame stream
//! - `detect-once`: Sample a single frame and print its label
//! - `serve`: Answer `POST /playlist` requests over HTTP
//! - `completion`: Generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! moodtune playlist Happy '[{"name":"A","tags":["Happy"],"popularity":80}]'
//! moodtune playlist Sad --tracks-file library.json --pretty
//! ffmpeg -f v4l2 -i /dev/video0 -f rawvideo -pix_fmt bgr24 - | moodtune detect
//! moodtune serve --bind 0.0.0.0:3000
//! ```

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "moodtune")]
#[command(about = "Moodtune: emotion sampling and mood-tagged playlists")]
#[command(version)]
pub struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "MOODTUNE_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the most popular tracks tagged with an emotion
    ///
    /// Reads a JSON array of track objects, keeps those whose `tags` array
    /// contains EMOTION exactly, and prints at most ten of them (most popular
    /// first) as a JSON array. Tracks are echoed unchanged.
    Playlist {
        /// Emotion tag to match (defaults to the configured emotion, "Happy")
        emotion: Option<String>,

        /// JSON array of track objects (defaults to an empty list)
        #[arg(conflicts_with = "tracks_file")]
        tracks: Option<String>,

        /// Read the track array from a file instead, `-` for stdin
        #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
        tracks_file: Option<PathBuf>,

        /// Maximum playlist length
        #[arg(long)]
        limit: Option<usize>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Sample emotions from a stream of raw frames
    ///
    /// Reads back-to-back raw frames of WIDTHxHEIGHTxCHANNELS bytes and
    /// prints one `Detected Emotion: <label>` line per frame. Frames the
    /// analyzer cannot handle are reported as "Neutral". Stops at end of
    /// input, on a truncated frame, or after --max-frames.
    Detect {
        #[command(flatten)]
        sampling: SamplingArgs,

        /// Stop after this many frames (at least one)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_frames: Option<u64>,
    },

    /// Sample a single frame and print only its label
    DetectOnce {
        #[command(flatten)]
        sampling: SamplingArgs,
    },

    /// Serve playlists over HTTP
    ///
    /// `POST /playlist` takes `{"emotion": ..., "tracks": [...]}` and answers
    /// with the same JSON array `moodtune playlist` prints. A missing emotion
    /// uses the configured default.
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },

    /// Generate shell completions
    ///
    /// Usage: moodtune completion bash > ~/.local/share/bash-completion/completions/moodtune
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Frame source and analyzer options shared by the sampling commands.
#[derive(ClapArgs, Debug, Clone)]
pub struct SamplingArgs {
    /// Raw frame input, `-` or omitted for stdin
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Bytes per pixel
    #[arg(long)]
    pub channels: Option<u8>,

    /// Analyzer program, run once per frame
    #[arg(long, value_name = "PROGRAM", value_hint = clap::ValueHint::CommandName)]
    pub analyzer: Option<String>,

    /// Argument passed to the analyzer program (repeatable)
    #[arg(long = "analyzer-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub analyzer_args: Vec<String>,
}
