//! # External Analyzer Process
//!
//! [`CommandAnalyzer`] delegates facial analysis to an external program, in
//! the same way the player delegates playback to a command-line client. This
//! keeps the model (and its runtime) entirely outside this crate.
//!
//! ## Protocol
//!
//! For every frame the program is started once and receives:
//!
//! - the raw frame bytes on stdin,
//! - `MOODTUNE_FRAME_WIDTH`, `MOODTUNE_FRAME_HEIGHT`, `MOODTUNE_FRAME_CHANNELS`,
//! - `MOODTUNE_ACTIONS` (comma separated, currently always `emotion`),
//! - `MOODTUNE_ENFORCE_DETECTION` (`true`/`false`).
//!
//! It must print JSON on stdout, either one result object or an array of
//! per-face results (the first one is used):
//!
//! ```text
//! {"dominant_emotion": "happy", "emotion": {"happy": 97.1, "neutral": 2.3}}
//! ```
//!
//! A non-zero exit status is reported as [`AnalysisError::Exit`] with the
//! program's stderr.

use crate::emotion::{Analysis, AnalysisError, AnalysisRequest, EmotionAnalyzer};
use crate::frame::Frame;
use log::{debug, trace};
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

pub const ENV_WIDTH: &str = "MOODTUNE_FRAME_WIDTH";
pub const ENV_HEIGHT: &str = "MOODTUNE_FRAME_HEIGHT";
pub const ENV_CHANNELS: &str = "MOODTUNE_FRAME_CHANNELS";
pub const ENV_ACTIONS: &str = "MOODTUNE_ACTIONS";
pub const ENV_ENFORCE_DETECTION: &str = "MOODTUNE_ENFORCE_DETECTION";

/// Runs an external program per frame.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, frame: &Frame, request: &AnalysisRequest) -> Command {
        let actions = request
            .actions
            .iter()
            .map(|action| action.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env(ENV_WIDTH, frame.width().to_string())
            .env(ENV_HEIGHT, frame.height().to_string())
            .env(ENV_CHANNELS, frame.channels().to_string())
            .env(ENV_ACTIONS, actions)
            .env(ENV_ENFORCE_DETECTION, request.enforce_detection.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl EmotionAnalyzer for CommandAnalyzer {
    fn analyze(&mut self, frame: &Frame, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
        trace!("Running analyzer `{}' on {}x{} frame", self.program, frame.width(), frame.height());

        let mut child = self
            .command(frame, request)
            .spawn()
            .map_err(|source| AnalysisError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let mut stdin = child.stdin.take();

        // Feed stdin from a second thread so a child that writes before it
        // has read the whole frame cannot fill its stdout pipe and stall.
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin.as_mut() {
                Some(pipe) => pipe.write_all(frame.data()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("frame writer panicked")));
            (written, output)
        });
        let output = output?;

        match written {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("Analyzer `{}' closed stdin before reading the whole frame", self.program);
            }
            Err(e) => return Err(e.into()),
            Ok(()) => {}
        }

        if !output.status.success() {
            return Err(AnalysisError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_analysis(&output.stdout)
    }
}

/// Parses analyzer stdout, accepting a single result or a list of per-face
/// results.
///
/// # Errors
///
/// [`AnalysisError::Parse`] when stdout is not an analysis object or array,
/// [`AnalysisError::NoDominantEmotion`] for an empty array or a result
/// without a `dominant_emotion` string.
///
/// # Examples
///
/// ```
/// use moodtune::analyzer::parse_analysis;
///
/// let analysis = parse_analysis(br#"[{"dominant_emotion": "sad"}]"#)?;
/// assert_eq!(analysis.dominant_emotion.as_str(), "sad");
/// # Ok::<(), moodtune::emotion::AnalysisError>(())
/// ```
pub fn parse_analysis(stdout: &[u8]) -> Result<Analysis, AnalysisError> {
    let value: Value = serde_json::from_slice(stdout)?;

    let result = match value {
        Value::Array(mut faces) => {
            if faces.is_empty() {
                return Err(AnalysisError::NoDominantEmotion);
            }
            faces.swap_remove(0)
        }
        other => other,
    };

    match result.get("dominant_emotion") {
        Some(Value::String(_)) => Ok(serde_json::from_value(result)?),
        _ => Err(AnalysisError::NoDominantEmotion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_result() {
        let analysis = parse_analysis(br#"{"dominant_emotion": "fear", "region": {"x": 1}}"#).unwrap();
        assert_eq!(analysis.dominant_emotion.as_str(), "fear");
        assert!(analysis.scores.is_empty());
    }

    #[test]
    fn test_parse_takes_first_face() {
        let analysis = parse_analysis(
            br#"[{"dominant_emotion": "happy", "emotion": {"happy": 88.0}}, {"dominant_emotion": "sad"}]"#,
        )
        .unwrap();
        assert_eq!(analysis.dominant_emotion.as_str(), "happy");
        assert_eq!(analysis.scores.get("happy"), Some(&88.0));
    }

    #[test]
    fn test_parse_errors_are_distinct() {
        assert!(matches!(parse_analysis(b"not json"), Err(AnalysisError::Parse(_))));
        assert!(matches!(parse_analysis(b"[]"), Err(AnalysisError::NoDominantEmotion)));
        assert!(matches!(parse_analysis(b"{}"), Err(AnalysisError::NoDominantEmotion)));
        assert!(matches!(
            parse_analysis(br#"{"dominant_emotion": 3}"#),
            Err(AnalysisError::NoDominantEmotion)
        ));
        assert!(matches!(
            parse_analysis(br#"{"dominant_emotion": "sad", "emotion": "loud"}"#),
            Err(AnalysisError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let frame = Frame::new(1, 1, 1, vec![0]).unwrap();
        let mut analyzer = CommandAnalyzer::new("moodtune-no-such-analyzer-binary", Vec::new());

        let err = analyzer.analyze(&frame, &AnalysisRequest::emotion_only()).unwrap_err();
        assert!(matches!(err, AnalysisError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_program_with_frame_environment() {
        let frame = Frame::new(2, 1, 3, vec![7; 6]).unwrap();
        let script = format!(
            r#"cat > /dev/null; printf '{{"dominant_emotion": "%s"}}' "${{{ENV_WIDTH}}}x${{{ENV_HEIGHT}}}-${{{ENV_ACTIONS}}}-${{{ENV_ENFORCE_DETECTION}}}""#
        );
        let mut analyzer = CommandAnalyzer::new("sh", vec!["-c".into(), script]);

        let analysis = analyzer.analyze(&frame, &AnalysisRequest::emotion_only()).unwrap();
        assert_eq!(analysis.dominant_emotion.as_str(), "2x1-emotion-false");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_reports_stderr() {
        let frame = Frame::new(1, 1, 1, vec![0]).unwrap();
        let mut analyzer = CommandAnalyzer::new(
            "sh",
            vec!["-c".into(), "echo 'Face could not be detected' >&2; exit 3".into()],
        );

        match analyzer.analyze(&frame, &AnalysisRequest::emotion_only()) {
            Err(AnalysisError::Exit { stderr, .. }) => assert_eq!(stderr, "Face could not be detected"),
            other => panic!("expected exit error, got {other:?}"),
        }
    }
}
