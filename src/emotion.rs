//! # Emotion Sampling
//!
//! Turns a single [`Frame`] into an [`EmotionLabel`] by asking an
//! [`EmotionAnalyzer`] for the dominant emotion.
//!
//! The analyzer reports success or a typed [`AnalysisError`]. Failures are
//! logged and collapsed to [`EmotionLabel::neutral`] in exactly one place,
//! [`detect_emotion`], so a caller driving a capture loop never stops on a
//! single bad frame.
//!
//! ```
//! use moodtune::emotion::{detect_emotion, Analysis, AnalysisError, AnalysisRequest, EmotionAnalyzer};
//! use moodtune::frame::Frame;
//!
//! struct AlwaysHappy;
//!
//! impl EmotionAnalyzer for AlwaysHappy {
//!     fn analyze(&mut self, _frame: &Frame, _request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
//!         Ok(Analysis::new("happy"))
//!     }
//! }
//!
//! let frame = Frame::new(1, 1, 3, vec![0, 0, 0])?;
//! assert_eq!(detect_emotion(&mut AlwaysHappy, &frame).as_str(), "happy");
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::frame::Frame;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Label returned whenever the analyzer cannot produce one.
pub const NEUTRAL: &str = "Neutral";

/// Classification result drawn from the analyzer's vocabulary.
///
/// No vocabulary is enforced here; whatever string the analyzer reports as
/// dominant is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionLabel(String);

impl EmotionLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The fallback label.
    #[must_use]
    pub fn neutral() -> Self {
        Self(NEUTRAL.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmotionLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for EmotionLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Analyses an analyzer may be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Emotion,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emotion => "emotion",
        }
    }
}

/// What the sampler asks of an analyzer for every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub actions: Vec<Action>,
    /// When false the analyzer must return a best-effort estimate even if no
    /// face was confidently located.
    pub enforce_detection: bool,
}

impl AnalysisRequest {
    /// Emotion-only analysis without detection enforcement.
    #[must_use]
    pub fn emotion_only() -> Self {
        Self {
            actions: vec![Action::Emotion],
            enforce_detection: false,
        }
    }
}

/// Successful analyzer output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analysis {
    pub dominant_emotion: EmotionLabel,
    /// Per-label confidence, when the analyzer reports it.
    #[serde(default, rename = "emotion")]
    pub scores: BTreeMap<String, f64>,
}

impl Analysis {
    pub fn new(dominant_emotion: impl Into<EmotionLabel>) -> Self {
        Self {
            dominant_emotion: dominant_emotion.into(),
            scores: BTreeMap::new(),
        }
    }
}

/// Every way an analyzer can fail to produce a dominant emotion.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to start analyzer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error while talking to analyzer: {0}")]
    Io(#[from] std::io::Error),
    #[error("analyzer exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("analyzer output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("analyzer result has no dominant emotion")]
    NoDominantEmotion,
    #[error("analysis failed: {0}")]
    Model(String),
}

/// A facial-analysis collaborator.
///
/// Implementations must honour [`AnalysisRequest::enforce_detection`] being
/// false by returning a best-effort estimate instead of an error when no face
/// is found.
pub trait EmotionAnalyzer {
    fn analyze(&mut self, frame: &Frame, request: &AnalysisRequest) -> Result<Analysis, AnalysisError>;
}

impl<A: EmotionAnalyzer + ?Sized> EmotionAnalyzer for &mut A {
    fn analyze(&mut self, frame: &Frame, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
        (**self).analyze(frame, request)
    }
}

impl<A: EmotionAnalyzer + ?Sized> EmotionAnalyzer for Box<A> {
    fn analyze(&mut self, frame: &Frame, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
        (**self).analyze(frame, request)
    }
}

/// Returns the dominant emotion in `frame`, or `"Neutral"` if analysis fails
/// for any reason.
pub fn detect_emotion<A: EmotionAnalyzer + ?Sized>(analyzer: &mut A, frame: &Frame) -> EmotionLabel {
    match analyzer.analyze(frame, &AnalysisRequest::emotion_only()) {
        Ok(analysis) => {
            trace!("Dominant emotion `{}'", analysis.dominant_emotion);
            analysis.dominant_emotion
        }
        Err(e) => {
            debug!("Emotion analysis failed, falling back to {NEUTRAL}: {e}");
            EmotionLabel::neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed outcome and records what it was asked.
    struct Scripted {
        outcome: fn() -> Result<Analysis, AnalysisError>,
        seen: Vec<AnalysisRequest>,
    }

    impl Scripted {
        fn new(outcome: fn() -> Result<Analysis, AnalysisError>) -> Self {
            Self { outcome, seen: Vec::new() }
        }
    }

    impl EmotionAnalyzer for Scripted {
        fn analyze(&mut self, _frame: &Frame, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
            self.seen.push(request.clone());
            (self.outcome)()
        }
    }

    fn frame() -> Frame {
        Frame::new(2, 2, 3, vec![0; 12]).unwrap()
    }

    #[test]
    fn test_returns_dominant_emotion_on_success() {
        let mut analyzer = Scripted::new(|| Ok(Analysis::new("Happy")));
        assert_eq!(detect_emotion(&mut analyzer, &frame()), EmotionLabel::from("Happy"));
    }

    #[test]
    fn test_requests_emotion_only_without_enforced_detection() {
        let mut analyzer = Scripted::new(|| Ok(Analysis::new("Sad")));
        detect_emotion(&mut analyzer, &frame());

        assert_eq!(analyzer.seen.len(), 1);
        assert_eq!(analyzer.seen[0].actions, vec![Action::Emotion]);
        assert!(!analyzer.seen[0].enforce_detection);
    }

    #[test]
    fn test_every_failure_maps_to_neutral() {
        let failures: [fn() -> Result<Analysis, AnalysisError>; 6] = [
            || Err(AnalysisError::Spawn {
                program: "missing".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            || Err(AnalysisError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe))),
            || Err(AnalysisError::Exit { status: "exit status: 1".into(), stderr: "boom".into() }),
            || Err(AnalysisError::Parse(serde_json::from_str::<Analysis>("nope").unwrap_err())),
            || Err(AnalysisError::NoDominantEmotion),
            || Err(AnalysisError::Model("face not found".into())),
        ];

        for outcome in failures {
            let mut analyzer = Scripted::new(outcome);
            assert_eq!(detect_emotion(&mut analyzer, &frame()).as_str(), NEUTRAL);
        }
    }

    #[test]
    fn test_degenerate_frame_still_reaches_analyzer() {
        let empty = Frame::new(0, 0, 3, Vec::new()).unwrap();
        let mut analyzer = Scripted::new(|| Err(AnalysisError::Model("empty image".into())));

        assert_eq!(detect_emotion(&mut analyzer, &empty), EmotionLabel::neutral());
        assert_eq!(analyzer.seen.len(), 1);
    }

    #[test]
    fn test_analysis_deserializes_scores() {
        let analysis: Analysis = serde_json::from_str(
            r#"{"dominant_emotion": "angry", "emotion": {"angry": 91.5, "sad": 3.0}}"#,
        )
        .unwrap();

        assert_eq!(analysis.dominant_emotion.as_str(), "angry");
        assert_eq!(analysis.scores.get("sad"), Some(&3.0));
    }

    #[test]
    fn test_label_is_not_normalized() {
        assert_ne!(EmotionLabel::from("happy"), EmotionLabel::from("Happy"));
        assert_eq!(EmotionLabel::from(" Sad ").to_string(), " Sad ");
    }
}
