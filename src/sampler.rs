//! # Sampling Loop
//!
//! Drives capture → analysis → display until the source runs dry, capture
//! fails, or the display asks to quit.
//!
//! ```text
//! FrameSource::capture → detect_emotion → LabelDisplay::show → (repeat)
//! ```
//!
//! A failed capture ends the loop normally, it is not reported as an error.
//! Analyzer failures never end the loop; they surface as `"Neutral"`.

use crate::emotion::{detect_emotion, EmotionAnalyzer, EmotionLabel};
use crate::frame::{Frame, FrameSource};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::io::Write;

/// Whether the loop should keep going after a frame was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Receives each frame together with its label.
pub trait LabelDisplay {
    fn show(&mut self, frame: &Frame, label: &EmotionLabel) -> Result<LoopControl>;
}

impl<D: LabelDisplay + ?Sized> LabelDisplay for &mut D {
    fn show(&mut self, frame: &Frame, label: &EmotionLabel) -> Result<LoopControl> {
        (**self).show(frame, label)
    }
}

/// Writes one `Detected Emotion: <label>` line per frame.
pub struct TextDisplay<W> {
    out: W,
    remaining: Option<u64>,
}

impl<W: Write> TextDisplay<W> {
    /// `max_frames` quits after that many frames have been shown.
    pub fn new(out: W, max_frames: Option<u64>) -> Self {
        Self {
            out,
            remaining: max_frames,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LabelDisplay for TextDisplay<W> {
    fn show(&mut self, _frame: &Frame, label: &EmotionLabel) -> Result<LoopControl> {
        writeln!(self.out, "Detected Emotion: {label}").context("Failed to write emotion label")?;
        self.out.flush().context("Failed to flush emotion label")?;

        match self.remaining.as_mut() {
            Some(n) => {
                *n = n.saturating_sub(1);
                Ok(if *n == 0 { LoopControl::Quit } else { LoopControl::Continue })
            }
            None => Ok(LoopControl::Continue),
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    CaptureFailed,
    Quit,
}

/// Summary of one sampling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerReport {
    pub frames: u64,
    pub labels: BTreeMap<EmotionLabel, u64>,
    pub stopped: StopReason,
}

impl SamplerReport {
    /// Most frequent label, ties going to the label that sorts first.
    #[must_use]
    pub fn most_common(&self) -> Option<&EmotionLabel> {
        self.labels
            .iter()
            .rev()
            .max_by_key(|(_, count)| **count)
            .map(|(label, _)| label)
    }
}

/// Runs the capture loop to completion.
///
/// # Errors
///
/// Only display failures are returned; capture failures end the loop with
/// [`StopReason::CaptureFailed`].
pub fn run_sampler<S, A, D>(mut source: S, mut analyzer: A, mut display: D) -> Result<SamplerReport>
where
    S: FrameSource,
    A: EmotionAnalyzer,
    D: LabelDisplay,
{
    let mut frames = 0u64;
    let mut labels = BTreeMap::new();

    let stopped = loop {
        let frame = match source.capture() {
            Ok(Some(frame)) => frame,
            Ok(None) => break StopReason::EndOfStream,
            Err(e) => {
                warn!("Frame capture failed, stopping: {e:#}");
                break StopReason::CaptureFailed;
            }
        };

        let label = detect_emotion(&mut analyzer, &frame);
        frames += 1;
        debug!("Frame {frames}: {label}");

        let control = display.show(&frame, &label)?;
        *labels.entry(label).or_insert(0) += 1;

        if control == LoopControl::Quit {
            break StopReason::Quit;
        }
    };

    info!("Sampled {frames} frames, stopped: {stopped:?}");
    Ok(SamplerReport {
        frames,
        labels,
        stopped,
    })
}
