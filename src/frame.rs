//! # Frames and Frame Sources
//!
//! A [`Frame`] is an opaque image buffer handed from a capture source to the
//! analyzer. Sources implement [`FrameSource`]; [`RawFrameReader`] reads
//! fixed-size raw frames from any byte stream, which covers a camera piped
//! through a tool such as `ffmpeg -f rawvideo -pix_fmt bgr24 -`.

use anyhow::{ensure, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};

/// Raw pixel buffer, `height` rows of `width` pixels of `channels` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps `data`, which must hold exactly `width * height * channels` bytes.
    ///
    /// # Errors
    ///
    /// Fails when `data` has any other length.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        let expected = FrameGeometry { width, height, channels }.byte_len();
        ensure!(
            data.len() == expected,
            "frame of {width}x{height}x{channels} needs {expected} bytes, got {}",
            data.len()
        );
        Ok(Self { width, height, channels, data })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn channels(&self) -> u8 {
        self.channels
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Frame dimensions shared by every frame of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl Default for FrameGeometry {
    /// 640x480 BGR, what most default cameras deliver.
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            channels: 3,
        }
    }
}

impl FrameGeometry {
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * usize::from(self.channels)
    }
}

/// A capture device or stream.
pub trait FrameSource {
    /// Next frame, `Ok(None)` at end of stream. An `Err` is a capture failure.
    fn capture(&mut self) -> Result<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn capture(&mut self) -> Result<Option<Frame>> {
        (**self).capture()
    }
}

/// Reads back-to-back raw frames of a fixed geometry.
pub struct RawFrameReader<R> {
    reader: R,
    geometry: FrameGeometry,
    frames_read: u64,
}

impl<R: Read> RawFrameReader<R> {
    pub fn new(reader: R, geometry: FrameGeometry) -> Self {
        Self {
            reader,
            geometry,
            frames_read: 0,
        }
    }

    #[must_use]
    pub const fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl<R: Read> FrameSource for RawFrameReader<R> {
    fn capture(&mut self) -> Result<Option<Frame>> {
        let len = self.geometry.byte_len();
        ensure!(len > 0, "frame geometry {:?} has no pixels", self.geometry);

        let mut data = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.reader.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            trace!("End of frame stream after {} frames", self.frames_read);
            return Ok(None);
        }
        ensure!(
            filled == len,
            "truncated frame {}: got {filled} of {len} bytes",
            self.frames_read
        );

        self.frames_read += 1;
        let FrameGeometry { width, height, channels } = self.geometry;
        Frame::new(width, height, channels, data).map(Some)
    }
}
