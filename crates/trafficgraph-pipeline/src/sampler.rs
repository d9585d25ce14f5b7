//! Temporal Sampler: which native frames become scenes.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use std::iter::StepBy;
use std::ops::Range;
use trafficgraph_recording::RecordingError;

/// The frames of one snippet selected for conversion.
///
/// `Copy` and restartable: [`FrameSchedule::frames`] yields the same
/// sequence every time it is called.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSchedule {
    native_rate: f64,
    origin: f64,
    start_frame: u32,
    end_frame: u32,
    stride: u32,
}

impl FrameSchedule {
    /// Frame indices in ascending order, end exclusive.
    pub fn frames(&self) -> StepBy<Range<u32>> {
        (self.start_frame..self.end_frame).step_by(self.stride as usize)
    }

    /// Recording time of `frame`.
    pub fn timestamp(&self, frame: u32) -> f64 {
        self.origin + f64::from(frame) / self.native_rate
    }

    pub fn native_rate(&self) -> f64 {
        self.native_rate
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.frames().len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_frame >= self.end_frame
    }
}

impl IntoIterator for FrameSchedule {
    type Item = u32;
    type IntoIter = StepBy<Range<u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemporalSampler {
    hertz: Option<u32>,
    start_offset: f64,
    end_offset: f64,
}

impl TemporalSampler {
    pub fn new(hertz: Option<u32>, start_offset: f64, end_offset: f64) -> Self {
        Self {
            hertz,
            start_offset,
            end_offset,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.hertz, config.start_offset, config.end_offset)
    }

    /// Compute the frame schedule for a snippet's timestamps.
    pub fn schedule(&self, timestamps: &[f64]) -> Result<FrameSchedule, PipelineError> {
        let (t0, t1, last) = match timestamps {
            [t0, t1, .., last] => (*t0, *t1, *last),
            [t0, t1] => (*t0, *t1, *t1),
            other => return Err(RecordingError::TooFewTimestamps(other.len()).into()),
        };
        let native_rate = (1.0 / (t1 - t0)).round();
        if !native_rate.is_finite() || native_rate < 1.0 {
            return Err(RecordingError::NonIncreasingTimestamps { index: 1 }.into());
        }

        let output_rate = match self.hertz {
            Some(hz) if hz > 0 => f64::from(hz),
            _ => native_rate,
        };
        let stride = ((native_rate / output_rate).round() as u32).max(1);

        let mut start = t0 + self.start_offset.max(0.0);
        let mut end = last - self.end_offset.max(0.0);
        if start >= end {
            tracing::warn!(
                start_offset = self.start_offset,
                end_offset = self.end_offset,
                duration = last - t0,
                "trim offsets leave no time window, using the full snippet"
            );
            start = t0;
            end = last;
        }

        Ok(FrameSchedule {
            native_rate,
            origin: t0,
            start_frame: ((start - t0) * native_rate).round() as u32,
            end_frame: ((end - t0) * native_rate).round() as u32,
            stride,
        })
    }
}
