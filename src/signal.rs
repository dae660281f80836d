use alloc::vec::Vec;
use core::f32::consts::PI;

use crate::config::{HarnessConfig, Tone, ADC_MAX};
use crate::error::{check_len, HarnessError};

/// Ordered, immutable 12-bit samples with a power-of-two length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleSequence {
    samples: Vec<u16>,
}

impl SampleSequence {
    /// Validate length and converter range.
    pub fn new(samples: Vec<u16>) -> Result<Self, HarnessError> {
        check_len(samples.len())?;
        if samples.iter().any(|&s| s > ADC_MAX) {
            return Err(HarnessError::SampleOutOfRange);
        }
        Ok(Self { samples })
    }

    /// All-zero sequence of `len` samples.
    pub fn zeros(len: usize) -> Result<Self, HarnessError> {
        Self::new(alloc::vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.samples
    }

    /// Sum of all samples, i.e. the expected DC magnitude.
    pub fn sum(&self) -> u64 {
        self.samples.iter().map(|&s| u64::from(s)).sum()
    }

    /// Copy into a caller-provided real buffer of the same length.
    pub fn write_f32(&self, out: &mut [f32]) -> Result<(), HarnessError> {
        if out.len() != self.samples.len() {
            return Err(HarnessError::MismatchedLengths);
        }
        for (o, &s) in out.iter_mut().zip(&self.samples) {
            *o = f32::from(s);
        }
        Ok(())
    }
}

/// Anything that can deliver `len` quantized samples.
pub trait SampleSource {
    fn acquire(&mut self, len: usize) -> Result<SampleSequence, HarnessError>;
}

/// Synthetic multi-tone source standing in for a converter channel.
///
/// Each sample is `offset + sum(amplitude * sin(2*pi*f*t))` at `t = i / rate`,
/// clamped to `0..=4095` and truncated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneGenerator {
    sample_rate_hz: u32,
    tones: [Tone; 2],
    offset: f32,
}

impl ToneGenerator {
    pub fn new(sample_rate_hz: u32, tones: [Tone; 2], offset: f32) -> Result<Self, HarnessError> {
        if sample_rate_hz == 0 || !offset.is_finite() {
            return Err(HarnessError::InvalidValue);
        }
        Ok(Self {
            sample_rate_hz,
            tones,
            offset,
        })
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        Self::new(config.sample_rate_hz, config.tones, config.offset)
    }

    /// Value of sample `i` before quantization.
    pub fn sample_at(&self, i: usize) -> f32 {
        let t = i as f32 / self.sample_rate_hz as f32;
        let mut v = self.offset;
        for tone in &self.tones {
            v += tone.amplitude * libm::sinf(2.0 * PI * tone.freq_hz * t);
        }
        v
    }

    /// Clamp to the converter range, then truncate.
    fn quantize(v: f32) -> u16 {
        let max = f32::from(ADC_MAX);
        let clamped = if v < 0.0 {
            0.0
        } else if v > max {
            max
        } else {
            v
        };
        clamped as u16
    }
}

impl SampleSource for ToneGenerator {
    fn acquire(&mut self, len: usize) -> Result<SampleSequence, HarnessError> {
        check_len(len)?;
        let samples = (0..len).map(|i| Self::quantize(self.sample_at(i))).collect();
        log_debug!(
            "generated {} samples at {} Hz ({} tones)",
            len,
            self.sample_rate_hz,
            self.tones.len()
        );
        SampleSequence::new(samples)
    }
}

/// Replays a fixed slice of samples, e.g. a captured converter buffer.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'a> {
    samples: &'a [u16],
}

impl<'a> SliceSource<'a> {
    pub fn new(samples: &'a [u16]) -> Self {
        Self { samples }
    }
}

impl SampleSource for SliceSource<'_> {
    fn acquire(&mut self, len: usize) -> Result<SampleSequence, HarnessError> {
        if self.samples.len() != len {
            return Err(HarnessError::MismatchedLengths);
        }
        SampleSequence::new(self.samples.to_vec())
    }
}
