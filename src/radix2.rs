//! Iterative radix-2 decimation-in-time FFT.
//!
//! The input is reordered by [`bit_reverse_permute`] and then combined by
//! `log2(N)` butterfly stages of doubling size in [`fft_in_place`]. Twiddles are
//! evaluated per group rather than tabulated so the transform needs no memory
//! beyond the buffer itself.

use alloc::vec::Vec;
use core::f32::consts::PI;

use crate::error::{check_len, HarnessError};
use crate::num::{Complex32, ComplexSequence};
use crate::signal::SampleSequence;
use crate::spectrum::{MagnitudeSpectrum, SpectrumTransform};

/// Reorder `data` into bit-reversed index order.
///
/// The reversed counterpart `j` of each index is advanced incrementally and
/// pairs are swapped once (`i < j`), so applying the permutation twice restores
/// the original order.
pub fn bit_reverse_permute(data: &mut [Complex32]) -> Result<(), HarnessError> {
    let n = data.len();
    check_len(n)?;
    let mut j = 0usize;
    for i in 1..n.saturating_sub(1) {
        let mut k = n >> 1;
        while j >= k {
            j -= k;
            k >>= 1;
        }
        j += k;
        if i < j {
            data.swap(i, j);
        }
    }
    Ok(())
}

/// Forward DFT of `data` in place, natural-order output.
pub fn fft_in_place(data: &mut [Complex32]) -> Result<(), HarnessError> {
    let n = data.len();
    bit_reverse_permute(data)?;
    let mut half = 1usize;
    while half < n {
        let stage = half << 1;
        for j in 0..half {
            let angle = 2.0 * PI * j as f32 / stage as f32;
            let w = Complex32::new(libm::cosf(angle), -libm::sinf(angle));
            let mut i = j;
            while i < n {
                let odd = i + half;
                let t = w * data[odd];
                data[odd] = data[i] - t;
                data[i] += t;
                i += stage;
            }
        }
        half = stage;
    }
    Ok(())
}

/// Magnitudes of the first `N/2` values of a transformed buffer.
pub fn magnitudes(data: &[Complex32]) -> Result<MagnitudeSpectrum, HarnessError> {
    let n = data.len();
    check_len(n)?;
    let bins: Vec<f32> = data[..n / 2].iter().map(|c| c.norm()).collect();
    MagnitudeSpectrum::new(bins, n)
}

/// Reference transform: in-house radix-2 FFT over a reusable working buffer.
#[derive(Clone, Debug, Default)]
pub struct ReferenceFft {
    buffer: Option<ComplexSequence>,
    executed: bool,
}

impl ReferenceFft {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpectrumTransform for ReferenceFft {
    fn name(&self) -> &str {
        "reference radix-2"
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        check_len(len)?;
        if len < 2 {
            return Err(HarnessError::InvalidValue);
        }
        if self.buffer.as_ref().map(ComplexSequence::len) != Some(len) {
            self.buffer = Some(ComplexSequence::zeroed(len)?);
            self.executed = false;
        }
        Ok(())
    }

    fn load(&mut self, samples: &SampleSequence) -> Result<(), HarnessError> {
        self.prepare(samples.len())?;
        let buffer = self.buffer.as_mut().ok_or(HarnessError::InvalidState)?;
        buffer.load(samples)?;
        self.executed = false;
        Ok(())
    }

    fn execute(&mut self) -> Result<(), HarnessError> {
        let buffer = self.buffer.as_mut().ok_or(HarnessError::InvalidState)?;
        fft_in_place(buffer.as_mut_slice())?;
        self.executed = true;
        Ok(())
    }

    fn magnitudes(&self) -> Result<MagnitudeSpectrum, HarnessError> {
        match &self.buffer {
            Some(buffer) if self.executed => magnitudes(buffer.as_slice()),
            _ => Err(HarnessError::InvalidState),
        }
    }
}
