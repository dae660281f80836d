use alloc::vec::Vec;

use crate::error::HarnessError;
use crate::signal::SampleSequence;

/// One-sided magnitude spectrum: bins `0..N/2`, bin `k` at `k * rate / N` Hz.
#[derive(Clone, Debug, PartialEq)]
pub struct MagnitudeSpectrum {
    bins: Vec<f32>,
    fft_len: usize,
}

impl MagnitudeSpectrum {
    /// Wrap `bins` produced by an `fft_len`-point transform.
    pub fn new(bins: Vec<f32>, fft_len: usize) -> Result<Self, HarnessError> {
        if bins.is_empty() {
            return Err(HarnessError::EmptyInput);
        }
        if bins.len() * 2 != fft_len {
            return Err(HarnessError::MismatchedLengths);
        }
        Ok(Self { bins, fft_len })
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Length of the transform that produced this spectrum.
    pub fn fft_len(&self) -> usize {
        self.fft_len
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.bins
    }

    pub fn get(&self, bin: usize) -> Option<f32> {
        self.bins.get(bin).copied()
    }

    /// Physical frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize, sample_rate_hz: u32) -> f32 {
        bin as f32 * sample_rate_hz as f32 / self.fft_len as f32
    }

    /// Strongest bin at or above `from`, ties resolved to the lowest index.
    pub fn peak_bin(&self, from: usize) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (k, &m) in self.bins.iter().enumerate().skip(from) {
            match best {
                Some((_, b)) if m <= b => {}
                _ => best = Some((k, m)),
            }
        }
        best.map(|(k, _)| k)
    }
}

/// A "samples in, magnitudes out" transform the orchestrator can time.
///
/// A run is split into three steps so only the transform kernel sits inside
/// the measurement window: [`load`](Self::load) stages the samples in the
/// transform's own input format, [`execute`](Self::execute) runs the kernel,
/// and [`magnitudes`](Self::magnitudes) reduces its output.
pub trait SpectrumTransform {
    /// Short label used in measurements and reports.
    fn name(&self) -> &str;

    /// Allocate buffers and plan for `len` samples ahead of the timed window.
    fn prepare(&mut self, len: usize) -> Result<(), HarnessError>;

    /// Convert `samples` into the working buffer.
    fn load(&mut self, samples: &SampleSequence) -> Result<(), HarnessError>;

    /// Run the transform kernel over the loaded buffer.
    fn execute(&mut self) -> Result<(), HarnessError>;

    /// One-sided magnitudes of the last executed transform.
    ///
    /// Fails with [`HarnessError::InvalidState`] unless `execute` ran after
    /// the most recent `load`.
    fn magnitudes(&self) -> Result<MagnitudeSpectrum, HarnessError>;

    fn spectrum(&mut self, samples: &SampleSequence) -> Result<MagnitudeSpectrum, HarnessError> {
        self.load(samples)?;
        self.execute()?;
        self.magnitudes()
    }
}

impl<T: SpectrumTransform + ?Sized> SpectrumTransform for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        (**self).prepare(len)
    }

    fn load(&mut self, samples: &SampleSequence) -> Result<(), HarnessError> {
        (**self).load(samples)
    }

    fn execute(&mut self) -> Result<(), HarnessError> {
        (**self).execute()
    }

    fn magnitudes(&self) -> Result<MagnitudeSpectrum, HarnessError> {
        (**self).magnitudes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn peak_bin_skips_dc() {
        let s = MagnitudeSpectrum::new(vec![100.0, 1.0, 7.0, 7.0], 8).unwrap();
        assert_eq!(s.peak_bin(0), Some(0));
        assert_eq!(s.peak_bin(1), Some(2));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert_eq!(
            MagnitudeSpectrum::new(vec![0.0; 3], 8),
            Err(HarnessError::MismatchedLengths)
        );
    }

    #[test]
    fn bin_frequency_scales_with_rate() {
        let s = MagnitudeSpectrum::new(vec![0.0; 512], 1024).unwrap();
        assert!((s.bin_frequency(5, 1_000_000) - 4882.8125).abs() < 1e-2);
    }
}
