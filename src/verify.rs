//! Bin-by-bin comparison of two magnitude spectra.
//!
//! The tolerance is an absolute magnitude difference. A bin mismatches when
//! `|a - b| > tolerance`. A NaN difference is recorded as infinite, so it
//! always mismatches and dominates the maximum. Mismatches are reported,
//! never raised.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::config::{HarnessConfig, MAX_REPORTED_MISMATCHES};
use crate::error::HarnessError;
use crate::spectrum::MagnitudeSpectrum;

/// One bin outside tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub value_a: f32,
    pub value_b: f32,
    pub difference: f32,
}

/// A named bin compared regardless of tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyBin {
    pub label: String,
    pub frequency_hz: f32,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyBinComparison {
    pub label: String,
    pub index: usize,
    pub frequency_hz: f32,
    pub value_a: f32,
    pub value_b: f32,
    /// Signed `value_a - value_b`.
    pub difference: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Warn,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Warn => write!(f, "WARN"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiscrepancyReport {
    pub compared: usize,
    pub mismatch_count: usize,
    pub max_abs_diff: f32,
    pub tolerance: f32,
    /// First mismatches in ascending bin order, capped.
    pub mismatches: Vec<Mismatch>,
    pub key_bins: Vec<KeyBinComparison>,
}

impl DiscrepancyReport {
    pub fn is_match(&self) -> bool {
        self.mismatch_count == 0
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_match() {
            Verdict::Pass
        } else {
            Verdict::Warn
        }
    }

    pub fn key_bin(&self, label: &str) -> Option<&KeyBinComparison> {
        self.key_bins.iter().find(|k| k.label == label)
    }
}

impl fmt::Display for DiscrepancyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.mismatches {
            writeln!(
                f,
                "[DIFF] bin {:4}: A={:.2} B={:.2} diff={:.2}",
                m.index, m.value_a, m.value_b, m.difference
            )?;
        }
        writeln!(f, "bins compared: {}", self.compared)?;
        writeln!(
            f,
            "bins over tolerance {:.1}: {}",
            self.tolerance, self.mismatch_count
        )?;
        writeln!(f, "max difference: {:.2}", self.max_abs_diff)?;
        match self.verdict() {
            Verdict::Pass => writeln!(f, "[PASS] spectra match within {:.1}", self.tolerance)?,
            Verdict::Warn => writeln!(
                f,
                "[WARN] {} bins differ by more than {:.1}",
                self.mismatch_count, self.tolerance
            )?,
        }
        writeln!(f, "bin    frequency          A            B         diff")?;
        for k in &self.key_bins {
            writeln!(
                f,
                "{:5}  {:<10} {:>12.1} {:>12.1} {:>12.1}",
                k.index, k.label, k.value_a, k.value_b, k.difference
            )?;
        }
        Ok(())
    }
}

/// Compares two spectra against a fixed absolute tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralVerifier {
    tolerance: f32,
    max_reported: usize,
    key_bins: Vec<KeyBin>,
}

impl SpectralVerifier {
    pub fn new(tolerance: f32) -> Result<Self, HarnessError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(HarnessError::InvalidValue);
        }
        Ok(Self {
            tolerance,
            max_reported: MAX_REPORTED_MISMATCHES,
            key_bins: Vec::new(),
        })
    }

    /// Tolerance from `config` with key bins at DC and both tones.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let mut verifier = Self::new(config.tolerance)?;
        verifier.max_reported = config.max_reported_mismatches;
        verifier = verifier.with_key_bin("DC (0 Hz)", 0.0, 0);
        for tone in &config.tones {
            verifier = verifier.with_key_bin(
                frequency_label(tone.freq_hz),
                tone.freq_hz,
                config.bin_for(tone.freq_hz),
            );
        }
        Ok(verifier)
    }

    pub fn with_key_bin(mut self, label: impl Into<String>, frequency_hz: f32, index: usize) -> Self {
        self.key_bins.push(KeyBin {
            label: label.into(),
            frequency_hz,
            index,
        });
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn key_bins(&self) -> &[KeyBin] {
        &self.key_bins
    }

    pub fn verify(
        &self,
        a: &MagnitudeSpectrum,
        b: &MagnitudeSpectrum,
    ) -> Result<DiscrepancyReport, HarnessError> {
        if a.len() != b.len() {
            return Err(HarnessError::MismatchedLengths);
        }
        let (a, b) = (a.as_slice(), b.as_slice());
        if self.key_bins.iter().any(|k| k.index >= a.len()) {
            return Err(HarnessError::InvalidValue);
        }

        let mut mismatch_count = 0usize;
        let mut max_abs_diff = 0.0f32;
        let mut mismatches = Vec::with_capacity(self.max_reported.min(a.len()));
        for (index, (&va, &vb)) in a.iter().zip(b).enumerate() {
            let diff = libm::fabsf(va - vb);
            let diff = if diff.is_nan() { f32::INFINITY } else { diff };
            if diff > max_abs_diff {
                max_abs_diff = diff;
            }
            if diff > self.tolerance {
                mismatch_count += 1;
                if mismatches.len() < self.max_reported {
                    mismatches.push(Mismatch {
                        index,
                        value_a: va,
                        value_b: vb,
                        difference: diff,
                    });
                }
            }
        }

        let key_bins = self
            .key_bins
            .iter()
            .map(|k| KeyBinComparison {
                label: k.label.clone(),
                index: k.index,
                frequency_hz: k.frequency_hz,
                value_a: a[k.index],
                value_b: b[k.index],
                difference: a[k.index] - b[k.index],
            })
            .collect();

        if mismatch_count > 0 {
            log_warn!(
                "{} of {} bins exceed tolerance {} (max diff {})",
                mismatch_count,
                a.len(),
                self.tolerance,
                max_abs_diff
            );
        }
        Ok(DiscrepancyReport {
            compared: a.len(),
            mismatch_count,
            max_abs_diff,
            tolerance: self.tolerance,
            mismatches,
            key_bins,
        })
    }
}

fn frequency_label(freq_hz: f32) -> String {
    if freq_hz >= 1000.0 {
        format!("{} kHz", freq_hz / 1000.0)
    } else {
        format!("{} Hz", freq_hz)
    }
}
