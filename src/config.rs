//! Named hardware and signal constants plus the [`HarnessConfig`] that carries them.
//!
//! Defaults reproduce the reference board: a 200 MHz core, a 12-bit converter
//! sampled at 1 MS/s, and a 1024-point two-tone test signal.

use crate::error::{check_len, HarnessError};

/// Default transform length.
pub const DEFAULT_FFT_LEN: usize = 1024;

/// Default sample rate in samples per second.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 1_000_000;

/// Default core clock used to turn cycles into wall-clock time.
pub const DEFAULT_CORE_CLOCK_HZ: u32 = 200_000_000;

/// Default absolute magnitude tolerance for bin comparisons.
pub const DEFAULT_TOLERANCE: f32 = 1.0;

/// Largest value a 12-bit converter produces.
pub const ADC_MAX: u16 = 4095;

/// Mid-scale bias applied to the synthetic waveform.
pub const DEFAULT_OFFSET: f32 = 2047.5;

/// Number of mismatching bins itemized in a report.
pub const MAX_REPORTED_MISMATCHES: usize = 10;

/// Default primary tone.
pub const DEFAULT_TONE_1: Tone = Tone::new(5_000.0, 1_000.0);

/// Default secondary tone.
pub const DEFAULT_TONE_2: Tone = Tone::new(25_000.0, 500.0);

/// Environment variable overriding [`HarnessConfig::fft_len`].
pub const ENV_FFT_LEN: &str = "FFTCHECK_FFT_LEN";
/// Environment variable overriding [`HarnessConfig::sample_rate_hz`].
pub const ENV_SAMPLE_RATE_HZ: &str = "FFTCHECK_SAMPLE_RATE_HZ";
/// Environment variable overriding [`HarnessConfig::core_clock_hz`].
pub const ENV_CORE_CLOCK_HZ: &str = "FFTCHECK_CORE_CLOCK_HZ";
/// Environment variable overriding [`HarnessConfig::tolerance`].
pub const ENV_TOLERANCE: &str = "FFTCHECK_TOLERANCE";

/// A sinusoidal component of the synthetic signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub freq_hz: f32,
    pub amplitude: f32,
}

impl Tone {
    pub const fn new(freq_hz: f32, amplitude: f32) -> Self {
        Self { freq_hz, amplitude }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarnessConfig {
    /// Number of samples per comparison; must be a power of two.
    pub fft_len: usize,
    /// Rate of the synthetic converter; bin `k` sits at `k * rate / fft_len` Hz.
    pub sample_rate_hz: u32,
    /// Core frequency of the cycle counter.
    pub core_clock_hz: u32,
    /// The two sinusoids summed into the test signal.
    pub tones: [Tone; 2],
    /// DC level added before quantization, in converter counts.
    pub offset: f32,
    /// Absolute tolerance in magnitude units. Not relative to signal scale.
    pub tolerance: f32,
    /// Cap on itemized mismatches in a report; at least 1. Caps above the
    /// bin count itemize every mismatch.
    pub max_reported_mismatches: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fft_len: DEFAULT_FFT_LEN,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            core_clock_hz: DEFAULT_CORE_CLOCK_HZ,
            tones: [DEFAULT_TONE_1, DEFAULT_TONE_2],
            offset: DEFAULT_OFFSET,
            tolerance: DEFAULT_TOLERANCE,
            max_reported_mismatches: MAX_REPORTED_MISMATCHES,
        }
    }
}

impl HarnessConfig {
    /// Override the transform length. Checked by [`HarnessConfig::validate`].
    pub fn with_fft_len(mut self, fft_len: usize) -> Self {
        self.fft_len = fft_len;
        self
    }

    /// Override the sample rate; tone bins move with it.
    pub fn with_sample_rate(mut self, sample_rate_hz: u32) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Override the clock used to convert cycles to milliseconds.
    pub fn with_core_clock(mut self, core_clock_hz: u32) -> Self {
        self.core_clock_hz = core_clock_hz;
        self
    }

    /// Replace both tones.
    pub fn with_tones(mut self, tones: [Tone; 2]) -> Self {
        self.tones = tones;
        self
    }

    /// Override the DC offset. Samples pushed outside `0..=4095` are clamped.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Override the absolute magnitude tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Override how many mismatches a report itemizes.
    pub fn with_max_reported_mismatches(mut self, max: usize) -> Self {
        self.max_reported_mismatches = max;
        self
    }

    /// Bin nearest to `freq_hz`: `round(freq_hz * fft_len / sample_rate_hz)`.
    pub fn bin_for(&self, freq_hz: f32) -> usize {
        let bin = freq_hz * self.fft_len as f32 / self.sample_rate_hz as f32;
        libm::roundf(bin) as usize
    }

    /// Reject configurations the harness cannot run with.
    pub fn validate(&self) -> Result<(), HarnessError> {
        check_len(self.fft_len)?;
        if self.fft_len < 2 {
            return Err(HarnessError::InvalidValue);
        }
        if self.sample_rate_hz == 0 || self.core_clock_hz == 0 {
            return Err(HarnessError::InvalidValue);
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 || !self.offset.is_finite() {
            return Err(HarnessError::InvalidValue);
        }
        let bins = self.fft_len / 2;
        if self.max_reported_mismatches == 0 {
            return Err(HarnessError::InvalidValue);
        }
        for tone in &self.tones {
            if !tone.freq_hz.is_finite() || tone.freq_hz < 0.0 || !tone.amplitude.is_finite() {
                return Err(HarnessError::InvalidValue);
            }
            if self.bin_for(tone.freq_hz) >= bins {
                return Err(HarnessError::InvalidValue);
            }
        }
        Ok(())
    }

    /// Build a configuration from the process environment, starting from the
    /// defaults. Unset variables keep their default; unparsable ones are rejected.
    #[cfg(feature = "std")]
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HarnessConfig::from_env`] with an injected variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<alloc::string::String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_FFT_LEN) {
            cfg.fft_len = parse(&v)?;
        }
        if let Some(v) = lookup(ENV_SAMPLE_RATE_HZ) {
            cfg.sample_rate_hz = parse(&v)?;
        }
        if let Some(v) = lookup(ENV_CORE_CLOCK_HZ) {
            cfg.core_clock_hz = parse(&v)?;
        }
        if let Some(v) = lookup(ENV_TOLERANCE) {
            cfg.tolerance = parse(&v)?;
        }
        cfg.validate()?;
        log_debug!("harness config: {:?}", cfg);
        Ok(cfg)
    }
}

fn parse<T: core::str::FromStr>(raw: &str) -> Result<T, HarnessError> {
    raw.trim().parse::<T>().map_err(|_| HarnessError::InvalidValue)
}
