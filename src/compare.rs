//! Linear comparison pipeline.
//!
//! ```text
//! Idle -> Generated -> TransformedA -> TransformedB -> Verified -> Done
//! ```
//!
//! Transform A is the reference, B the optimized one. Each step checks the
//! current [`Stage`] and fails with [`HarnessError::InvalidState`] when invoked
//! out of order; there are no retries and no way back to an earlier stage.

use alloc::string::String;
use core::fmt;

use crate::config::HarnessConfig;
use crate::cycles::{CycleBenchmark, CycleCounter, CycleMeasurement};
use crate::error::HarnessError;
use crate::radix2::ReferenceFft;
#[cfg(not(feature = "realfft"))]
use crate::rfft::HalfLengthRealFft;
use crate::rfft::{OptimizedFft, PackedRealFft};
use crate::signal::{SampleSequence, SampleSource, ToneGenerator};
use crate::spectrum::{MagnitudeSpectrum, SpectrumTransform};
#[cfg(feature = "realfft")]
use crate::vendor::RealFftBackend;
use crate::verify::{DiscrepancyReport, SpectralVerifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Generated,
    TransformedA,
    TransformedB,
    Verified,
    Done,
}

/// Everything one comparison cycle produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonSummary {
    pub fft_len: usize,
    pub sample_rate_hz: u32,
    pub core_clock_hz: u32,
    /// Counter overhead of an empty operation.
    pub baseline: CycleMeasurement,
    pub reference: CycleMeasurement,
    pub optimized: CycleMeasurement,
    pub reference_spectrum: MagnitudeSpectrum,
    pub optimized_spectrum: MagnitudeSpectrum,
    pub report: DiscrepancyReport,
}

impl ComparisonSummary {
    /// Reference cycles divided by optimized cycles.
    ///
    /// Both counts cover the transform kernel alone; sample conversion and
    /// the magnitude pass are outside the measured window on either side.
    pub fn speedup(&self) -> Option<f64> {
        if self.optimized.cycles == 0 {
            return None;
        }
        Some(f64::from(self.reference.cycles) / f64::from(self.optimized.cycles))
    }
}

impl fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== FFT comparison: {} points @ {} Hz, core {} Hz ===",
            self.fft_len, self.sample_rate_hz, self.core_clock_hz
        )?;
        writeln!(f, "A {}", self.reference)?;
        writeln!(f, "B {}", self.optimized)?;
        writeln!(f, "  {}", self.baseline)?;
        if let Some(s) = self.speedup() {
            writeln!(f, "speedup A/B: {:.2}x", s)?;
        }
        writeln!(f, "--- verification ---")?;
        write!(f, "{}", self.report)
    }
}

/// One comparison cycle: owns the config, the benchmark and every intermediate result.
pub struct Comparison<C> {
    config: HarnessConfig,
    bench: CycleBenchmark<C>,
    verifier: SpectralVerifier,
    stage: Stage,
    samples: Option<SampleSequence>,
    baseline: Option<CycleMeasurement>,
    reference: Option<(MagnitudeSpectrum, CycleMeasurement)>,
    optimized: Option<(MagnitudeSpectrum, CycleMeasurement)>,
    report: Option<DiscrepancyReport>,
}

impl<C: CycleCounter> Comparison<C> {
    /// Validate `config` and initialize the cycle counter.
    pub fn new(config: HarnessConfig, counter: C) -> Result<Self, HarnessError> {
        config.validate()?;
        let bench = CycleBenchmark::new(counter, config.core_clock_hz)?;
        let verifier = SpectralVerifier::from_config(&config)?;
        Ok(Self {
            config,
            bench,
            verifier,
            stage: Stage::Idle,
            samples: None,
            baseline: None,
            reference: None,
            optimized: None,
            report: None,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn require(&self, stage: Stage) -> Result<(), HarnessError> {
        if self.stage != stage {
            log_warn!("expected stage {:?}, comparison is at {:?}", stage, self.stage);
            return Err(HarnessError::InvalidState);
        }
        Ok(())
    }

    fn enter(&mut self, stage: Stage) {
        log_info!("comparison stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Acquire `fft_len` samples and record the no-op baseline.
    pub fn generate<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<&SampleSequence, HarnessError> {
        self.require(Stage::Idle)?;
        let samples = source.acquire(self.config.fft_len)?;
        if samples.len() != self.config.fft_len {
            return Err(HarnessError::MismatchedLengths);
        }
        self.baseline = Some(self.bench.measure_noop("no-op baseline"));
        self.enter(Stage::Generated);
        Ok(self.samples.insert(samples))
    }

    /// Time transform A.
    pub fn run_reference<T: SpectrumTransform + ?Sized>(
        &mut self,
        transform: &mut T,
    ) -> Result<&CycleMeasurement, HarnessError> {
        self.require(Stage::Generated)?;
        let result = self.timed(transform)?;
        self.enter(Stage::TransformedA);
        Ok(&self.reference.insert(result).1)
    }

    /// Time transform B.
    pub fn run_optimized<T: SpectrumTransform + ?Sized>(
        &mut self,
        transform: &mut T,
    ) -> Result<&CycleMeasurement, HarnessError> {
        self.require(Stage::TransformedA)?;
        let result = self.timed(transform)?;
        self.enter(Stage::TransformedB);
        Ok(&self.optimized.insert(result).1)
    }

    /// Plan and load outside the window, time only `execute`, reduce afterwards.
    fn timed<T: SpectrumTransform + ?Sized>(
        &mut self,
        transform: &mut T,
    ) -> Result<(MagnitudeSpectrum, CycleMeasurement), HarnessError> {
        let samples = self.samples.as_ref().ok_or(HarnessError::InvalidState)?;
        transform.prepare(samples.len())?;
        transform.load(samples)?;
        let label = String::from(transform.name());
        let (executed, measurement) = self.bench.measure(&label, || transform.execute());
        executed?;
        Ok((transform.magnitudes()?, measurement))
    }

    /// Compare spectrum A against spectrum B.
    pub fn verify(&mut self) -> Result<&DiscrepancyReport, HarnessError> {
        self.require(Stage::TransformedB)?;
        let (a, _) = self.reference.as_ref().ok_or(HarnessError::InvalidState)?;
        let (b, _) = self.optimized.as_ref().ok_or(HarnessError::InvalidState)?;
        let report = self.verifier.verify(a, b)?;
        self.enter(Stage::Verified);
        Ok(self.report.insert(report))
    }

    /// Hand every result of the cycle to the caller.
    pub fn finish(&mut self) -> Result<ComparisonSummary, HarnessError> {
        self.require(Stage::Verified)?;
        let baseline = self.baseline.take().ok_or(HarnessError::InvalidState)?;
        let (reference_spectrum, reference) =
            self.reference.take().ok_or(HarnessError::InvalidState)?;
        let (optimized_spectrum, optimized) =
            self.optimized.take().ok_or(HarnessError::InvalidState)?;
        let report = self.report.take().ok_or(HarnessError::InvalidState)?;
        self.samples = None;
        self.enter(Stage::Done);
        Ok(ComparisonSummary {
            fft_len: self.config.fft_len,
            sample_rate_hz: self.config.sample_rate_hz,
            core_clock_hz: self.config.core_clock_hz,
            baseline,
            reference,
            optimized,
            reference_spectrum,
            optimized_spectrum,
            report,
        })
    }

    /// Run every step in order.
    pub fn run<S, A, B>(
        mut self,
        source: &mut S,
        reference: &mut A,
        optimized: &mut B,
    ) -> Result<ComparisonSummary, HarnessError>
    where
        S: SampleSource + ?Sized,
        A: SpectrumTransform + ?Sized,
        B: SpectrumTransform + ?Sized,
    {
        self.generate(source)?;
        self.run_reference(reference)?;
        self.run_optimized(optimized)?;
        self.verify()?;
        self.finish()
    }
}

/// Default signal, reference radix-2 against the `realfft` packed backend.
#[cfg(feature = "realfft")]
pub fn run_default_comparison<C: CycleCounter>(
    counter: C,
) -> Result<ComparisonSummary, HarnessError> {
    run_comparison(HarnessConfig::default(), counter, RealFftBackend::new())
}

/// Default signal, reference radix-2 against the built-in half-length packed FFT.
///
/// The half-length backend reuses the radix-2 butterflies, so this fallback
/// only checks the packing and split stages independently.
#[cfg(not(feature = "realfft"))]
pub fn run_default_comparison<C: CycleCounter>(
    counter: C,
) -> Result<ComparisonSummary, HarnessError> {
    run_comparison(HarnessConfig::default(), counter, HalfLengthRealFft::new())
}

/// Compare the reference transform against `backend` on the configured signal.
pub fn run_comparison<C, F>(
    config: HarnessConfig,
    counter: C,
    backend: F,
) -> Result<ComparisonSummary, HarnessError>
where
    C: CycleCounter,
    F: PackedRealFft,
{
    let mut source = ToneGenerator::from_config(&config)?;
    let mut reference = ReferenceFft::new();
    let mut optimized = OptimizedFft::new(backend);
    Comparison::new(config, counter)?.run(&mut source, &mut reference, &mut optimized)
}
