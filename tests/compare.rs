// Test intent: end-to-end comparison runs, stage ordering and summary reporting.
use fftcheck::compare::{run_comparison, run_default_comparison, Comparison, Stage};
use fftcheck::config::HarnessConfig;
use fftcheck::cycles::SimulatedCycleCounter;
use fftcheck::radix2::ReferenceFft;
use fftcheck::rfft::{HalfLengthRealFft, OptimizedFft, PackedRealFft};
use fftcheck::signal::{SampleSource, SliceSource, ToneGenerator};
use fftcheck::{HarnessError, MagnitudeSpectrum, SampleSequence, SpectrumTransform};

/// Charges `cost` cycles to the kernel and a large cost to staging and reduction.
struct Costly<'a, T> {
    inner: T,
    counter: &'a SimulatedCycleCounter,
    cost: u32,
}

impl<T: SpectrumTransform> SpectrumTransform for Costly<'_, T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        self.inner.prepare(len)
    }

    fn load(&mut self, samples: &SampleSequence) -> Result<(), HarnessError> {
        self.counter.advance(1_000_000);
        self.inner.load(samples)
    }

    fn execute(&mut self) -> Result<(), HarnessError> {
        self.counter.advance(self.cost);
        self.inner.execute()
    }

    fn magnitudes(&self) -> Result<MagnitudeSpectrum, HarnessError> {
        self.counter.advance(1_000_000);
        self.inner.magnitudes()
    }
}

#[test]
fn default_comparison_passes() {
    let summary = run_default_comparison(SimulatedCycleCounter::new(1)).unwrap();
    assert!(summary.report.is_match(), "{}", summary.report);
    assert_eq!(summary.report.compared, 512);
    assert!(summary.report.max_abs_diff <= 1.0);
    assert_eq!(summary.fft_len, 1024);
    assert_eq!(summary.reference.label, "reference radix-2");
    assert_eq!(summary.baseline.label, "no-op baseline");
}

#[cfg(feature = "realfft")]
#[test]
fn default_comparison_uses_independent_backend() {
    let summary = run_default_comparison(SimulatedCycleCounter::new(1)).unwrap();
    assert_eq!(summary.optimized.label, "realfft packed rfft");
}

#[cfg(not(feature = "realfft"))]
#[test]
fn default_comparison_falls_back_to_half_length() {
    let summary = run_default_comparison(SimulatedCycleCounter::new(1)).unwrap();
    assert_eq!(summary.optimized.label, "half-length packed rfft");
}

#[test]
fn half_length_backend_passes() {
    let summary = run_comparison(
        HarnessConfig::default(),
        SimulatedCycleCounter::new(1),
        HalfLengthRealFft::new(),
    )
    .unwrap();
    assert!(summary.report.is_match(), "{}", summary.report);
    assert_eq!(summary.optimized.label, "half-length packed rfft");
}

#[test]
fn tones_dominate_their_bins() {
    let summary = run_default_comparison(SimulatedCycleCounter::new(1)).unwrap();
    for spectrum in [&summary.reference_spectrum, &summary.optimized_spectrum] {
        let bins = spectrum.as_slice();
        assert_eq!(spectrum.peak_bin(1), Some(5));
        assert!(bins[5] > 5.0 * bins[4] && bins[5] > 5.0 * bins[6]);
        let upper = (10..512).max_by(|&a, &b| bins[a].total_cmp(&bins[b])).unwrap();
        assert_eq!(upper, 26);
    }
    let idx: Vec<usize> = summary.report.key_bins.iter().map(|k| k.index).collect();
    assert_eq!(idx, [0, 5, 26]);
}

#[test]
fn dc_bin_is_sample_sum() {
    let config = HarnessConfig::default();
    let sum = ToneGenerator::from_config(&config)
        .unwrap()
        .acquire(config.fft_len)
        .unwrap()
        .sum() as f32;
    let summary = run_default_comparison(SimulatedCycleCounter::new(1)).unwrap();
    let dc = summary.report.key_bin("DC (0 Hz)").unwrap();
    assert!((dc.value_a - sum).abs() < 0.5);
    assert!((dc.value_b - sum).abs() < 0.5);
}

#[test]
fn all_zero_capture_matches_exactly() {
    let zeros = vec![0u16; 1024];
    let counter = SimulatedCycleCounter::new(1);
    let summary = Comparison::new(HarnessConfig::default(), &counter)
        .unwrap()
        .run(
            &mut SliceSource::new(&zeros),
            &mut ReferenceFft::new(),
            &mut OptimizedFft::new(HalfLengthRealFft::new()),
        )
        .unwrap();
    assert!(summary.report.is_match());
    assert_eq!(summary.report.max_abs_diff, 0.0);
    assert!(summary.reference_spectrum.as_slice().iter().all(|&m| m == 0.0));
}

#[test]
fn speedup_counts_only_the_kernel() {
    let counter = SimulatedCycleCounter::new(0);
    let summary = Comparison::new(HarnessConfig::default(), &counter)
        .unwrap()
        .run(
            &mut ToneGenerator::from_config(&HarnessConfig::default()).unwrap(),
            &mut Costly {
                inner: ReferenceFft::new(),
                counter: &counter,
                cost: 9_000,
            },
            &mut Costly {
                inner: OptimizedFft::new(HalfLengthRealFft::new()),
                counter: &counter,
                cost: 3_000,
            },
        )
        .unwrap();
    assert_eq!(summary.reference.cycles, 9_000);
    assert_eq!(summary.optimized.cycles, 3_000);
    assert_eq!(summary.baseline.cycles, 0);
    assert_eq!(summary.speedup(), Some(3.0));

    let text = summary.to_string();
    assert!(text.contains("speedup A/B: 3.00x"));
    assert!(text.contains("[PASS]"));
    assert!(text.contains("5 kHz"));
}

#[test]
fn steps_must_run_in_order() {
    let counter = SimulatedCycleCounter::new(1);
    let mut cmp = Comparison::new(HarnessConfig::default(), &counter).unwrap();
    assert_eq!(cmp.stage(), Stage::Idle);
    assert_eq!(cmp.verify().unwrap_err(), HarnessError::InvalidState);
    assert_eq!(
        cmp.run_reference(&mut ReferenceFft::new()).unwrap_err(),
        HarnessError::InvalidState
    );

    let short = vec![0u16; 16];
    assert_eq!(
        cmp.generate(&mut SliceSource::new(&short)).unwrap_err(),
        HarnessError::MismatchedLengths
    );
    assert_eq!(cmp.stage(), Stage::Idle);

    let mut source = ToneGenerator::from_config(cmp.config()).unwrap();
    assert_eq!(cmp.generate(&mut source).unwrap().len(), 1024);
    assert_eq!(cmp.stage(), Stage::Generated);

    let mut optimized = OptimizedFft::new(HalfLengthRealFft::new());
    assert_eq!(
        cmp.run_optimized(&mut optimized).unwrap_err(),
        HarnessError::InvalidState
    );
    cmp.run_reference(&mut ReferenceFft::new()).unwrap();
    assert_eq!(cmp.stage(), Stage::TransformedA);
    cmp.run_optimized(&mut optimized).unwrap();
    assert_eq!(cmp.stage(), Stage::TransformedB);
    assert_eq!(cmp.finish().unwrap_err(), HarnessError::InvalidState);
    assert!(cmp.verify().unwrap().is_match());
    assert_eq!(cmp.stage(), Stage::Verified);
    let summary = cmp.finish().unwrap();
    assert_eq!(cmp.stage(), Stage::Done);
    assert!(summary.report.is_match());
    assert_eq!(
        cmp.generate(&mut source).unwrap_err(),
        HarnessError::InvalidState
    );
}

struct BrokenBackend;

impl PackedRealFft for BrokenBackend {
    fn name(&self) -> &str {
        "broken"
    }

    fn transform(&mut self, _input: &[f32], _packed: &mut [f32]) -> Result<(), HarnessError> {
        Err(HarnessError::InvalidState)
    }
}

#[test]
fn failing_optimized_transform_aborts_the_run() {
    let err = run_comparison(
        HarnessConfig::default(),
        SimulatedCycleCounter::new(1),
        BrokenBackend,
    )
    .unwrap_err();
    assert_eq!(err, HarnessError::TransformFailed);
}

#[test]
fn rejects_invalid_configuration() {
    let config = HarnessConfig::default().with_fft_len(1000);
    assert!(matches!(
        Comparison::new(config, SimulatedCycleCounter::new(1)),
        Err(HarnessError::NonPowerOfTwo)
    ));
}

#[cfg(feature = "realfft")]
#[test]
fn realfft_backend_passes() {
    use fftcheck::vendor::RealFftBackend;

    let summary = run_comparison(
        HarnessConfig::default(),
        SimulatedCycleCounter::new(1),
        RealFftBackend::new(),
    )
    .unwrap();
    assert!(summary.report.is_match(), "{}", summary.report);
    assert_eq!(summary.optimized.label, "realfft packed rfft");
}

#[test]
fn larger_transform_passes() {
    let config = HarnessConfig::default().with_fft_len(4096);
    let summary = run_comparison(config, SimulatedCycleCounter::new(1), HalfLengthRealFft::new()).unwrap();
    assert!(summary.report.is_match(), "{}", summary.report);
    assert_eq!(summary.report.key_bins[1].index, 20);
    assert_eq!(summary.report.key_bins[2].index, 102);
}
