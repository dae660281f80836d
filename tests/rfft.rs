// Test intent: the half-length packed real FFT agrees with the reference transform and the adapter normalizes it.
use fftcheck::num::{Complex32, ComplexSequence};
use fftcheck::radix2::{fft_in_place, ReferenceFft};
use fftcheck::rfft::{pack_spectrum, unpack_magnitudes, HalfLengthRealFft, OptimizedFft, PackedRealFft, MAX_CACHE_ENTRIES};
use fftcheck::{HarnessError, SampleSequence, SpectrumTransform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_samples(n: usize, seed: u64) -> Vec<u16> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..=4095)).collect()
}

fn reference_bins(samples: &[u16]) -> Vec<Complex32> {
    let seq = SampleSequence::new(samples.to_vec()).unwrap();
    let mut buf = ComplexSequence::from_samples(&seq);
    fft_in_place(buf.as_mut_slice()).unwrap();
    buf.as_slice().to_vec()
}

#[test]
fn packed_layout_matches_reference_bins() {
    for (i, &n) in [2usize, 4, 8, 64, 256, 1024].iter().enumerate() {
        let samples = random_samples(n, i as u64);
        let input: Vec<f32> = samples.iter().map(|&s| f32::from(s)).collect();
        let mut packed = vec![0.0f32; n];
        HalfLengthRealFft::new().transform(&input, &mut packed).unwrap();

        let x = reference_bins(&samples);
        let tol = 1.0;
        assert!((packed[0] - x[0].re).abs() < tol, "n={n} dc");
        assert!((packed[1] - x[n / 2].re).abs() < tol, "n={n} nyquist");
        for k in 1..n / 2 {
            assert!((packed[2 * k] - x[k].re).abs() < tol, "n={n} re[{k}]");
            assert!((packed[2 * k + 1] - x[k].im).abs() < tol, "n={n} im[{k}]");
        }
    }
}

#[test]
fn adapter_matches_reference_magnitudes() {
    let seq = SampleSequence::new(random_samples(512, 7)).unwrap();
    let a = ReferenceFft::new().spectrum(&seq).unwrap();
    let b = OptimizedFft::new(HalfLengthRealFft::new()).spectrum(&seq).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert!((x - y).abs() <= 1.0, "{x} vs {y}");
    }
}

#[test]
fn twiddle_cache_is_bounded() {
    let mut fft = HalfLengthRealFft::new();
    fft.prepare(64).unwrap();
    fft.prepare(64).unwrap();
    assert_eq!(fft.cache_len(), 1);
    for shift in 1..=20 {
        fft.prepare(1 << shift).unwrap();
        assert!(fft.cache_len() <= MAX_CACHE_ENTRIES);
    }
}

#[test]
fn adapter_keeps_packed_output() {
    let seq = SampleSequence::new(vec![1, 1, 1, 1]).unwrap();
    let mut fft = OptimizedFft::new(HalfLengthRealFft::new());
    let spectrum = fft.spectrum(&seq).unwrap();
    assert_eq!(fft.packed(), &[4.0, 0.0, 0.0, 0.0]);
    assert_eq!(spectrum.as_slice(), &[4.0, 0.0]);
    assert_eq!(fft.name(), "half-length packed rfft");
}

#[test]
fn pack_spectrum_orders_dc_and_nyquist_first() {
    let mut packed = [0.0f32; 8];
    pack_spectrum(&mut packed, |k| Complex32::new(k as f32 * 10.0, k as f32)).unwrap();
    assert_eq!(packed, [0.0, 40.0, 10.0, 1.0, 20.0, 2.0, 30.0, 3.0]);
    let m = unpack_magnitudes(&packed).unwrap();
    assert_eq!(m.len(), 4);
    assert_eq!(m.fft_len(), 8);
}

#[derive(Default)]
struct FailingFft {
    calls: usize,
}

impl PackedRealFft for FailingFft {
    fn name(&self) -> &str {
        "failing"
    }

    fn transform(&mut self, _input: &[f32], _packed: &mut [f32]) -> Result<(), HarnessError> {
        self.calls += 1;
        Err(HarnessError::InvalidValue)
    }
}

#[test]
fn backend_failure_is_reported_as_transform_failure() {
    let seq = SampleSequence::zeros(16).unwrap();
    let mut backend = FailingFft::default();
    let mut fft = OptimizedFft::new(&mut backend);
    assert_eq!(fft.spectrum(&seq), Err(HarnessError::TransformFailed));
    drop(fft);
    assert_eq!(backend.calls, 1);
}

#[test]
fn rejects_unsupported_lengths() {
    let mut fft = OptimizedFft::new(HalfLengthRealFft::new());
    assert_eq!(fft.prepare(1), Err(HarnessError::InvalidValue));
    assert_eq!(fft.prepare(24), Err(HarnessError::NonPowerOfTwo));
    assert_eq!(unpack_magnitudes(&[]).unwrap_err(), HarnessError::EmptyInput);
}

#[test]
fn staged_steps_match_one_shot_spectrum() {
    let seq = SampleSequence::new(random_samples(64, 3)).unwrap();
    let mut fft = OptimizedFft::new(HalfLengthRealFft::new());
    assert_eq!(fft.execute(), Err(HarnessError::InvalidState));
    fft.load(&seq).unwrap();
    assert_eq!(fft.magnitudes(), Err(HarnessError::InvalidState));
    fft.execute().unwrap();
    let staged = fft.magnitudes().unwrap();
    assert_eq!(staged, fft.spectrum(&seq).unwrap());
}
