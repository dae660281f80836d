//! Packed real-input FFTs and the adapter that turns them into magnitude spectra.
//!
//! A [`PackedRealFft`] maps `N` real samples to `N` floats laid out as
//!
//! ```text
//! [X0.re, X(N/2).re, X1.re, X1.im, X2.re, X2.im, ..., X(N/2-1).re, X(N/2-1).im]
//! ```
//!
//! which is the layout produced by vendor DSP libraries such as CMSIS-DSP's
//! `arm_rfft_fast_f32`. DC and Nyquist are purely real for real input, so they
//! share the first pair. [`OptimizedFft`] wraps any backend and normalizes the
//! packed output to the same `N/2` magnitudes as [`crate::radix2::ReferenceFft`].

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::f32::consts::PI;

use hashbrown::HashMap;

use crate::error::{check_len, HarnessError};
use crate::num::Complex32;
use crate::radix2::fft_in_place;
use crate::signal::SampleSequence;
use crate::spectrum::{MagnitudeSpectrum, SpectrumTransform};

/// Number of real values per complex pair in the packed layout.
pub const STRIDE: usize = 2;

/// Smallest supported packed transform length.
pub const MIN_LEN: usize = STRIDE;

/// Maximum number of cached twiddle tables kept by [`HalfLengthRealFft`].
pub const MAX_CACHE_ENTRIES: usize = 16;

/// Externally supplied real-input FFT producing the packed layout.
pub trait PackedRealFft {
    fn name(&self) -> &str;

    /// Plan for `len`-point transforms. Called before the timed window.
    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        check_packed_len(len)
    }

    /// Transform `input` into `packed`; both have length `N`.
    fn transform(&mut self, input: &[f32], packed: &mut [f32]) -> Result<(), HarnessError>;
}

impl<T: PackedRealFft + ?Sized> PackedRealFft for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        (**self).prepare(len)
    }

    fn transform(&mut self, input: &[f32], packed: &mut [f32]) -> Result<(), HarnessError> {
        (**self).transform(input, packed)
    }
}

pub(crate) fn check_packed_len(len: usize) -> Result<(), HarnessError> {
    check_len(len)?;
    if len < MIN_LEN {
        return Err(HarnessError::InvalidValue);
    }
    Ok(())
}

/// Write DC, Nyquist and bins `1..N/2` into the packed layout.
///
/// `bin(k)` must return `X_k` for `k` in `0..=N/2`.
pub fn pack_spectrum<F>(packed: &mut [f32], mut bin: F) -> Result<(), HarnessError>
where
    F: FnMut(usize) -> Complex32,
{
    let n = packed.len();
    check_packed_len(n)?;
    let m = n / STRIDE;
    packed[0] = bin(0).re;
    packed[1] = bin(m).re;
    for k in 1..m {
        let x = bin(k);
        packed[STRIDE * k] = x.re;
        packed[STRIDE * k + 1] = x.im;
    }
    Ok(())
}

/// Convert a packed spectrum into `N/2` magnitudes.
///
/// Bin 0 is `|DC|`; the Nyquist coefficient has no slot in a one-sided
/// `N/2`-bin spectrum and is dropped.
pub fn unpack_magnitudes(packed: &[f32]) -> Result<MagnitudeSpectrum, HarnessError> {
    let n = packed.len();
    check_packed_len(n)?;
    let m = n / STRIDE;
    let mut bins = Vec::with_capacity(m);
    bins.push(libm::fabsf(packed[0]));
    for k in 1..m {
        bins.push(Complex32::new(packed[STRIDE * k], packed[STRIDE * k + 1]).norm());
    }
    MagnitudeSpectrum::new(bins, n)
}

/// Packed real FFT computed through an `N/2`-point complex FFT.
///
/// Even samples form the real part and odd samples the imaginary part of a
/// half-length sequence `z`. After transforming `z`, each output bin is
/// `X_k = ((Z_k + conj(Z_{m-k})) - i * w_k * (Z_k - conj(Z_{m-k}))) / 2` with
/// `w_k = exp(-2*pi*i*k/N)`.
#[derive(Debug, Default)]
pub struct HalfLengthRealFft {
    /// Split twiddles `w_k` for `k = 0..N/2`, keyed by `N`.
    cache: HashMap<usize, Arc<[Complex32]>>,
    scratch: Vec<Complex32>,
}

impl HalfLengthRealFft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn twiddles(&mut self, n: usize) -> Arc<[Complex32]> {
        if let Some(table) = self.cache.get(&n) {
            return Arc::clone(table);
        }
        if self.cache.len() >= MAX_CACHE_ENTRIES {
            self.cache.clear();
        }
        let m = n / STRIDE;
        let table: Vec<Complex32> = (0..m)
            .map(|k| Complex32::expi(-2.0 * PI * k as f32 / n as f32))
            .collect();
        let table: Arc<[Complex32]> = Arc::from(table);
        log_debug!("cached {} split twiddles for N = {}", m, n);
        self.cache.insert(n, Arc::clone(&table));
        table
    }
}

impl PackedRealFft for HalfLengthRealFft {
    fn name(&self) -> &str {
        "half-length packed rfft"
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        check_packed_len(len)?;
        self.twiddles(len);
        let m = len / STRIDE;
        if self.scratch.len() != m {
            self.scratch = vec![Complex32::zero(); m];
        }
        Ok(())
    }

    fn transform(&mut self, input: &[f32], packed: &mut [f32]) -> Result<(), HarnessError> {
        let n = input.len();
        if packed.len() != n {
            return Err(HarnessError::MismatchedLengths);
        }
        self.prepare(n)?;
        let twiddles = self.twiddles(n);
        let m = n / STRIDE;
        let z = &mut self.scratch;
        for (k, slot) in z.iter_mut().enumerate() {
            *slot = Complex32::new(input[STRIDE * k], input[STRIDE * k + 1]);
        }
        fft_in_place(z)?;
        let z0 = z[0];
        let z = &self.scratch;
        pack_spectrum(packed, |k| {
            if k == 0 {
                Complex32::new(z0.re + z0.im, 0.0)
            } else if k == m {
                Complex32::new(z0.re - z0.im, 0.0)
            } else {
                let a = z[k];
                let b = z[m - k].conj();
                let sum = a + b;
                let t = twiddles[k] * (a - b);
                (sum + Complex32::new(t.im, -t.re)).scale(0.5)
            }
        })
    }
}

/// Adapter exposing a [`PackedRealFft`] as a [`SpectrumTransform`].
///
/// Only the backend call runs in [`SpectrumTransform::execute`]; the `u16` to
/// `f32` conversion and the unpacking happen in `load` and `magnitudes`.
#[derive(Debug, Default)]
pub struct OptimizedFft<F> {
    backend: F,
    input: Vec<f32>,
    packed: Vec<f32>,
    executed: bool,
}

impl<F: PackedRealFft> OptimizedFft<F> {
    pub fn new(backend: F) -> Self {
        Self {
            backend,
            input: Vec::new(),
            packed: Vec::new(),
            executed: false,
        }
    }

    /// Packed output of the most recent transform.
    pub fn packed(&self) -> &[f32] {
        &self.packed
    }
}

impl<F: PackedRealFft> SpectrumTransform for OptimizedFft<F> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        check_packed_len(len)?;
        self.backend.prepare(len).map_err(|err| {
            log_warn!("{} failed to plan {} points: {}", self.backend.name(), len, err);
            HarnessError::TransformFailed
        })?;
        if self.input.len() != len {
            self.input.resize(len, 0.0);
            self.packed.resize(len, 0.0);
            self.executed = false;
        }
        Ok(())
    }

    fn load(&mut self, samples: &SampleSequence) -> Result<(), HarnessError> {
        if self.input.len() != samples.len() {
            self.prepare(samples.len())?;
        }
        samples.write_f32(&mut self.input)?;
        self.executed = false;
        Ok(())
    }

    fn execute(&mut self) -> Result<(), HarnessError> {
        if self.input.is_empty() {
            return Err(HarnessError::InvalidState);
        }
        self.backend
            .transform(&self.input, &mut self.packed)
            .map_err(|err| {
                log_warn!("{} transform failed: {}", self.backend.name(), err);
                HarnessError::TransformFailed
            })?;
        self.executed = true;
        Ok(())
    }

    fn magnitudes(&self) -> Result<MagnitudeSpectrum, HarnessError> {
        if !self.executed {
            return Err(HarnessError::InvalidState);
        }
        unpack_magnitudes(&self.packed)
    }
}
