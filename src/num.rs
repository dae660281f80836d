use alloc::vec;
use alloc::vec::Vec;

use crate::error::{check_len, HarnessError};
use crate::signal::SampleSequence;

/// Single-precision complex value.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

impl Complex32 {
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    pub const fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    /// `exp(i * theta)`.
    #[inline(always)]
    pub fn expi(theta: f32) -> Self {
        let (sin, cos) = libm::sincosf(theta);
        Self { re: cos, im: sin }
    }

    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    #[inline(always)]
    pub fn scale(self, k: f32) -> Self {
        Self {
            re: self.re * k,
            im: self.im * k,
        }
    }

    /// Magnitude `sqrt(re^2 + im^2)`.
    #[inline(always)]
    pub fn norm(self) -> f32 {
        libm::sqrtf(self.re * self.re + self.im * self.im)
    }
}

impl core::ops::Neg for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl core::ops::Add for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
}

impl core::ops::Sub for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
}

impl core::ops::Mul for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Self {
            re: self.re * other.re - self.im * other.im,
            im: self.re * other.im + self.im * other.re,
        }
    }
}

impl core::ops::AddAssign for Complex32 {
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        self.re += other.re;
        self.im += other.im;
    }
}

/// Owned complex working buffer whose length is a power of two for its whole life.
///
/// Elements are reachable only through slices, so transforms may reorder and
/// rewrite them in place but can never resize the buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexSequence {
    data: Vec<Complex32>,
}

impl ComplexSequence {
    /// Zero-filled buffer of `len` elements.
    pub fn zeroed(len: usize) -> Result<Self, HarnessError> {
        check_len(len)?;
        Ok(Self {
            data: vec![Complex32::zero(); len],
        })
    }

    /// Take ownership of `data`, rejecting non-power-of-two lengths.
    pub fn from_vec(data: Vec<Complex32>) -> Result<Self, HarnessError> {
        check_len(data.len())?;
        Ok(Self { data })
    }

    /// Real part from each sample, imaginary part zero.
    pub fn from_samples(samples: &SampleSequence) -> Self {
        let data = samples
            .as_slice()
            .iter()
            .map(|&s| Complex32::new(f32::from(s), 0.0))
            .collect();
        Self { data }
    }

    /// Overwrite the buffer with `samples`, reusing its allocation.
    pub fn load(&mut self, samples: &SampleSequence) -> Result<(), HarnessError> {
        if samples.len() != self.data.len() {
            return Err(HarnessError::MismatchedLengths);
        }
        for (slot, &s) in self.data.iter_mut().zip(samples.as_slice()) {
            *slot = Complex32::new(f32::from(s), 0.0);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Complex32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex32] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_operations() {
        let a = Complex32::new(1.0, -2.0);
        let b = Complex32::new(3.0, 4.0);
        let c = a * b;
        assert!((c.re - (1.0 * 3.0 - (-2.0) * 4.0)).abs() < 1e-6);
        assert!((c.im - (1.0 * 4.0 + (-2.0) * 3.0)).abs() < 1e-6);
        let n = -a;
        assert_eq!(n.re, -1.0);
        assert_eq!(n.im, 2.0);
        assert!((Complex32::new(3.0, 4.0).norm() - 5.0).abs() < 1e-6);
        let e = Complex32::expi(core::f32::consts::PI / 2.0);
        assert!(e.re.abs() < 1e-6 && (e.im - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sequence_rejects_bad_lengths() {
        assert_eq!(ComplexSequence::zeroed(0), Err(HarnessError::EmptyInput));
        assert_eq!(ComplexSequence::zeroed(6), Err(HarnessError::NonPowerOfTwo));
        assert_eq!(ComplexSequence::zeroed(8).map(|s| s.len()), Ok(8));
    }
}
