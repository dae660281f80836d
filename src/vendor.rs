use std::sync::Arc;
use std::vec::Vec;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::error::HarnessError;
use crate::num::Complex32;
use crate::rfft::{check_packed_len, pack_spectrum, PackedRealFft};

/// Vendor-optimized packed real FFT backed by the `realfft`/`rustfft` planners.
///
/// `realfft` returns `N/2 + 1` complex bins; they are repacked into the
/// DC/Nyquist-first layout described in [`crate::rfft`].
pub struct RealFftBackend {
    planner: RealFftPlanner<f32>,
    plan: Option<Arc<dyn RealToComplex<f32>>>,
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Default for RealFftBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RealFftBackend {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            plan: None,
            input: Vec::new(),
            output: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn planned_len(&self) -> Option<usize> {
        self.plan.as_ref().map(|p| p.len())
    }
}

impl core::fmt::Debug for RealFftBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RealFftBackend")
            .field("planned_len", &self.planned_len())
            .finish()
    }
}

impl PackedRealFft for RealFftBackend {
    fn name(&self) -> &str {
        "realfft packed rfft"
    }

    fn prepare(&mut self, len: usize) -> Result<(), HarnessError> {
        check_packed_len(len)?;
        if self.planned_len() == Some(len) {
            return Ok(());
        }
        let plan = self.planner.plan_fft_forward(len);
        self.input = plan.make_input_vec();
        self.output = plan.make_output_vec();
        self.scratch = plan.make_scratch_vec();
        log_debug!("planned realfft forward transform for {} points", len);
        self.plan = Some(plan);
        Ok(())
    }

    fn transform(&mut self, input: &[f32], packed: &mut [f32]) -> Result<(), HarnessError> {
        let n = input.len();
        if packed.len() != n {
            return Err(HarnessError::MismatchedLengths);
        }
        self.prepare(n)?;
        let plan = self.plan.as_ref().ok_or(HarnessError::InvalidState)?;
        self.input.copy_from_slice(input);
        plan.process_with_scratch(&mut self.input, &mut self.output, &mut self.scratch)
            .map_err(|_| HarnessError::TransformFailed)?;
        let output = &self.output;
        pack_spectrum(packed, |k| Complex32::new(output[k].re, output[k].im))
    }
}
