//! # fftcheck - FFT benchmark and verification harness
//!
//! Runs two independent FFT implementations over the same synthetic 12-bit
//! signal, measures each in core clock cycles, and verifies that their
//! one-sided magnitude spectra agree within an absolute tolerance.
//!
//! ## Pipeline
//!
//! 1. [`signal`]: a two-tone waveform quantized to `0..=4095`.
//! 2. [`radix2`]: the in-house radix-2 decimation-in-time reference FFT.
//! 3. [`rfft`]: an optimized packed real FFT behind the [`rfft::PackedRealFft`]
//!    trait, normalized to the same magnitude layout.
//! 4. [`cycles`]: a cycle-counter harness around each transform.
//! 5. [`verify`]: bin-by-bin comparison producing a [`verify::DiscrepancyReport`].
//! 6. [`compare`]: the linear orchestrator tying the steps together.
//!
//! ## Cargo Features
//!
//! - `std` (default): host cycle counter and environment configuration
//! - `realfft` (default): vendor-optimized backend built on the `realfft` crate
//! - `verbose-logging` (default): stage and measurement logging via `log`
//!
//! Without `std` the crate is `no_std` + `alloc` and runs on Cortex-M targets,
//! where [`cycles::DwtCycleCounter`] reads the DWT cycle counter.
//!
//! ## Example
//!
//! ```
//! use fftcheck::compare::run_default_comparison;
//! use fftcheck::cycles::SimulatedCycleCounter;
//!
//! let summary = run_default_comparison(SimulatedCycleCounter::new(1)).unwrap();
//! assert!(summary.report.is_match());
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
extern crate alloc;

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            log::info!($($arg)*);
        }
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            log::debug!($($arg)*);
        }
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            log::warn!($($arg)*);
        }
    }};
}

pub mod config;
pub mod error;

/// Complex arithmetic and the in-place transform buffer.
pub mod num;

/// Synthetic sample generation and raw sample sources.
pub mod signal;

/// Magnitude spectra and the transform seam shared by both implementations.
pub mod spectrum;

/// Radix-2 decimation-in-time reference FFT.
pub mod radix2;

/// Packed real-input FFT backends and the adapter that normalizes them.
pub mod rfft;

/// Vendor-optimized packed transform backed by the `realfft` crate.
#[cfg(feature = "realfft")]
pub mod vendor;

/// Cycle counters and the measurement harness.
pub mod cycles;

/// Bin-by-bin spectral verification.
pub mod verify;

/// Comparison orchestrator.
pub mod compare;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use num::{Complex32, ComplexSequence};
pub use signal::SampleSequence;
pub use spectrum::{MagnitudeSpectrum, SpectrumTransform};
