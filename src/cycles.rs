//! Cycle-accurate timing of transform invocations.
//!
//! A [`CycleCounter`] is a free-running 32-bit counter that increments once per
//! core clock. [`CycleBenchmark`] resets it once, then brackets each operation
//! with two reads. The delta uses wrapping arithmetic, matching the hardware
//! counter rolling over.

use alloc::string::String;
use core::cell::Cell;
use core::fmt;

use crate::error::HarnessError;

/// Monotonic, free-running cycle counter.
pub trait CycleCounter {
    /// Zero the counter and enable counting.
    fn reset(&self);
    fn read(&self) -> u32;
}

impl<C: CycleCounter + ?Sized> CycleCounter for &C {
    fn reset(&self) {
        (**self).reset()
    }

    fn read(&self) -> u32 {
        (**self).read()
    }
}

/// Execution cost of one labelled operation.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleMeasurement {
    pub label: String,
    pub cycles: u32,
    /// `cycles / (core_clock_hz / 1000)`.
    pub millis: f64,
}

impl CycleMeasurement {
    pub fn from_cycles(label: impl Into<String>, cycles: u32, core_clock_hz: u32) -> Self {
        let millis = f64::from(cycles) / (f64::from(core_clock_hz) / 1000.0);
        Self {
            label: label.into(),
            cycles,
            millis,
        }
    }
}

impl fmt::Display for CycleMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} cycles ({:.3} ms)",
            self.label, self.cycles, self.millis
        )
    }
}

/// Measures operations against a [`CycleCounter`] clocked at `core_clock_hz`.
#[derive(Debug)]
pub struct CycleBenchmark<C> {
    counter: C,
    core_clock_hz: u32,
}

impl<C: CycleCounter> CycleBenchmark<C> {
    /// Takes ownership of `counter` and resets it. This is the only reset.
    pub fn new(counter: C, core_clock_hz: u32) -> Result<Self, HarnessError> {
        if core_clock_hz == 0 {
            return Err(HarnessError::InvalidValue);
        }
        counter.reset();
        log_debug!("cycle counter reset, core clock {} Hz", core_clock_hz);
        Ok(Self {
            counter,
            core_clock_hz,
        })
    }

    /// Run `op` between two counter reads.
    pub fn measure<R, F>(&mut self, label: &str, op: F) -> (R, CycleMeasurement)
    where
        F: FnOnce() -> R,
    {
        let start = self.counter.read();
        let out = core::hint::black_box(op());
        let end = self.counter.read();
        let m = CycleMeasurement::from_cycles(label, end.wrapping_sub(start), self.core_clock_hz);
        log_info!("{}", m);
        (out, m)
    }

    /// Cost of an empty operation; the read-to-read overhead of the counter.
    pub fn measure_noop(&mut self, label: &str) -> CycleMeasurement {
        self.measure(label, || ()).1
    }
}

/// Deterministic software counter.
///
/// Every read advances the count by `step`; [`SimulatedCycleCounter::advance`]
/// adds the cost of simulated work between reads.
#[derive(Debug, Default)]
pub struct SimulatedCycleCounter {
    now: Cell<u32>,
    step: u32,
}

impl SimulatedCycleCounter {
    pub fn new(step: u32) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    /// Start at `now`, e.g. just below the wrap point.
    pub fn starting_at(now: u32, step: u32) -> Self {
        Self {
            now: Cell::new(now),
            step,
        }
    }

    pub fn advance(&self, cycles: u32) {
        self.now.set(self.now.get().wrapping_add(cycles));
    }
}

impl CycleCounter for SimulatedCycleCounter {
    fn reset(&self) {
        self.now.set(0);
    }

    fn read(&self) -> u32 {
        let v = self.now.get().wrapping_add(self.step);
        self.now.set(v);
        v
    }
}

/// Host counter deriving cycles from the monotonic clock and a nominal core frequency.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct InstantCycleCounter {
    origin: Cell<std::time::Instant>,
    core_clock_hz: u32,
}

#[cfg(feature = "std")]
impl InstantCycleCounter {
    pub fn new(core_clock_hz: u32) -> Self {
        Self {
            origin: Cell::new(std::time::Instant::now()),
            core_clock_hz,
        }
    }
}

#[cfg(feature = "std")]
impl CycleCounter for InstantCycleCounter {
    fn reset(&self) {
        self.origin.set(std::time::Instant::now());
    }

    fn read(&self) -> u32 {
        let nanos = self.origin.get().elapsed().as_nanos();
        // Truncation to 32 bits mirrors the hardware counter wrapping.
        (nanos * u128::from(self.core_clock_hz) / 1_000_000_000) as u32
    }
}

/// Cortex-M Data Watchpoint and Trace cycle counter (CYCCNT).
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[derive(Debug, Default)]
pub struct DwtCycleCounter;

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl DwtCycleCounter {
    const DEMCR: *mut u32 = 0xE000_EDFC as *mut u32;
    const DWT_CTRL: *mut u32 = 0xE000_1000 as *mut u32;
    const DWT_CYCCNT: *mut u32 = 0xE000_1004 as *mut u32;
    const DEMCR_TRCENA: u32 = 1 << 24;
    const CTRL_CYCCNTENA: u32 = 1;
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl CycleCounter for DwtCycleCounter {
    fn reset(&self) {
        // SAFETY: fixed, always-mapped system control space registers on ARMv7-M.
        unsafe {
            let demcr = core::ptr::read_volatile(Self::DEMCR);
            core::ptr::write_volatile(Self::DEMCR, demcr | Self::DEMCR_TRCENA);
            core::ptr::write_volatile(Self::DWT_CYCCNT, 0);
            let ctrl = core::ptr::read_volatile(Self::DWT_CTRL);
            core::ptr::write_volatile(Self::DWT_CTRL, ctrl | Self::CTRL_CYCCNTENA);
        }
    }

    fn read(&self) -> u32 {
        // SAFETY: read-only access to the always-mapped CYCCNT register.
        unsafe { core::ptr::read_volatile(Self::DWT_CYCCNT) }
    }
}
