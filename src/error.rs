//! Error taxonomy shared by every stage of the harness.

use core::fmt;

/// Errors that stop a comparison from proceeding.
///
/// A spectral mismatch is not an error; it is reported through
/// [`crate::verify::DiscrepancyReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessError {
    /// A buffer or sequence had zero length.
    EmptyInput,
    /// A transform length was not a power of two.
    NonPowerOfTwo,
    /// Two buffers that must agree in length did not.
    MismatchedLengths,
    /// A sample exceeded the 12-bit converter range.
    SampleOutOfRange,
    /// A configuration value was non-finite, non-positive or unparsable.
    InvalidValue,
    /// The optimized transform backend reported a failure.
    TransformFailed,
    /// A comparison step was invoked out of order.
    InvalidState,
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::EmptyInput => write!(f, "input is empty"),
            HarnessError::NonPowerOfTwo => write!(f, "transform length must be a power of two"),
            HarnessError::MismatchedLengths => write!(f, "buffer lengths do not match"),
            HarnessError::SampleOutOfRange => {
                write!(f, "sample exceeds converter range 0..={}", crate::config::ADC_MAX)
            }
            HarnessError::InvalidValue => write!(f, "invalid configuration value"),
            HarnessError::TransformFailed => {
                write!(f, "optimized transform failed; comparison cannot proceed")
            }
            HarnessError::InvalidState => write!(f, "comparison step invoked out of order"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HarnessError {}

/// Check that `n` is a usable transform length.
pub(crate) fn check_len(n: usize) -> Result<(), HarnessError> {
    if n == 0 {
        return Err(HarnessError::EmptyInput);
    }
    if !n.is_power_of_two() {
        return Err(HarnessError::NonPowerOfTwo);
    }
    Ok(())
}
