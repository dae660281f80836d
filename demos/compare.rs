//! Runs one comparison cycle on the host and prints the report.
//!
//! Configuration comes from `FFTCHECK_*` environment variables; set
//! `RUST_LOG=debug` to see stage transitions and planning details.
use fftcheck::compare::run_comparison;
use fftcheck::cycles::InstantCycleCounter;
use fftcheck::HarnessConfig;

#[cfg(feature = "realfft")]
fn backend() -> fftcheck::vendor::RealFftBackend {
    fftcheck::vendor::RealFftBackend::new()
}

#[cfg(not(feature = "realfft"))]
fn backend() -> fftcheck::rfft::HalfLengthRealFft {
    fftcheck::rfft::HalfLengthRealFft::new()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = HarnessConfig::from_env()?;
    let counter = InstantCycleCounter::new(config.core_clock_hz);
    let summary = run_comparison(config, counter, backend())?;
    println!("{summary}");
    if !summary.report.is_match() {
        std::process::exit(1);
    }
    Ok(())
}
