//! Run the default matrix on the host with the reference kernel.
//!
//! Ticks are nanoseconds from the host monotonic clock, so the cpp columns
//! are ns/pixel, not cycles. Useful for checking the harness itself.

use std::process::ExitCode;

use graybench::{
    CycleCounter, FrameStore, Harness, InstantCounter, PlaneMut, PlaneRef, Progress,
    ReferenceKernel, SampleLayout, config, rgb_to_gray_ref,
};

fn main() -> ExitCode {
    if let Err(e) = demo() {
        eprintln!("demo failed: {e}");
        return ExitCode::FAILURE;
    }

    let mut store = FrameStore::<{ config::MAX_WIDTH }, { config::MAX_HEIGHT }>::new();
    let mut counter = InstantCounter::new();
    let unit = if counter.kind().is_cycle_accurate() {
        "cycles"
    } else {
        "ns"
    };
    println!("timing in {unit} ({:?})", counter.kind());
    let mut print = |p: &Progress<'_>| {
        let s = p.summary;
        println!(
            "{:>3}x{:<3}  ticks_avg={:>8}  cpp_x256={:>6}  cpp={:>8.3}  failures={}/{}  saturated={}",
            s.width,
            s.height,
            s.ticks_avg,
            s.cpp_x256_avg,
            s.cpp_avg,
            s.failures,
            s.trials,
            s.saturated
        );
    };

    match Harness::new(config::DEFAULT).run(&mut store, &mut ReferenceKernel, &mut counter, &mut print) {
        Ok(report) if report.all_passed() => ExitCode::SUCCESS,
        Ok(report) => {
            eprintln!("{} trials differed from the reference", report.total_failures());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("config: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Red, green, blue and mid gray through the oracle.
fn demo() -> Result<(), graybench::BufferError> {
    let src = [255, 0, 0, 0, 255, 0, 0, 0, 255, 128, 128, 128];
    let mut out = [0u8; 4];
    let src = PlaneRef::new(&src, 4, 1, 12, SampleLayout::Rgb8)?;
    let mut dst = PlaneMut::new(&mut out, 4, 1, 4, SampleLayout::Gray8)?;
    rgb_to_gray_ref(&mut dst, &src);
    println!("primaries + gray -> {out:?}");
    Ok(())
}
