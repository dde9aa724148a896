//! Tick sources for timing a single kernel call.
//!
//! [`CycleCounter`] is the seam: the trial runner only ever calls
//! [`init`](CycleCounter::init) once, then [`start`](CycleCounter::start)
//! and [`stop`](CycleCounter::stop) around each timed call. On Cortex-M,
//! [`TimingSource::select`] picks the DWT cycle counter when the core has
//! one and falls back to SysTick otherwise.
//!
//! # Wraparound
//!
//! Elapsed ticks are a `u32`. DWT wraps after 2³² cycles and SysTick after
//! 2²⁴; a single call that runs longer than that reports a wrapped value.
//! This is a known measurement limit and is not corrected.

/// Which hardware (or host) counter produced a tick count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum CounterKind {
    /// DWT CYCCNT: one tick per core clock cycle.
    DwtCycles,
    /// SysTick down-counter on the core clock, 24 bits wide.
    SysTick,
    /// Host monotonic clock, one tick per nanosecond.
    HostNanos,
    /// Test or user-supplied counter.
    Custom,
}

impl CounterKind {
    /// Whether a tick is exactly one core clock cycle.
    pub const fn is_cycle_accurate(self) -> bool {
        matches!(self, Self::DwtCycles | Self::SysTick)
    }

    /// Largest elapsed value the counter can report before wrapping.
    pub const fn max_ticks(self) -> u32 {
        match self {
            Self::SysTick => SYSTICK_RELOAD,
            _ => u32::MAX,
        }
    }
}

/// SysTick reload value: the full 24-bit range.
pub const SYSTICK_RELOAD: u32 = 0x00FF_FFFF;

/// A resettable elapsed-tick counter.
///
/// Not reentrant: implementations own the counter state they mutate and
/// are driven from a single thread of execution.
pub trait CycleCounter {
    /// The counter behind this source.
    fn kind(&self) -> CounterKind;

    /// Enable the counter. Calling this more than once is harmless.
    fn init(&mut self) {}

    /// Reset the counter to zero.
    fn start(&mut self);

    /// Ticks elapsed since the most recent [`start`](Self::start).
    fn stop(&mut self) -> u32;
}

impl<C: CycleCounter + ?Sized> CycleCounter for &mut C {
    fn kind(&self) -> CounterKind {
        (**self).kind()
    }

    fn init(&mut self) {
        (**self).init()
    }

    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) -> u32 {
        (**self).stop()
    }
}

// ---------------------------------------------------------------------------
// Cortex-M counters
// ---------------------------------------------------------------------------

/// DWT cycle counter (Cortex-M3 and up).
#[cfg(feature = "dwt")]
pub struct DwtCounter {
    dcb: cortex_m::peripheral::DCB,
    dwt: cortex_m::peripheral::DWT,
}

#[cfg(feature = "dwt")]
impl DwtCounter {
    /// Take ownership of the trace peripherals and enable CYCCNT.
    pub fn new(dcb: cortex_m::peripheral::DCB, dwt: cortex_m::peripheral::DWT) -> Self {
        let mut counter = Self { dcb, dwt };
        counter.init();
        counter
    }
}

#[cfg(feature = "dwt")]
impl CycleCounter for DwtCounter {
    fn kind(&self) -> CounterKind {
        CounterKind::DwtCycles
    }

    fn init(&mut self) {
        self.dcb.enable_trace();
        self.dwt.set_cycle_count(0);
        self.dwt.enable_cycle_counter();
    }

    #[inline(always)]
    fn start(&mut self) {
        self.dwt.set_cycle_count(0);
    }

    #[inline(always)]
    fn stop(&mut self) -> u32 {
        cortex_m::peripheral::DWT::cycle_count()
    }
}

/// SysTick free-running down-counter (every Cortex-M, including M0/M0+).
#[cfg(feature = "cortex-m")]
pub struct SysTickCounter {
    syst: cortex_m::peripheral::SYST,
}

#[cfg(feature = "cortex-m")]
impl SysTickCounter {
    /// Take ownership of SysTick and start it on the core clock.
    pub fn new(syst: cortex_m::peripheral::SYST) -> Self {
        let mut counter = Self { syst };
        counter.init();
        counter
    }
}

#[cfg(feature = "cortex-m")]
impl CycleCounter for SysTickCounter {
    fn kind(&self) -> CounterKind {
        CounterKind::SysTick
    }

    fn init(&mut self) {
        use cortex_m::peripheral::syst::SystClkSource;

        self.syst.disable_counter();
        self.syst.set_reload(SYSTICK_RELOAD);
        self.syst.clear_current();
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.enable_counter();
    }

    #[inline(always)]
    fn start(&mut self) {
        self.syst.clear_current();
    }

    #[inline(always)]
    fn stop(&mut self) -> u32 {
        // Counts down from the reload value.
        SYSTICK_RELOAD - (cortex_m::peripheral::SYST::get_current() & SYSTICK_RELOAD)
    }
}

/// The counter chosen for this core.
#[cfg(feature = "cortex-m")]
#[non_exhaustive]
pub enum TimingSource {
    /// Cycle-accurate DWT counter.
    #[cfg(feature = "dwt")]
    Dwt(DwtCounter),
    /// Coarser SysTick fallback.
    SysTick(SysTickCounter),
}

#[cfg(feature = "cortex-m")]
impl TimingSource {
    /// Use DWT when the core implements CYCCNT, otherwise SysTick. The
    /// unused peripherals are dropped.
    #[cfg(feature = "dwt")]
    pub fn select(
        dcb: cortex_m::peripheral::DCB,
        dwt: cortex_m::peripheral::DWT,
        syst: cortex_m::peripheral::SYST,
    ) -> Self {
        if cortex_m::peripheral::DWT::has_cycle_counter() {
            debug!("timer: DWT cycle counter");
            Self::Dwt(DwtCounter::new(dcb, dwt))
        } else {
            debug!("timer: SysTick fallback");
            Self::SysTick(SysTickCounter::new(syst))
        }
    }

    /// SysTick; this build has no DWT support. The trace peripherals are
    /// dropped.
    #[cfg(not(feature = "dwt"))]
    pub fn select(
        _dcb: cortex_m::peripheral::DCB,
        _dwt: cortex_m::peripheral::DWT,
        syst: cortex_m::peripheral::SYST,
    ) -> Self {
        debug!("timer: SysTick");
        Self::SysTick(SysTickCounter::new(syst))
    }
}

#[cfg(feature = "cortex-m")]
impl CycleCounter for TimingSource {
    fn kind(&self) -> CounterKind {
        match self {
            #[cfg(feature = "dwt")]
            Self::Dwt(c) => c.kind(),
            Self::SysTick(c) => c.kind(),
        }
    }

    fn init(&mut self) {
        match self {
            #[cfg(feature = "dwt")]
            Self::Dwt(c) => c.init(),
            Self::SysTick(c) => c.init(),
        }
    }

    #[inline(always)]
    fn start(&mut self) {
        match self {
            #[cfg(feature = "dwt")]
            Self::Dwt(c) => c.start(),
            Self::SysTick(c) => c.start(),
        }
    }

    #[inline(always)]
    fn stop(&mut self) -> u32 {
        match self {
            #[cfg(feature = "dwt")]
            Self::Dwt(c) => c.stop(),
            Self::SysTick(c) => c.stop(),
        }
    }
}

// ---------------------------------------------------------------------------
// Host counter
// ---------------------------------------------------------------------------

/// Monotonic host clock in nanoseconds, for running the harness off-target.
///
/// Elapsed times beyond `u32::MAX` nanoseconds (about 4.3 s) saturate.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct InstantCounter {
    started: std::time::Instant,
}

#[cfg(feature = "std")]
impl InstantCounter {
    /// A counter whose zero point is now.
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for InstantCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl CycleCounter for InstantCounter {
    fn kind(&self) -> CounterKind {
        CounterKind::HostNanos
    }

    fn start(&mut self) {
        self.started = std::time::Instant::now();
    }

    fn stop(&mut self) -> u32 {
        let nanos = self.started.elapsed().as_nanos();
        u32::try_from(nanos).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stepping {
        now: u32,
        step: u32,
        inits: u32,
    }

    impl CycleCounter for Stepping {
        fn kind(&self) -> CounterKind {
            CounterKind::Custom
        }

        fn init(&mut self) {
            self.inits += 1;
        }

        fn start(&mut self) {
            self.now = 0;
        }

        fn stop(&mut self) -> u32 {
            self.now += self.step;
            self.now
        }
    }

    #[test]
    fn kind_properties() {
        assert!(CounterKind::DwtCycles.is_cycle_accurate());
        assert!(CounterKind::SysTick.is_cycle_accurate());
        assert!(!CounterKind::HostNanos.is_cycle_accurate());
        assert_eq!(CounterKind::SysTick.max_ticks(), 0x00FF_FFFF);
        assert_eq!(CounterKind::DwtCycles.max_ticks(), u32::MAX);
    }

    #[test]
    fn start_resets_elapsed() {
        let mut c = Stepping {
            now: 0,
            step: 7,
            inits: 0,
        };
        c.start();
        assert_eq!(c.stop(), 7);
        assert_eq!(c.stop(), 14);
        c.start();
        assert_eq!(c.stop(), 7);
    }

    #[cfg(feature = "dwt")]
    #[test]
    fn cycle_counter_check_is_an_associated_fn() {
        use cortex_m::peripheral::{DCB, DWT, SYST};

        let select: fn(DCB, DWT, SYST) -> TimingSource = TimingSource::select;
        let _ = select;
        let _: fn() -> bool = DWT::has_cycle_counter;
    }

    #[test]
    fn mut_ref_forwards() {
        fn drive<C: CycleCounter>(mut c: C) -> (CounterKind, u32) {
            c.init();
            c.start();
            (c.kind(), c.stop())
        }
        let mut c = Stepping {
            now: 0,
            step: 3,
            inits: 0,
        };
        assert_eq!(drive(&mut c), (CounterKind::Custom, 3));
        assert_eq!(c.inits, 1);
    }
}
