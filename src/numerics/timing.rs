//! Wall-clock timing of the pressure solve phases, collected per thread when
//! the `timing` feature is enabled and compiled away otherwise.

#[cfg(feature = "timing")]
use std::cell::RefCell;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Assembly,
    LinearSolve,
}

#[derive(Default, Clone, Debug)]
pub struct TimingStats {
    pub assembly: Vec<Duration>,
    pub linear_solve: Vec<Duration>,
    pub total: Duration,
}

impl TimingStats {
    #[cfg(feature = "timing")]
    fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Duration> {
        match phase {
            Phase::Assembly => &mut self.assembly,
            Phase::LinearSolve => &mut self.linear_solve,
        }
    }

    pub fn log_summary(&self) {
        if self.assembly.is_empty() && self.linear_solve.is_empty() {
            return;
        }
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        let assembly: Duration = self.assembly.iter().sum();
        let linear: Duration = self.linear_solve.iter().sum();

        tracing::info!(
            total_ms = ms(self.total),
            assembly_ms = ms(assembly),
            linear_solve_ms = ms(linear),
            other_ms = ms(self.total.saturating_sub(assembly + linear)),
            "pressure solve timing"
        );
    }
}

#[cfg(feature = "timing")]
thread_local! {
    static STATS: RefCell<TimingStats> = RefCell::new(TimingStats::default());
}

/// Run `f`, charging its duration to `phase`.
pub fn timed<F, R>(phase: Phase, f: F) -> R
where
    F: FnOnce() -> R,
{
    #[cfg(feature = "timing")]
    {
        let start = std::time::Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        STATS.with(|s| s.borrow_mut().phase_mut(phase).push(elapsed));
        result
    }
    #[cfg(not(feature = "timing"))]
    {
        let _ = phase;
        f()
    }
}

pub fn reset_timing() {
    #[cfg(feature = "timing")]
    STATS.with(|s| *s.borrow_mut() = TimingStats::default());
}

/// Close the current measurement with the overall solve time and return the
/// collected stats. Empty without the `timing` feature.
pub fn finalize_timing(total: Duration) -> TimingStats {
    #[cfg(feature = "timing")]
    {
        STATS.with(|s| {
            let mut stats = s.borrow_mut();
            stats.total = total;
            stats.clone()
        })
    }
    #[cfg(not(feature = "timing"))]
    {
        let _ = total;
        TimingStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_returns_closure_result() {
        reset_timing();
        assert_eq!(timed(Phase::Assembly, || 21 * 2), 42);
        let stats = finalize_timing(Duration::from_millis(5));
        if cfg!(feature = "timing") {
            assert_eq!(stats.assembly.len(), 1);
            assert!(stats.linear_solve.is_empty());
            assert_eq!(stats.total, Duration::from_millis(5));
        } else {
            assert!(stats.assembly.is_empty());
        }
    }
}
