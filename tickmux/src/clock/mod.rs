/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hardware tick source.
//!
//! [`TickSource`] drives one fixed-width counter in symmetric (up-then-down)
//! counting mode: the counter sweeps 0..top..0 and raises its overflow
//! interrupt once per sweep, which is the scheduler's tick.  The counter
//! itself sits behind the [`Counter`] trait so the same rate/start/stop/read
//! logic runs against the real timer registers on the device and against
//! [`sim::SimCounter`] on the host.
//!
//! # Critical sections
//! The top value is wider than a single register write on the target, so
//! every multi-register update goes through
//! [`Counter::with_overflow_masked`] — the tick interrupt must never observe
//! a half-written top.  The same discipline is expected of callers that
//! mutate scheduler state from outside the tick context.

pub mod sim;

use tracing::{debug, warn};

use crate::rate::{self, RateSelection};
use crate::rate::math::counts_to_micros;
pub use crate::rate::Divider;

// ── Counter trait ─────────────────────────────────────────────────────────────

/// Register-level view of the tick counter.
///
/// Implementations model a free-running hardware counter: `count()` returns
/// the instantaneous position of the sweep, and two successive reads may
/// differ even with the clock otherwise untouched.
pub trait Counter {
    /// Instantaneous counter value.
    fn count(&mut self) -> u16;

    /// Reset the counter position to zero.
    fn zero_count(&mut self);

    /// Program the sweep top value.
    fn set_top(&mut self, top: u16);

    /// Currently programmed top value.
    fn top(&self) -> u16;

    /// Program the clock-select field.  This also (re-)enables the clock
    /// input, so the counter starts advancing.
    fn apply_divider(&mut self, divider: Divider);

    /// Clear the clock-select field — the counter freezes in place.
    fn halt_clock(&mut self);

    /// Enable or disable the overflow interrupt.
    fn set_overflow_irq(&mut self, enabled: bool);

    /// Run `f` with the overflow interrupt masked, restoring the previous
    /// mask state afterwards.  This is the critical section wrapping every
    /// multi-register update.
    fn with_overflow_masked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R;
}

// ── TickSource ────────────────────────────────────────────────────────────────

/// Owns the counter and carries the currently selected rate.
pub struct TickSource<C: Counter> {
    counter: C,
    clock_hz: u32,
    selection: Option<RateSelection>,
}

impl<C: Counter> TickSource<C> {
    pub fn new(counter: C, clock_hz: u32) -> Self {
        TickSource {
            counter,
            clock_hz,
            selection: None,
        }
    }

    /// Program the tick period.
    ///
    /// Runs the divider search, writes the top under the overflow-masked
    /// critical section, then applies the divider (which also lets the
    /// counter run).  A request beyond the counter range is capped to the
    /// longest representable period — the returned selection carries the
    /// `clamped` flag and a warning is emitted.
    pub fn set_period_micros(&mut self, target_micros: u32) -> RateSelection {
        let sel = rate::select_rate(self.clock_hz, target_micros);

        if sel.clamped {
            warn!(
                target_micros,
                divider = %sel.divider,
                top = sel.top,
                "requested tick period exceeds the counter range – capped to the maximum"
            );
        }

        self.counter.with_overflow_masked(|c| c.set_top(sel.top));
        self.counter.apply_divider(sel.divider);
        self.selection = Some(sel);

        debug!(
            target_micros,
            divider = %sel.divider,
            top = sel.top,
            "tick period programmed"
        );

        sel
    }

    /// The rate currently programmed, if any.
    pub fn selection(&self) -> Option<RateSelection> {
        self.selection
    }

    /// Restart the sweep from zero.
    ///
    /// The overflow interrupt is masked while the count is reset, and kept
    /// masked until the counter is seen to advance past zero — re-enabling
    /// against a stale zero would deliver a phantom overflow for a sweep
    /// that never happened.
    pub fn start(&mut self) {
        self.counter.set_overflow_irq(false);
        self.counter.with_overflow_masked(|c| c.zero_count());
        self.resume();

        loop {
            let count = self.counter.with_overflow_masked(|c| c.count());
            if count != 0 {
                break;
            }
        }

        self.counter.set_overflow_irq(true);
    }

    /// Disable the clock input entirely; the count freezes in place.
    pub fn stop(&mut self) {
        self.counter.halt_clock();
    }

    /// Re-enable the clock input without resetting the count.
    pub fn resume(&mut self) {
        if let Some(sel) = self.selection {
            self.counter.apply_divider(sel.divider);
        }
    }

    /// Enable or disable tick delivery without touching the clock.
    pub fn set_tick_enabled(&mut self, enabled: bool) {
        self.counter.set_overflow_irq(enabled);
    }

    /// Elapsed microseconds since the last sweep bottom.
    ///
    /// Diagnostic only — the dispatch path never calls this.  The counter
    /// position alone does not say whether the sweep is on its way up or
    /// down, so the count is read twice with a busy-wait in between; once
    /// the direction is known, the distance travelled is the position (going
    /// up) or the full up-phase plus the way back down (going down).
    pub fn elapsed_micros(&mut self) -> u64 {
        let Some(sel) = self.selection else {
            return 0;
        };

        let first = self.counter.with_overflow_masked(|c| c.count());

        let mut second;
        loop {
            second = self.counter.with_overflow_masked(|c| c.count());
            if second != first {
                break;
            }
        }

        let top = self.counter.top() as u64;
        let counts = if second > first {
            first as u64
        } else {
            (top - second as u64) + top
        };

        counts_to_micros(self.clock_hz, sel.divider.scale(), counts)
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::sim::SimCounter;
    use super::*;

    fn tick_source() -> TickSource<SimCounter> {
        TickSource::new(SimCounter::new(1), 16_000_000)
    }

    // ── set_period_micros ─────────────────────────────────────────────────────

    #[test]
    fn set_period_programs_top_and_divider() {
        let mut ts = tick_source();
        let sel = ts.set_period_micros(1_000);
        assert_eq!(sel.top, 8_000);
        assert_eq!(ts.counter().top(), 8_000);
        assert_eq!(ts.counter().divider(), Some(Divider::Div1));
        assert!(!sel.clamped);
    }

    #[test]
    fn set_period_writes_top_inside_critical_section() {
        let mut ts = tick_source();
        let before = ts.counter().masked_sections();
        ts.set_period_micros(1_000);
        assert!(ts.counter().masked_sections() > before);
    }

    #[test]
    fn set_period_out_of_range_reports_clamp() {
        let mut ts = tick_source();
        let sel = ts.set_period_micros(u32::MAX);
        assert!(sel.clamped);
        assert_eq!(ts.counter().top(), 65_535);
        assert_eq!(ts.counter().divider(), Some(Divider::Div1024));
    }

    // ── start / stop / resume ─────────────────────────────────────────────────

    #[test]
    fn start_leaves_counter_advanced_past_zero() {
        let mut ts = tick_source();
        ts.set_period_micros(1_000);
        ts.start();
        assert_ne!(ts.counter_mut().count(), 0);
    }

    #[test]
    fn start_reenables_overflow_irq_after_the_wait() {
        let mut ts = tick_source();
        ts.set_period_micros(1_000);
        ts.counter_mut().set_overflow_irq(false);
        ts.start();
        assert!(ts.counter().overflow_irq_enabled());
    }

    #[test]
    fn stop_freezes_the_count() {
        let mut ts = tick_source();
        ts.set_period_micros(1_000);
        ts.start();
        ts.stop();
        let frozen = ts.counter_mut().count();
        assert_eq!(ts.counter_mut().count(), frozen);
        assert_eq!(ts.counter_mut().count(), frozen);
    }

    #[test]
    fn resume_continues_from_frozen_count() {
        let mut ts = tick_source();
        ts.set_period_micros(1_000);
        ts.start();
        ts.stop();
        let frozen = ts.counter_mut().count();
        ts.resume();
        assert_ne!(ts.counter_mut().count(), frozen);
    }

    // ── elapsed_micros ────────────────────────────────────────────────────────

    #[test]
    fn elapsed_is_zero_before_a_period_is_programmed() {
        let mut ts = tick_source();
        assert_eq!(ts.elapsed_micros(), 0);
    }

    #[test]
    fn elapsed_tracks_the_up_phase() {
        let mut ts = tick_source();
        ts.set_period_micros(1_000); // top = 8000 at /1
        // Park the sweep 4000 counts up: 4000 of 16000 cycles ≈ 250 µs
        ts.counter_mut().advance(4_000);
        let elapsed = ts.elapsed_micros();
        assert!(
            (245..=255).contains(&elapsed),
            "expected ≈250 µs, got {elapsed}"
        );
    }

    #[test]
    fn elapsed_corrects_for_the_down_phase() {
        let mut ts = tick_source();
        ts.set_period_micros(1_000); // top = 8000, full sweep = 1000 µs
        // 12000 cycles into the sweep: 8000 up + 4000 back down ≈ 750 µs
        ts.counter_mut().advance(12_000);
        let elapsed = ts.elapsed_micros();
        assert!(
            (745..=755).contains(&elapsed),
            "expected ≈750 µs, got {elapsed}"
        );
    }
}
