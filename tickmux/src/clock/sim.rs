/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-memory counter driver for tests and the host simulator.
//!
//! [`SimCounter`] models the symmetric sweep of the real timer: it keeps a
//! free-running cycle position and reflects it into the 0..top..0 triangle
//! on every read.  To imitate a counter that keeps moving underneath the
//! CPU, each observation advances the position by a configurable step while
//! the clock input is enabled — so busy-wait loops that watch for the count
//! to change terminate, just as they do on the device.

use super::{Counter, Divider};

/// Host-side stand-in for the tick counter registers.
pub struct SimCounter {
    /// Free-running position within the sweep, in prescaled counts.
    position: u64,
    /// Counts advanced per observation while the clock runs.
    step: u16,
    top: u16,
    divider: Option<Divider>,
    running: bool,
    overflow_irq: bool,
    /// Number of masked critical sections entered (test observability).
    masked_sections: u32,
}

impl SimCounter {
    /// `step` is the number of counts the sweep advances per observation;
    /// it is floored at 1 so direction-detection busy-waits always finish.
    pub fn new(step: u16) -> Self {
        SimCounter {
            position: 0,
            step: step.max(1),
            top: 0,
            divider: None,
            running: false,
            overflow_irq: false,
            masked_sections: 0,
        }
    }

    /// Advance the sweep by `counts` without an observation, as if time
    /// passed while the CPU was busy elsewhere.
    pub fn advance(&mut self, counts: u64) {
        if self.running {
            self.position = self.position.wrapping_add(counts);
        }
    }

    /// Currently programmed divider, if the clock has been configured.
    pub fn divider(&self) -> Option<Divider> {
        self.divider
    }

    pub fn overflow_irq_enabled(&self) -> bool {
        self.overflow_irq
    }

    /// How many masked critical sections have been entered so far.
    pub fn masked_sections(&self) -> u32 {
        self.masked_sections
    }

    /// Reflect the free-running position into the 0..top..0 triangle.
    fn reflected(&self) -> u16 {
        let span = 2 * self.top as u64;
        if span == 0 {
            return 0;
        }
        let m = self.position % span;
        if m <= self.top as u64 {
            m as u16
        } else {
            (span - m) as u16
        }
    }
}

impl Counter for SimCounter {
    fn count(&mut self) -> u16 {
        if self.running {
            self.position = self.position.wrapping_add(self.step as u64);
        }
        self.reflected()
    }

    fn zero_count(&mut self) {
        self.position = 0;
    }

    fn set_top(&mut self, top: u16) {
        self.top = top;
    }

    fn top(&self) -> u16 {
        self.top
    }

    fn apply_divider(&mut self, divider: Divider) {
        self.divider = Some(divider);
        self.running = true;
    }

    fn halt_clock(&mut self) {
        self.running = false;
    }

    fn set_overflow_irq(&mut self, enabled: bool) {
        self.overflow_irq = enabled;
    }

    fn with_overflow_masked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.masked_sections += 1;
        let was_enabled = self.overflow_irq;
        self.overflow_irq = false;
        let result = f(self);
        self.overflow_irq = was_enabled;
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn running_counter(top: u16) -> SimCounter {
        let mut c = SimCounter::new(1);
        c.set_top(top);
        c.apply_divider(Divider::Div1);
        c
    }

    #[test]
    fn count_reflects_up_then_down() {
        let mut c = running_counter(4);
        // step 1 per observation: 1 2 3 4 3 2 1 0 1 ...
        let observed: Vec<u16> = (0..9).map(|_| c.count()).collect();
        assert_eq!(observed, vec![1, 2, 3, 4, 3, 2, 1, 0, 1]);
    }

    #[test]
    fn halted_counter_does_not_advance() {
        let mut c = running_counter(100);
        c.advance(10);
        c.halt_clock();
        let frozen = c.count();
        assert_eq!(c.count(), frozen);
        c.advance(50); // ignored while halted
        assert_eq!(c.count(), frozen);
    }

    #[test]
    fn zero_count_restarts_the_sweep() {
        let mut c = running_counter(100);
        c.advance(42);
        c.zero_count();
        assert_eq!(c.count(), 1); // one observation after the reset
    }

    #[test]
    fn zero_top_pins_the_count_at_zero() {
        let mut c = running_counter(0);
        c.advance(1_000);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn masked_section_restores_irq_state() {
        let mut c = SimCounter::new(1);
        c.set_overflow_irq(true);
        c.with_overflow_masked(|inner| {
            assert!(!inner.overflow_irq_enabled());
        });
        assert!(c.overflow_irq_enabled());
        assert_eq!(c.masked_sections(), 1);
    }

    #[test]
    fn step_is_floored_at_one() {
        let mut c = SimCounter::new(0);
        c.set_top(10);
        c.apply_divider(Divider::Div1);
        assert_eq!(c.count(), 1);
    }
}
