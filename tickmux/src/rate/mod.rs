/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tick-rate selection for a fixed-width counter.
//!
//! The tick counter is 16 bits wide, so a requested tick period must be made
//! to fit by prescaling the input clock.  [`select_rate`] walks the divider
//! candidates from fastest to slowest and picks the first one whose scaled
//! cycle count is representable — the smallest divider keeps the most
//! resolution for the diagnostic elapsed-time read.
//!
//! A request beyond even the slowest divider is not an error: it is clamped
//! to the longest representable period and flagged, so the caller can report
//! the degradation and continue.

pub mod math;

use math::sweep_cycles;

// ── Constants ─────────────────────────────────────────────────────────────────

/// One past the largest value the 16-bit tick counter can hold.
pub const COUNTER_RESOLUTION: u32 = 1 << 16;

// ── Divider ───────────────────────────────────────────────────────────────────

/// Clock-prescale factor applied between the input clock and the counter.
///
/// The candidate set and ordering are fixed by the counter hardware's
/// clock-select field; the search in [`select_rate`] relies on the order
/// being strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl Divider {
    /// All candidates, fastest first.
    pub const CANDIDATES: [Divider; 5] = [
        Divider::Div1,
        Divider::Div8,
        Divider::Div64,
        Divider::Div256,
        Divider::Div1024,
    ];

    /// The prescale factor itself.
    pub fn factor(self) -> u32 {
        1 << self.scale()
    }

    /// log2 of the factor — the shift used by the count/time conversions.
    pub fn scale(self) -> u32 {
        match self {
            Divider::Div1 => 0,
            Divider::Div8 => 3,
            Divider::Div64 => 6,
            Divider::Div256 => 8,
            Divider::Div1024 => 10,
        }
    }
}

impl std::fmt::Display for Divider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.factor())
    }
}

// ── RateSelection ─────────────────────────────────────────────────────────────

/// Result of fitting a target tick period into the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSelection {
    /// Divider to program into the clock-select field.
    pub divider: Divider,
    /// Top count for the symmetric sweep (the counter counts 0..top..0).
    pub top: u16,
    /// `true` when the request exceeded the counter range even at the
    /// slowest divider and was capped to the longest representable period.
    pub clamped: bool,
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Fit `target_micros` into the counter at `clock_hz`.
///
/// Picks the smallest divider whose scaled sweep-cycle count is strictly
/// below [`COUNTER_RESOLUTION`]; the scaled count becomes the counter top.
/// When nothing fits, the top is capped at `COUNTER_RESOLUTION − 1` under the
/// slowest divider and `clamped` is set — a defined degradation, never a
/// wrap.
pub fn select_rate(clock_hz: u32, target_micros: u32) -> RateSelection {
    let cycles = sweep_cycles(clock_hz, target_micros);

    for divider in Divider::CANDIDATES {
        let scaled = cycles >> divider.scale();
        if scaled < COUNTER_RESOLUTION as u64 {
            return RateSelection {
                divider,
                top: scaled as u16,
                clamped: false,
            };
        }
    }

    RateSelection {
        divider: Divider::Div1024,
        top: (COUNTER_RESOLUTION - 1) as u16,
        clamped: true,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // A 2 MHz clock makes one microsecond equal one sweep cycle, which keeps
    // the divider-boundary arithmetic in the tests exact.
    const CLOCK_2MHZ: u32 = 2_000_000;
    const CLOCK_16MHZ: u32 = 16_000_000;

    // ── Divider table ─────────────────────────────────────────────────────────

    #[test]
    fn divider_factors_match_scales() {
        for d in Divider::CANDIDATES {
            assert_eq!(d.factor(), 1 << d.scale());
        }
        assert_eq!(Divider::Div1.factor(), 1);
        assert_eq!(Divider::Div8.factor(), 8);
        assert_eq!(Divider::Div64.factor(), 64);
        assert_eq!(Divider::Div256.factor(), 256);
        assert_eq!(Divider::Div1024.factor(), 1024);
    }

    #[test]
    fn divider_candidates_are_strictly_increasing() {
        let factors: Vec<u32> = Divider::CANDIDATES.iter().map(|d| d.factor()).collect();
        assert!(factors.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn divider_displays_as_prescale_notation() {
        assert_eq!(Divider::Div64.to_string(), "/64");
    }

    // ── Default tick ──────────────────────────────────────────────────────────

    #[test]
    fn one_millisecond_tick_at_16_mhz_needs_no_prescale() {
        let sel = select_rate(CLOCK_16MHZ, 1_000);
        assert_eq!(sel.divider, Divider::Div1);
        assert_eq!(sel.top, 8_000);
        assert!(!sel.clamped);
    }

    // ── Divider boundaries ────────────────────────────────────────────────────

    #[test]
    fn largest_period_that_fits_undivided() {
        // 65535 cycles is the last value strictly below the resolution
        let sel = select_rate(CLOCK_2MHZ, 65_535);
        assert_eq!(sel.divider, Divider::Div1);
        assert_eq!(sel.top, 65_535);
        assert!(!sel.clamped);
    }

    #[test]
    fn first_period_past_undivided_range_moves_to_div8() {
        let sel = select_rate(CLOCK_2MHZ, 65_536);
        assert_eq!(sel.divider, Divider::Div8);
        assert_eq!(sel.top, 8_192);
        assert!(!sel.clamped);
    }

    #[test]
    fn div8_boundary_moves_to_div64() {
        // 65536 × 8 cycles is exactly out of range for /8
        let sel = select_rate(CLOCK_2MHZ, 65_536 * 8);
        assert_eq!(sel.divider, Divider::Div64);
        assert_eq!(sel.top, 8_192);
    }

    #[test]
    fn div64_boundary_moves_to_div256() {
        let sel = select_rate(CLOCK_2MHZ, 65_536 * 64);
        assert_eq!(sel.divider, Divider::Div256);
        assert_eq!(sel.top, 16_384);
    }

    #[test]
    fn div256_boundary_moves_to_div1024() {
        let sel = select_rate(CLOCK_2MHZ, 65_536 * 256);
        assert_eq!(sel.divider, Divider::Div1024);
        assert_eq!(sel.top, 16_384);
    }

    #[test]
    fn largest_period_that_fits_at_div1024() {
        // 65536 × 1024 − 1 cycles shifts down to 65535 — still in range
        let sel = select_rate(CLOCK_2MHZ, 65_536 * 1024 - 1);
        assert_eq!(sel.divider, Divider::Div1024);
        assert_eq!(sel.top, 65_535);
        assert!(!sel.clamped);
    }

    // ── Clamping ──────────────────────────────────────────────────────────────

    #[test]
    fn period_past_div1024_range_clamps_to_maximum() {
        let sel = select_rate(CLOCK_2MHZ, 65_536 * 1024);
        assert_eq!(sel.divider, Divider::Div1024);
        assert_eq!(sel.top, 65_535);
        assert!(sel.clamped, "out-of-range request must clamp, not wrap");
    }

    #[test]
    fn clamp_kicks_in_earlier_on_faster_clocks() {
        // At 16 MHz the same microsecond request costs 8× the cycles
        let sel = select_rate(CLOCK_16MHZ, 65_536 * 1024 / 8);
        assert_eq!(sel.divider, Divider::Div1024);
        assert!(sel.clamped);
    }

    #[test]
    fn zero_period_selects_fastest_divider_with_zero_top() {
        let sel = select_rate(CLOCK_16MHZ, 0);
        assert_eq!(sel.divider, Divider::Div1);
        assert_eq!(sel.top, 0);
        assert!(!sel.clamped);
    }
}
