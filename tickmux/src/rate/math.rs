/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure count/time arithmetic for the tick-rate logic.
//!
//! These are free functions rather than methods so they can be used and
//! tested independently of the `TickSource`.

// ── Cycle / microsecond conversions ───────────────────────────────────────────

/// Input-clock cycles the counter must count for one tick of `micros`.
///
/// The counter runs in symmetric (up-then-down) mode: it counts up to the
/// top value and back down, and the overflow fires once per full sweep.  One
/// sweep therefore spans `2 × top` input cycles, which is where the division
/// by 2 000 000 (2 × cycles-per-microsecond) comes from.
///
/// The clock term divides first, matching the fixed-point evaluation order of
/// the counter hardware registers; clocks are expected to be whole multiples
/// of 2 MHz (enforced by config validation).
pub fn sweep_cycles(clock_hz: u32, micros: u32) -> u64 {
    (clock_hz as u64 / 2_000_000) * micros as u64
}

/// Convert a raw count distance into elapsed microseconds.
///
/// `scale` is the log2 of the active divider: a divided clock makes each
/// count worth `2^scale` input cycles, applied as a final shift so the
/// division below never loses the scale factor to truncation first.
pub fn counts_to_micros(clock_hz: u32, scale: u32, counts: u64) -> u64 {
    ((counts * 1_000) / (clock_hz as u64 / 1_000)) << scale
}

// ── Tests ─────────────────────────────────────────────────────────────────────
