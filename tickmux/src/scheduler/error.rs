/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the timer scheduler.
//!
//! Every failure here is local and synchronous at the point of the
//! `attach`/`detach` call — nothing is deferred or retried.  Each variant
//! carries the exact values the caller needs to log a useful message or to
//! refuse to start the feature whose timer could not be scheduled:
//!
//! | Variant | Condition |
//! |---|---|
//! | `CapacityExceeded` | `attach` found no empty slot |
//! | `HandleOutOfRange` | `detach` with an index past the table end |
//! | `SlotNotAttached` | `detach` on an empty slot (stale or repeated handle) |
//!
//! Period-overflow is deliberately **not** an error: a tick period beyond the
//! counter range is clamped to the maximum representable period and flagged
//! on the returned rate selection (see the `rate` module).

use thiserror::Error;

/// Errors returned by `Scheduler::attach` / `Scheduler::detach` and the
/// scheduling facade built on them.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Every slot in the timer table is already attached.
    ///
    /// The table is left unchanged — an over-capacity attach never
    /// overwrites an existing timer.
    #[error("timer table is full – all {capacity} slots are attached")]
    CapacityExceeded { capacity: usize },

    /// The handle names a slot index past the end of the table.
    #[error("handle #{index} is out of range for a table of {capacity} slots")]
    HandleOutOfRange { index: usize, capacity: usize },

    /// The handle names a slot that is currently empty: it was already
    /// detached, or it held a one-shot that has since fired and retired
    /// itself.
    #[error("slot #{index} is not attached – handle is stale or already detached")]
    SlotNotAttached { index: usize },
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_relevant_values() {
        let err = SchedulerError::CapacityExceeded { capacity: 34 };
        assert!(err.to_string().contains("34"));

        let err = SchedulerError::HandleOutOfRange {
            index: 40,
            capacity: 34,
        };
        assert!(err.to_string().contains("#40"));

        let err = SchedulerError::SlotNotAttached { index: 3 };
        assert!(err.to_string().contains("#3"));
    }
}
