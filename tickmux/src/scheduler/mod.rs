/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timer table & dispatcher.
//!
//! [`Scheduler`] multiplexes one hardware tick onto a fixed-capacity table of
//! software timers.  Collaborating subsystems call [`Scheduler::attach`] (or
//! the [`schedule_every`](Scheduler::schedule_every) /
//! [`schedule_after`](Scheduler::schedule_after) facade) once during their
//! setup; the tick-interrupt binding calls [`Scheduler::tick`] on every
//! counter overflow; the dispatcher invokes due callbacks synchronously, in
//! slot order, with no nesting.
//!
//! # Contract
//!
//! | Topic | Rule |
//! |---|---|
//! | Ownership | One explicitly owned instance, passed by reference to the interrupt binding and to every module that schedules work |
//! | Slot identity | A handle is its slot index; stable from attach to detach or one-shot retirement |
//! | Capacity | Full table → `CapacityExceeded`, table untouched |
//! | Stale handles | Out-of-range or empty-slot detach → checked error, never a memory fault |
//! | Tie-break | Timers expiring on the same tick fire in ascending slot order, nothing more |
//! | Zero period | `countdown == 0` means parked — a timer attached with period 0 never fires |
//! | Interrupt safety | `attach`/`detach` are **not** tick-safe: call before ticking starts, or with the tick masked, exactly like the multi-register counter writes |
//! | Callbacks | Short, non-blocking, no reach-back into the scheduler during dispatch (the `&mut` borrow makes direct reentrancy unrepresentable) |
//!
//! The dispatch path does not log, allocate, or block — on the device it
//! runs in interrupt context, and a callback that overruns one tick period
//! starves every later slot in that tick.

pub mod error;

pub use error::SchedulerError;

use tracing::{debug, info, warn};

use crate::clock::{Counter, TickSource};
use crate::config::{SchedulerConfig, MAX_CAPACITY};
use crate::slot::{Callback, Handle, Slot, TimerKind};

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// The timer-multiplexing scheduler.
///
/// Owns the slot table and the [`TickSource`].  Constructed once at startup
/// from a validated [`SchedulerConfig`]; the tick source itself is left
/// untouched until the first `attach` arms it (one-time, idempotent).
pub struct Scheduler<C: Counter> {
    tick_source: TickSource<C>,
    slots: Box<[Slot]>,
    tick_micros: u32,
    ticking: bool,
}

impl<C: Counter> Scheduler<C> {
    /// Build a scheduler over `counter` with `config`'s capacity, tick
    /// resolution, and input clock.
    ///
    /// A capacity beyond the 8-bit handle range is capped at
    /// [`MAX_CAPACITY`] with a warning; configurations that went through
    /// [`SchedulerConfig::validate`] never hit this.
    pub fn new(counter: C, config: &SchedulerConfig) -> Self {
        let capacity = if config.capacity > MAX_CAPACITY {
            warn!(
                requested = config.capacity,
                capped = MAX_CAPACITY,
                "table capacity exceeds the handle range – capped"
            );
            MAX_CAPACITY
        } else {
            config.capacity
        };

        Scheduler {
            tick_source: TickSource::new(counter, config.clock_hz),
            slots: (0..capacity).map(|_| Slot::empty()).collect(),
            tick_micros: config.tick_micros,
            ticking: false,
        }
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Install `callback` to run every `period` ticks (cyclic) or once after
    /// `period` ticks (one-shot), and return the slot handle.
    ///
    /// The first call arms the tick source at the configured resolution.
    /// The new timer's countdown starts at the full period, so nothing fires
    /// before the next tick boundary.  A period of 0 parks the slot
    /// permanently: it occupies capacity but never fires.
    ///
    /// # Errors
    /// [`SchedulerError::CapacityExceeded`] when every slot is attached; the
    /// table is left unchanged.
    pub fn attach(
        &mut self,
        callback: Callback,
        period: u32,
        kind: TimerKind,
    ) -> Result<Handle, SchedulerError> {
        if !self.ticking {
            self.start_ticking();
        }

        let index = self
            .slots
            .iter()
            .position(|slot| !slot.is_attached())
            .ok_or(SchedulerError::CapacityExceeded {
                capacity: self.slots.len(),
            })?;

        self.slots[index].arm(kind, period, callback);
        debug!(slot = index, period, ?kind, "timer attached");

        Ok(Handle::new(index as u8))
    }

    /// Free the slot named by `handle` so a later attach may reuse it.  The
    /// detached callback is never invoked again.
    ///
    /// # Errors
    /// [`SchedulerError::HandleOutOfRange`] for an index past the table end,
    /// [`SchedulerError::SlotNotAttached`] for a slot that is already empty
    /// (a repeated detach, or a one-shot that has fired).
    pub fn detach(&mut self, handle: Handle) -> Result<(), SchedulerError> {
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(handle.index())
            .ok_or(SchedulerError::HandleOutOfRange {
                index: handle.index(),
                capacity,
            })?;

        if !slot.is_attached() {
            return Err(SchedulerError::SlotNotAttached {
                index: handle.index(),
            });
        }

        slot.clear();
        debug!(slot = handle.index(), "timer detached");
        Ok(())
    }

    // ── Facade ────────────────────────────────────────────────────────────────

    /// Run `callback` every `period_ms` milliseconds (at the default 1 ms
    /// resolution; in tick units otherwise).
    pub fn schedule_every(
        &mut self,
        period_ms: u32,
        callback: impl FnMut() + Send + 'static,
    ) -> Result<Handle, SchedulerError> {
        self.attach(Box::new(callback), period_ms, TimerKind::Periodic)
    }

    /// Run `callback` once, `delay_ms` milliseconds from now.
    pub fn schedule_after(
        &mut self,
        delay_ms: u32,
        callback: impl FnMut() + Send + 'static,
    ) -> Result<Handle, SchedulerError> {
        self.attach(Box::new(callback), delay_ms, TimerKind::OneShot)
    }

    /// Stop and free a previously scheduled timer.
    pub fn cancel(&mut self, handle: Handle) -> Result<(), SchedulerError> {
        self.detach(handle)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// One dispatch pass over the table.
    ///
    /// Invoked only by the tick-interrupt binding — this is not an
    /// application API.  Scans slots in ascending index order (the sole
    /// tie-break between timers expiring on the same tick), decrements every
    /// running countdown, and invokes each callback whose countdown reaches
    /// zero: cyclic slots rearm to their full period, one-shots are retired
    /// on the spot.
    ///
    /// A countdown already at zero is parked, not "fire every tick" — this
    /// is what makes zero-period timers permanently silent.
    pub fn tick(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.countdown == 0 {
                continue;
            }

            slot.countdown -= 1;
            if slot.countdown > 0 {
                continue;
            }

            if let Some(callback) = slot.callback.as_mut() {
                callback();

                match slot.kind {
                    TimerKind::Periodic => slot.countdown = slot.period,
                    TimerKind::OneShot => slot.clear(),
                }
            }
        }
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    /// Fixed table capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently attached timers.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_attached()).count()
    }

    /// Whether the tick source has been armed by a first attach.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn tick_source(&self) -> &TickSource<C> {
        &self.tick_source
    }

    /// Mutable access for the code that binds the scheduler to the tick
    /// interrupt (start/stop/resume, diagnostic elapsed read).
    pub fn tick_source_mut(&mut self) -> &mut TickSource<C> {
        &mut self.tick_source
    }

    // ── Initialisation ────────────────────────────────────────────────────────

    /// One-time tick-source arming, run by the first attach.
    fn start_ticking(&mut self) {
        self.ticking = true;

        let selection = self.tick_source.set_period_micros(self.tick_micros);
        self.tick_source.set_tick_enabled(true);
        self.tick_source.resume();

        info!(
            tick_micros = self.tick_micros,
            divider = %selection.divider,
            top = selection.top,
            clamped = selection.clamped,
            "tick source armed"
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
