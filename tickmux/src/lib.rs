/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! tickmux – timer-multiplexed cooperative scheduler
//!
//! One hardware countdown timer and its overflow interrupt are shared by up
//! to a fixed number of software timers, each cyclic or one-shot.  Every
//! other subsystem of the embedding device schedules its periodic work
//! through [`scheduler::Scheduler::attach`] / `detach` and never touches the
//! counter hardware directly.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/     – YAML scheduler configuration (tick resolution, capacity, clock)
//! ├── rate/       – divider search that fits the tick rate into the counter width
//! ├── clock/      – hardware tick source: Counter trait, TickSource, sim driver
//! ├── scheduler/  – timer table & dispatcher
//! └── slot.rs     – timer slot data model
//! ```

pub mod clock;
pub mod config;
pub mod rate;
pub mod scheduler;
pub mod slot;
