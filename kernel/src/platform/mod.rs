// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces a board provides to the entropy sources it binds.

/// Interrupt control of the processor the source runs on.
///
/// This is the subset of a chip's interface the register layer needs: the
/// ability to make a short span of code atomic with respect to interrupts
/// and context switches.
pub trait Atomic {
    /// Run `f` with interrupt delivery disabled, and re-enable it before
    /// returning.
    ///
    /// Implementations restore the previous interrupt state on every path out
    /// of `f`, so `f` may return early freely. The span should be kept as
    /// short as possible.
    fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R;
}

/// `Atomic` for processors on which every register transfer the caller makes
/// is already a single bus transaction.
pub struct NoAtomic;

impl Atomic for NoAtomic {
    fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
}

/// Generic operations that clock-like things are expected to support.
pub trait ClockInterface {
    fn is_enabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);
}

/// Helper struct for interfaces that expect clocks, but have no clock control
pub struct NoClockControl {}
impl ClockInterface for NoClockControl {
    fn is_enabled(&self) -> bool {
        true
    }
    fn enable(&self) {}
    fn disable(&self) {}
}

/// Instance of NoClockControl for things that need references to `ClockInterface` objects
pub static NO_CLOCK_CONTROL: NoClockControl = NoClockControl {};
