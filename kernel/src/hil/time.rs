// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware agnostic interfaces for short synchronous delays.

/// A calibrated busy-wait.
///
/// Entropy sources use this between status polls while a caller has asked to
/// wait for data. The delay is a spin on the calling thread: it does not
/// yield, it cannot be cancelled, and it only has to be *at least* as long
/// as requested.
pub trait BusyWait {
    /// Spin for at least `ns` nanoseconds.
    fn spin_ns(&self, ns: u32);
}

/// Converts a number of cycles of a clock running at `hz` into nanoseconds,
/// rounding up.
pub const fn cycles_to_ns(cycles: u32, hz: u32) -> u32 {
    let ns = (cycles as u64 * 1_000_000_000 + hz as u64 - 1) / hz as u64;
    if ns > u32::MAX as u64 {
        u32::MAX
    } else {
        ns as u32
    }
}
