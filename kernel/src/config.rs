// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Data structure for storing compile-time configuration options in the kernel.
//!
//! Configuration is a typed `const` object rather than scattered `#[cfg]`
//! attributes. Every code path stays type-checked even when the option that
//! guards it is off, and the compiler folds the constant so a disabled
//! option costs nothing in the final binary.
//!
//! Per-device timing is not configured here. Each chip crate exports its own
//! [`PollConfig`](crate::entropy::PollConfig) constant instead.

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, enable the Cargo feature of the same name on
/// the `hwrng-kernel` dependency from the board crate.
pub(crate) struct Config {
    /// Whether every completed `read` should be traced to the log.
    ///
    /// If enabled, each read reports the source name, the number of bytes
    /// delivered and how many poll attempts it took.
    pub(crate) trace_reads: bool,

    /// Whether the ADC pair filter should trace every rejected pair.
    // This is very chatty: a stuck ADC rejects every pair of every pass.
    pub(crate) trace_filter: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. This is the only location in the kernel where `#[cfg(x)]` is used
/// to configure code based on Cargo features.
pub(crate) const CONFIG: Config = Config {
    trace_reads: cfg!(feature = "trace_reads"),
    trace_filter: cfg!(feature = "trace_filter"),
};
