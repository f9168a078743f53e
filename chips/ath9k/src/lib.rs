// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Entropy source for Atheros AR9300 and later wireless MACs.
//!
//! These parts have no random number generator. Instead the baseband ADC can
//! be routed onto the PHY test bus, and the low bits of its samples are
//! noise.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod rng;
