// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core hardware RNG kernel
//!
//! The kernel crate implements the shared machinery that every hardware
//! random number generator driver in this tree builds on, and it holds the
//! Hardware Interface Layer (HIL) definitions through which an entropy
//! consumer talks to those drivers.
//!
//! A driver in one of the `chips/` crates only describes its register
//! protocol by implementing [`entropy::RngDevice`]. The generic
//! [`entropy::HwRng`] wraps such a device, runs the lifecycle state machine
//! and the bounded poll-retry protocol, applies the sample filter, and
//! exposes the result as a [`hil::entropy::EntropySource`].
//!
//! Most `unsafe` code is in this kernel crate, inside
//! [`utilities::mmio`].

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod entropy;
pub mod hil;
pub mod platform;
pub mod utilities;

mod config;
mod errorcode;

pub use crate::errorcode::ErrorCode;
