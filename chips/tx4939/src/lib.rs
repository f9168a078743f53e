// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Driver for the random number generator of the Toshiba TX4939 SoC.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod rng;
