// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Driver for the Random Number Generator Accelerator (RNGA) found on
//! Freescale i.MX21 and i.MX31 SoCs.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod rnga;
