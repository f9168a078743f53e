// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Generic hardware entropy harvesting.
//!
//! Chip crates implement [`RngDevice`] for their register protocol and wrap
//! it in a [`HwRng`], which provides the [`EntropySource`] interface.
//!
//! [`EntropySource`]: crate::hil::entropy::EntropySource

pub mod filter;
pub mod poll;
mod source;

pub use self::filter::{AdcPairFilter, NoFilter, SampleFilter};
pub use self::poll::{poll_until_ready, Attempt, PollConfig, Polled};
pub use self::source::{HwRng, RngDevice, State};
