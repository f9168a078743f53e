// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface for hardware entropy sources.
//!
//! An entropy source is a piece of hardware that produces bits whose
//! unpredictability comes from a physical process: a free running
//! oscillator, a shift register clocked from noise, or the low bits of an
//! analog front end. The consumer of this interface is typically an entropy
//! pool that mixes and conditions what it pulls; nothing behind this trait
//! hashes or whitens its output.
//!
//! Every source offers the same capability set so that a consumer can pull
//! from any of them without knowing which hardware is behind it:
//!
//! - `name` and `quality` identify the source and estimate its entropy
//!   density. A quality of 0 means "unknown", otherwise it is the number of
//!   bits of entropy per 1024 bits of output.
//! - `init` brings the hardware up. A `HWFAULT` here means the source should
//!   be abandoned.
//! - `read` moves whole words of output into a byte buffer and returns how
//!   many bytes were written. `Ok(0)` means "nothing right now, try again
//!   later" and is not an error.
//! - `cleanup` stops the hardware again.
//!
//! Operations must be invoked in the sequence `init`, any number of `read`s,
//! `cleanup`, and the sequence may repeat. A source is single-threaded:
//! callers must serialize calls on one instance.
//!
//! Example
//! -------
//!
//! ```rust
//! use kernel::hil::entropy::EntropySource;
//! use kernel::ErrorCode;
//!
//! fn fill(source: &dyn EntropySource, buf: &mut [u8]) -> Result<usize, ErrorCode> {
//!     source.init()?;
//!     let mut filled = 0;
//!     while filled < buf.len() {
//!         let n = source.read(&mut buf[filled..], true)?;
//!         if n == 0 {
//!             break;
//!         }
//!         filled += n;
//!     }
//!     source.cleanup()?;
//!     Ok(filled)
//! }
//! ```

use crate::ErrorCode;

/// The uniform capability set of a hardware entropy source.
pub trait EntropySource {
    /// Human readable identifier, unique among registered sources.
    fn name(&self) -> &str;

    /// Bits of entropy per 1024 bits of output, 0 if unknown.
    fn quality(&self) -> u16;

    /// Bring the hardware from its idle state to generating.
    ///
    /// Return values:
    /// - `Ok(())`: the source is running.
    /// - `HWFAULT`: the hardware reported a fault; the source is dead and
    ///   every later call fails with `BADSTATE`.
    /// - `BADSTATE`: the source is already running or is dead.
    fn init(&self) -> Result<(), ErrorCode>;

    /// Copy available output into `buf`.
    ///
    /// Only whole words are copied, so the returned length is always a
    /// multiple of the source's word size. When `wait` is true the source may
    /// spin the calling thread for a bounded time while the hardware fills;
    /// there is no way to cancel that wait, so callers that need cancellation
    /// should pass `false` and poll on their own schedule.
    ///
    /// Return values:
    /// - `Ok(n)`: `n` bytes were written, possibly 0.
    /// - `INVAL`: `buf` is shorter than one word. No hardware was touched.
    /// - `BADSTATE`: the source is not running.
    fn read(&self, buf: &mut [u8], wait: bool) -> Result<usize, ErrorCode>;

    /// Stop the hardware.
    ///
    /// Calling `cleanup` on a stopped source does nothing and succeeds.
    /// Calling it before `init` or on a dead source fails with `BADSTATE`.
    fn cleanup(&self) -> Result<(), ErrorCode>;
}
