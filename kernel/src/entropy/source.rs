// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Generic hardware entropy source.
//!
//! [`HwRng`] owns one device and drives it through its lifecycle:
//!
//! ```text
//!            init            cleanup
//!   Asleep ────────> Running ───────> Stopped
//!      │               ^                 │
//!      │               └──── init ───────┘
//!      │ init fails
//!      v
//!    Dead  (terminal, rebind the device to recover)
//! ```
//!
//! A read is one or more *passes* over the device, run by the poll-retry
//! protocol. A pass queries the fill status once and, if samples are there,
//! draws them one at a time through the source's [`SampleFilter`] into the
//! reader's buffer. A pass that finds nothing, or whose samples were all
//! rejected by the filter, is pending and may be retried. A pass that is
//! cut short by a device error acknowledges the error and ends the read
//! with whatever it had already transferred.

use core::cell::Cell;
use core::cmp;

use crate::config;
use crate::entropy::filter::SampleFilter;
use crate::entropy::poll::{poll_until_ready, Attempt, PollConfig, Polled};
use crate::hil::entropy::EntropySource;
use crate::hil::time::BusyWait;
use crate::platform::ClockInterface;
use crate::utilities::mmio::Word;
use crate::ErrorCode;

/// Scratch space used to throw away warm-up output.
const WARMUP_SCRATCH_BYTES: usize = 64;

/// The register protocol of one family of RNG hardware.
///
/// Implementations own their register block and translate these calls into
/// register accesses. They keep no lifecycle state of their own; `HwRng`
/// makes sure the calls come in a valid order.
pub trait RngDevice {
    /// Native transfer width.
    type Word: Word;
    /// What one `draw` returns, before filtering.
    type Sample: Copy;

    /// Bits of entropy per 1024 bits of output, 0 if unknown.
    const QUALITY: u16 = 0;
    /// Number of full passes to discard after the device is first enabled.
    const WARMUP_PASSES: usize = 0;

    /// Take the device out of its low-power state and check its health
    /// indicator. Returns `HWFAULT` if the hardware reports itself broken.
    fn power_up(&self) -> Result<(), ErrorCode>;

    /// Start generating.
    fn enable(&self);

    /// Stop generating.
    fn disable(&self);

    /// Query the fill status once and return how many samples can be drawn
    /// right now, 0 if none. `wanted` is how many the reader has room for;
    /// devices without a fill level simply return it.
    fn samples_ready(&self, wanted: usize) -> usize;

    /// Called before the first `draw` of a pass.
    fn begin_pass(&self) {}

    /// Read sample `index` of the current pass.
    ///
    /// Returns an error if the device flagged a problem with this transfer.
    /// The sample is then discarded and the pass ends.
    fn draw(&self, index: usize) -> Result<Self::Sample, ErrorCode>;

    /// Called after the last `draw` of a pass, including a pass cut short
    /// by an error.
    fn end_pass(&self) {}

    /// Clear the error condition reported by `draw`.
    fn acknowledge_error(&self) {}
}

/// Lifecycle state of an entropy source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Bound but never started; hardware idle.
    Asleep,
    /// Generating.
    Running,
    /// Halted by `cleanup`; the register block is still valid.
    Stopped,
    /// The hardware reported a fault. Terminal.
    Dead,
}

/// A hardware entropy source built from a device and a sample filter.
pub struct HwRng<'a, D: RngDevice, F> {
    name: &'a str,
    device: D,
    filter: F,
    state: Cell<State>,
    poll: Cell<PollConfig>,
    delay: &'a dyn BusyWait,
    clock: &'a dyn ClockInterface,
}

impl<'a, D, F> HwRng<'a, D, F>
where
    D: RngDevice,
    F: SampleFilter<D::Sample, D::Word>,
{
    /// Bind a source to a device whose register block has been mapped.
    ///
    /// The clock is enabled here if it is not already, so it is running
    /// before `init` touches the device. Boards without clock gating pass
    /// `&NO_CLOCK_CONTROL`.
    pub fn new(
        name: &'a str,
        device: D,
        filter: F,
        poll: PollConfig,
        delay: &'a dyn BusyWait,
        clock: &'a dyn ClockInterface,
    ) -> HwRng<'a, D, F> {
        if !clock.is_enabled() {
            clock.enable();
        }
        HwRng {
            name,
            device,
            filter,
            state: Cell::new(State::Asleep),
            poll: Cell::new(poll),
            delay,
            clock,
        }
    }

    /// Unbind the source: stop the hardware if it is still running, gate its
    /// clock, and hand the device back.
    pub fn release(self) -> D {
        if self.state.get() == State::Running {
            self.device.disable();
        }
        self.clock.disable();
        self.device
    }

    pub fn state(&self) -> State {
        self.state.get()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// The device, if the source is running.
    ///
    /// Device-specific operations that need the generator active go through
    /// here.
    pub fn running(&self) -> Result<&D, ErrorCode> {
        match self.state.get() {
            State::Running => Ok(&self.device),
            _ => Err(ErrorCode::BADSTATE),
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll.get()
    }

    pub fn set_poll_config(&self, poll: PollConfig) {
        self.poll.set(poll);
    }

    /// Stop the device for good and report `err` to the caller.
    fn fail(&self, err: ErrorCode, why: &str) -> ErrorCode {
        self.device.disable();
        self.state.set(State::Dead);
        log::error!("{}: {}: {}", self.name, why, err);
        err
    }

    /// One status query and, if the device is ready, one transfer.
    fn pass(&self, buf: &mut [u8]) -> Attempt {
        let width = D::Word::BYTES;
        let wanted = buf.len() / width;
        let ready = self.device.samples_ready(wanted);
        if ready == 0 {
            return Attempt::Pending;
        }

        let mut slots = buf.chunks_exact_mut(width);
        let mut accepted = 0;
        let mut faulted = false;
        self.device.begin_pass();
        for index in 0..cmp::min(ready, wanted) {
            match self.device.draw(index) {
                Ok(sample) => {
                    if let Some(word) = self.filter.admit(sample) {
                        if let Some(slot) = slots.next() {
                            word.copy_to(slot);
                            accepted += 1;
                        }
                    }
                }
                Err(_) => {
                    log::debug!("{}: error while reading random number", self.name);
                    self.device.acknowledge_error();
                    faulted = true;
                    break;
                }
            }
        }
        self.device.end_pass();

        if accepted == 0 && !faulted {
            Attempt::Pending
        } else {
            Attempt::Done(accepted)
        }
    }

    fn harvest(&self, buf: &mut [u8], wait: bool) -> Polled {
        let poll = self.poll.get();
        poll_until_ready(&poll, self.delay, wait, || self.pass(&mut *buf))
    }

    fn warm_up(&self) -> Result<(), ErrorCode> {
        let mut scratch = [0u8; WARMUP_SCRATCH_BYTES];
        for _ in 0..D::WARMUP_PASSES {
            if self.harvest(&mut scratch, true).words == 0 {
                return Err(self.fail(ErrorCode::HWFAULT, "no output during warm-up"));
            }
        }
        Ok(())
    }
}

impl<D, F> EntropySource for HwRng<'_, D, F>
where
    D: RngDevice,
    F: SampleFilter<D::Sample, D::Word>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn quality(&self) -> u16 {
        D::QUALITY
    }

    fn init(&self) -> Result<(), ErrorCode> {
        match self.state.get() {
            State::Asleep | State::Stopped => {}
            State::Running | State::Dead => return Err(ErrorCode::BADSTATE),
        }

        if let Err(err) = self.device.power_up() {
            return Err(self.fail(err, "power-up failed"));
        }
        self.device.enable();
        self.state.set(State::Running);
        self.warm_up()
    }

    fn read(&self, buf: &mut [u8], wait: bool) -> Result<usize, ErrorCode> {
        let width = D::Word::BYTES;
        let capacity = buf.len() / width * width;
        if capacity == 0 {
            return Err(ErrorCode::INVAL);
        }
        if self.state.get() != State::Running {
            return Err(ErrorCode::BADSTATE);
        }

        let polled = self.harvest(&mut buf[..capacity], wait);
        let bytes = polled.words * width;
        if config::CONFIG.trace_reads {
            log::trace!(
                "{}: read {} bytes after {} delays",
                self.name,
                bytes,
                polled.delays
            );
        }
        Ok(bytes)
    }

    fn cleanup(&self) -> Result<(), ErrorCode> {
        match self.state.get() {
            State::Running => {
                self.device.disable();
                self.state.set(State::Stopped);
                Ok(())
            }
            State::Stopped => Ok(()),
            State::Asleep | State::Dead => Err(ErrorCode::BADSTATE),
        }
    }
}
