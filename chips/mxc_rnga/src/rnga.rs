// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! RNGA entropy source.
//!
//! The RNGA runs two free running ring oscillators against each other and
//! shifts the result into a 16 word output FIFO. The STATUS register reports
//! how many words the FIFO holds, so one pass reads the level once and then
//! drains up to that many words, checking the error flag after each one.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let regs = unsafe { MmioRegisters::<u32>::new(RNGA_BASE, 0x1000, rnga::REGISTER_SPAN) }?;
//! let rng = rnga::new(regs, &board.delay, &board.rnga_clock);
//! rng.init()?;
//! let n = rng.read(&mut buf, true)?;
//! ```

use kernel::entropy::{HwRng, NoFilter, PollConfig, RngDevice};
use kernel::hil::time::BusyWait;
use kernel::platform::ClockInterface;
use kernel::utilities::mmio::RegisterBlock;
use kernel::utilities::registers::{register_bitfields, FieldValue, LocalRegisterCopy};
use kernel::ErrorCode;

pub const NAME: &str = "mxc-rnga";

/// Size of the register block in bytes.
pub const REGISTER_SPAN: usize = 0x28;

/// Default poll timing: 20 retries, 10 µs apart.
pub const POLL: PollConfig = PollConfig::new(20, 10_000);

const CONTROL: usize = 0x00;
const STATUS: usize = 0x04;
const ENTROPY: usize = 0x08;
const OUTPUT_FIFO: usize = 0x0c;
// 0x10..0x28 hold the oscillator verification registers, which are not used.

register_bitfields![u32,
    Control [
        /// Put the oscillators to sleep
        SLEEP OFFSET(4) NUMBITS(1) [],
        /// Clear the error interrupt
        CLEAR_INT OFFSET(3) NUMBITS(1) [],
        /// Mask the error interrupt
        MASK_INTS OFFSET(2) NUMBITS(1) [],
        /// Raise a security violation on FIFO underflow
        HIGH_ASSURANCE OFFSET(1) NUMBITS(1) [],
        /// Start generating
        GO OFFSET(0) NUMBITS(1) []
    ],
    Status [
        /// Oscillator failure
        OSC_DEAD OFFSET(31) NUMBITS(1) [],
        /// Number of words in the output FIFO, 0 to 16
        LEVEL OFFSET(8) NUMBITS(8) [],
        SLEEP OFFSET(4) NUMBITS(1) [],
        /// Error interrupt pending
        ERROR_INT OFFSET(3) NUMBITS(1) [],
        FIFO_UNDERFLOW OFFSET(2) NUMBITS(1) [],
        LAST_READ_STATUS OFFSET(1) NUMBITS(1) [],
        SECURITY_VIOLATION OFFSET(0) NUMBITS(1) []
    ]
];

/// Register protocol of one RNGA instance.
pub struct Rnga<B: RegisterBlock<u32>> {
    registers: B,
}

/// An RNGA entropy source.
pub type MxcRnga<'a, B> = HwRng<'a, Rnga<B>, NoFilter>;

/// Bind an RNGA whose registers are mapped at `registers`.
///
/// The peripheral clock is switched on here and stays on until the source
/// is released.
pub fn new<'a, B: RegisterBlock<u32>>(
    registers: B,
    delay: &'a dyn BusyWait,
    clock: &'a dyn ClockInterface,
) -> MxcRnga<'a, B> {
    HwRng::new(NAME, Rnga::new(registers), NoFilter, POLL, delay, clock)
}

impl<B: RegisterBlock<u32>> Rnga<B> {
    pub const fn new(registers: B) -> Rnga<B> {
        Rnga { registers }
    }

    fn status(&self) -> LocalRegisterCopy<u32, Status::Register> {
        LocalRegisterCopy::new(self.registers.read_register(STATUS))
    }

    fn modify_control(&self, field: FieldValue<u32, Control::Register>) {
        let ctrl = self.registers.read_register(CONTROL);
        self.registers.write_register(CONTROL, field.modify(ctrl));
    }

    /// Shift `seed` into the generator's entropy register.
    fn write_entropy(&self, seed: u32) {
        self.registers.write_register(ENTROPY, seed);
    }
}

impl<B: RegisterBlock<u32>> RngDevice for Rnga<B> {
    type Word = u32;
    type Sample = u32;

    fn power_up(&self) -> Result<(), ErrorCode> {
        self.modify_control(Control::SLEEP::CLEAR);

        if self.status().is_set(Status::OSC_DEAD) {
            return Err(ErrorCode::HWFAULT);
        }
        Ok(())
    }

    fn enable(&self) {
        self.modify_control(Control::GO::SET);
    }

    fn disable(&self) {
        self.modify_control(Control::GO::CLEAR);
    }

    fn samples_ready(&self, _wanted: usize) -> usize {
        self.status().read(Status::LEVEL) as usize
    }

    fn draw(&self, _index: usize) -> Result<u32, ErrorCode> {
        let value = self.registers.read_register(OUTPUT_FIFO);
        if self.status().is_set(Status::ERROR_INT) {
            return Err(ErrorCode::FAIL);
        }
        Ok(value)
    }

    fn acknowledge_error(&self) {
        self.modify_control(Control::CLEAR_INT::SET);
    }
}

/// Additional input to a running generator.
pub trait EntropyInput {
    /// Mix `seed` into the generator's state.
    ///
    /// Returns `BADSTATE` unless the source is running.
    fn write_entropy(&self, seed: u32) -> Result<(), ErrorCode>;
}

impl<B: RegisterBlock<u32>> EntropyInput for MxcRnga<'_, B> {
    fn write_entropy(&self, seed: u32) -> Result<(), ErrorCode> {
        self.running()?.write_entropy(seed);
        Ok(())
    }
}
