// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Offset-addressed access to a device's register block.
//!
//! Entropy source drivers address their registers by byte offset, the way
//! datasheets list them, through the [`RegisterBlock`] trait. On hardware the
//! block is a [`MmioRegisters`]: a window of `tock-registers` cells laid over
//! the device's memory mapped I/O range, so every access is a volatile load
//! or store that the compiler cannot merge, reorder or elide.
//!
//! The window is validated once, when it is created from the binding's
//! address range. Register offsets are a closed, fixed layout per device and
//! are only checked with `debug_assert!` on each access.
//!
//! Some devices have registers wider than the bus can move in one
//! transaction, for example 64-bit registers read over a 32-bit data path.
//! An interrupt taken between the two halves of such a transfer can clobber
//! the half already loaded. [`AtomicRegisters`] wraps a block so that each
//! individual transfer runs with interrupts disabled:
//!
//! ```rust
//! use kernel::platform::NoAtomic;
//! use kernel::utilities::mmio::{AtomicRegisters, MmioRegisters, RegisterBlock};
//!
//! # let window: &'static mut [u64; 6] = Box::leak(Box::new([0; 6]));
//! # let base = window.as_mut_ptr() as usize;
//! let regs = unsafe { MmioRegisters::<u64>::new(base, 0x30, 0x30) }.unwrap();
//! let regs = AtomicRegisters::new(regs, &NoAtomic);
//! regs.write_register(0x18, 0x5a5a);
//! assert_eq!(regs.read_register(0x18), 0x5a5a);
//! ```

use core::marker::PhantomData;
use core::mem::size_of;

use crate::platform::Atomic;
use crate::utilities::registers::interfaces::{Readable, Writeable};
use crate::utilities::registers::{ReadWrite, UIntLike};
use crate::ErrorCode;

/// A native register word: the unit a device moves per register transfer.
pub trait Word: UIntLike {
    /// Width of the word in bytes.
    const BYTES: usize;

    /// Store the word into `out` in native byte order. `out` is exactly
    /// `BYTES` long.
    fn copy_to(self, out: &mut [u8]);
}

impl Word for u32 {
    const BYTES: usize = 4;

    fn copy_to(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_ne_bytes());
    }
}

impl Word for u64 {
    const BYTES: usize = 8;

    fn copy_to(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_ne_bytes());
    }
}

/// Register-level access to one device.
///
/// `offset` is a byte offset from the start of the block and must lie in the
/// device's documented register range.
pub trait RegisterBlock<W: UIntLike> {
    fn read_register(&self, offset: usize) -> W;
    fn write_register(&self, offset: usize, value: W);
}

impl<W: UIntLike, B: RegisterBlock<W> + ?Sized> RegisterBlock<W> for &B {
    fn read_register(&self, offset: usize) -> W {
        (**self).read_register(offset)
    }

    fn write_register(&self, offset: usize, value: W) {
        (**self).write_register(offset, value)
    }
}

/// A memory mapped register window.
pub struct MmioRegisters<W: UIntLike + 'static> {
    registers: &'static [ReadWrite<W>],
}

impl<W: UIntLike + 'static> MmioRegisters<W> {
    /// Lay a register window over `len` bytes of I/O memory at `base`.
    ///
    /// `span` is the size of the device's register layout. The mapping must
    /// cover it (`SIZE` otherwise), and both `base` and `span` must be
    /// multiples of the word size (`INVAL` otherwise).
    ///
    /// # Safety
    ///
    /// `base..base + len` must be a mapping of device registers that stays
    /// valid for the rest of the program, and no other window may be created
    /// over the same range.
    pub unsafe fn new(base: usize, len: usize, span: usize) -> Result<Self, ErrorCode> {
        let word = size_of::<W>();
        if base == 0 || base % word != 0 || span == 0 || span % word != 0 {
            return Err(ErrorCode::INVAL);
        }
        if len < span {
            return Err(ErrorCode::SIZE);
        }
        // Safety: the caller guarantees the range is mapped, exclusively
        // ours, and 'static. tock-registers cells are repr(transparent) over
        // the word type.
        let registers =
            unsafe { core::slice::from_raw_parts(base as *const ReadWrite<W>, span / word) };
        Ok(MmioRegisters { registers })
    }

    /// Size of the register layout in bytes.
    pub fn span(&self) -> usize {
        self.registers.len() * size_of::<W>()
    }

    fn register(&self, offset: usize) -> &ReadWrite<W> {
        debug_assert!(offset % size_of::<W>() == 0, "unaligned register {offset:#x}");
        debug_assert!(offset < self.span(), "register {offset:#x} outside block");
        &self.registers[offset / size_of::<W>()]
    }
}

impl<W: UIntLike + 'static> RegisterBlock<W> for MmioRegisters<W> {
    fn read_register(&self, offset: usize) -> W {
        self.register(offset).get()
    }

    fn write_register(&self, offset: usize, value: W) {
        self.register(offset).set(value);
    }
}

/// A register block whose transfers are each made atomic with respect to
/// interrupts.
///
/// Only the transfer itself is covered: interrupts are disabled immediately
/// before one register read or write and re-enabled immediately after it.
pub struct AtomicRegisters<'a, W, B, A: Atomic> {
    block: B,
    chip: &'a A,
    split: bool,
    _word: PhantomData<W>,
}

impl<'a, W: Word, B: RegisterBlock<W>, A: Atomic> AtomicRegisters<'a, W, B, A> {
    /// Wrap `block`, disabling interrupts around transfers only if `W` is
    /// wider than the processor's native word.
    pub fn new(block: B, chip: &'a A) -> Self {
        AtomicRegisters {
            block,
            chip,
            split: size_of::<W>() > size_of::<usize>(),
            _word: PhantomData,
        }
    }

    /// Wrap `block`, disabling interrupts around every transfer regardless of
    /// the processor's word size.
    pub fn always(block: B, chip: &'a A) -> Self {
        AtomicRegisters {
            block,
            chip,
            split: true,
            _word: PhantomData,
        }
    }

    /// Whether transfers run with interrupts disabled.
    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn inner(&self) -> &B {
        &self.block
    }

    fn transfer<R, F: FnOnce() -> R>(&self, f: F) -> R {
        if self.split {
            self.chip.atomic(f)
        } else {
            f()
        }
    }
}

impl<W: Word, B: RegisterBlock<W>, A: Atomic> RegisterBlock<W> for AtomicRegisters<'_, W, B, A> {
    fn read_register(&self, offset: usize) -> W {
        self.transfer(|| self.block.read_register(offset))
    }

    fn write_register(&self, offset: usize, value: W) {
        self.transfer(|| self.block.write_register(offset, value))
    }
}
