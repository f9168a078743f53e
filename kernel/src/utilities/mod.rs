// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Utility types and macros provided by the kernel crate.

pub mod mmio;

#[cfg(test)]
pub(crate) mod capture_log;

/// The Tock Register Interface.
///
/// This is a re-export of the `tock-registers` crate provided for
/// convenience, so that chip crates declare their bitfields with
/// `kernel::utilities::registers::register_bitfields!` and decode register
/// values with `LocalRegisterCopy`.
pub mod registers {
    pub use tock_registers::fields::{Field, FieldValue};
    pub use tock_registers::interfaces;
    pub use tock_registers::register_bitfields;
    pub use tock_registers::registers::{ReadOnly, ReadWrite};
    pub use tock_registers::{LocalRegisterCopy, RegisterLongName, UIntLike};
}
