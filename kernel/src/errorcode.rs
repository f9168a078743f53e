// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Standard error enum for entropy source operations

use core::fmt;

/// Errors returned by the register interface and by entropy sources.
///
/// There are deliberately no success-like variants here. Running out of
/// entropy is not an error: a read that finds nothing returns `Ok(0)`, and a
/// read interrupted by a device error returns `Ok` with the bytes that were
/// already transferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// The hardware reported a fault it cannot recover from. The source is
    /// dead until it is bound again.
    HWFAULT = 1,
    /// The operation is not valid in the current lifecycle state
    BADSTATE = 2,
    /// An invalid parameter was passed
    INVAL = 5,
    /// A region or buffer was too small
    SIZE = 6,
    /// Operation or device revision is unsupported
    NOSUPPORT = 9,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            ErrorCode::FAIL => "failure",
            ErrorCode::HWFAULT => "hardware fault",
            ErrorCode::BADSTATE => "invalid state",
            ErrorCode::INVAL => "invalid argument",
            ErrorCode::SIZE => "too small",
            ErrorCode::NOSUPPORT => "unsupported",
        };
        f.write_str(msg)
    }
}
