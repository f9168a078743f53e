// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Sample validity filters.
//!
//! A filter sits between the raw samples a device draws from its registers
//! and the words that are handed to the reader. Sources with a dedicated
//! generator use [`NoFilter`], which passes every sample through. Sources
//! that scrape noise off an analog front end use [`AdcPairFilter`] to throw
//! away samples that show the front end is stuck or saturated.
//!
//! Filter state belongs to a single source instance. Two channels must never
//! share a filter, since what counts as "repeated" is per channel.

use core::cell::Cell;

use crate::config;

/// Decides whether a raw sample counts as entropy.
pub trait SampleFilter<S, W> {
    /// Return the word to emit for `sample`, or `None` to drop it.
    fn admit(&self, sample: S) -> Option<W>;
}

/// Identity filter: every sample is a word.
#[derive(Default)]
pub struct NoFilter;

impl<W> SampleFilter<W, W> for NoFilter {
    fn admit(&self, sample: W) -> Option<W> {
        Some(sample)
    }
}

/// Debiasing filter for pairs of 16-bit ADC samples.
///
/// A pair `(v1, v2)` becomes the word `v1 << 16 | v2` unless it looks like
/// the converter is not toggling:
///
/// - either sample is 0 or the saturated value `0xffff`,
/// - both samples are equal,
/// - `v1` repeats the last sample seen in the previous pair.
///
/// The remembered sample is updated to `v2` for every pair, accepted or not,
/// so that the repeat check follows what the hardware really produced.
pub struct AdcPairFilter {
    last: Cell<u16>,
}

impl AdcPairFilter {
    pub const SATURATED: u16 = 0xffff;

    pub const fn new() -> AdcPairFilter {
        AdcPairFilter { last: Cell::new(0) }
    }

    /// The last raw sample observed.
    pub fn last(&self) -> u16 {
        self.last.get()
    }

    fn usable(v: u16) -> bool {
        v != 0 && v != Self::SATURATED
    }
}

impl Default for AdcPairFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleFilter<(u16, u16), u32> for AdcPairFilter {
    fn admit(&self, (v1, v2): (u16, u16)) -> Option<u32> {
        let last = self.last.replace(v2);
        if Self::usable(v1) && Self::usable(v2) && v1 != v2 && v1 != last {
            Some((u32::from(v1) << 16) | u32::from(v2))
        } else {
            if config::CONFIG.trace_filter {
                log::trace!("adc pair {v1:#06x},{v2:#06x} rejected (last {last:#06x})");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::capture_log;
    use log::Level;
    use std::string::String;
    use std::vec::Vec;

    #[test]
    fn passthrough() {
        let f = NoFilter;
        assert_eq!(f.admit(0u32), Some(0));
        assert_eq!(f.admit(u64::MAX), Some(u64::MAX));
    }

    #[test]
    fn stuck_and_saturated_pairs() {
        let raw: [u16; 8] = [0x0001, 0x0001, 0x0002, 0x0003, 0xffff, 0x0004, 0x0005, 0x0005];
        let f = AdcPairFilter::new();
        let words: Vec<u32> = raw
            .chunks(2)
            .filter_map(|p| f.admit((p[0], p[1])))
            .collect();
        assert_eq!(words, [0x0002_0003]);
        assert_eq!(f.last(), 0x0005);
    }

    #[test]
    fn zero_sample_rejected() {
        let f = AdcPairFilter::new();
        assert_eq!(f.admit((0x1234, 0x0000)), None);
        assert_eq!(f.admit((0x0000, 0x1234)), None);
        assert_eq!(f.last(), 0x1234);
    }

    #[test]
    fn repeat_of_rejected_sample_rejected() {
        let f = AdcPairFilter::new();
        // Rejected for saturation, but 0x0042 is still remembered.
        assert_eq!(f.admit((0xffff, 0x0042)), None);
        assert_eq!(f.admit((0x0042, 0x0100)), None);
        assert_eq!(f.admit((0x0101, 0x0102)), Some(0x0101_0102));
    }

    #[test]
    fn instances_do_not_share_state() {
        let a = AdcPairFilter::new();
        let b = AdcPairFilter::new();
        assert_eq!(a.admit((0x0010, 0x0020)), Some(0x0010_0020));
        assert_eq!(b.admit((0x0020, 0x0030)), Some(0x0020_0030));
        assert_eq!(a.admit((0x0020, 0x0030)), None);
    }

    #[test]
    fn rejection_trace_follows_config() {
        let f = AdcPairFilter::new();
        let logged = capture_log::capture(|| {
            assert_eq!(f.admit((0x0010, 0x0020)), Some(0x0010_0020));
            assert_eq!(f.admit((0x0007, 0x0007)), None);
        });
        if config::CONFIG.trace_filter {
            assert_eq!(
                logged,
                [(
                    Level::Trace,
                    String::from("adc pair 0x0007,0x0007 rejected (last 0x0020)")
                )]
            );
        } else {
            assert!(logged.is_empty());
        }
    }
}
