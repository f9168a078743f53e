// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Bounded poll-retry protocol.
//!
//! Hardware generators fill their output some time after they are started.
//! A reader that asked to wait polls the device, and if nothing is there
//! spins for a fixed interval and polls again, for a fixed number of
//! retries. Running out of retries is not a failure; it just means there is
//! no entropy yet.

use crate::hil::time::BusyWait;

/// Per-device poll timing.
///
/// Both values come from the device's documented generation latency. They
/// are configuration rather than literals so a board can adjust them, but
/// the defaults each chip crate exports should be kept unless the hardware
/// timing is known to differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// How many extra polls to make after the first one came back empty.
    pub retries: u32,
    /// Delay before each extra poll, in nanoseconds.
    pub interval_ns: u32,
}

impl PollConfig {
    pub const fn new(retries: u32, interval_ns: u32) -> PollConfig {
        PollConfig {
            retries,
            interval_ns,
        }
    }

    /// Longest time a waiting read can spin, in nanoseconds.
    pub const fn max_wait_ns(&self) -> u64 {
        self.retries as u64 * self.interval_ns as u64
    }
}

/// Result of one poll of the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// Nothing usable yet; polling again may help.
    Pending,
    /// The poll finished with this many words transferred. This may be 0 if
    /// the device reported an error before the first word.
    Done(usize),
}

/// Outcome of [`poll_until_ready`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Polled {
    /// Words transferred, 0 if every poll came back pending.
    pub words: usize,
    /// Number of delays spent between polls.
    pub delays: u32,
}

/// Run `attempt` once, and while it is pending and `wait` is set, up to
/// `config.retries` more times with `config.interval_ns` of spinning before
/// each retry.
pub fn poll_until_ready<F>(
    config: &PollConfig,
    delay: &dyn BusyWait,
    wait: bool,
    mut attempt: F,
) -> Polled
where
    F: FnMut() -> Attempt,
{
    let mut outcome = attempt();
    let mut delays = 0;
    while wait && outcome == Attempt::Pending && delays < config.retries {
        delay.spin_ns(config.interval_ns);
        delays += 1;
        outcome = attempt();
    }

    let words = match outcome {
        Attempt::Pending => 0,
        Attempt::Done(n) => n,
    };
    Polled { words, delays }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct CountingDelay {
        calls: Cell<u32>,
        total_ns: Cell<u64>,
    }

    impl CountingDelay {
        fn new() -> Self {
            CountingDelay {
                calls: Cell::new(0),
                total_ns: Cell::new(0),
            }
        }
    }

    impl BusyWait for CountingDelay {
        fn spin_ns(&self, ns: u32) {
            self.calls.set(self.calls.get() + 1);
            self.total_ns.set(self.total_ns.get() + u64::from(ns));
        }
    }

    const CONFIG: PollConfig = PollConfig::new(20, 10_000);

    #[test]
    fn ready_immediately() {
        let delay = CountingDelay::new();
        let polled = poll_until_ready(&CONFIG, &delay, true, || Attempt::Done(3));
        assert_eq!(polled, Polled { words: 3, delays: 0 });
        assert_eq!(delay.calls.get(), 0);
    }

    #[test]
    fn no_wait_polls_once() {
        let delay = CountingDelay::new();
        let mut polls = 0;
        let polled = poll_until_ready(&CONFIG, &delay, false, || {
            polls += 1;
            Attempt::Pending
        });
        assert_eq!(polled.words, 0);
        assert_eq!(polls, 1);
        assert_eq!(delay.calls.get(), 0);
    }

    #[test]
    fn ready_after_k_delays() {
        for k in 1..=20 {
            let delay = CountingDelay::new();
            let mut polls = 0;
            let polled = poll_until_ready(&CONFIG, &delay, true, || {
                polls += 1;
                if polls > k {
                    Attempt::Done(2)
                } else {
                    Attempt::Pending
                }
            });
            assert_eq!(polled, Polled { words: 2, delays: k });
            assert_eq!(delay.calls.get(), k);
        }
    }

    #[test]
    fn exhausted_retries_yield_nothing() {
        let delay = CountingDelay::new();
        let mut polls = 0;
        let polled = poll_until_ready(&CONFIG, &delay, true, || {
            polls += 1;
            Attempt::Pending
        });
        assert_eq!(polled.words, 0);
        assert_eq!(polls, 21);
        assert_eq!(delay.calls.get(), 20);
        assert_eq!(delay.total_ns.get(), CONFIG.max_wait_ns());
    }

    #[test]
    fn done_with_zero_stops_retrying() {
        let delay = CountingDelay::new();
        let mut polls = 0;
        let polled = poll_until_ready(&CONFIG, &delay, true, || {
            polls += 1;
            Attempt::Done(0)
        });
        assert_eq!(polled.words, 0);
        assert_eq!(polls, 1);
        assert_eq!(delay.calls.get(), 0);
    }
}
