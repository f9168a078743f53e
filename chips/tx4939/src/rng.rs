// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! TX4939 RNG entropy source.
//!
//! The generator fills three 64-bit output registers per generation. A
//! generation is started by writing ST to the control/status register, and
//! ST reads back set until the outputs are valid. Each pass therefore reads
//! RCSR once, collects up to three words and immediately starts the next
//! generation.
//!
//! The registers are 64 bits wide. On a 32-bit kernel an exception taken in
//! the middle of a 64-bit transfer clobbers the upper half of the processor
//! register, so every transfer goes through [`AtomicRegisters`].
//!
//! The first two generations after a reset are of insufficient quality and
//! are discarded by `init`.

use kernel::entropy::{HwRng, NoFilter, PollConfig, RngDevice};
use kernel::hil::time::{cycles_to_ns, BusyWait};
use kernel::platform::{Atomic, ClockInterface};
use kernel::utilities::mmio::{AtomicRegisters, RegisterBlock};
use kernel::utilities::registers::{register_bitfields, LocalRegisterCopy};
use kernel::ErrorCode;

/// Size of the register block in bytes.
pub const REGISTER_SPAN: usize = 0x30;

/// Output registers filled per generation.
pub const OUTPUT_REGISTERS: usize = 3;

/// Default poll timing: a generation takes 90 cycles of the 200 MHz bus
/// clock, and up to 20 of them are waited for.
pub const POLL: PollConfig = PollConfig::new(20, cycles_to_ns(90, 200_000_000));

const RCSR: usize = 0x00;

const fn ror(n: usize) -> usize {
    0x18 + n * 8
}

register_bitfields![u64,
    Rcsr [
        /// Interrupt enable
        INTE OFFSET(3) NUMBITS(1) [],
        /// Reset
        RST OFFSET(2) NUMBITS(1) [],
        /// Generation finished
        FIN OFFSET(1) NUMBITS(1) [],
        /// Start; reads back set while a generation is running
        ST OFFSET(0) NUMBITS(1) []
    ]
];

/// Register protocol of the TX4939 generator.
pub struct Tx4939<B: RegisterBlock<u64>> {
    registers: B,
}

/// A TX4939 entropy source on a bus that may split 64-bit transfers.
pub type Tx4939Rng<'a, B, A> = HwRng<'a, Tx4939<AtomicRegisters<'a, u64, B, A>>, NoFilter>;

/// Bind the generator whose registers are mapped at `registers`.
///
/// `name` is the binding's device name. `chip` provides interrupt control
/// for transfers wider than the processor's word.
pub fn new<'a, B: RegisterBlock<u64>, A: Atomic>(
    name: &'a str,
    registers: B,
    chip: &'a A,
    delay: &'a dyn BusyWait,
    clock: &'a dyn ClockInterface,
) -> Tx4939Rng<'a, B, A> {
    let registers = AtomicRegisters::new(registers, chip);
    HwRng::new(name, Tx4939::new(registers), NoFilter, POLL, delay, clock)
}

impl<B: RegisterBlock<u64>> Tx4939<B> {
    pub const fn new(registers: B) -> Tx4939<B> {
        Tx4939 { registers }
    }

    fn write_rcsr(&self, value: u64) {
        self.registers.write_register(RCSR, value);
    }

    fn start(&self) {
        self.write_rcsr(Rcsr::ST::SET.value);
    }
}

impl<B: RegisterBlock<u64>> RngDevice for Tx4939<B> {
    type Word = u64;
    type Sample = u64;

    const WARMUP_PASSES: usize = 2;

    fn power_up(&self) -> Result<(), ErrorCode> {
        self.write_rcsr(Rcsr::RST::SET.value);
        self.write_rcsr(0);
        Ok(())
    }

    fn enable(&self) {
        self.start();
    }

    fn disable(&self) {
        self.write_rcsr(0);
    }

    fn samples_ready(&self, _wanted: usize) -> usize {
        let rcsr: LocalRegisterCopy<u64, Rcsr::Register> =
            LocalRegisterCopy::new(self.registers.read_register(RCSR));
        if rcsr.is_set(Rcsr::ST) {
            0
        } else {
            OUTPUT_REGISTERS
        }
    }

    fn draw(&self, index: usize) -> Result<u64, ErrorCode> {
        Ok(self.registers.read_register(ror(index)))
    }

    fn end_pass(&self) {
        self.start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use kernel::entropy::State;
    use kernel::hil::entropy::EntropySource;
    use kernel::platform::{NoAtomic, NO_CLOCK_CONTROL};
    use std::vec::Vec;

    const ST: u64 = 1 << 0;
    const FIN: u64 = 1 << 1;
    const RST: u64 = 1 << 2;

    struct CountingAtomic {
        depth: Cell<usize>,
        disables: Cell<usize>,
        enables: Cell<usize>,
    }

    impl CountingAtomic {
        fn new() -> Self {
            CountingAtomic {
                depth: Cell::new(0),
                disables: Cell::new(0),
                enables: Cell::new(0),
            }
        }
    }

    impl Atomic for CountingAtomic {
        fn atomic<F, R>(&self, f: F) -> R
        where
            F: FnOnce() -> R,
        {
            assert_eq!(self.depth.get(), 0, "nested interrupt disable");
            self.depth.set(1);
            self.disables.set(self.disables.get() + 1);
            let r = f();
            self.depth.set(0);
            self.enables.set(self.enables.get() + 1);
            r
        }
    }

    /// Register level model of the generator.
    ///
    /// A started generation completes after `latency` further RCSR reads and
    /// then fills ROR(n) with `generation << 8 | n`.
    struct SimTx4939<'a> {
        rcsr: Cell<u64>,
        ror: [Cell<u64>; 3],
        generation: Cell<u64>,
        latency: usize,
        busy_reads: Cell<usize>,
        stuck: bool,
        writes: RefCell<Vec<u64>>,
        rcsr_reads: Cell<usize>,
        ror_reads: Cell<usize>,
        guard: Option<&'a CountingAtomic>,
    }

    impl<'a> SimTx4939<'a> {
        fn new(latency: usize) -> Self {
            SimTx4939 {
                rcsr: Cell::new(0),
                ror: Default::default(),
                generation: Cell::new(0),
                latency,
                busy_reads: Cell::new(0),
                stuck: false,
                writes: RefCell::new(Vec::new()),
                rcsr_reads: Cell::new(0),
                ror_reads: Cell::new(0),
                guard: None,
            }
        }

        fn check_guard(&self) {
            if let Some(chip) = self.guard {
                assert_eq!(chip.depth.get(), 1, "transfer with interrupts on");
            }
        }

        fn accesses(&self) -> usize {
            self.rcsr_reads.get() + self.ror_reads.get() + self.writes.borrow().len()
        }
    }

    impl RegisterBlock<u64> for SimTx4939<'_> {
        fn read_register(&self, offset: usize) -> u64 {
            self.check_guard();
            if offset == RCSR {
                self.rcsr_reads.set(self.rcsr_reads.get() + 1);
                if self.rcsr.get() & ST != 0 && !self.stuck {
                    if self.busy_reads.get() == 0 {
                        let generation = self.generation.get() + 1;
                        self.generation.set(generation);
                        for (n, reg) in self.ror.iter().enumerate() {
                            reg.set((generation << 8) | n as u64);
                        }
                        self.rcsr.set(FIN);
                    } else {
                        self.busy_reads.set(self.busy_reads.get() - 1);
                    }
                }
                return self.rcsr.get();
            }
            assert!((0x18..0x30).contains(&offset), "read of {offset:#x}");
            self.ror_reads.set(self.ror_reads.get() + 1);
            self.ror[(offset - 0x18) / 8].get()
        }

        fn write_register(&self, offset: usize, value: u64) {
            self.check_guard();
            assert_eq!(offset, RCSR, "write of {offset:#x}");
            self.writes.borrow_mut().push(value);
            if value & RST != 0 {
                self.rcsr.set(0);
                self.generation.set(0);
            } else if value & ST != 0 {
                self.rcsr.set(ST);
                self.busy_reads.set(self.latency);
            } else {
                self.rcsr.set(value);
            }
        }
    }

    #[derive(Default)]
    struct Delay {
        calls: Cell<u32>,
        total_ns: Cell<u32>,
    }

    impl BusyWait for Delay {
        fn spin_ns(&self, ns: u32) {
            self.calls.set(self.calls.get() + 1);
            self.total_ns.set(self.total_ns.get() + ns);
        }
    }

    fn words(buf: &[u8]) -> Vec<u64> {
        buf.chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                u64::from_ne_bytes(b)
            })
            .collect()
    }

    #[test]
    fn register_layout() {
        assert_eq!(ror(0), 0x18);
        assert_eq!(ror(2), 0x28);
        assert_eq!(ror(OUTPUT_REGISTERS), REGISTER_SPAN);
        assert_eq!(POLL.interval_ns, 450);
        assert_eq!(POLL.retries, 20);
    }

    #[test]
    fn init_resets_starts_and_discards_two_generations() {
        let delay = Delay::default();
        let sim = SimTx4939::new(0);
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        assert_eq!(rng.init(), Ok(()));
        assert_eq!(rng.name(), "tx4939-rng");
        assert_eq!(rng.quality(), 0);
        // Reset, release, start, then one restart per warm-up pass.
        assert_eq!(*sim.writes.borrow(), [RST, 0, ST, ST, ST]);
        assert_eq!(sim.ror_reads.get(), 6);

        let mut buf = [0u8; 24];
        assert_eq!(rng.read(&mut buf, false), Ok(24));
        assert_eq!(words(&buf), [0x300, 0x301, 0x302]);
    }

    #[test]
    fn at_most_three_words_per_read() {
        let delay = Delay::default();
        let sim = SimTx4939::new(0);
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        rng.init().unwrap();
        let ror_reads = sim.ror_reads.get();

        let mut buf = [0u8; 64];
        assert_eq!(rng.read(&mut buf, true), Ok(24));
        assert_eq!(sim.ror_reads.get() - ror_reads, 3);

        let mut buf = [0u8; 17];
        assert_eq!(rng.read(&mut buf, true), Ok(16));
        assert_eq!(words(&buf[..16]), [0x400, 0x401]);
    }

    #[test]
    fn waits_for_generation() {
        let delay = Delay::default();
        let sim = SimTx4939::new(3);
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        rng.init().unwrap();
        delay.calls.set(0);
        delay.total_ns.set(0);

        let mut buf = [0u8; 8];
        assert_eq!(rng.read(&mut buf, true), Ok(8));
        assert_eq!(delay.calls.get(), 3);
        assert_eq!(delay.total_ns.get(), 1350);
    }

    #[test]
    fn busy_without_wait() {
        let delay = Delay::default();
        let sim = SimTx4939::new(5);
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        rng.init().unwrap();
        let (reads, calls) = (sim.rcsr_reads.get(), delay.calls.get());

        let mut buf = [0u8; 8];
        assert_eq!(rng.read(&mut buf, false), Ok(0));
        assert_eq!(sim.rcsr_reads.get() - reads, 1);
        assert_eq!(delay.calls.get(), calls);
    }

    #[test]
    fn stuck_generator_fails_warm_up() {
        let delay = Delay::default();
        let sim = SimTx4939 {
            stuck: true,
            ..SimTx4939::new(0)
        };
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        assert_eq!(rng.init(), Err(ErrorCode::HWFAULT));
        assert_eq!(rng.state(), State::Dead);
        assert_eq!(delay.calls.get(), 20);
        assert_eq!(sim.rcsr_reads.get(), 21);
        // Generation is halted again.
        assert_eq!(sim.writes.borrow().last(), Some(&0));
    }

    #[test]
    fn short_buffer_is_rejected_untouched() {
        let delay = Delay::default();
        let sim = SimTx4939::new(0);
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        let mut buf = [0u8; 7];
        assert_eq!(rng.read(&mut buf, true), Err(ErrorCode::INVAL));
        rng.init().unwrap();
        let before = sim.accesses();
        assert_eq!(rng.read(&mut buf, true), Err(ErrorCode::INVAL));
        assert_eq!(sim.accesses(), before);
    }

    #[test]
    fn cleanup_halts_generation() {
        let delay = Delay::default();
        let sim = SimTx4939::new(0);
        let rng = new("tx4939-rng", &sim, &NoAtomic, &delay, &NO_CLOCK_CONTROL);
        rng.init().unwrap();
        assert_eq!(rng.cleanup(), Ok(()));
        assert_eq!(sim.writes.borrow().last(), Some(&0));
        assert_eq!(sim.rcsr.get(), 0);

        let mut buf = [0u8; 8];
        assert_eq!(rng.read(&mut buf, true), Err(ErrorCode::BADSTATE));
    }

    #[test]
    fn every_transfer_is_atomic() {
        let chip = CountingAtomic::new();
        let delay = Delay::default();
        let sim = SimTx4939 {
            guard: Some(&chip),
            ..SimTx4939::new(1)
        };
        let rng = HwRng::new(
            "tx4939-rng",
            Tx4939::new(AtomicRegisters::always(&sim, &chip)),
            NoFilter,
            POLL,
            &delay,
            &NO_CLOCK_CONTROL,
        );
        rng.init().unwrap();
        let mut buf = [0u8; 24];
        assert_eq!(rng.read(&mut buf, true), Ok(24));
        rng.cleanup().unwrap();

        assert_eq!(chip.depth.get(), 0);
        assert_eq!(chip.disables.get(), chip.enables.get());
        assert_eq!(chip.disables.get(), sim.accesses());
    }
}
