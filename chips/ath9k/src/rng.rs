// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! ADC noise entropy source.
//!
//! Each pass routes the baseband ADC onto the PHY test bus and then reads
//! two 16-bit samples per requested output word. The samples go through an
//! [`AdcPairFilter`], which drops pairs that show a stuck or saturated
//! converter. There is no ready flag: a pass is always attempted, and a pass
//! in which every pair was dropped counts as "no data yet".

use kernel::entropy::{AdcPairFilter, HwRng, PollConfig, RngDevice};
use kernel::hil::time::BusyWait;
use kernel::platform::ClockInterface;
use kernel::utilities::mmio::RegisterBlock;
use kernel::utilities::registers::{register_bitfields, FieldValue};
use kernel::ErrorCode;

/// Default poll timing: 20 retries, 10 µs apart.
pub const POLL: PollConfig = PollConfig::new(20, 10_000);

const PHY_TEST: usize = 0xa360;
const PHY_TEST_CTL_STATUS: usize = 0xa364;
const PHY_TST_ADC: usize = 0xa368;

/// Bytes of register space the driver needs mapped.
pub const REGISTER_SPAN: usize = PHY_TST_ADC + 4;

const SAMPLE_MASK: u32 = 0xffff;

register_bitfields![u32,
    PhyTest [
        RX_OBS_SEL_BIT5 OFFSET(23) NUMBITS(1) [],
        /// Baseband observation select
        BBB_OBS_SEL OFFSET(19) NUMBITS(4) [
            Off = 0,
            Adc = 1
        ]
    ],
    PhyTestCtlStatus [
        /// Receive observation select
        RX_OBS_SEL OFFSET(10) NUMBITS(4) []
    ]
];

/// MAC silicon version and revision, as read from the SREV register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MacRevision {
    pub version: u32,
    pub revision: u16,
}

impl MacRevision {
    const VERSION_9300: u32 = 0x1c0;
    const REVISION_9300_20: u16 = 2;

    /// Whether this is an AR9300 2.0 or later part, the first to route the
    /// ADC onto the test bus.
    pub fn has_adc_test_bus(&self) -> bool {
        self.version > Self::VERSION_9300
            || (self.version == Self::VERSION_9300 && self.revision >= Self::REVISION_9300_20)
    }
}

/// Power-save control of the MAC.
///
/// The PHY must be awake while the test bus is sampled.
pub trait PowerSave {
    /// Hold the MAC awake.
    fn wakeup(&self);
    /// Drop the hold taken by `wakeup`.
    fn restore(&self);
}

/// For MACs that never sleep.
pub struct NoPowerSave;

impl PowerSave for NoPowerSave {
    fn wakeup(&self) {}
    fn restore(&self) {}
}

/// Register protocol of the ADC sampler.
pub struct Ath9kAdc<'a, B: RegisterBlock<u32>> {
    registers: B,
    power: &'a dyn PowerSave,
}

/// An ath9k ADC entropy source.
pub type Ath9kRng<'a, B> = HwRng<'a, Ath9kAdc<'a, B>, AdcPairFilter>;

/// Bind the sampler of the MAC whose registers are mapped at `registers`.
///
/// `name` is the binding's device name. Returns `NOSUPPORT` if the MAC is
/// older than AR9300 2.0.
pub fn new<'a, B: RegisterBlock<u32>>(
    name: &'a str,
    registers: B,
    revision: MacRevision,
    power: &'a dyn PowerSave,
    delay: &'a dyn BusyWait,
    clock: &'a dyn ClockInterface,
) -> Result<Ath9kRng<'a, B>, ErrorCode> {
    let adc = Ath9kAdc::new(registers, revision, power)?;
    Ok(HwRng::new(name, adc, AdcPairFilter::new(), POLL, delay, clock))
}

impl<'a, B: RegisterBlock<u32>> Ath9kAdc<'a, B> {
    pub fn new(
        registers: B,
        revision: MacRevision,
        power: &'a dyn PowerSave,
    ) -> Result<Ath9kAdc<'a, B>, ErrorCode> {
        if !revision.has_adc_test_bus() {
            log::debug!(
                "ath9k: MAC {:#x} rev {} has no ADC test bus",
                revision.version,
                revision.revision
            );
            return Err(ErrorCode::NOSUPPORT);
        }
        Ok(Ath9kAdc { registers, power })
    }

    fn modify_phy_test(&self, field: FieldValue<u32, PhyTest::Register>) {
        let val = self.registers.read_register(PHY_TEST);
        self.registers.write_register(PHY_TEST, field.modify(val));
    }

    fn sample(&self) -> u16 {
        (self.registers.read_register(PHY_TST_ADC) & SAMPLE_MASK) as u16
    }
}

impl<B: RegisterBlock<u32>> RngDevice for Ath9kAdc<'_, B> {
    type Word = u32;
    type Sample = (u16, u16);

    const QUALITY: u16 = 320;

    fn power_up(&self) -> Result<(), ErrorCode> {
        Ok(())
    }

    // The test bus is routed at the start of every pass.
    fn enable(&self) {}

    fn disable(&self) {
        self.power.wakeup();
        self.modify_phy_test(PhyTest::BBB_OBS_SEL::Off);
        self.power.restore();
    }

    fn samples_ready(&self, wanted: usize) -> usize {
        wanted
    }

    fn begin_pass(&self) {
        self.power.wakeup();
        self.modify_phy_test(PhyTest::BBB_OBS_SEL::Adc);
        self.modify_phy_test(PhyTest::RX_OBS_SEL_BIT5::CLEAR);
        let ctl = self.registers.read_register(PHY_TEST_CTL_STATUS);
        self.registers.write_register(
            PHY_TEST_CTL_STATUS,
            PhyTestCtlStatus::RX_OBS_SEL.val(0).modify(ctl),
        );
    }

    fn draw(&self, _index: usize) -> Result<(u16, u16), ErrorCode> {
        let v1 = self.sample();
        let v2 = self.sample();
        Ok((v1, v2))
    }

    fn end_pass(&self) {
        self.power.restore();
    }
}
