//! Blocking pulse sequencer for the weld output.
//!
//! A fire runs to completion: nothing is polled or redrawn while the output
//! is pulsing and there is no way to cancel a started sequence.

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use log::debug;

use crate::settings::WeldSettings;

/// Shape of one fire sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PulsePlan {
    pub count: u8,
    /// Duration of the ON half and of the OFF half of every pulse.
    pub half_period_ms: u16,
}

impl PulsePlan {
    pub const fn new(count: u8, half_period_ms: u16) -> Self {
        Self {
            count,
            half_period_ms,
        }
    }

    /// Wall time of the whole sequence.
    pub const fn total_ms(&self) -> u32 {
        2 * self.count as u32 * self.half_period_ms as u32
    }
}

impl From<&WeldSettings> for PulsePlan {
    fn from(settings: &WeldSettings) -> Self {
        Self::new(settings.repeat_count, settings.delay_ms)
    }
}

/// Drives the weld output with a blocking delay provider.
#[derive(Debug)]
pub struct PulseSequencer<OUT, D> {
    output: OUT,
    delay: D,
}

impl<OUT, D> PulseSequencer<OUT, D>
where
    OUT: OutputPin,
    D: DelayNs,
{
    pub fn new(output: OUT, delay: D) -> Self {
        Self { output, delay }
    }

    /// Releases the owned output and delay.
    pub fn release(self) -> (OUT, D) {
        (self.output, self.delay)
    }

    /// Runs `plan.count` ON/OFF pulses. On an output fault the output is
    /// driven low (best effort) and the fault is returned.
    pub fn fire(&mut self, plan: PulsePlan) -> Result<(), OUT::Error> {
        debug!(
            "fire: {} pulses x {} ms ({} ms total)",
            plan.count,
            plan.half_period_ms,
            plan.total_ms()
        );

        let result = self.run(plan);
        if result.is_err() {
            let _ = self.output.set_low();
        }
        result
    }

    fn run(&mut self, plan: PulsePlan) -> Result<(), OUT::Error> {
        for _ in 0..plan.count {
            self.output.set_high()?;
            self.delay.delay_ms(plan.half_period_ms as u32);
            self.output.set_low()?;
            self.delay.delay_ms(plan.half_period_ms as u32);
        }
        Ok(())
    }
}
