//! Temperature estimation: ADC counts in, one averaged Celsius value out.
//!
//! Each control iteration runs `samples_per_pass` measurement passes.  A
//! pass reads every configured channel once, converts each count through
//! the [`ThermistorModel`], and averages across channels.  The estimate is
//! the mean of the pass means: channel averaging damps ADC quantization,
//! pass averaging suppresses single-read spikes.

pub mod thermistor;

use log::error;

use crate::app::ports::AdcPort;
use crate::config::SensingConfig;
use crate::error::{Result, SafetyFault, SensorError};
use thermistor::{ADC_MAX, ThermistorModel};

/// Highest MCP3008 channel.
pub const MAX_CHANNEL: u8 = 7;

/// One ADC conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub channel: u8,
    pub count: u16,
}

/// Output of one estimation round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureEstimate {
    pub celsius: f32,
    /// Passes averaged (always ≥ 1).
    pub sample_count: u16,
    /// Channels averaged per pass (always ≥ 1).
    pub channel_count: u8,
}

/// Converts and averages thermistor readings.
pub struct TemperatureEstimator {
    channels: heapless::Vec<u8, 8>,
    samples_per_pass: u16,
    max_temperature_c: f32,
    model: ThermistorModel,
}

impl TemperatureEstimator {
    pub fn new(config: &SensingConfig) -> Self {
        Self {
            channels: config.channels.clone(),
            samples_per_pass: config.samples_per_pass.max(1),
            max_temperature_c: config.max_temperature_c,
            model: config.model,
        }
    }

    /// Read one channel and validate the transport result.
    pub fn sample(adc: &mut impl AdcPort, channel: u8) -> Result<RawSample> {
        if channel > MAX_CHANNEL {
            return Err(SensorError::ChannelOutOfRange(channel).into());
        }
        let count = adc.read(channel)?;
        if count > ADC_MAX {
            return Err(SensorError::CountOutOfRange(count).into());
        }
        Ok(RawSample { channel, count })
    }

    /// Run every pass and return the averaged estimate.
    ///
    /// Any read failure aborts the round; no stale value is substituted.
    /// An estimate above the configured maximum returns
    /// [`SafetyFault::OverTemperature`].
    pub fn estimate(&self, adc: &mut impl AdcPort) -> Result<TemperatureEstimate> {
        if self.channels.is_empty() {
            return Err(SensorError::ChannelOutOfRange(u8::MAX).into());
        }

        let mut sum_of_means = 0.0_f32;
        for _ in 0..self.samples_per_pass {
            let mut pass_sum = 0.0_f32;
            for &channel in &self.channels {
                let sample = Self::sample(adc, channel)?;
                pass_sum += self.model.celsius(sample.count);
            }
            sum_of_means += pass_sum / self.channels.len() as f32;
        }

        let estimate = TemperatureEstimate {
            celsius: sum_of_means / f32::from(self.samples_per_pass),
            sample_count: self.samples_per_pass,
            channel_count: self.channels.len() as u8,
        };

        if estimate.celsius > self.max_temperature_c {
            error!(
                "Over temperature: {:.2}\u{00b0}C > {:.1}\u{00b0}C limit",
                estimate.celsius, self.max_temperature_c
            );
            return Err(SafetyFault::OverTemperature.into());
        }

        Ok(estimate)
    }
}
