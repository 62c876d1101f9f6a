//! Raspberry Pi hardware adapter.
//!
//! Bridges the real peripherals to the port traits:
//!
//! | Port          | Peripheral                                        |
//! |---------------|---------------------------------------------------|
//! | `AdcPort`     | MCP3008 on SPI0/CE0                               |
//! | `ActuatorPort`| direction GPIO, PWM0/PWM1 hardware, soft-PWM fan  |
//! | buttons       | GPIO async interrupts → [`SetpointInbox`]         |
//!
//! This is the only module that touches hardware.  rppal resets every
//! claimed pin and disables the hardware PWM channels on drop, so the
//! outputs also go dark if the process unwinds.

use std::sync::Arc;

use anyhow::Context;
use log::{debug, info};
use rppal::gpio::{Event, Gpio, InputPin, OutputPin, Trigger};
use rppal::pwm::{Channel, Polarity, Pwm};
use rppal::spi::{Bus, Mode as SpiMode, SlaveSelect, Spi};

use crate::app::ports::{ActuatorPort, AdcPort};
use crate::config::WiringConfig;
use crate::drivers::button::{Edge, EdgeButton};
use crate::drivers::direction::DirectionPin;
use crate::drivers::mcp3008::{self, FRAME_LEN};
use crate::error::{ActuatorError, SensorError};
use crate::pins;
use crate::setpoint::{SetpointAdjust, SetpointInbox};

/// Duty units per full period.
const DUTY_SCALE: f64 = 1_000_000.0;

enum PwmOutput {
    Hardware(Pwm),
    Software(OutputPin),
}

impl PwmOutput {
    fn set(&mut self, frequency_hz: u32, duty: u32) -> Result<(), ActuatorError> {
        if frequency_hz == 0 || duty == 0 {
            return self.off();
        }
        let cycle = (f64::from(duty) / DUTY_SCALE).clamp(0.0, 1.0);
        let hz = f64::from(frequency_hz);
        match self {
            Self::Hardware(pwm) => {
                pwm.set_frequency(hz, cycle)
                    .map_err(|_| ActuatorError::PwmWriteFailed)?;
                pwm.enable().map_err(|_| ActuatorError::PwmWriteFailed)
            }
            Self::Software(pin) => pin
                .set_pwm_frequency(hz, cycle)
                .map_err(|_| ActuatorError::PwmWriteFailed),
        }
    }

    fn off(&mut self) -> Result<(), ActuatorError> {
        match self {
            Self::Hardware(pwm) => pwm.disable().map_err(|_| ActuatorError::PwmWriteFailed),
            Self::Software(pin) => {
                pin.clear_pwm().map_err(|_| ActuatorError::PwmWriteFailed)?;
                pin.set_low();
                Ok(())
            }
        }
    }
}

/// Concrete adapter owning every claimed peripheral.
pub struct RpiHardware {
    spi: Spi,
    direction_gpio: u8,
    direction: DirectionPin<OutputPin>,
    /// `(wiring channel, output)` pairs.
    pwm: [(u8, PwmOutput); 3],
    /// Held so their interrupt callbacks stay registered.
    buttons: Vec<InputPin>,
}

impl RpiHardware {
    /// Claim SPI, the direction pin, and the three PWM outputs.
    pub fn new(wiring: &WiringConfig) -> anyhow::Result<Self> {
        let spi = Spi::new(
            Bus::Spi0,
            SlaveSelect::Ss0,
            pins::ADC_SPI_CLOCK_HZ,
            SpiMode::Mode0,
        )
        .context("opening SPI0 for the MCP3008")?;

        let gpio = Gpio::new().context("opening GPIO")?;
        let direction = gpio
            .get(wiring.direction_pin)
            .with_context(|| format!("claiming direction GPIO {}", wiring.direction_pin))?
            .into_output_low();

        let element = Pwm::with_frequency(Channel::Pwm0, 1_000.0, 0.0, Polarity::Normal, false)
            .context("opening PWM0 (element)")?;
        let outer = Pwm::with_frequency(Channel::Pwm1, 1_000.0, 0.0, Polarity::Normal, false)
            .context("opening PWM1 (outer fan)")?;
        let inner = gpio
            .get(pins::INNER_FAN_GPIO)
            .with_context(|| format!("claiming inner fan GPIO {}", pins::INNER_FAN_GPIO))?
            .into_output_low();

        info!(
            "Hardware ready: MCP3008 on SPI0, direction GPIO {}, PWM channels {}/{}/{}",
            wiring.direction_pin,
            wiring.element_channel,
            wiring.outer_fan_channel,
            wiring.inner_fan_channel
        );

        Ok(Self {
            spi,
            direction_gpio: wiring.direction_pin,
            direction: DirectionPin::new(direction),
            pwm: [
                (wiring.element_channel, PwmOutput::Hardware(element)),
                (wiring.outer_fan_channel, PwmOutput::Hardware(outer)),
                (wiring.inner_fan_channel, PwmOutput::Software(inner)),
            ],
            buttons: Vec::new(),
        })
    }

    /// Register falling-edge interrupts on both setpoint buttons.
    pub fn attach_buttons(
        &mut self,
        wiring: &WiringConfig,
        inbox: Arc<SetpointInbox>,
    ) -> anyhow::Result<()> {
        let gpio = Gpio::new().context("opening GPIO")?;
        for (pin, adjust) in [
            (wiring.increment_pin, SetpointAdjust::Increment),
            (wiring.decrement_pin, SetpointAdjust::Decrement),
        ] {
            let mut input = gpio
                .get(pin)
                .with_context(|| format!("claiming button GPIO {pin}"))?
                .into_input_pullup();
            let button = EdgeButton::new(adjust, wiring.button_debounce_ms);
            let inbox = Arc::clone(&inbox);
            input
                .set_async_interrupt(Trigger::FallingEdge, None, move |event: Event| {
                    let edge = match event.trigger {
                        Trigger::FallingEdge => Edge::Falling,
                        _ => Edge::Rising,
                    };
                    let now_ms = u64::try_from(event.timestamp.as_millis()).unwrap_or(u64::MAX);
                    if button.forward(edge, now_ms, &inbox) {
                        debug!("Button GPIO {pin}: {:?}", button.adjust());
                    }
                })
                .with_context(|| format!("registering interrupt on GPIO {pin}"))?;
            self.buttons.push(input);
        }
        info!(
            "Setpoint buttons on GPIO {} (+) and {} (-)",
            wiring.increment_pin, wiring.decrement_pin
        );
        Ok(())
    }
}

// ── AdcPort implementation ────────────────────────────────────

impl AdcPort for RpiHardware {
    fn read(&mut self, channel: u8) -> Result<u16, SensorError> {
        let tx = mcp3008::request_frame(channel)?;
        let mut rx = [0u8; FRAME_LEN];
        let n = self
            .spi
            .transfer(&mut rx, &tx)
            .map_err(|_| SensorError::Transport)?;
        if n != FRAME_LEN {
            return Err(SensorError::Transport);
        }
        Ok(mcp3008::decode(&rx))
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for RpiHardware {
    fn write_pin(&mut self, pin: u8, level: bool) -> Result<(), ActuatorError> {
        if pin != self.direction_gpio {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.direction.drive(level)
    }

    fn set_duty(&mut self, channel: u8, frequency_hz: u32, duty: u32) -> Result<(), ActuatorError> {
        let (_, output) = self
            .pwm
            .iter_mut()
            .find(|(ch, _)| *ch == channel)
            .ok_or(ActuatorError::UnknownChannel(channel))?;
        output.set(frequency_hz, duty)
    }
}
