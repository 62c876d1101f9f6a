//! NTC thermistor divider model.
//!
//! Circuit: V_REF -- R_F -- ADC_PIN -- NTC -- GND, read by a 10-bit ADC.
//!
//! ```text
//! v   = raw * V_REF / 1023
//! r   = R_F * v / (V_REF - v)
//! lnR = ln(r / R_25)
//! ```
//!
//! Resistance is turned into temperature with either the four-term
//! Steinhart–Hart polynomial or the simpler Beta equation.  The defaults
//! describe an Amphenol TK95F232V (type F material) behind a 1.1 kOhm
//! divider resistor on a 3.3 V reference.

use serde::{Deserialize, Serialize};

/// Full-scale count of the 10-bit ADC.
pub const ADC_MAX: u16 = 1023;

/// 0 °C in Kelvin.
pub const T_K_0: f64 = 273.15;

/// Resistance-to-temperature solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solver {
    /// `1/T = A + B·lnR + C·lnR² + D·lnR³`
    SteinhartHart { a: f64, b: f64, c: f64, d: f64 },
    /// `1/T = lnR/β + 1/T25`
    Beta { beta: f64, t25_k: f64 },
}

impl Solver {
    /// Type F material coefficients, 3.274 to 0.36036 resistance ratio.
    pub const TYPE_F_STEINHART_HART: Self = Self::SteinhartHart {
        a: 3.354_015_4E-03,
        b: 2.562_772_5E-04,
        c: 2.082_921_0E-06,
        d: 7.300_320_6E-08,
    };

    /// Type F material Beta over 0–50 °C.
    pub const TYPE_F_BETA: Self = Self::Beta {
        beta: 3895.0,
        t25_k: 298.15,
    };

    fn kelvin(&self, ln_r: f64) -> f64 {
        match *self {
            Self::SteinhartHart { a, b, c, d } => {
                1.0 / (a + b * ln_r + c * ln_r.powi(2) + d * ln_r.powi(3))
            }
            Self::Beta { beta, t25_k } => 1.0 / (ln_r / beta + 1.0 / t25_k),
        }
    }
}

/// Divider and thermistor constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermistorModel {
    /// Divider and ADC reference voltage (V).
    pub v_ref: f64,
    /// Fixed divider resistor tied to V_REF (Ohm).
    pub r_f: f64,
    /// Thermistor resistance at 25 °C (Ohm).
    pub r_25: f64,
    pub solver: Solver,
}

impl Default for ThermistorModel {
    fn default() -> Self {
        Self {
            v_ref: 3.3,
            r_f: 1100.0,
            r_25: 2252.0,
            solver: Solver::TYPE_F_STEINHART_HART,
        }
    }
}

impl ThermistorModel {
    /// Convert a raw ADC count to degrees Celsius.
    ///
    /// The rails are pinned one count inside the range: a count of 0 is a
    /// shorted thermistor and 1023 an open one, and neither has a finite
    /// resistance.  Pinning keeps the result finite and monotonic, so a
    /// short reads as extreme heat and trips the over-temperature cutoff.
    pub fn celsius(&self, raw: u16) -> f32 {
        let raw = raw.clamp(1, ADC_MAX - 1);
        let v = f64::from(raw) * self.v_ref / f64::from(ADC_MAX);
        let r = self.r_f * v / (self.v_ref - v);
        let ln_r = (r / self.r_25).ln();
        (self.solver.kelvin(ln_r) - T_K_0) as f32
    }
}

/// Celsius to Fahrenheit.
pub fn to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}
