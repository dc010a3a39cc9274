//! IR ranger calibration curve
//!
//! The ranger outputs a voltage that falls off exponentially with distance.
//! The 10-bit ADC sample converts as:
//!
//! ```text
//! voltage  = sample * 5 / 1024
//! distance = round(102.5149651 * 0.3091605258 ^ voltage)   [cm]
//! ```

use crate::constants::{
    IR_ADC_MAX, IR_ADC_RANGE, IR_CALIBRATION_BASE, IR_CALIBRATION_SCALE, IR_REFERENCE_VOLTAGE,
};

/// Sample voltage
#[inline]
pub fn sample_voltage(magnitude: u16) -> f64 {
    f64::from(magnitude) * IR_REFERENCE_VOLTAGE / IR_ADC_RANGE
}

/// Distance in centimeters for a non-zero sample
pub fn distance_for_magnitude(magnitude: u16) -> u16 {
    let distance = IR_CALIBRATION_SCALE * IR_CALIBRATION_BASE.powf(sample_voltage(magnitude));
    (distance + 0.5) as u16
}

/// Sample that reads back as `distance`
///
/// Clamped to `1..=1023`: distances past the curve's ends map to the
/// nearest representable sample.
pub fn magnitude_for_distance(distance: f64) -> u16 {
    if distance <= 0.0 {
        return IR_ADC_MAX;
    }
    let voltage = (distance / IR_CALIBRATION_SCALE).ln() / IR_CALIBRATION_BASE.ln();
    let magnitude = (voltage * IR_ADC_RANGE / IR_REFERENCE_VOLTAGE).round();
    magnitude.clamp(1.0, f64::from(IR_ADC_MAX)) as u16
}
