//! Slip-ratio tire grip model with thermal and wear behavior.
//!
//! ## The Slip Curve
//!
//! A tire generates force only when its contact patch slides slightly
//! against the road. Grip rises steeply with slip ratio, peaks around 12%
//! slip, then falls off into the wheelspin/lockup region:
//!
//! ```text
//! grip
//!   │      ╭──╮
//!   │    ╱      ╲___
//!   │   ╱            ‾‾‾───
//!   │  ╱
//!   │ ╱
//!   └─┴────┬─────────────── slip ratio
//!   0    ~0.12
//! ```
//!
//! The curve is a simplified Pacejka magic formula,
//! `μ(s) = max_grip · sin(C · atan(B·s))`, with `B` derived so the peak
//! lands at `PEAK_SLIP`. Below the peak a closed-form inverse exists
//! (`slip_for_grip_fraction`), which the world uses to estimate the
//! operating slip for a requested drive force.
//!
//! Temperature scales grip through a bell curve around the compound's
//! optimal temperature; slip friction heats the tread and airflow cools it.

use crate::types::{constants, TireDimensions, TireParams, TireState};

/// Pacejka shape factor: controls how far grip falls past the peak.
const PACEJKA_C: f64 = 1.4;

/// Slip ratio at which grip peaks.
const PEAK_SLIP: f64 = 0.12;

/// Grip retained at temperature extremes, as a fraction of peak.
const THERMAL_FLOOR: f64 = 0.8;

/// Width (°C) of the thermal bell around the optimal temperature.
const THERMAL_WIDTH: f64 = 50.0;

/// Speed constant (m/s) for rolling-resistance saturation.
const ROLLING_SPEED_REF: f64 = 3.0;

/// Reference load (N) normalizing wear and heating rates.
const REF_LOAD: f64 = 4000.0;

/// Base wear accumulation coefficient (1/s at reference conditions).
const WEAR_COEFF: f64 = 1.0e-4;

/// Tread heating from slip friction (°C/s at reference conditions).
const HEAT_COEFF: f64 = 30.0;

/// Newton cooling rate toward ambient (1/s).
const COOL_RATE: f64 = 0.04;

/// Grip, resistance, wear, and geometry evaluation for one tire.
pub struct TireModel;

impl TireModel {
    /// Stiffness factor `B` of the magic formula, placing the peak at
    /// `PEAK_SLIP`.
    fn stiffness() -> f64 {
        (std::f64::consts::PI / (2.0 * PACEJKA_C)).tan() / PEAK_SLIP
    }

    /// Friction coefficient available at a given slip ratio.
    ///
    /// Zero at zero slip, monotone rising to the peak at `PEAK_SLIP`,
    /// falling beyond it. Never exceeds `max_grip`. Slip direction does not
    /// matter; the magnitude is used.
    pub fn grip(params: &TireParams, slip_ratio: f64) -> f64 {
        let s = if slip_ratio.is_nan() { 0.0 } else { slip_ratio.abs() };
        params.max_grip * (PACEJKA_C * (Self::stiffness() * s).atan()).sin()
    }

    /// Inverse of the sub-peak branch of the grip curve.
    ///
    /// Given a demanded fraction of peak grip in `[0, 1)`, returns the slip
    /// ratio at which the tire delivers it. Fractions at or above 1 return
    /// `PEAK_SLIP`.
    pub fn slip_for_grip_fraction(fraction: f64) -> f64 {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction };
        if fraction >= 1.0 {
            return PEAK_SLIP;
        }
        let fraction = fraction.max(0.0);
        (fraction.asin() / PACEJKA_C).tan() / Self::stiffness()
    }

    /// Slip ratio of peak grip.
    pub fn peak_slip() -> f64 {
        PEAK_SLIP
    }

    /// Grip multiplier in `(0, 1]` as a function of tread temperature.
    ///
    /// Bell-shaped around `optimal_temp` with its maximum of exactly 1.0
    /// there; both cold and overheated tires sit strictly below the peak.
    pub fn temperature_effect(params: &TireParams, temperature: f64) -> f64 {
        let t = if temperature.is_nan() {
            constants::AMBIENT_TEMP
        } else {
            temperature
        };
        let offset = (t - params.optimal_temp) / THERMAL_WIDTH;
        THERMAL_FLOOR + (1.0 - THERMAL_FLOOR) * (-offset * offset).exp()
    }

    /// Rolling resistance force (N) opposing motion.
    ///
    /// Zero at rest, saturating with speed, and directly proportional to
    /// vehicle mass.
    pub fn rolling_resistance(params: &TireParams, speed: f64, vehicle_mass: f64) -> f64 {
        let speed = if speed.is_nan() { 0.0 } else { speed.abs() };
        let saturation = 1.0 - (-speed / ROLLING_SPEED_REF).exp();
        params.rolling_resistance_coeff * vehicle_mass * constants::GRAVITY * saturation
    }

    /// Wear accumulation rate (fraction of tread life per second).
    ///
    /// Positive, increasing with slip, temperature, and load. The caller
    /// integrates `wear += rate * dt` and caps at 1.0.
    pub fn wear_rate(params: &TireParams, slip_ratio: f64, temperature: f64, load: f64) -> f64 {
        let slip = if slip_ratio.is_nan() { 0.0 } else { slip_ratio.abs() };
        let temp = if temperature.is_nan() {
            constants::AMBIENT_TEMP
        } else {
            temperature.max(0.0)
        };
        let load = if load.is_nan() { 0.0 } else { load.max(0.0) };

        WEAR_COEFF * (0.05 + slip) * (1.0 + temp / params.max_temp) * (load / REF_LOAD)
    }

    /// Tire geometry from the size spec, e.g. 225/45R17.
    ///
    /// Pure arithmetic on the sidewall designation: section width in mm,
    /// sidewall height as a percentage of width, rim diameter in inches.
    pub fn dimensions(params: &TireParams) -> TireDimensions {
        let width_m = params.width_mm / 1000.0;
        let sidewall_height_m = width_m * params.aspect_ratio / 100.0;
        let outer_diameter_m = params.rim_diameter_in * 0.0254 + 2.0 * sidewall_height_m;
        TireDimensions {
            width_m,
            sidewall_height_m,
            outer_diameter_m,
        }
    }

    /// Advance a tire's thermal and wear state over one sub-step.
    ///
    /// Slip friction heats the tread proportionally to slip, load, and
    /// speed; airflow cools it toward ambient.
    pub fn update_state(state: &mut TireState, speed: f64, dt: f64) {
        let speed = if speed.is_nan() { 0.0 } else { speed.abs() };

        let heating = HEAT_COEFF
            * state.slip_ratio.abs()
            * (state.load / REF_LOAD)
            * (0.2 + speed / 30.0);
        let cooling = COOL_RATE * (state.temperature - constants::AMBIENT_TEMP);
        state.temperature += (heating - cooling) * dt;

        let rate = Self::wear_rate(
            &state.params,
            state.slip_ratio,
            state.temperature,
            state.load,
        );
        state.wear = (state.wear + rate * dt).min(1.0);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TireParams {
        TireParams::default()
    }

    #[test]
    fn test_grip_zero_at_zero_slip() {
        assert_eq!(TireModel::grip(&params(), 0.0), 0.0);
    }

    #[test]
    fn test_grip_monotonic_below_peak() {
        let p = params();
        let slips = [0.01, 0.02, 0.04, 0.06, 0.08, 0.1];
        for w in slips.windows(2) {
            let lo = TireModel::grip(&p, w[0]);
            let hi = TireModel::grip(&p, w[1]);
            assert!(
                lo < hi,
                "grip must rise on [0, 0.1]: grip({})={} vs grip({})={}",
                w[0],
                lo,
                w[1],
                hi
            );
        }
    }

    #[test]
    fn test_grip_never_exceeds_max() {
        let p = params();
        for s in [0.0, 0.05, 0.1, 0.12, 0.2, 0.5, 1.0, 10.0] {
            assert!(
                TireModel::grip(&p, s) <= p.max_grip + 1e-12,
                "grip({}) exceeded max_grip",
                s
            );
        }
    }

    #[test]
    fn test_grip_falls_past_peak() {
        let p = params();
        let peak = TireModel::grip(&p, TireModel::peak_slip());
        let spinning = TireModel::grip(&p, 0.5);
        let locked = TireModel::grip(&p, 1.0);

        assert!(spinning < peak);
        assert!(locked < spinning, "grip keeps falling toward lockup");
    }

    #[test]
    fn test_grip_symmetric_in_slip_sign() {
        let p = params();
        assert_eq!(TireModel::grip(&p, 0.08), TireModel::grip(&p, -0.08));
    }

    #[test]
    fn test_slip_inverse_round_trip() {
        let p = params();
        for fraction in [0.1, 0.3, 0.5, 0.7, 0.9] {
            let slip = TireModel::slip_for_grip_fraction(fraction);
            let grip = TireModel::grip(&p, slip);
            assert!(
                (grip / p.max_grip - fraction).abs() < 1e-9,
                "inverse broken at fraction {}: slip={} grip={}",
                fraction,
                slip,
                grip
            );
            assert!(slip < TireModel::peak_slip());
        }
        assert_eq!(TireModel::slip_for_grip_fraction(1.5), TireModel::peak_slip());
    }

    #[test]
    fn test_temperature_effect_peaks_at_optimal() {
        let p = params();
        let at_optimal = TireModel::temperature_effect(&p, p.optimal_temp);
        assert!((at_optimal - 1.0).abs() < 1e-12);

        for t in [-10.0, 20.0, 50.0, 70.0, 100.0, 140.0, 200.0] {
            if (t - p.optimal_temp).abs() < 1e-9 {
                continue;
            }
            let effect = TireModel::temperature_effect(&p, t);
            assert!(
                effect < at_optimal,
                "temperature_effect({}) = {} should be below the peak",
                t,
                effect
            );
            assert!(effect > 0.0);
        }
    }

    #[test]
    fn test_rolling_resistance_zero_at_rest() {
        let p = params();
        assert_eq!(TireModel::rolling_resistance(&p, 0.0, 1500.0), 0.0);
    }

    #[test]
    fn test_rolling_resistance_increases_with_speed() {
        let p = params();
        let slow = TireModel::rolling_resistance(&p, 5.0, 1500.0);
        let fast = TireModel::rolling_resistance(&p, 20.0, 1500.0);
        assert!(slow > 0.0);
        assert!(fast > slow);
    }

    #[test]
    fn test_rolling_resistance_scales_with_mass() {
        let p = params();
        for speed in [1.0, 10.0, 30.0] {
            let heavy = TireModel::rolling_resistance(&p, speed, 2000.0);
            let light = TireModel::rolling_resistance(&p, speed, 1500.0);
            assert!(
                heavy > light,
                "heavier vehicle must roll harder at {} m/s",
                speed
            );
            // Direct proportionality
            assert!((heavy / light - 2000.0 / 1500.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wear_rate_increases_with_inputs() {
        let p = params();
        let base = TireModel::wear_rate(&p, 0.05, 60.0, 3000.0);

        assert!(base > 0.0);
        assert!(TireModel::wear_rate(&p, 0.2, 60.0, 3000.0) > base);
        assert!(TireModel::wear_rate(&p, 0.05, 120.0, 3000.0) > base);
        assert!(TireModel::wear_rate(&p, 0.05, 60.0, 5000.0) > base);
    }

    #[test]
    fn test_wear_integration_capped() {
        let mut state = TireState::new(params());
        state.slip_ratio = 1.0;
        state.temperature = 120.0;
        state.load = 8000.0;

        // Absurdly long integration must still cap at fully worn
        for _ in 0..100 {
            TireModel::update_state(&mut state, 30.0, 1.0e4);
        }
        assert!(state.wear <= 1.0);
        assert!((state.wear - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimensions_225_45_r17() {
        let dims = TireModel::dimensions(&params());
        assert!((dims.width_m - 0.225).abs() < 1e-12);
        assert!((dims.sidewall_height_m - 0.10125).abs() < 1e-12);
        // 17in rim = 0.4318 m, plus two sidewalls
        assert!((dims.outer_diameter_m - (0.4318 + 2.0 * 0.10125)).abs() < 1e-9);
    }

    #[test]
    fn test_slip_heats_tread_and_cooling_recovers() {
        let mut state = TireState::new(params());
        state.slip_ratio = 0.5;
        state.load = 4000.0;

        for _ in 0..600 {
            TireModel::update_state(&mut state, 20.0, 1.0 / 60.0);
        }
        assert!(
            state.temperature > constants::AMBIENT_TEMP + 10.0,
            "sustained slip should heat the tread, got {}",
            state.temperature
        );

        // Stop slipping; tread cools back toward ambient
        state.slip_ratio = 0.0;
        let hot = state.temperature;
        for _ in 0..600 {
            TireModel::update_state(&mut state, 20.0, 1.0 / 60.0);
        }
        assert!(state.temperature < hot);
    }

    #[test]
    fn test_nan_inputs_recovered() {
        let p = params();
        assert!(TireModel::grip(&p, f64::NAN).is_finite());
        assert!(TireModel::temperature_effect(&p, f64::NAN).is_finite());
        assert!(TireModel::rolling_resistance(&p, f64::NAN, 1500.0).is_finite());
        assert!(TireModel::wear_rate(&p, f64::NAN, f64::NAN, f64::NAN).is_finite());
    }
}
