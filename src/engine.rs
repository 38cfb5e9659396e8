//! Internal-combustion engine model.
//!
//! The engine is described by a small set of curve parameters
//! (`EngineParams`) and evaluated through pure functions of rpm and
//! throttle. The torque curve is unimodal:
//!
//! ```text
//! torque
//!   │        ___
//!   │      /     \
//!   │    /         \_
//!   │  /
//!   │ /
//!   └──────┬──────┬───── rpm
//!        idle   ~65%   redline
//! ```
//!
//! Torque rises from idle, peaks around 65% of redline, and falls toward
//! the redline. Power follows exactly from torque
//! (`P = T·ω`, with ω in rad/s), so callers may recompute it instead of
//! caching.
//!
//! ## Edge policy
//!
//! Out-of-range rpm and throttle arise naturally from simulation drift, so
//! inputs are clamped (`rpm` to `[0, max_rpm]`, throttle to `[0, 1]`) and
//! every function returns a finite number. Structural misconfiguration is
//! handled at vehicle creation, not here.

use crate::types::EngineParams;

/// Fraction of `max_rpm` where the torque curve peaks.
const PEAK_RPM_FRACTION: f64 = 0.65;

/// Half-width of the torque parabola in normalized rpm. Chosen wider than
/// the peak position so torque stays positive over the whole rpm range.
const CURVE_WIDTH: f64 = 0.75;

/// Engine-braking torque at redline as a fraction of peak torque.
const ENGINE_BRAKE_FRACTION: f64 = 0.15;

/// Fuel flow at idle (liters per second).
const IDLE_FUEL_FLOW: f64 = 2.0e-4;

/// Additional fuel flow at redline and full throttle (liters per second).
const FULL_LOAD_FUEL_FLOW: f64 = 4.0e-3;

/// Torque/power/fuel model evaluated against a parameter set.
pub struct EngineModel;

impl EngineModel {
    /// Drive torque (Nm) at the crank for a given rpm and throttle.
    ///
    /// The curve is a downward parabola over normalized rpm, peaking at
    /// `PEAK_RPM_FRACTION`, scaled linearly by throttle. Zero throttle gives
    /// zero torque; engine braking is modeled separately.
    pub fn torque(params: &EngineParams, rpm: f64, throttle: f64) -> f64 {
        let rpm = clamp(rpm, 0.0, params.max_rpm);
        let throttle = clamp(throttle, 0.0, 1.0);

        let n = if params.max_rpm > 0.0 {
            rpm / params.max_rpm
        } else {
            0.0
        };
        let offset = (n - PEAK_RPM_FRACTION) / CURVE_WIDTH;
        let shape = (1.0 - offset * offset).max(0.0);

        params.max_torque * shape * throttle
    }

    /// Power (kW) delivered at the same operating point.
    ///
    /// Exactly `torque · rpm · 2π/60 / 1000`; tests rely on this identity.
    pub fn power(params: &EngineParams, rpm: f64, throttle: f64) -> f64 {
        let clamped_rpm = clamp(rpm, 0.0, params.max_rpm);
        Self::torque(params, rpm, throttle) * clamped_rpm * 2.0 * std::f64::consts::PI
            / 60.0
            / 1000.0
    }

    /// Retarding torque (Nm, always <= 0) from a closed-throttle engine.
    ///
    /// Compression and friction losses grow with engine speed, so the
    /// magnitude is linear in rpm.
    pub fn engine_braking(params: &EngineParams, rpm: f64) -> f64 {
        let rpm = clamp(rpm, 0.0, params.max_rpm);
        let n = if params.max_rpm > 0.0 {
            rpm / params.max_rpm
        } else {
            0.0
        };
        -ENGINE_BRAKE_FRACTION * params.max_torque * n
    }

    /// Fuel consumed (liters) over a time slice `dt`.
    ///
    /// Idle flow plus a load term monotonic in both rpm and throttle. The
    /// per-step amount is tiny for any realistic `dt`, which keeps the
    /// caller's running total numerically well behaved.
    pub fn fuel_consumption(params: &EngineParams, rpm: f64, throttle: f64, dt: f64) -> f64 {
        let rpm = clamp(rpm, 0.0, params.max_rpm);
        let throttle = clamp(throttle, 0.0, 1.0);
        let dt = dt.max(0.0);

        let n = if params.max_rpm > 0.0 {
            rpm / params.max_rpm
        } else {
            0.0
        };
        let flow = IDLE_FUEL_FLOW + FULL_LOAD_FUEL_FLOW * n * (0.2 + 0.8 * throttle);
        flow * dt
    }
}

fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        lo
    } else {
        x.max(lo).min(hi)
    }
}

// =============================================================================
// Tests
// =============================================================================
