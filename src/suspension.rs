//! Per-corner suspension spring-damper model.
//!
//! Each of a vehicle's four corners is an independent spring-damper with
//! hard travel limits:
//!
//! ```text
//!  chassis ──┬──
//!            │  spring k, damper c
//!           ╱╲
//!           ╲╱   compression x ∈ [0, max_compression]
//!            │
//!  wheel  ──┴──  load = spring + damper (never pulls the ground)
//! ```
//!
//! The spring is linear inside its travel and clamps at the bump stop:
//! compressing past `max_compression` does not produce more force
//! (bottomed-out), and force calculations never extrapolate outside the
//! travel range. The combined corner force feeds the chassis (upward
//! reaction) and the tire model (normal load).

use crate::types::SuspensionParams;

/// Spring/damper force evaluation for one corner.
pub struct SuspensionModel;

impl SuspensionModel {
    /// Spring force (N) at a given compression (m).
    ///
    /// Linear `k·x` inside `[0, max_compression]`. Beyond the bump stop the
    /// force clamps at `k·max_compression`. Small extension (negative
    /// compression) produces no force; past `max_extension` the travel stop
    /// produces a capped rebound force pulling the wheel back.
    pub fn spring_force(params: &SuspensionParams, compression: f64) -> f64 {
        let compression = if compression.is_nan() { 0.0 } else { compression };

        if compression >= 0.0 {
            params.spring_rate * compression.min(params.max_compression)
        } else if -compression <= params.max_extension {
            0.0
        } else {
            // Extension stop: capped, does not grow with further droop
            -params.spring_rate * params.max_extension
        }
    }

    /// Damper force (N) at a given compression velocity (m/s).
    ///
    /// Sign matches the velocity, so the damper resists both compression
    /// and rebound.
    pub fn damper_force(params: &SuspensionParams, velocity: f64) -> f64 {
        let velocity = if velocity.is_nan() { 0.0 } else { velocity };
        params.damper_rate * velocity
    }

    /// Combined corner force (N), floored at zero.
    ///
    /// A wheel cannot pull on the road, so the value used as chassis
    /// reaction and tire normal load is never negative.
    pub fn corner_force(params: &SuspensionParams, compression: f64, velocity: f64) -> f64 {
        (Self::spring_force(params, compression) + Self::damper_force(params, velocity)).max(0.0)
    }

    /// Static compression (m) that carries a given corner load.
    ///
    /// Used to seed a vehicle's corners so the chassis starts settled
    /// instead of bouncing on spawn. Clamped to the travel range.
    pub fn static_compression(params: &SuspensionParams, corner_load: f64) -> f64 {
        if params.spring_rate <= 0.0 {
            return 0.0;
        }
        (corner_load / params.spring_rate).clamp(0.0, params.max_compression)
    }
}

// =============================================================================
// Tests
// =============================================================================
