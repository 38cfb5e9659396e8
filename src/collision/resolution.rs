//! Impulse-based contact resolution.
//!
//! A single normal impulse removes the approaching component of relative
//! velocity and restores a fraction of it according to the restitution
//! coefficient:
//!
//! ```text
//! j = -(1 + e) · (v_rel · n) / (1/m_a + 1/m_b)
//! ```
//!
//! Static bodies use zero inverse mass, so the full impulse lands on the
//! dynamic partner. Penetration is removed positionally, split by inverse
//! mass, rather than by velocity, which keeps resting contacts from gaining
//! energy.

use crate::collision::detection::ContactInfo;
use crate::types::{constants, RigidBody};

/// Fraction of penetration removed per resolution pass.
const CORRECTION_FACTOR: f64 = 0.8;

/// Penetration below this depth (m) is left alone to avoid jitter.
const PENETRATION_SLOP: f64 = 1.0e-4;

/// Resolves one contact between two bodies, returning the impulse magnitude.
///
/// `restitution` is clamped to `[0, 1]`; even a perfectly elastic contact
/// never injects kinetic energy. Separating contacts get no impulse but are
/// still positionally corrected.
pub fn resolve_contact(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &ContactInfo,
    restitution: f64,
) -> f64 {
    let inv_mass_a = a.inv_mass();
    let inv_mass_b = b.inv_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;

    // Two static bodies: nothing to move
    if inv_mass_sum < constants::EPSILON {
        return 0.0;
    }

    let restitution = if restitution.is_nan() {
        0.0
    } else {
        restitution.clamp(0.0, 1.0)
    };

    let relative_velocity = b.linear_velocity - a.linear_velocity;
    let approach_speed = relative_velocity.dot(&contact.normal);

    // Impulse only when the bodies are approaching
    let impulse_magnitude = if approach_speed < 0.0 {
        let j = -(1.0 + restitution) * approach_speed / inv_mass_sum;
        a.linear_velocity -= contact.normal * (j * inv_mass_a);
        b.linear_velocity += contact.normal * (j * inv_mass_b);
        j
    } else {
        0.0
    };

    // De-penetrate positionally, split by inverse mass
    let depth = (contact.penetration - PENETRATION_SLOP).max(0.0);
    let correction = contact.normal * (depth * CORRECTION_FACTOR / inv_mass_sum);
    a.position -= correction * inv_mass_a;
    b.position += correction * inv_mass_b;

    impulse_magnitude
}

// =============================================================================
// Tests
// =============================================================================
