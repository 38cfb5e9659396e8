//! Semi-implicit Euler integration of rigid bodies.
//!
//! Velocity is updated from the accumulated forces first, then position is
//! advanced with the *new* velocity:
//!
//! ```text
//! v(t+dt) = v(t) + (F/m)·dt
//! x(t+dt) = x(t) + v(t+dt)·dt
//! ```
//!
//! This ordering (symplectic Euler) keeps oscillating systems such as the
//! suspension springs bounded where explicit Euler would gain energy.
//!
//! Rotation is reduced: only yaw is integrated from the vertical torque
//! component, using the box yaw inertia. Pitch and roll are quasi-static
//! values written directly by the vehicle force stage, not integrated here.
//!
//! Force and torque accumulators are consumed and cleared by every call, so
//! forces act for exactly one sub-step unless re-applied.

use crate::types::{constants, RigidBody, Vec3};

/// Advances one body by `dt` seconds and clears its accumulators.
///
/// Static bodies are never moved; their accumulators are still cleared so a
/// force applied to a static body by mistake cannot linger.
pub fn integrate(body: &mut RigidBody, dt: f64) {
    if body.is_static {
        body.force_accumulator = Vec3::ZERO;
        body.torque_accumulator = Vec3::ZERO;
        return;
    }

    // Velocity first (semi-implicit)
    let acceleration = body.force_accumulator * body.inv_mass();
    body.linear_velocity += acceleration * dt;

    let yaw_inertia = body.yaw_inertia();
    if yaw_inertia > constants::EPSILON {
        body.angular_velocity.y += body.torque_accumulator.y / yaw_inertia * dt;
    }

    // Then position with the updated velocity
    body.position += body.linear_velocity * dt;
    body.orientation.yaw += body.angular_velocity.y * dt;

    body.force_accumulator = Vec3::ZERO;
    body.torque_accumulator = Vec3::ZERO;
}

// =============================================================================
// Tests
// =============================================================================
