//! AABB overlap detection.
//!
//! Boxes follow the world axes regardless of body yaw. Overlap is measured
//! independently per axis; a contact exists only when all three overlaps are
//! positive. The contact normal is the axis of minimum penetration, signed
//! so it points from body A toward body B:
//!
//! ```text
//!        ┌──────┐
//!        │  A   │ →  normal
//!        │   ┌──┼───────┐
//!        └───┼──┘       │
//!            │    B     │
//!            └──────────┘
//! ```

use crate::types::{constants, RigidBody, Vec3};

/// Geometric result of an overlap test, independent of body masses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Unit normal pointing from A toward B
    pub normal: Vec3,
    /// Overlap depth along the normal (m), always positive
    pub penetration: f64,
}

/// Tests two bodies for AABB overlap.
///
/// Returns `None` when the boxes are separated on any axis. Touching
/// exactly (zero overlap) does not count as a collision. The result is
/// symmetric: swapping the arguments flips the normal and keeps the depth.
pub fn detect_aabb_overlap(a: &RigidBody, b: &RigidBody) -> Option<ContactInfo> {
    let (min_a, max_a) = a.aabb();
    let (min_b, max_b) = b.aabb();

    let overlap_x = (max_a.x.min(max_b.x)) - (min_a.x.max(min_b.x));
    let overlap_y = (max_a.y.min(max_b.y)) - (min_a.y.max(min_b.y));
    let overlap_z = (max_a.z.min(max_b.z)) - (min_a.z.max(min_b.z));

    if overlap_x <= 0.0 || overlap_y <= 0.0 || overlap_z <= 0.0 {
        return None;
    }

    let delta = b.position - a.position;

    // Minimum-penetration axis becomes the contact normal
    let (penetration, normal) = if overlap_x <= overlap_y && overlap_x <= overlap_z {
        (overlap_x, Vec3::new(sign_or_up(delta.x), 0.0, 0.0))
    } else if overlap_y <= overlap_z {
        (overlap_y, Vec3::new(0.0, sign_or_up(delta.y), 0.0))
    } else {
        (overlap_z, Vec3::new(0.0, 0.0, sign_or_up(delta.z)))
    };

    // Coincident centers: no direction to prefer, push B upward
    let normal = if delta.magnitude_squared() < constants::EPSILON {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        normal
    };

    Some(ContactInfo {
        normal,
        penetration,
    })
}

fn sign_or_up(component: f64) -> f64 {
    if component >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

// =============================================================================
// Tests
// =============================================================================
