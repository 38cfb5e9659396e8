//! Collision detection and resolution.
//!
//! The pipeline is intentionally coarse: every body is a world-axis-aligned
//! box, overlap is tested per axis, and contacts are resolved with a single
//! normal impulse plus positional de-penetration. Pairs are visited in
//! stable registry order so runs are bit-for-bit reproducible.
//!
//! - `detection`: AABB overlap test producing a contact normal and depth
//! - `resolution`: impulse response and penetration correction

pub mod detection;
pub mod resolution;

pub use detection::{detect_aabb_overlap, ContactInfo};
pub use resolution::resolve_contact;
