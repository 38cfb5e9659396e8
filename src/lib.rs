//! # VD Core
//!
//! A deterministic, fixed-timestep vehicle dynamics simulation engine.
//!
//! ## Architecture
//!
//! - `types`: Core data structures (Vec3, rigid bodies, vehicle state, errors)
//! - `engine`: Internal-combustion engine model (torque/power curves, braking, fuel)
//! - `suspension`: Per-corner spring-damper model with travel limits
//! - `tire`: Slip-ratio grip curve, thermal model, rolling resistance, wear
//! - `integrator`: Semi-implicit Euler integration of rigid bodies
//! - `collision`: AABB detection and impulse-based resolution
//! - `world`: Main orchestrator owning all bodies and vehicles
//! - `presets`: YAML-based vehicle/engine/tire parameter loader

pub mod collision;
pub mod engine;
pub mod integrator;
pub mod presets;
pub mod suspension;
pub mod tire;
pub mod types;
pub mod world;
