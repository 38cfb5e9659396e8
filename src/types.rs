//! Core types for the vehicle dynamics simulation.
//!
//! All units are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Angular velocity: radians per second (rad/s)
//! - Mass: kilograms (kg)
//! - Force: Newtons (N), Torque: Newton-meters (Nm)
//! - Temperature: degrees Celsius (°C)

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities, forces, and torques.
///
/// Coordinate system:
/// - X: horizontal, world forward
/// - Y: vertical (positive upward)
/// - Z: horizontal, world right
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < 1e-10 {
            Self::ZERO
        } else {
            *self / mag
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// True if all components are finite (no NaN/Infinity)
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Operator overloads for Vec3
impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

// =============================================================================
// Body Handle
// =============================================================================

/// Opaque handle identifying a body inside a `PhysicsWorld`.
///
/// Handles are registry indices; removed slots are tombstoned, never reused,
/// so a stale handle fails with `WorldError::UnknownBody` instead of aliasing
/// another body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

// =============================================================================
// Orientation
// =============================================================================

/// Simplified orientation: integrated yaw plus quasi-static pitch/roll
/// approximations derived from chassis acceleration. Not a full quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Heading around the vertical axis (radians)
    pub yaw: f64,
    /// Nose-down positive (radians)
    pub pitch: f64,
    /// Lean toward +Z positive (radians)
    pub roll: f64,
}

// =============================================================================
// Rigid Body
// =============================================================================

/// Bounding-box dimensions of a body (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.length.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.length > 0.0
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// A rigid body owned by the world.
///
/// Static bodies (`is_static == true`) have effectively infinite mass: they
/// are never integrated and only participate in collision.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub mass: f64,
    pub position: Vec3,
    pub orientation: Orientation,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub dimensions: Dimensions,
    /// Per-sub-step force buffer, cleared after each sub-step
    pub force_accumulator: Vec3,
    /// Per-sub-step torque buffer, cleared after each sub-step
    pub torque_accumulator: Vec3,
    pub is_static: bool,
}

impl RigidBody {
    /// Inverse mass: zero for static bodies, so impulses vanish on them.
    pub fn inv_mass(&self) -> f64 {
        if self.is_static {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Moment of inertia about the vertical (yaw) axis, box approximation.
    pub fn yaw_inertia(&self) -> f64 {
        let l = self.dimensions.length;
        let w = self.dimensions.width;
        self.mass * (l * l + w * w) / 12.0
    }

    /// Axis-aligned bounding box as (min, max) corners.
    ///
    /// Boxes follow the world axes regardless of yaw; this matches the
    /// coarse overlap test the collision stage performs.
    pub fn aabb(&self) -> (Vec3, Vec3) {
        let half = Vec3::new(
            self.dimensions.length * 0.5,
            self.dimensions.height * 0.5,
            self.dimensions.width * 0.5,
        );
        (self.position - half, self.position + half)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Static engine curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Peak torque (Nm)
    pub max_torque: f64,
    /// Rated power (kW)
    pub max_power: f64,
    /// Redline (rpm)
    pub max_rpm: f64,
    /// Idle speed (rpm)
    pub idle_rpm: f64,
}

impl EngineParams {
    /// Structural validity: finite, positive curve parameters with the idle
    /// speed strictly below the redline.
    pub fn is_valid(&self) -> bool {
        self.max_torque.is_finite()
            && self.max_torque > 0.0
            && self.max_power.is_finite()
            && self.max_power > 0.0
            && self.idle_rpm.is_finite()
            && self.idle_rpm > 0.0
            && self.max_rpm.is_finite()
            && self.max_rpm > self.idle_rpm
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            max_torque: 250.0,
            max_power: 150.0,
            max_rpm: 7000.0,
            idle_rpm: 800.0,
        }
    }
}

/// Per-vehicle mutable engine state.
///
/// `rpm` is derived each sub-step from wheel speed and the drive ratio,
/// clamped to `[idle_rpm, max_rpm]`. `throttle` is set by the input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineState {
    pub rpm: f64,
    pub throttle: f64,
    pub params: EngineParams,
}

impl EngineState {
    pub fn new(params: EngineParams) -> Self {
        Self {
            rpm: params.idle_rpm,
            throttle: 0.0,
            params,
        }
    }
}

// =============================================================================
// Suspension
// =============================================================================

/// Static per-corner suspension parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuspensionParams {
    /// Spring rate (N/m)
    pub spring_rate: f64,
    /// Damper rate (Ns/m)
    pub damper_rate: f64,
    /// Maximum travel in compression (m)
    pub max_compression: f64,
    /// Maximum travel in extension (m)
    pub max_extension: f64,
    /// Unloaded spring length (m)
    pub rest_length: f64,
}

impl SuspensionParams {
    /// Structural validity: finite, positive rates and travel limits.
    pub fn is_valid(&self) -> bool {
        self.spring_rate.is_finite()
            && self.spring_rate > 0.0
            && self.damper_rate.is_finite()
            && self.damper_rate > 0.0
            && self.max_compression.is_finite()
            && self.max_compression > 0.0
            && self.max_extension.is_finite()
            && self.max_extension > 0.0
            && self.rest_length.is_finite()
            && self.rest_length > 0.0
    }
}

impl Default for SuspensionParams {
    fn default() -> Self {
        Self {
            spring_rate: 50_000.0,
            damper_rate: 4_000.0,
            max_compression: 0.25,
            max_extension: 0.15,
            rest_length: 0.35,
        }
    }
}

/// Mutable per-corner suspension state.
///
/// Invariant: `0 <= compression <= max_compression` after every update; the
/// force model clamps rather than extrapolating beyond travel limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionCorner {
    pub compression: f64,
    pub compression_velocity: f64,
    pub params: SuspensionParams,
}

impl SuspensionCorner {
    pub fn new(params: SuspensionParams) -> Self {
        Self {
            compression: 0.0,
            compression_velocity: 0.0,
            params,
        }
    }
}

// =============================================================================
// Tire
// =============================================================================

/// Static tire parameters, including the size spec printed on the sidewall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TireParams {
    /// Section width (mm), e.g. 225 in "225/45R17"
    pub width_mm: f64,
    /// Aspect ratio (%), sidewall height relative to width
    pub aspect_ratio: f64,
    /// Rim diameter (inches)
    pub rim_diameter_in: f64,
    /// Peak friction coefficient at optimal slip and temperature
    pub max_grip: f64,
    /// Rolling resistance coefficient (dimensionless)
    pub rolling_resistance_coeff: f64,
    /// Temperature of peak grip (°C)
    pub optimal_temp: f64,
    /// Overheated beyond this temperature (°C)
    pub max_temp: f64,
}

impl TireParams {
    /// Structural validity: finite, positive size and grip figures, and an
    /// overheat threshold above the optimal temperature.
    pub fn is_valid(&self) -> bool {
        self.width_mm.is_finite()
            && self.width_mm > 0.0
            && self.aspect_ratio.is_finite()
            && self.aspect_ratio > 0.0
            && self.rim_diameter_in.is_finite()
            && self.rim_diameter_in > 0.0
            && self.max_grip.is_finite()
            && self.max_grip > 0.0
            && self.rolling_resistance_coeff.is_finite()
            && self.rolling_resistance_coeff >= 0.0
            && self.optimal_temp.is_finite()
            && self.max_temp.is_finite()
            && self.max_temp > self.optimal_temp
    }
}

impl Default for TireParams {
    fn default() -> Self {
        Self {
            width_mm: 225.0,
            aspect_ratio: 45.0,
            rim_diameter_in: 17.0,
            max_grip: 1.25,
            rolling_resistance_coeff: 0.013,
            optimal_temp: 85.0,
            max_temp: 140.0,
        }
    }
}

/// Mutable per-tire state, updated by the world each sub-step.
///
/// Invariant: grip output never exceeds `params.max_grip`; `wear` is capped
/// at 1.0 (fully worn).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireState {
    pub slip_ratio: f64,
    /// Tread temperature (°C)
    pub temperature: f64,
    /// Accumulated wear in [0, 1]
    pub wear: f64,
    /// Normal load from the suspension (N)
    pub load: f64,
    pub params: TireParams,
}

impl TireState {
    pub fn new(params: TireParams) -> Self {
        Self {
            slip_ratio: 0.0,
            temperature: constants::AMBIENT_TEMP,
            wear: 0.0,
            load: 0.0,
            params,
        }
    }
}

/// Tire geometry derived from the size spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireDimensions {
    pub width_m: f64,
    pub sidewall_height_m: f64,
    pub outer_diameter_m: f64,
}

// =============================================================================
// Collision Manifold
// =============================================================================

/// Transient result of resolving one overlapping body pair.
///
/// Produced during a sub-step and buffered by the world until the next call
/// to `step` so the scoring layer can consume collision events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionManifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Contact normal pointing from A toward B
    pub normal: Vec3,
    pub penetration_depth: f64,
    pub impulse_magnitude: f64,
}

// =============================================================================
// Creation Specs
// =============================================================================

/// Creation-time parameters for a plain (static or dynamic) body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub mass: f64,
    pub position: Vec3,
    pub dimensions: Dimensions,
}

/// Creation-time parameters for a vehicle: chassis, drivetrain, and four
/// identical corners. Validated once at creation, never at use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub mass: f64,
    pub position: Vec3,
    pub dimensions: Dimensions,
    /// Overall drive ratio (gearbox × final drive)
    pub drive_ratio: f64,
    /// Rolling radius of the driven wheels (m)
    pub wheel_radius: f64,
    /// Front-to-rear axle distance (m)
    pub wheelbase: f64,
    pub engine: EngineParams,
    pub suspension: SuspensionParams,
    pub tire: TireParams,
}

impl Default for VehicleSpec {
    fn default() -> Self {
        Self {
            mass: 1500.0,
            position: Vec3::ZERO,
            dimensions: Dimensions::new(4.5, 1.8, 1.4),
            drive_ratio: 12.0,
            wheel_radius: 0.3,
            wheelbase: 2.7,
            engine: EngineParams::default(),
            suspension: SuspensionParams::default(),
            tire: TireParams::default(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Structurally invalid configuration or handle use.
///
/// These fail hard at the call that introduced them; they are never silently
/// clamped, since that would mask caller bugs. Numeric drift inside the curve
/// models is clamped instead (see the model modules).
#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    /// Body mass must be strictly positive
    NonPositiveMass(f64),
    /// Dimensions contained NaN/Infinity or non-positive extents
    InvalidDimensions(Dimensions),
    /// Handle does not refer to a live body
    UnknownBody(BodyHandle),
    /// Applied force or torque contained NaN or Infinity
    NonFiniteForce,
    /// A creation spec field was non-finite or out of range; names the
    /// offending part
    InvalidSpec(&'static str),
    /// Operation requires a vehicle but the handle refers to a plain body
    NotAVehicle(BodyHandle),
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldError::NonPositiveMass(m) => write!(f, "mass must be positive, got {}", m),
            WorldError::InvalidDimensions(d) => write!(
                f,
                "dimensions must be finite and positive, got {}x{}x{}",
                d.length, d.width, d.height
            ),
            WorldError::UnknownBody(h) => write!(f, "unknown body handle {}", h.0),
            WorldError::NonFiniteForce => write!(f, "force/torque must be finite"),
            WorldError::InvalidSpec(part) => write!(f, "invalid spec: {}", part),
            WorldError::NotAVehicle(h) => write!(f, "body {} is not a vehicle", h.0),
        }
    }
}

impl std::error::Error for WorldError {}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants used in the simulation.
pub mod constants {
    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f64 = 9.81;

    /// Ambient air temperature used for tire cooling (°C)
    pub const AMBIENT_TEMP: f64 = 20.0;

    /// Small value for floating-point comparisons
    pub const EPSILON: f64 = 1e-10;
}

// =============================================================================
// Tests
// =============================================================================
