//! The physics world: body registry, vehicle dynamics, and the fixed-step
//! simulation loop.
//!
//! ## Stepping
//!
//! `step(dt)` accumulates wall time and advances the simulation in fixed
//! sub-steps of `TIME_STEP` seconds, at most `MAX_SUB_STEPS` per call.
//! Excess accumulated time beyond the cap is dropped, so a stalled caller
//! produces a slow-motion frame instead of a death spiral. Identical input
//! sequences produce bit-identical trajectories: bodies live in an
//! insertion-ordered registry, pairs are visited in index order, and nothing
//! reads a clock or RNG.
//!
//! ## Vehicle force pipeline (per sub-step)
//!
//! 1. Derive engine rpm from wheel rolling speed and the drive ratio
//! 2. Engine torque (or engine braking at closed throttle) becomes a drive
//!    force demand at the contact patches
//! 3. Suspension corners react the chassis against the ground plane and set
//!    each tire's normal load, shifted by longitudinal weight transfer
//! 4. The tire model caps the demand at the grip envelope and yields the
//!    operating slip ratio per wheel
//! 5. Rolling resistance, lateral cornering force, and steering yaw torque
//! 6. Tire thermal/wear state and fuel consumption advance
//!
//! External forces from `apply_force`/`apply_torque` act for every sub-step
//! of the next `step` call and are cleared afterwards.

use crate::collision::{detect_aabb_overlap, resolve_contact};
use crate::engine::EngineModel;
use crate::integrator::integrate;
use crate::suspension::SuspensionModel;
use crate::tire::TireModel;
use crate::types::{
    constants, BodyHandle, BodySpec, CollisionManifold, Dimensions, EngineState, Orientation,
    RigidBody, SuspensionCorner, TireState, Vec3, VehicleSpec, WorldError,
};

/// Fixed simulation sub-step (s).
pub const TIME_STEP: f64 = 1.0 / 240.0;

/// Maximum sub-steps per `step` call.
pub const MAX_SUB_STEPS: usize = 8;

/// Default coefficient of restitution for body contacts.
const DEFAULT_RESTITUTION: f64 = 0.3;

/// Maximum road-wheel steering angle at full lock (rad).
const MAX_STEER_ANGLE: f64 = 0.5;

/// Cornering stiffness as a rate on lateral velocity (1/s).
const LATERAL_RATE: f64 = 4.0;

/// Gain pulling yaw rate toward the kinematic steering target (1/s).
const YAW_RATE_GAIN: f64 = 5.0;

/// Rate at which a spinning wheel's slip ratio climbs toward 1 (1/s).
const WHEELSPIN_RATE: f64 = 3.0;

/// Vehicle speed below which drive and braking effects taper out (m/s).
const STANDSTILL_SPEED: f64 = 0.05;

/// Corner indices: front-left, front-right, rear-left, rear-right.
const FRONT_CORNERS: [usize; 2] = [0, 1];

/// Per-vehicle drivetrain and contact state attached to a chassis body.
#[derive(Debug, Clone)]
struct VehicleState {
    engine: EngineState,
    corners: [SuspensionCorner; 4],
    tires: [TireState; 4],
    /// Steering input in [-1, 1], positive steers toward +Z
    steering: f64,
    drive_ratio: f64,
    wheel_radius: f64,
    wheelbase: f64,
    /// Chassis spawn height; heave is measured against it
    ride_height: f64,
    /// Longitudinal acceleration from the previous sub-step (m/s²)
    last_accel_long: f64,
    /// Lateral acceleration from the previous sub-step (m/s²)
    last_accel_lat: f64,
    /// Total fuel consumed (liters)
    fuel_used: f64,
    /// Odometer: path length traveled (m)
    distance_traveled: f64,
}

/// Registry slot: a body plus optional vehicle state and the external force
/// buffer for the next step.
#[derive(Debug, Clone)]
struct BodyEntry {
    body: RigidBody,
    vehicle: Option<VehicleState>,
    external_force: Vec3,
    external_torque: Vec3,
}

/// Owns every body and drives the simulation.
///
/// Removed slots are tombstoned rather than reused, so stale handles fail
/// with `WorldError::UnknownBody` instead of silently aliasing a newer body.
pub struct PhysicsWorld {
    bodies: Vec<Option<BodyEntry>>,
    collision_events: Vec<CollisionManifold>,
    restitution: f64,
    accumulator: f64,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            collision_events: Vec::new(),
            restitution: DEFAULT_RESTITUTION,
            accumulator: 0.0,
        }
    }

    /// Sets the restitution used for all contacts, clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, restitution: f64) {
        self.restitution = if restitution.is_nan() {
            DEFAULT_RESTITUTION
        } else {
            restitution.clamp(0.0, 1.0)
        };
    }

    // =========================================================================
    // Body creation and removal
    // =========================================================================

    /// Creates an immovable obstacle (wall, barrier) at a fixed position.
    pub fn create_static_body(
        &mut self,
        position: Vec3,
        dimensions: Dimensions,
    ) -> Result<BodyHandle, WorldError> {
        if !position.is_finite() {
            return Err(WorldError::InvalidSpec("position"));
        }
        if !dimensions.is_valid() {
            return Err(WorldError::InvalidDimensions(dimensions));
        }
        Ok(self.insert(
            RigidBody {
                mass: f64::INFINITY,
                position,
                orientation: Orientation::default(),
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                dimensions,
                force_accumulator: Vec3::ZERO,
                torque_accumulator: Vec3::ZERO,
                is_static: true,
            },
            None,
        ))
    }

    /// Creates a plain dynamic body with no drivetrain.
    pub fn create_dynamic_body(&mut self, spec: &BodySpec) -> Result<BodyHandle, WorldError> {
        if !(spec.mass.is_finite() && spec.mass > 0.0) {
            return Err(WorldError::NonPositiveMass(spec.mass));
        }
        if !spec.dimensions.is_valid() {
            return Err(WorldError::InvalidDimensions(spec.dimensions));
        }
        if !spec.position.is_finite() {
            return Err(WorldError::InvalidSpec("position"));
        }
        Ok(self.insert(
            RigidBody {
                mass: spec.mass,
                position: spec.position,
                orientation: Orientation::default(),
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                dimensions: spec.dimensions,
                force_accumulator: Vec3::ZERO,
                torque_accumulator: Vec3::ZERO,
                is_static: false,
            },
            None,
        ))
    }

    /// Creates a vehicle: chassis body plus engine, four suspension corners,
    /// and four tires. The suspension is seeded at static compression so the
    /// chassis spawns settled instead of bouncing.
    pub fn create_vehicle(&mut self, spec: &VehicleSpec) -> Result<BodyHandle, WorldError> {
        if !(spec.mass.is_finite() && spec.mass > 0.0) {
            return Err(WorldError::NonPositiveMass(spec.mass));
        }
        if !spec.dimensions.is_valid() {
            return Err(WorldError::InvalidDimensions(spec.dimensions));
        }
        if !spec.position.is_finite() {
            return Err(WorldError::InvalidSpec("position"));
        }
        if !(spec.drive_ratio.is_finite() && spec.drive_ratio > 0.0)
            || !(spec.wheel_radius.is_finite() && spec.wheel_radius > 0.0)
            || !(spec.wheelbase.is_finite() && spec.wheelbase > 0.0)
        {
            return Err(WorldError::InvalidSpec("drivetrain geometry"));
        }
        if !spec.engine.is_valid() {
            return Err(WorldError::InvalidSpec("engine parameters"));
        }
        if !spec.suspension.is_valid() {
            return Err(WorldError::InvalidSpec("suspension parameters"));
        }
        if !spec.tire.is_valid() {
            return Err(WorldError::InvalidSpec("tire parameters"));
        }

        let corner_load = spec.mass * constants::GRAVITY / 4.0;
        let static_comp = SuspensionModel::static_compression(&spec.suspension, corner_load);
        let mut corner = SuspensionCorner::new(spec.suspension);
        corner.compression = static_comp;

        let mut tire = TireState::new(spec.tire);
        tire.load = corner_load;

        let vehicle = VehicleState {
            engine: EngineState::new(spec.engine),
            corners: [corner; 4],
            tires: [tire; 4],
            steering: 0.0,
            drive_ratio: spec.drive_ratio,
            wheel_radius: spec.wheel_radius,
            wheelbase: spec.wheelbase,
            ride_height: spec.position.y,
            last_accel_long: 0.0,
            last_accel_lat: 0.0,
            fuel_used: 0.0,
            distance_traveled: 0.0,
        };

        Ok(self.insert(
            RigidBody {
                mass: spec.mass,
                position: spec.position,
                orientation: Orientation::default(),
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                dimensions: spec.dimensions,
                force_accumulator: Vec3::ZERO,
                torque_accumulator: Vec3::ZERO,
                is_static: false,
            },
            Some(vehicle),
        ))
    }

    /// Removes a body. The slot is tombstoned; the handle becomes invalid.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        let slot = self
            .bodies
            .get_mut(handle.index())
            .ok_or(WorldError::UnknownBody(handle))?;
        if slot.is_none() {
            return Err(WorldError::UnknownBody(handle));
        }
        *slot = None;
        Ok(())
    }

    fn insert(&mut self, body: RigidBody, vehicle: Option<VehicleState>) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len());
        self.bodies.push(Some(BodyEntry {
            body,
            vehicle,
            external_force: Vec3::ZERO,
            external_torque: Vec3::ZERO,
        }));
        handle
    }

    // =========================================================================
    // Inputs and forces
    // =========================================================================

    /// Queues an external force (N) acting on the body's center of mass for
    /// every sub-step of the next `step` call.
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) -> Result<(), WorldError> {
        if !force.is_finite() {
            return Err(WorldError::NonFiniteForce);
        }
        self.entry_mut(handle)?.external_force += force;
        Ok(())
    }

    /// Queues an external torque (Nm) for every sub-step of the next `step`.
    pub fn apply_torque(&mut self, handle: BodyHandle, torque: Vec3) -> Result<(), WorldError> {
        if !torque.is_finite() {
            return Err(WorldError::NonFiniteForce);
        }
        self.entry_mut(handle)?.external_torque += torque;
        Ok(())
    }

    /// Overwrites a body's linear velocity.
    pub fn set_linear_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), WorldError> {
        if !velocity.is_finite() {
            return Err(WorldError::NonFiniteForce);
        }
        self.entry_mut(handle)?.body.linear_velocity = velocity;
        Ok(())
    }

    /// Sets a vehicle's throttle, clamped to `[0, 1]`.
    pub fn set_throttle(&mut self, handle: BodyHandle, throttle: f64) -> Result<(), WorldError> {
        let vehicle = self.vehicle_mut(handle)?;
        vehicle.engine.throttle = if throttle.is_nan() {
            0.0
        } else {
            throttle.clamp(0.0, 1.0)
        };
        Ok(())
    }

    /// Sets a vehicle's steering input, clamped to `[-1, 1]`.
    pub fn set_steering(&mut self, handle: BodyHandle, steering: f64) -> Result<(), WorldError> {
        let vehicle = self.vehicle_mut(handle)?;
        vehicle.steering = if steering.is_nan() {
            0.0
        } else {
            steering.clamp(-1.0, 1.0)
        };
        Ok(())
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, WorldError> {
        Ok(&self.entry(handle)?.body)
    }

    pub fn engine_state(&self, handle: BodyHandle) -> Result<&EngineState, WorldError> {
        Ok(&self.vehicle(handle)?.engine)
    }

    pub fn tire_states(&self, handle: BodyHandle) -> Result<&[TireState; 4], WorldError> {
        Ok(&self.vehicle(handle)?.tires)
    }

    pub fn suspension_corners(
        &self,
        handle: BodyHandle,
    ) -> Result<&[SuspensionCorner; 4], WorldError> {
        Ok(&self.vehicle(handle)?.corners)
    }

    /// Total fuel consumed by a vehicle since creation (liters).
    pub fn fuel_used(&self, handle: BodyHandle) -> Result<f64, WorldError> {
        Ok(self.vehicle(handle)?.fuel_used)
    }

    /// Odometer reading: path length traveled since creation (m).
    pub fn distance_traveled(&self, handle: BodyHandle) -> Result<f64, WorldError> {
        Ok(self.vehicle(handle)?.distance_traveled)
    }

    /// Collisions resolved during the most recent `step` call.
    pub fn collision_events(&self) -> &[CollisionManifold] {
        &self.collision_events
    }

    fn entry(&self, handle: BodyHandle) -> Result<&BodyEntry, WorldError> {
        self.bodies
            .get(handle.index())
            .and_then(|slot| slot.as_ref())
            .ok_or(WorldError::UnknownBody(handle))
    }

    fn entry_mut(&mut self, handle: BodyHandle) -> Result<&mut BodyEntry, WorldError> {
        self.bodies
            .get_mut(handle.index())
            .and_then(|slot| slot.as_mut())
            .ok_or(WorldError::UnknownBody(handle))
    }

    fn vehicle(&self, handle: BodyHandle) -> Result<&VehicleState, WorldError> {
        self.entry(handle)?
            .vehicle
            .as_ref()
            .ok_or(WorldError::NotAVehicle(handle))
    }

    fn vehicle_mut(&mut self, handle: BodyHandle) -> Result<&mut VehicleState, WorldError> {
        self.entry_mut(handle)?
            .vehicle
            .as_mut()
            .ok_or(WorldError::NotAVehicle(handle))
    }

    // =========================================================================
    // Simulation loop
    // =========================================================================

    /// Advances the simulation by `dt` seconds of wall time.
    ///
    /// Runs whole sub-steps of `TIME_STEP`, at most `MAX_SUB_STEPS`; a
    /// fractional remainder carries over to the next call and excess beyond
    /// the cap is dropped. Collision events and external force buffers from
    /// the previous call are cleared first.
    pub fn step(&mut self, dt: f64) {
        let dt = if dt.is_nan() { 0.0 } else { dt.max(0.0) };
        self.collision_events.clear();
        self.accumulator += dt;

        let mut sub_steps = 0;
        while self.accumulator >= TIME_STEP && sub_steps < MAX_SUB_STEPS {
            self.sub_step(TIME_STEP);
            self.accumulator -= TIME_STEP;
            sub_steps += 1;
        }
        // Drop time we could not simulate inside the cap
        if self.accumulator >= TIME_STEP {
            self.accumulator %= TIME_STEP;
        }

        for slot in self.bodies.iter_mut().flatten() {
            slot.external_force = Vec3::ZERO;
            slot.external_torque = Vec3::ZERO;
        }
    }

    fn sub_step(&mut self, dt: f64) {
        // Force stage, in stable registry order
        for slot in self.bodies.iter_mut().flatten() {
            if slot.body.is_static {
                continue;
            }
            if slot.vehicle.is_some() {
                Self::vehicle_forces(slot, dt);
            } else {
                let weight = Vec3::new(0.0, -slot.body.mass * constants::GRAVITY, 0.0);
                slot.body.force_accumulator += weight;
            }
            slot.body.force_accumulator += slot.external_force;
            slot.body.torque_accumulator += slot.external_torque;
        }

        // Integration stage
        for slot in self.bodies.iter_mut().flatten() {
            integrate(&mut slot.body, dt);
        }

        self.resolve_collisions();
    }

    /// Computes and accumulates all drivetrain, suspension, tire, and
    /// steering forces for one vehicle.
    fn vehicle_forces(entry: &mut BodyEntry, dt: f64) {
        let body = &mut entry.body;
        let vehicle = match entry.vehicle.as_mut() {
            Some(v) => v,
            None => return,
        };

        let yaw = body.orientation.yaw;
        let forward = Vec3::new(yaw.cos(), 0.0, yaw.sin());
        let right = Vec3::new(-forward.z, 0.0, forward.x);

        let forward_speed = body.linear_velocity.dot(&forward);
        let lateral_speed = body.linear_velocity.dot(&right);
        let weight = body.mass * constants::GRAVITY;

        // --- Engine rpm from wheel rolling speed ---
        let wheel_omega = forward_speed.abs() / vehicle.wheel_radius;
        let raw_rpm = wheel_omega * vehicle.drive_ratio * 60.0 / (2.0 * std::f64::consts::PI);
        vehicle.engine.rpm =
            raw_rpm.clamp(vehicle.engine.params.idle_rpm, vehicle.engine.params.max_rpm);

        // --- Drive / engine-brake force demand at the contact patches ---
        let throttle = vehicle.engine.throttle;
        let demand = if throttle > 0.0 {
            let torque = EngineModel::torque(&vehicle.engine.params, vehicle.engine.rpm, throttle);
            torque * vehicle.drive_ratio / vehicle.wheel_radius
        } else if forward_speed.abs() > STANDSTILL_SPEED {
            // Closed throttle: compression braking opposes motion
            let torque = EngineModel::engine_braking(&vehicle.engine.params, vehicle.engine.rpm);
            torque.abs() * vehicle.drive_ratio / vehicle.wheel_radius * -forward_speed.signum()
        } else {
            0.0
        };

        // --- Suspension: chassis reaction against the ground plane ---
        let heave = vehicle.ride_height - body.position.y;
        let compression_velocity = -body.linear_velocity.y;
        let static_comp =
            SuspensionModel::static_compression(&vehicle.corners[0].params, weight / 4.0);

        let mut total_support = 0.0;
        let mut corner_forces = [0.0; 4];
        for (i, corner) in vehicle.corners.iter_mut().enumerate() {
            let raw_compression = static_comp + heave;
            corner.compression = raw_compression.clamp(0.0, corner.params.max_compression);
            corner.compression_velocity = compression_velocity;

            let force =
                SuspensionModel::corner_force(&corner.params, raw_compression, compression_velocity);
            corner_forces[i] = force;
            total_support += force;
        }
        body.force_accumulator += Vec3::new(0.0, total_support - weight, 0.0);

        // --- Tire loads with longitudinal weight transfer ---
        let cg_height = body.dimensions.height * 0.5;
        let transfer = body.mass * vehicle.last_accel_long * cg_height / vehicle.wheelbase;
        let mut loads = [0.0; 4];
        for i in 0..4 {
            let shift = if FRONT_CORNERS.contains(&i) {
                -transfer / 2.0
            } else {
                transfer / 2.0
            };
            loads[i] = (corner_forces[i] + shift).max(0.0);
        }

        // --- Traction: cap the demand at the grip envelope per wheel ---
        let mut applied_total = 0.0;
        for (i, tire) in vehicle.tires.iter_mut().enumerate() {
            tire.load = loads[i];
            let thermal = TireModel::temperature_effect(&tire.params, tire.temperature);
            let envelope = tire.params.max_grip * thermal * tire.load;
            let wheel_demand = demand / 4.0;

            if wheel_demand.abs() <= envelope {
                let fraction = if envelope > constants::EPSILON {
                    wheel_demand.abs() / envelope
                } else {
                    0.0
                };
                tire.slip_ratio = TireModel::slip_for_grip_fraction(fraction) * wheel_demand.signum();
                applied_total += wheel_demand;
            } else {
                // Wheelspin: slip runs away and force follows the falling branch
                let slip = tire.slip_ratio.abs().max(TireModel::peak_slip());
                let slip = slip + (1.0 - slip) * WHEELSPIN_RATE * dt;
                tire.slip_ratio = slip * wheel_demand.signum();
                applied_total +=
                    TireModel::grip(&tire.params, slip) * thermal * tire.load * wheel_demand.signum();
            }
        }
        body.force_accumulator += forward * applied_total;

        // --- Rolling resistance, opposing motion ---
        if forward_speed.abs() > constants::EPSILON {
            let rolling = TireModel::rolling_resistance(
                &vehicle.tires[0].params,
                forward_speed,
                body.mass,
            );
            body.force_accumulator += forward * (-rolling * forward_speed.signum());
        }

        // --- Lateral grip: cornering spring clamped at the friction circle ---
        let total_load: f64 = loads.iter().sum();
        let thermal = TireModel::temperature_effect(
            &vehicle.tires[0].params,
            vehicle.tires[0].temperature,
        );
        let lateral_limit = vehicle.tires[0].params.max_grip * thermal * total_load;
        let lateral_force =
            (-lateral_speed * body.mass * LATERAL_RATE).clamp(-lateral_limit, lateral_limit);
        body.force_accumulator += right * lateral_force;

        // --- Steering: pull yaw rate toward the kinematic target ---
        let steer_angle = vehicle.steering * MAX_STEER_ANGLE;
        let target_yaw_rate = forward_speed * steer_angle.tan() / vehicle.wheelbase;
        let yaw_torque =
            (target_yaw_rate - body.angular_velocity.y) * body.yaw_inertia() * YAW_RATE_GAIN;
        body.torque_accumulator += Vec3::new(0.0, yaw_torque, 0.0);

        // --- Quasi-static pitch and roll from chassis acceleration ---
        body.orientation.pitch =
            -vehicle.last_accel_long * cg_height / (constants::GRAVITY * vehicle.wheelbase);
        body.orientation.roll =
            vehicle.last_accel_lat * cg_height / (constants::GRAVITY * body.dimensions.width);

        // --- Record this sub-step's planar acceleration for the next one ---
        let planar_force = body.force_accumulator + entry.external_force;
        vehicle.last_accel_long = planar_force.dot(&forward) / body.mass;
        vehicle.last_accel_lat = planar_force.dot(&right) / body.mass;

        // --- Tire thermal/wear state, fuel, odometer ---
        for tire in vehicle.tires.iter_mut() {
            TireModel::update_state(tire, forward_speed, dt);
        }
        vehicle.fuel_used +=
            EngineModel::fuel_consumption(&vehicle.engine.params, vehicle.engine.rpm, throttle, dt);
        vehicle.distance_traveled += body.linear_velocity.magnitude() * dt;
    }

    /// Detects and resolves every overlapping pair, in index order `i < j`.
    fn resolve_collisions(&mut self) {
        let restitution = self.restitution;
        let count = self.bodies.len();

        for i in 0..count {
            for j in (i + 1)..count {
                let (left, right) = self.bodies.split_at_mut(j);
                let entry_a = match left[i].as_mut() {
                    Some(e) => e,
                    None => continue,
                };
                let entry_b = match right[0].as_mut() {
                    Some(e) => e,
                    None => continue,
                };
                if entry_a.body.is_static && entry_b.body.is_static {
                    continue;
                }

                if let Some(contact) = detect_aabb_overlap(&entry_a.body, &entry_b.body) {
                    let impulse =
                        resolve_contact(&mut entry_a.body, &mut entry_b.body, &contact, restitution);
                    self.collision_events.push(CollisionManifold {
                        body_a: BodyHandle(i),
                        body_b: BodyHandle(j),
                        normal: contact.normal,
                        penetration_depth: contact.penetration,
                        impulse_magnitude: impulse,
                    });
                }
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EngineParams, VehicleSpec};

    fn spawn_height(spec: &VehicleSpec) -> f64 {
        // Anything above ground works; suspension is seeded settled
        spec.dimensions.height / 2.0 + 0.1
    }

    fn default_vehicle(world: &mut PhysicsWorld) -> BodyHandle {
        let mut spec = VehicleSpec::default();
        spec.position = Vec3::new(0.0, spawn_height(&spec), 0.0);
        world.create_vehicle(&spec).unwrap()
    }

    #[test]
    fn test_create_and_query_vehicle() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.body(car).unwrap().mass, 1500.0);
        assert_eq!(world.engine_state(car).unwrap().rpm, 800.0);
        assert_eq!(world.tire_states(car).unwrap().len(), 4);
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let mut world = PhysicsWorld::new();

        let mut spec = VehicleSpec::default();
        spec.mass = -100.0;
        assert!(matches!(
            world.create_vehicle(&spec),
            Err(WorldError::NonPositiveMass(_))
        ));

        let mut spec = VehicleSpec::default();
        spec.dimensions = Dimensions::new(0.0, 1.8, 1.4);
        assert!(matches!(
            world.create_vehicle(&spec),
            Err(WorldError::InvalidDimensions(_))
        ));

        assert!(world
            .create_static_body(Vec3::ZERO, Dimensions::new(f64::NAN, 1.0, 1.0))
            .is_err());
    }

    #[test]
    fn test_model_params_validated_at_creation() {
        let mut world = PhysicsWorld::new();

        // A NaN grip figure must fail at creation, not crash inside `step`
        let mut spec = VehicleSpec::default();
        spec.tire.max_grip = f64::NAN;
        assert!(matches!(
            world.create_vehicle(&spec),
            Err(WorldError::InvalidSpec("tire parameters"))
        ));

        let mut spec = VehicleSpec::default();
        spec.engine.idle_rpm = 9000.0; // above the redline
        assert!(matches!(
            world.create_vehicle(&spec),
            Err(WorldError::InvalidSpec("engine parameters"))
        ));

        let mut spec = VehicleSpec::default();
        spec.suspension.spring_rate = 0.0;
        assert!(matches!(
            world.create_vehicle(&spec),
            Err(WorldError::InvalidSpec("suspension parameters"))
        ));

        let mut spec = VehicleSpec::default();
        spec.drive_ratio = -3.0;
        assert!(matches!(
            world.create_vehicle(&spec),
            Err(WorldError::InvalidSpec("drivetrain geometry"))
        ));

        // Nothing was registered and the world still steps cleanly
        assert_eq!(world.body_count(), 0);
        world.step(1.0 / 60.0);
    }

    #[test]
    fn test_stale_handle_rejected_after_removal() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        let other = default_vehicle(&mut world);

        world.remove_body(car).unwrap();

        assert!(matches!(world.body(car), Err(WorldError::UnknownBody(_))));
        assert!(matches!(
            world.set_throttle(car, 0.5),
            Err(WorldError::UnknownBody(_))
        ));
        assert!(matches!(
            world.remove_body(car),
            Err(WorldError::UnknownBody(_))
        ));
        // Other bodies are unaffected
        assert!(world.body(other).is_ok());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_vehicle_ops_on_plain_body_rejected() {
        let mut world = PhysicsWorld::new();
        let wall = world
            .create_static_body(Vec3::new(50.0, 1.0, 0.0), Dimensions::new(1.0, 10.0, 2.0))
            .unwrap();

        assert!(matches!(
            world.set_throttle(wall, 1.0),
            Err(WorldError::NotAVehicle(_))
        ));
        assert!(matches!(
            world.set_steering(wall, 0.5),
            Err(WorldError::NotAVehicle(_))
        ));
        assert!(matches!(
            world.engine_state(wall),
            Err(WorldError::NotAVehicle(_))
        ));
    }

    #[test]
    fn test_non_finite_force_rejected() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);

        assert!(matches!(
            world.apply_force(car, Vec3::new(f64::NAN, 0.0, 0.0)),
            Err(WorldError::NonFiniteForce)
        ));
        assert!(matches!(
            world.apply_torque(car, Vec3::new(0.0, f64::INFINITY, 0.0)),
            Err(WorldError::NonFiniteForce)
        ));
    }

    #[test]
    fn test_vehicle_spawns_settled() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        let start_y = world.body(car).unwrap().position.y;

        // Two seconds idle: no throttle, no inputs
        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }

        let body = world.body(car).unwrap();
        assert!(
            (body.position.y - start_y).abs() < 0.01,
            "chassis drifted vertically by {}",
            (body.position.y - start_y).abs()
        );
        assert!(
            body.linear_velocity.magnitude() < 0.01,
            "idle vehicle should stay at rest, |v| = {}",
            body.linear_velocity.magnitude()
        );
    }

    #[test]
    fn test_acceleration_run_reaches_plausible_speed() {
        let mut world = PhysicsWorld::new();
        let mut spec = VehicleSpec::default();
        spec.mass = 1200.0;
        spec.engine = EngineParams {
            max_torque: 250.0,
            max_power: 150.0,
            max_rpm: 7000.0,
            idle_rpm: 800.0,
        };
        spec.position = Vec3::new(0.0, spawn_height(&spec), 0.0);
        let car = world.create_vehicle(&spec).unwrap();

        world.set_throttle(car, 0.8).unwrap();

        let mut speed_at_4_5 = 0.0;
        for frame in 0..300 {
            world.step(1.0 / 60.0);
            if frame == 269 {
                speed_at_4_5 = world.body(car).unwrap().linear_velocity.x;
            }
        }

        let speed = world.body(car).unwrap().linear_velocity.x;
        assert!(speed > 20.0, "5 s at 80% throttle should exceed 20 m/s, got {}", speed);
        assert!(speed < 60.0, "speed implausibly high: {}", speed);
        assert!(speed > speed_at_4_5, "vehicle should still be accelerating at 5 s");
    }

    #[test]
    fn test_braking_distance_plausible() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        // 50 km/h
        world
            .set_linear_velocity(car, Vec3::new(13.89, 0.0, 0.0))
            .unwrap();

        let start_x = world.body(car).unwrap().position.x;
        for _ in 0..(10 * 60) {
            if world.body(car).unwrap().linear_velocity.x > 0.1 {
                world.apply_force(car, Vec3::new(-5000.0, 0.0, 0.0)).unwrap();
            }
            world.step(1.0 / 60.0);
        }

        let distance = world.body(car).unwrap().position.x - start_x;
        assert!(
            distance >= 10.0 && distance <= 30.0,
            "stopping distance from 50 km/h with 5 kN brake should be 10..30 m, got {}",
            distance
        );
        assert!(world.body(car).unwrap().linear_velocity.x.abs() < 0.5);

        // The odometer should agree with the straight-line travel
        let odometer = world.distance_traveled(car).unwrap();
        assert!(
            (odometer - distance).abs() < 0.5,
            "odometer {} vs positional distance {}",
            odometer,
            distance
        );
    }

    #[test]
    fn test_rpm_stays_within_limits() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        world.set_throttle(car, 1.0).unwrap();

        for _ in 0..600 {
            world.step(1.0 / 60.0);
            let engine = world.engine_state(car).unwrap();
            assert!(engine.rpm >= engine.params.idle_rpm);
            assert!(engine.rpm <= engine.params.max_rpm);
        }
    }

    #[test]
    fn test_steering_turns_the_vehicle() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        world.set_throttle(car, 0.6).unwrap();

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        world.set_steering(car, 0.5).unwrap();
        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }

        let body = world.body(car).unwrap();
        assert!(body.orientation.yaw > 0.05, "yaw should build up under steering");
        assert!(body.position.z.abs() > 0.1, "path should curve sideways");
    }

    #[test]
    fn test_deterministic_replay() {
        let run = || {
            let mut world = PhysicsWorld::new();
            let car = default_vehicle(&mut world);
            let _wall = world
                .create_static_body(Vec3::new(60.0, 1.0, 0.0), Dimensions::new(1.0, 4.0, 8.0))
                .unwrap();
            world.set_throttle(car, 0.9).unwrap();

            for frame in 0..600 {
                if frame == 200 {
                    world.set_steering(car, 0.2).unwrap();
                }
                world.step(1.0 / 60.0);
            }
            let body = world.body(car).unwrap();
            (body.position, body.linear_velocity, body.orientation.yaw)
        };

        let (pos_a, vel_a, yaw_a) = run();
        let (pos_b, vel_b, yaw_b) = run();

        // Bit-identical, not approximately equal
        assert_eq!(pos_a, pos_b);
        assert_eq!(vel_a, vel_b);
        assert_eq!(yaw_a.to_bits(), yaw_b.to_bits());
    }

    #[test]
    fn test_collision_reported_and_static_immovable() {
        let mut world = PhysicsWorld::new();
        let wall = world
            .create_static_body(Vec3::new(10.0, 0.0, 0.0), Dimensions::new(1.0, 4.0, 8.0))
            .unwrap();
        let crate_spec = BodySpec {
            mass: 200.0,
            position: Vec3::new(9.0, 0.0, 0.0), // overlapping the wall
            dimensions: Dimensions::new(1.5, 1.5, 1.5),
        };
        let moving = world.create_dynamic_body(&crate_spec).unwrap();
        world
            .set_linear_velocity(moving, Vec3::new(5.0, 0.0, 0.0))
            .unwrap();

        world.step(1.0 / 60.0);

        let events = world.collision_events();
        assert!(!events.is_empty(), "overlap must produce a collision event");
        let event = &events[0];
        assert!(
            (event.body_a == moving && event.body_b == wall)
                || (event.body_a == wall && event.body_b == moving)
        );
        assert!(event.penetration_depth > 0.0);
        assert!(event.impulse_magnitude > 0.0);

        assert_eq!(
            world.body(wall).unwrap().position,
            Vec3::new(10.0, 0.0, 0.0),
            "static body must never move"
        );
        // The dynamic body bounced off
        assert!(world.body(moving).unwrap().linear_velocity.x < 0.0);
    }

    #[test]
    fn test_collision_events_cleared_each_step() {
        let mut world = PhysicsWorld::new();
        let a = world
            .create_dynamic_body(&BodySpec {
                mass: 100.0,
                position: Vec3::ZERO,
                dimensions: Dimensions::new(1.0, 1.0, 1.0),
            })
            .unwrap();
        let _b = world
            .create_dynamic_body(&BodySpec {
                mass: 100.0,
                position: Vec3::new(0.5, 0.0, 0.0),
                dimensions: Dimensions::new(1.0, 1.0, 1.0),
            })
            .unwrap();

        world.step(1.0 / 60.0);
        assert!(!world.collision_events().is_empty());

        // Separate them; subsequent steps report nothing
        world
            .set_linear_velocity(a, Vec3::new(-100.0, 0.0, 0.0))
            .unwrap();
        world.step(1.0 / 60.0);
        world.step(1.0 / 60.0);
        assert!(world.collision_events().is_empty());
    }

    #[test]
    fn test_sub_step_cap_drops_excess_time() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        world
            .set_linear_velocity(car, Vec3::new(10.0, 0.0, 0.0))
            .unwrap();

        // One pathological 10 s frame simulates at most MAX_SUB_STEPS worth
        world.step(10.0);

        let max_travel = 10.0 * (MAX_SUB_STEPS as f64) * TIME_STEP + 1e-6;
        let x = world.body(car).unwrap().position.x;
        assert!(
            x <= max_travel,
            "capped step should not simulate 10 s of travel, moved {}",
            x
        );
    }

    #[test]
    fn test_throttle_and_steering_clamped() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);

        world.set_throttle(car, 3.0).unwrap();
        assert_eq!(world.engine_state(car).unwrap().throttle, 1.0);

        world.set_throttle(car, -1.0).unwrap();
        assert_eq!(world.engine_state(car).unwrap().throttle, 0.0);

        world.set_steering(car, -7.0).unwrap();
        world.set_steering(car, f64::NAN).unwrap();
        // NaN input falls back to straight ahead; simulation must stay finite
        world.step(1.0 / 60.0);
        assert!(world.body(car).unwrap().position.is_finite());
    }

    #[test]
    fn test_fuel_accumulates_under_load() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);

        world.set_throttle(car, 0.0).unwrap();
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let idle_fuel = world.fuel_used(car).unwrap();

        world.set_throttle(car, 1.0).unwrap();
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let loaded_fuel = world.fuel_used(car).unwrap() - idle_fuel;

        assert!(idle_fuel > 0.0, "engine idles fuel too");
        assert!(loaded_fuel > idle_fuel, "full throttle must burn more than idle");
    }

    #[test]
    fn test_tire_loads_track_vehicle_weight() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let total_load: f64 = world.tire_states(car).unwrap().iter().map(|t| t.load).sum();
        let weight = 1500.0 * constants::GRAVITY;
        assert!(
            (total_load - weight).abs() / weight < 0.05,
            "settled tire loads should carry the weight: {} vs {}",
            total_load,
            weight
        );
    }

    #[test]
    fn test_suspension_compression_within_travel() {
        let mut world = PhysicsWorld::new();
        let car = default_vehicle(&mut world);
        world.set_throttle(car, 1.0).unwrap();

        for _ in 0..300 {
            world.step(1.0 / 60.0);
            for corner in world.suspension_corners(car).unwrap() {
                assert!(corner.compression >= 0.0);
                assert!(corner.compression <= corner.params.max_compression);
            }
        }
    }
}
