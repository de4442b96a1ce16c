//! What the controller needs from the host engine: overlap queries,
//! collider lifetime, vehicles and a physics step.

use bitflags::bitflags;
use glam::Vec3;
use smallvec::SmallVec;

use super::body::{RigidBody, Transform};
use crate::defs::PilotAnimationType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoldierId(pub u32);

bitflags! {
    /// Collision layers an overlap query may report.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct QueryLayers: u32 {
        const SOLDIER  = 0x01;
        const VEHICLE  = 0x02;
        const BUILDING = 0x04;
        const TERRAIN  = 0x08;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryFilter {
    pub layers: QueryLayers,
    pub include_triggers: bool,
}

impl QueryFilter {
    /// Every layer, triggers included (vehicle entry zones are triggers).
    pub const EVERYTHING: QueryFilter = QueryFilter {
        layers: QueryLayers::all(),
        include_triggers: true,
    };

    /// What a soldier can stand on.
    pub const GROUND: QueryFilter = QueryFilter {
        layers: QueryLayers::all(),
        include_triggers: false,
    };

    /// What a melee blade can damage.
    pub const MELEE: QueryFilter = QueryFilter {
        layers: QueryLayers::SOLDIER
            .union(QueryLayers::VEHICLE)
            .union(QueryLayers::BUILDING),
        include_triggers: false,
    };
}

/// One collider touched by a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub collider: ColliderId,
    /// Vehicle the collider's rigid body belongs to, if any.
    pub vehicle: Option<VehicleId>,
}

pub type Hits = SmallVec<[Hit; 8]>;

/// Damage reported by a controller, routed back to its victim by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageEvent {
    pub target: ColliderId,
    /// Soldier owning `target`, when it is a movement collider.
    pub victim: Option<SoldierId>,
    pub amount: f32,
}

/// Seat handed out by a vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct Seat {
    pub vehicle: VehicleId,
    pub index: usize,
    /// `None` hides the pilot inside the vehicle.
    pub pilot_position: Option<Transform>,
    pub animation_type: PilotAnimationType,
    /// Clip of a static pose seat.
    pub pilot_animation: String,
    /// Clip of a nine/five pose seat.
    pub pilot_9pose: String,
}

pub trait Vehicle {
    fn position(&self) -> Vec3;

    fn has_available_seat(&self) -> bool;

    /// Claim a free seat for `soldier`.
    fn try_enter(&mut self, soldier: SoldierId) -> Option<Seat>;

    /// Give the seat back.
    fn leave(&mut self, soldier: SoldierId);
}

/// Host engine services used by a soldier during its tick.
///
/// Queries are synchronous and uncached.
pub trait Environment {
    fn gravity(&self) -> Vec3;

    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: QueryFilter) -> Hits;

    /// Capsule around segment `from`→`to`.
    fn overlap_capsule(&self, from: Vec3, to: Vec3, radius: f32, filter: QueryFilter) -> Hits;

    /// Create the movement capsule of `owner` standing at `feet`.
    fn spawn_movement_collider(&mut self, owner: SoldierId, feet: Vec3) -> ColliderId;

    fn remove_collider(&mut self, id: ColliderId);

    fn vehicle(&self, id: VehicleId) -> Option<&dyn Vehicle>;

    fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut dyn Vehicle>;

    fn apply_damage(&mut self, target: ColliderId, amount: f32);

    /// Damage reported since the last call.
    fn drain_damage(&mut self) -> Vec<DamageEvent> {
        Vec::new()
    }

    /// Physics step for one free body.
    fn integrate(&mut self, body: &mut RigidBody, dt: f32);
}
