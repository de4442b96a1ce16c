mod arena;
mod body;
mod env;

pub use arena::{Arena, ParkedVehicle, SeatTemplate};
pub use body::{MovementCapsule, RigidBody, Transform, MOVEMENT_CAPSULE};
pub use env::{
    ColliderId, DamageEvent, Environment, Hit, Hits, QueryFilter, QueryLayers, Seat, SoldierId,
    Vehicle, VehicleId,
};
