//! Flat-ground reference environment.
//!
//! * Infinite ground plane at `y = 0` (collider 0, `TERRAIN`).
//! * Static spheres, movement capsules and parked vehicles.
//! * Damage is appended to a ledger and drained by the runner.
//!
//! Good enough to drive the controller headless; not a physics engine.

use glam::Vec3;
use tracing::debug;

use super::body::{MOVEMENT_CAPSULE, RigidBody, Transform};
use super::env::{
    ColliderId, DamageEvent, Environment, Hit, Hits, QueryFilter, QueryLayers, Seat, SoldierId,
    Vehicle, VehicleId,
};
use crate::defs::PilotAnimationType;

pub const GROUND: ColliderId = ColliderId(0);

/// Radius of the entry trigger around a parked vehicle.
const VEHICLE_TRIGGER_RADIUS: f32 = 1.5;

/*──────────────────────── shapes ────────────────────────*/

#[derive(Clone, Copy, Debug)]
enum Shape {
    Ground,
    Sphere { center: Vec3, radius: f32 },
    Capsule { a: Vec3, b: Vec3, radius: f32 },
}

#[derive(Clone, Debug)]
struct ArenaCollider {
    id: ColliderId,
    shape: Shape,
    layers: QueryLayers,
    trigger: bool,
    vehicle: Option<VehicleId>,
    owner: Option<SoldierId>,
}

fn closest_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Shortest distance between segments `p1q1` and `p2q2`.
fn segment_distance(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= f32::EPSILON && e <= f32::EPSILON {
        (0.0, 0.0)
    } else if a <= f32::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= f32::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > f32::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    ((p1 + d1 * s) - (p2 + d2 * t)).length()
}

impl Shape {
    /// Does a capsule around `a`→`b` (a sphere when `a == b`) touch us?
    fn touches(&self, a: Vec3, b: Vec3, radius: f32) -> bool {
        match *self {
            Shape::Ground => a.y.min(b.y) - radius <= 0.0,
            Shape::Sphere { center, radius: r } => {
                (closest_on_segment(center, a, b) - center).length() <= r + radius
            }
            Shape::Capsule {
                a: ca,
                b: cb,
                radius: r,
            } => segment_distance(a, b, ca, cb) <= r + radius,
        }
    }
}

/*──────────────────────── vehicles ────────────────────────*/

/// Seat layout of a parked vehicle.
#[derive(Clone, Debug, Default)]
pub struct SeatTemplate {
    pub pilot_position: Option<Transform>,
    pub animation_type: PilotAnimationType,
    pub pilot_animation: String,
    pub pilot_9pose: String,
}

#[derive(Clone, Debug)]
pub struct ParkedVehicle {
    id: VehicleId,
    position: Vec3,
    seats: Vec<SeatTemplate>,
    occupants: Vec<Option<SoldierId>>,
}

impl ParkedVehicle {
    pub fn occupants(&self) -> &[Option<SoldierId>] {
        &self.occupants
    }
}

impl Vehicle for ParkedVehicle {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn has_available_seat(&self) -> bool {
        self.occupants.iter().any(Option::is_none)
    }

    fn try_enter(&mut self, soldier: SoldierId) -> Option<Seat> {
        let index = self.occupants.iter().position(Option::is_none)?;
        self.occupants[index] = Some(soldier);
        let t = &self.seats[index];
        Some(Seat {
            vehicle: self.id,
            index,
            pilot_position: t.pilot_position,
            animation_type: t.animation_type,
            pilot_animation: t.pilot_animation.clone(),
            pilot_9pose: t.pilot_9pose.clone(),
        })
    }

    fn leave(&mut self, soldier: SoldierId) {
        for slot in &mut self.occupants {
            if *slot == Some(soldier) {
                *slot = None;
            }
        }
    }
}

/*──────────────────────── arena ────────────────────────*/

#[derive(Clone, Debug)]
pub struct Arena {
    gravity: Vec3,
    colliders: Vec<ArenaCollider>,
    vehicles: Vec<ParkedVehicle>,
    damage: Vec<DamageEvent>,
    next_collider: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            colliders: vec![ArenaCollider {
                id: GROUND,
                shape: Shape::Ground,
                layers: QueryLayers::TERRAIN,
                trigger: false,
                vehicle: None,
                owner: None,
            }],
            vehicles: Vec::new(),
            damage: Vec::new(),
            next_collider: 1,
        }
    }

    fn alloc_collider(&mut self) -> ColliderId {
        let id = ColliderId(self.next_collider);
        self.next_collider += 1;
        id
    }

    /// Static sphere, e.g. a crate or a target dummy.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, layers: QueryLayers) -> ColliderId {
        let id = self.alloc_collider();
        self.colliders.push(ArenaCollider {
            id,
            shape: Shape::Sphere { center, radius },
            layers,
            trigger: false,
            vehicle: None,
            owner: None,
        });
        id
    }

    /// Park a vehicle with the given seats; an entry trigger surrounds it.
    pub fn park_vehicle(&mut self, position: Vec3, seats: Vec<SeatTemplate>) -> VehicleId {
        let id = VehicleId(self.vehicles.len() as u32);
        let occupants = vec![None; seats.len()];
        self.vehicles.push(ParkedVehicle {
            id,
            position,
            seats,
            occupants,
        });
        let cid = self.alloc_collider();
        self.colliders.push(ArenaCollider {
            id: cid,
            shape: Shape::Sphere {
                center: position,
                radius: VEHICLE_TRIGGER_RADIUS,
            },
            layers: QueryLayers::VEHICLE,
            trigger: true,
            vehicle: Some(id),
            owner: None,
        });
        id
    }

    pub fn parked(&self, id: VehicleId) -> Option<&ParkedVehicle> {
        self.vehicles.get(id.0 as usize)
    }

    pub fn has_collider(&self, id: ColliderId) -> bool {
        self.colliders.iter().any(|c| c.id == id)
    }

    /// Damage reported so far and not yet drained.
    pub fn damage(&self) -> &[DamageEvent] {
        &self.damage
    }

    fn query(&self, a: Vec3, b: Vec3, radius: f32, filter: QueryFilter) -> Hits {
        self.colliders
            .iter()
            .filter(|c| c.layers.intersects(filter.layers))
            .filter(|c| filter.include_triggers || !c.trigger)
            .filter(|c| c.shape.touches(a, b, radius))
            .map(|c| Hit {
                collider: c.id,
                vehicle: c.vehicle,
            })
            .collect()
    }
}

impl Environment for Arena {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: QueryFilter) -> Hits {
        self.query(center, center, radius, filter)
    }

    fn overlap_capsule(&self, from: Vec3, to: Vec3, radius: f32, filter: QueryFilter) -> Hits {
        self.query(from, to, radius, filter)
    }

    fn spawn_movement_collider(&mut self, owner: SoldierId, feet: Vec3) -> ColliderId {
        let id = self.alloc_collider();
        let (a, b) = MOVEMENT_CAPSULE.segment(feet);
        self.colliders.push(ArenaCollider {
            id,
            shape: Shape::Capsule {
                a,
                b,
                radius: MOVEMENT_CAPSULE.radius,
            },
            layers: QueryLayers::SOLDIER,
            trigger: false,
            vehicle: None,
            owner: Some(owner),
        });
        id
    }

    fn remove_collider(&mut self, id: ColliderId) {
        self.colliders.retain(|c| c.id != id);
    }

    fn vehicle(&self, id: VehicleId) -> Option<&dyn Vehicle> {
        self.vehicles.get(id.0 as usize).map(|v| v as &dyn Vehicle)
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut dyn Vehicle> {
        self.vehicles
            .get_mut(id.0 as usize)
            .map(|v| v as &mut dyn Vehicle)
    }

    fn apply_damage(&mut self, target: ColliderId, amount: f32) {
        let victim = self
            .colliders
            .iter()
            .find(|c| c.id == target)
            .and_then(|c| c.owner);
        debug!(?target, ?victim, amount, "arena damage");
        self.damage.push(DamageEvent {
            target,
            victim,
            amount,
        });
    }

    fn drain_damage(&mut self) -> Vec<DamageEvent> {
        std::mem::take(&mut self.damage)
    }

    fn integrate(&mut self, body: &mut RigidBody, dt: f32) {
        let resting = body.position.y <= 0.0 && body.velocity.y <= 0.0;
        if !resting {
            body.velocity += self.gravity * dt;
        }
        body.position += body.velocity * dt;
        if body.position.y < 0.0 {
            body.position.y = 0.0;
            body.velocity.y = body.velocity.y.max(0.0);
        }

        let (a, b) = MOVEMENT_CAPSULE.segment(body.position);
        if let Some(c) = self.colliders.iter_mut().find(|c| c.id == body.collider) {
            c.shape = Shape::Capsule {
                a,
                b,
                radius: MOVEMENT_CAPSULE.radius,
            };
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_is_hit_only_near_the_floor() {
        let arena = Arena::new();
        let near = arena.overlap_sphere(Vec3::new(0.0, 0.1, 0.0), 0.2, QueryFilter::GROUND);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].collider, GROUND);
        let far = arena.overlap_sphere(Vec3::new(0.0, 2.0, 0.0), 0.2, QueryFilter::GROUND);
        assert!(far.is_empty());
    }

    #[test]
    fn layer_and_trigger_filters_apply() {
        let mut arena = Arena::new();
        arena.park_vehicle(Vec3::new(0.0, 1.0, 0.0), vec![SeatTemplate::default()]);
        let p = Vec3::new(0.0, 1.0, 1.0);
        assert!(arena.overlap_sphere(p, 0.5, QueryFilter::MELEE).is_empty());
        let hits = arena.overlap_sphere(p, 0.5, QueryFilter::EVERYTHING);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vehicle, Some(VehicleId(0)));
    }

    #[test]
    fn capsule_query_hits_sphere_along_its_length() {
        let mut arena = Arena::new();
        let dummy = arena.add_sphere(Vec3::new(0.0, 5.0, 3.0), 0.5, QueryLayers::SOLDIER);
        let from = Vec3::new(0.0, 5.0, 0.0);
        let hits = arena.overlap_capsule(from, from + Vec3::Z * 2.8, 0.1, QueryFilter::MELEE);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, dummy);
        let short = arena.overlap_capsule(from, from + Vec3::Z, 0.1, QueryFilter::MELEE);
        assert!(short.is_empty());
    }

    #[test]
    fn capsules_touch_capsules() {
        let mut arena = Arena::new();
        let other = arena.spawn_movement_collider(SoldierId(9), Vec3::new(1.0, 0.0, 0.0));
        let hits = arena.overlap_capsule(
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(0.0, 1.0, 1.0),
            0.75,
            QueryFilter::MELEE,
        );
        assert!(hits.iter().any(|h| h.collider == other));
    }

    #[test]
    fn seats_fill_and_free() {
        let mut arena = Arena::new();
        let id = arena.park_vehicle(Vec3::ZERO, vec![SeatTemplate::default()]);
        let v = arena.vehicle_mut(id).unwrap();
        let seat = v.try_enter(SoldierId(1)).unwrap();
        assert_eq!(seat.index, 0);
        assert!(!v.has_available_seat());
        assert!(v.try_enter(SoldierId(2)).is_none());
        v.leave(SoldierId(1));
        assert!(v.has_available_seat());
    }

    #[test]
    fn bodies_fall_and_rest_on_ground() {
        let mut arena = Arena::new();
        let cid = arena.spawn_movement_collider(SoldierId(0), Vec3::new(0.0, 1.0, 0.0));
        let mut body = RigidBody::new(cid, Transform::new(Vec3::new(0.0, 1.0, 0.0), Default::default()));
        for _ in 0..200 {
            arena.integrate(&mut body, 0.02);
        }
        assert_eq!(body.position.y, 0.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn damage_is_attributed_to_owner() {
        let mut arena = Arena::new();
        let cid = arena.spawn_movement_collider(SoldierId(4), Vec3::ZERO);
        arena.apply_damage(cid, 25.0);
        let ev = arena.drain_damage();
        assert_eq!(ev.len(), 1);
        assert_eq!(ev[0].victim, Some(SoldierId(4)));
        assert!(arena.damage().is_empty());
    }

    #[test]
    fn segment_distance_parallel_and_crossing() {
        let d = segment_distance(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Y + Vec3::X);
        assert!((d - 1.0).abs() < 1e-5);
        let d = segment_distance(-Vec3::X, Vec3::X, -Vec3::Z + Vec3::Y, Vec3::Z + Vec3::Y);
        assert!((d - 1.0).abs() < 1e-5);
    }
}
