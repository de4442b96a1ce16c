use glam::{Quat, Vec3};

use super::env::ColliderId;

/// World-space placement.  Y is up, +Z is forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unit vector along local +Z.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Upright capsule every free soldier moves with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementCapsule {
    pub height: f32,
    pub radius: f32,
    /// Centre height above the feet.
    pub center_y: f32,
}

pub const MOVEMENT_CAPSULE: MovementCapsule = MovementCapsule {
    height: 1.8,
    radius: 0.3,
    center_y: 0.9,
};

impl MovementCapsule {
    /// Segment end points of the capsule standing at `feet`.
    pub fn segment(&self, feet: Vec3) -> (Vec3, Vec3) {
        let half = (self.height * 0.5 - self.radius).max(0.0);
        let c = feet + Vec3::Y * self.center_y;
        (c - Vec3::Y * half, c + Vec3::Y * half)
    }
}

/// Physics body of a free soldier.
///
/// The controller writes velocity and rotation; the host's physics step
/// ([`super::Environment::integrate`]) moves it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBody {
    pub collider: ColliderId,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
}

impl RigidBody {
    pub fn new(collider: ColliderId, at: Transform) -> Self {
        Self {
            collider,
            position: at.position,
            rotation: at.rotation,
            velocity: Vec3::ZERO,
        }
    }

    /// Instantaneous change of velocity, mass ignored.
    #[inline]
    pub fn add_velocity_change(&mut self, dv: Vec3) {
        self.velocity += dv;
    }

    /// Velocity with the vertical component removed.
    #[inline]
    pub fn planar_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z)
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capsule_segment_spans_body() {
        let (a, b) = MOVEMENT_CAPSULE.segment(Vec3::ZERO);
        assert!((a.y - 0.3).abs() < 1e-6);
        assert!((b.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn planar_velocity_drops_y() {
        let mut b = RigidBody::new(ColliderId(1), Transform::default());
        b.velocity = Vec3::new(1.0, -9.0, 2.0);
        assert_eq!(b.planar_velocity(), Vec3::new(1.0, 0.0, 2.0));
    }
}
