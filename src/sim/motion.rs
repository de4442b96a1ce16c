// ──────────────────────────────────────────────────────────────────────────
// sim/motion.rs
//
//  *   aim accumulation and clamping
//  *   the five velocity branches (exactly one fires per tick)
//  *   yaw helpers for body facing
// ──────────────────────────────────────────────────────────────────────────

use glam::{EulerRot, Quat, Vec2, Vec3};
use std::f32::consts::PI;

use crate::defs::Posture;

/// Per-tick aim step at `MaxTurnSpeed == 1`, degrees.
pub const BASE_TURN_DEGREES: f32 = 45.0;

/// Wrap degrees into `[-180, 180)`.
#[inline]
pub fn wrap_180(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Wrap degrees into `[0, 360)`.
#[inline]
pub fn wrap_360(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Yaw of `q`'s forward axis, radians.
#[inline]
pub fn yaw_of(q: Quat) -> f32 {
    let f = q * Vec3::Z;
    f.x.atan2(f.z)
}

/// `q` with pitch and roll removed.
#[inline]
pub fn yaw_only(q: Quat) -> Quat {
    Quat::from_rotation_y(yaw_of(q))
}

/// Rotation turning +Z towards the horizontal direction `dir`.
#[inline]
pub fn look_yaw(dir: Vec3) -> Quat {
    Quat::from_rotation_y(dir.x.atan2(dir.z))
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/*──────────────────────────── aim ───────────────────────────────────*/

/// View direction as Euler degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aim {
    pub pitch: f32,
    pub yaw: f32,
}

impl Aim {
    /// Accumulate one tick of view input.
    ///
    /// Each axis moves at most `45° × max_turn_speed`, the result is
    /// wrapped to ±180° and clamped to `constraint` (pitch, yaw).
    pub fn update(&mut self, view_delta: Vec2, turn_factor: f32, max_turn_speed: f32, constraint: Vec2) {
        let max = BASE_TURN_DEGREES * max_turn_speed;
        let step = |d: f32| {
            let s = (d * turn_factor).clamp(-max, max);
            if s.is_nan() { 0.0 } else { s }
        };
        self.pitch = wrap_180(self.pitch + step(view_delta.y)).clamp(-constraint.x, constraint.x);
        self.yaw = wrap_180(self.yaw + step(view_delta.x)).clamp(-constraint.y, constraint.y);
    }

    /// Full aim rotation, yaw applied after pitch.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }

    /// Yaw-only part of the aim; movement input is relative to it.
    pub fn heading(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians())
    }
}

/*──────────────────────────── velocity ──────────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VelocityBranch {
    /// The animation dictates locomotion.
    AnimatedMove,
    /// Touch-down frame: stop dead.
    Landing,
    /// Limited drift control in the air.
    Airborne,
    GroundedWalk,
    GroundedIdle,
}

/// Pick the branch; total over every input.
pub fn select_branch(animated_move: bool, posture: Posture, walk: f32) -> VelocityBranch {
    if animated_move {
        VelocityBranch::AnimatedMove
    } else if posture == Posture::Land {
        VelocityBranch::Landing
    } else if posture.is_airborne() {
        VelocityBranch::Airborne
    } else if walk > 0.0 {
        VelocityBranch::GroundedWalk
    } else {
        VelocityBranch::GroundedIdle
    }
}

/// Locomotion parameters of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Locomotion {
    /// Move input in aim space, `(x, 0, y)`.
    pub move_local: Vec3,
    pub heading: Quat,
    /// `acceleration × dt`.
    pub acc_step: f32,
    pub dt: f32,
    pub max_speed: f32,
    pub forward_factor: f32,
}

impl Locomotion {
    /// Blend strafe and forward limits by how much of the input is forward.
    pub fn new(
        move_local: Vec3,
        heading: Quat,
        acc_step: f32,
        dt: f32,
        (max_strafe_speed, max_speed): (f32, f32),
        (strafe_factor, thrust_factor): (f32, f32),
    ) -> Self {
        let t = move_local.z.clamp(0.0, 1.0);
        Self {
            move_local,
            heading,
            acc_step,
            dt,
            max_speed: lerp(max_strafe_speed, max_speed, t),
            forward_factor: lerp(strafe_factor, thrust_factor, t),
        }
    }

    /// Input magnitude clamped to `[0, 1]`.
    #[inline]
    pub fn walk(&self) -> f32 {
        self.move_local.length().clamp(0.0, 1.0)
    }

    /// `walk`, negative when moving backwards.
    #[inline]
    pub fn signed_walk(&self) -> f32 {
        if self.move_local.z < 0.0 { -self.walk() } else { self.walk() }
    }

    #[inline]
    pub fn move_world(&self) -> Vec3 {
        self.heading * self.move_local
    }

    #[inline]
    pub fn top_speed(&self) -> f32 {
        self.max_speed * self.forward_factor * self.walk()
    }
}

/// Body-space velocity the animation asks for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedMove {
    pub local: Vec3,
    pub body_rotation: Quat,
    /// Roll with inverted direction: thrust is subtracted.
    pub reverse_thrust: bool,
}

/// Advance `current` through `branch`.
///
/// `animated` is only read by [`VelocityBranch::AnimatedMove`]; a missing
/// value there leaves `current` untouched.
pub fn resolve_velocity(
    current: Vec3,
    branch: VelocityBranch,
    loco: &Locomotion,
    animated: Option<&AnimatedMove>,
) -> Vec3 {
    match branch {
        VelocityBranch::AnimatedMove => match animated {
            Some(a) => {
                let thrust = loco.max_speed * loco.forward_factor * loco.signed_walk();
                let thrust = if a.reverse_thrust { -thrust } else { thrust };
                a.body_rotation * (a.local + Vec3::Z * thrust)
            }
            None => current,
        },
        VelocityBranch::Landing => Vec3::ZERO,
        VelocityBranch::Airborne => current + loco.move_world() * loco.forward_factor * loco.dt,
        VelocityBranch::GroundedWalk => {
            (current + loco.move_world() * loco.acc_step).clamp_length_max(loco.top_speed())
        }
        VelocityBranch::GroundedIdle => {
            if loco.acc_step > 0.0 {
                current - current / loco.acc_step
            } else {
                current
            }
        }
    }
}

/// Half-turn about Y.
#[inline]
pub fn about_face() -> Quat {
    Quat::from_rotation_y(PI)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
