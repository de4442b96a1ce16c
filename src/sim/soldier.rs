//! The soldier controller.
//!
//! One `update_state` call per fixed tick turns input, animation-machine
//! outputs and physics feedback into aim, body rotation, velocity and new
//! animation-machine inputs.  The ordering below is load-bearing:
//!
//! 1. pilot context → seat posing only
//! 2. timers
//! 3. vehicle entry
//! 4. input locks
//! 5. action derivation, edge forwarding
//! 6. thrust input
//! 7. fixated → stop
//! 8. grounded probe
//! 9. weapon cycling
//! 10. melee
//! 11. control factors
//! 12. combo speed override
//! 13. aim
//! 14. body facing
//! 15. velocity
//! 16. body rotation
//! 17. playback speed sync
//! 18. commit

use glam::{Quat, Vec2, Vec3, Vec4};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::components::ControlData;
use super::melee::MeleeResolver;
use super::motion::{
    AnimatedMove, Aim, Locomotion, VelocityBranch, about_face, look_yaw, resolve_velocity,
    select_branch, wrap_360, yaw_only,
};
use super::posing::update_pose;
use super::posture::PostureTracker;
use super::weapons::{Armory, WeaponEvent, WeaponSlots};
use super::TickError;
use crate::anim::{AnimBridge, Layer, LayerState, Poser};
use crate::class::SoldierClass;
use crate::defs::{Action, AimType, Channel, InputEvents, InputFlags, PilotAnimationType, Posture};
use crate::world::{Environment, QueryFilter, RigidBody, Seat, SoldierId, Transform, VehicleId};

/// Radius searched for enterable vehicles.
pub const VEHICLE_SEARCH_RADIUS: f32 = 5.0;
/// Radius of the ground probe at the feet.
pub const GROUND_PROBE_RADIUS: f32 = 0.2;
/// Body rotation follows its target at `rate × dt` per tick.
pub const BODY_SLERP_RATE: f32 = 5.0;
/// Seconds a soldier stays alert after firing or being hit.
pub const ALERT_TIME: f32 = 3.0;
/// Falls longer than this land hard.
pub const HARD_LANDING_TIME: f32 = 1.5;
/// Energy reported to the animation machine.
pub const ENERGY: f32 = 100.0;

/// Animation bank of seated pilots.
const PILOT_BANK: &str = "human_4";

/// Free on foot, or seated in a vehicle.
#[derive(Clone, Debug)]
pub enum Context {
    /// `body` is `None` once fixated (ragdolled).
    Free { body: Option<RigidBody> },
    Pilot { seat: Seat, poser: Option<Poser> },
}

/// A soldier: class data, animation bridge, weapons and per-tick state.
#[derive(Debug)]
pub struct Soldier<B: AnimBridge = Box<dyn AnimBridge>> {
    id: SoldierId,
    class: Arc<SoldierClass>,
    bridge: B,
    context: Context,
    weapons: WeaponSlots,
    melee: MeleeResolver,
    postures: PostureTracker,

    aim: Aim,
    body_target: Quat,
    velocity: Vec3,
    /// Last known placement while there is no body.
    position: Vec3,

    grounded: bool,
    fall_timer: f32,
    alert_timer: f32,
    health: f32,
}

impl<B: AnimBridge> Soldier<B> {
    /// Create the movement collider, instantiate the loadout and equip the
    /// first primary weapon.
    pub fn spawn<E: Environment + ?Sized>(
        id: SoldierId,
        class: Arc<SoldierClass>,
        mut bridge: B,
        armory: &mut dyn Armory,
        env: &mut E,
        at: Transform,
    ) -> Self {
        let collider = env.spawn_movement_collider(id, at.position);
        let weapons = WeaponSlots::build(&class.weapons, armory, collider);

        // assume we're grounded on spawn
        bridge.inputs_mut().grounded = true;

        let facing = yaw_only(at.rotation);
        let mut soldier = Self {
            id,
            health: class.max_health,
            class,
            bridge,
            context: Context::Free {
                body: Some(RigidBody::new(collider, Transform::new(at.position, facing))),
            },
            weapons,
            melee: MeleeResolver::default(),
            postures: PostureTracker::default(),
            aim: Aim::default(),
            body_target: facing,
            velocity: Vec3::ZERO,
            position: at.position,
            grounded: true,
            fall_timer: 0.0,
            alert_timer: 0.0,
        };
        debug!(soldier = ?id, class = %soldier.class.name, animation = soldier.class.character_animation(), "spawned");

        // switching weapons changes the animation bank, the bridge exists now
        soldier.next_weapon(Channel::Primary);
        soldier
    }

    /*------------------------------------------------------------------*/
    /* accessors                                                        */
    /*------------------------------------------------------------------*/

    #[inline]
    pub fn id(&self) -> SoldierId {
        self.id
    }

    #[inline]
    pub fn class(&self) -> &SoldierClass {
        &self.class
    }

    #[inline]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    #[inline]
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn weapons(&self) -> &WeaponSlots {
        &self.weapons
    }

    #[inline]
    pub fn aim(&self) -> Aim {
        self.aim
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn body_target(&self) -> Quat {
        self.body_target
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    #[inline]
    pub fn fall_timer(&self) -> f32 {
        self.fall_timer
    }

    #[inline]
    pub fn alert_timer(&self) -> f32 {
        self.alert_timer
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    #[inline]
    pub fn is_pilot(&self) -> bool {
        matches!(self.context, Context::Pilot { .. })
    }

    /// No physics body: ragdolled or seated.
    #[inline]
    pub fn is_fixated(&self) -> bool {
        self.body().is_none()
    }

    pub fn body(&self) -> Option<&RigidBody> {
        match &self.context {
            Context::Free { body } => body.as_ref(),
            Context::Pilot { .. } => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut RigidBody> {
        match &mut self.context {
            Context::Free { body } => body.as_mut(),
            Context::Pilot { .. } => None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.body().map_or(self.position, |b| b.position)
    }

    pub fn poser(&self) -> Option<&Poser> {
        match &self.context {
            Context::Pilot { poser, .. } => poser.as_ref(),
            Context::Free { .. } => None,
        }
    }

    /*------------------------------------------------------------------*/
    /* public actions                                                   */
    /*------------------------------------------------------------------*/

    /// Heal (positive) or hurt (negative), clamped to `[0, max_health]`.
    pub fn add_health(&mut self, amount: f32) {
        if amount < 0.0 {
            self.alert_timer = ALERT_TIME;
        }
        let was_alive = !self.is_dead();
        self.health = (self.health + amount).clamp(0.0, self.class.max_health);
        if was_alive && self.is_dead() {
            info!(soldier = ?self.id, "soldier died");
        }
    }

    /// Cycle `channel` and switch the animation bank to the new weapon.
    pub fn next_weapon(&mut self, channel: Channel) {
        if let Some(bank) = self.weapons.next(channel) {
            self.bridge.set_active_weapon_bank(&bank);
        }
    }

    /// Kick off the spawn animation through a synthetic reload press.
    pub fn play_intro_anim(&mut self) {
        self.bridge.inputs_mut().events.pressed |= InputFlags::RELOAD;
    }

    /// Drop the physics body (ragdoll).  The soldier counts as grounded.
    pub fn fixate<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if let Context::Free { body } = &mut self.context {
            if let Some(b) = body.take() {
                env.remove_collider(b.collider);
                self.position = b.position;
            }
        }
        self.grounded = true;
        self.bridge.inputs_mut().grounded = true;
        debug!(soldier = ?self.id, "fixated");
    }

    /// Enter the nearest vehicle with a free seat within reach.
    pub fn try_enter_vehicle<E: Environment + ?Sized>(&mut self, env: &mut E) -> bool {
        if self.is_pilot() {
            return false;
        }

        let origin = self.position();
        let mut best: Option<(VehicleId, f32)> = None;
        for id in env
            .overlap_sphere(origin, VEHICLE_SEARCH_RADIUS, QueryFilter::EVERYTHING)
            .iter()
            .filter_map(|h| h.vehicle)
        {
            let Some(vehicle) = env.vehicle(id) else {
                warn!(vehicle = ?id, "overlap reported an unknown vehicle");
                continue;
            };
            if !vehicle.has_available_seat() {
                continue;
            }
            let dist = vehicle.position().distance(origin);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((id, dist));
            }
        }

        let Some((id, _)) = best else {
            return false;
        };
        let seat = env.vehicle_mut(id).and_then(|v| v.try_enter(self.id));
        match seat {
            Some(seat) => {
                self.set_pilot(seat, env);
                true
            }
            None => false,
        }
    }

    /// Switch to the pilot context of `seat`.
    pub fn set_pilot<E: Environment + ?Sized>(&mut self, seat: Seat, env: &mut E) {
        if let Context::Free { body: Some(b) } = &self.context {
            env.remove_collider(b.collider);
            self.position = b.position;
        }
        self.velocity = Vec3::ZERO;

        let poser = match &seat.pilot_position {
            Some(at) => {
                self.position = at.position;
                match seat.animation_type {
                    PilotAnimationType::None => None,
                    PilotAnimationType::StaticPose => Some(Poser::new(
                        PILOT_BANK,
                        format!("human_{}", seat.pilot_animation),
                        true,
                    )),
                    PilotAnimationType::NinePose | PilotAnimationType::FivePose => Some(
                        Poser::new(PILOT_BANK, format!("human_{}", seat.pilot_9pose), false),
                    ),
                }
            }
            // hidden inside the vehicle
            None => None,
        };

        self.weapons.set_visible(Channel::Primary, false);
        debug!(soldier = ?self.id, vehicle = ?seat.vehicle, seat = seat.index, "entered vehicle");
        self.context = Context::Pilot { seat, poser };
    }

    /// Leave the vehicle and stand at `position` with a fresh body.
    pub fn set_free<E: Environment + ?Sized>(&mut self, position: Vec3, env: &mut E) {
        if let Context::Pilot { seat, .. } = &self.context {
            if let Some(v) = env.vehicle_mut(seat.vehicle) {
                v.leave(self.id);
            }
        }
        if let Context::Free { body: Some(b) } = &self.context {
            env.remove_collider(b.collider);
        }

        let collider = env.spawn_movement_collider(self.id, position);
        let facing = yaw_only(self.body_target);
        self.context = Context::Free {
            body: Some(RigidBody::new(collider, Transform::new(position, facing))),
        };
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.weapons.set_visible(Channel::Primary, true);
        debug!(soldier = ?self.id, ?position, "left vehicle");
    }

    /// Physics step of the free body, if any.
    pub fn integrate<E: Environment + ?Sized>(&mut self, env: &mut E, dt: f32) {
        if let Context::Free { body: Some(b) } = &mut self.context {
            env.integrate(b, dt);
            self.position = b.position;
        }
    }

    /*------------------------------------------------------------------*/
    /* per-tick resolution                                              */
    /*------------------------------------------------------------------*/

    pub fn update_state<E: Environment + ?Sized>(
        &mut self,
        data: &ControlData,
        env: &mut E,
        dt: f32,
    ) -> Result<(), TickError> {
        // 1. seated: pose only
        if let Context::Pilot { seat, poser } = &mut self.context {
            if let Some(poser) = poser {
                poser.begin_tick();
                let input = Vec4::new(
                    data.movement.x,
                    data.movement.y,
                    data.view_delta.x,
                    data.view_delta.y,
                );
                update_pose(poser, seat.animation_type, input, dt);
            }
            return Ok(());
        }

        // 2.
        self.alert_timer = (self.alert_timer - dt).max(0.0);

        // 3.
        if data.events.is_pressed(InputFlags::ENTER) && self.try_enter_vehicle(env) {
            return Ok(());
        }

        // 4. locks only hold while the upper layer is inside the lock window
        let upper = self.bridge.layer(Layer::Upper);
        let locked = {
            let out = self.bridge.outputs();
            let window = out.input_lock_duration;
            let time = upper.map_or(0.0, |l| l.time);
            if window == 0.0 || time < window {
                out.input_locks
            } else {
                InputFlags::empty()
            }
        };
        let events = data.events.masked(locked);

        // 5.
        let action = Action::from_events(&events);

        // 6.
        let movement = if locked.contains(InputFlags::THRUST) {
            Vec2::ZERO
        } else {
            data.movement
        };
        let view_delta = if locked.contains(InputFlags::VIEW) {
            Vec2::ZERO
        } else {
            data.view_delta
        };
        self.write_inputs(action, data.events, movement);

        // 7.
        let body = match &mut self.context {
            Context::Free { body } => body.take(),
            Context::Pilot { .. } => None,
        };
        let Some(mut body) = body else {
            return Ok(());
        };

        let result = self.step_body(&mut body, action, &events, movement, view_delta, env, dt);

        self.position = body.position;
        if let Context::Free { body: slot } = &mut self.context {
            *slot = Some(body);
        }
        result
    }

    fn write_inputs(&mut self, action: Action, raw: InputEvents, movement: Vec2) {
        let grounded = self.grounded;
        let inputs = self.bridge.inputs_mut();
        inputs.action = action;
        inputs.events = raw;
        inputs.thrust_x = movement.x;
        inputs.thrust_y = movement.y;
        inputs.thrust_magnitude = movement.length().clamp(0.0, 1.0);
        inputs.thrust_angle = wrap_360((-movement.x).atan2(movement.y).to_degrees());
        inputs.energy = ENERGY;
        inputs.grounded = grounded;
    }

    fn step_body<E: Environment + ?Sized>(
        &mut self,
        body: &mut RigidBody,
        action: Action,
        events: &InputEvents,
        movement: Vec2,
        view_delta: Vec2,
        env: &mut E,
        dt: f32,
    ) -> Result<(), TickError> {
        let posture = self.bridge.outputs().posture;

        // 8.
        self.grounded = posture != Posture::Jump
            && env
                .overlap_sphere(body.position, GROUND_PROBE_RADIUS, QueryFilter::GROUND)
                .iter()
                .any(|h| h.collider != body.collider);

        // 9.
        if events.is_pressed(InputFlags::NEXT_PRIMARY_WEAPON) {
            self.next_weapon(Channel::Primary);
        }
        if events.is_pressed(InputFlags::NEXT_SECONDARY_WEAPON) {
            self.next_weapon(Channel::Secondary);
        }
        self.handle_weapon_events();

        // 10.
        let upper = self.bridge.layer(Layer::Upper);
        let lower = self.bridge.layer(Layer::Lower);
        if self.weapons.has_combo() {
            self.melee.update(
                self.bridge.outputs(),
                upper,
                self.weapons.active_mut(Channel::Primary),
                body,
                env,
            );
        }

        // 11.
        let factors = self.postures.factors(posture, &self.class.control_speed)?;

        // 12.
        let out = self.bridge.outputs();
        let animated_move = out.animated_move;
        let aim_type = out.aim_type;
        let strafe_backwards = out.strafe_backwards;
        let is_combo = |l: Option<LayerState>| l.is_some_and(|l| l.is_combo);
        let (max_strafe, max_speed) = if animated_move && is_combo(upper) && is_combo(lower) {
            (out.velocity_from_strafe, out.velocity_from_thrust)
        } else {
            (self.class.max_strafe_speed, self.class.max_speed)
        };
        let hint = Vec3::new(out.velocity_x, 0.0, out.velocity_z);
        let (x_from_anim, z_from_anim) = (out.velocity_x_from_anim, out.velocity_z_from_anim);

        // 13.
        self.aim.update(
            view_delta,
            factors.turn,
            self.class.max_turn_speed,
            self.class.aim_constraint,
        );

        let loco = Locomotion::new(
            Vec3::new(movement.x, 0.0, movement.y),
            self.aim.heading(),
            self.class.acceleration * dt,
            dt,
            (max_strafe, max_speed),
            (factors.strafe, factors.thrust),
        );
        let walk = loco.walk();
        let inverted = strafe_backwards || movement.y < 0.0;

        // 14. + 16. target; kept while rolling and while idle
        if posture != Posture::Roll {
            if aim_type == AimType::FullBody {
                self.body_target = self.aim.rotation();
            } else if walk > 0.0 {
                let facing = yaw_only(loco.heading * look_yaw(loco.move_local));
                self.body_target = if inverted {
                    facing * about_face()
                } else {
                    facing
                };
            }
        }

        // 15.
        let branch = select_branch(animated_move, posture, walk);
        let animated = (branch == VelocityBranch::AnimatedMove).then(|| {
            let local = if posture.is_airborne() {
                body.rotation.inverse() * self.velocity
            } else {
                let root = lower.map_or(Vec3::ZERO, |l| l.root_motion_velocity());
                Vec3::new(
                    if x_from_anim { root.x } else { hint.x },
                    0.0,
                    if z_from_anim { root.z } else { hint.z },
                )
            };
            AnimatedMove {
                local,
                body_rotation: body.rotation,
                reverse_thrust: posture == Posture::Roll && inverted,
            }
        });
        self.velocity = resolve_velocity(self.velocity, branch, &loco, animated.as_ref());
        self.velocity.y = 0.0;

        // 16.
        if action == Action::Roll && inverted {
            self.body_target *= about_face();
        }
        body.rotation = body
            .rotation
            .slerp(self.body_target, (BODY_SLERP_RATE * dt).min(1.0));

        // 17.
        self.sync_playback(posture, body, lower, upper);

        // 18.
        self.commit(posture, body, action, env, dt);
        Ok(())
    }

    fn handle_weapon_events(&mut self) {
        for (channel, event) in self.weapons.drain_events() {
            match event {
                WeaponEvent::Shot => self.alert_timer = ALERT_TIME,
                WeaponEvent::Reload => {
                    let reload_time = self.weapons.active(channel).map(|w| w.reload_time());
                    debug!(soldier = ?self.id, ?channel, ?reload_time, "reload");
                }
            }
        }
    }

    /// Scale movement clips so the feet match the body's ground speed.
    fn sync_playback(
        &mut self,
        posture: Posture,
        body: &RigidBody,
        lower: Option<LayerState>,
        upper: Option<LayerState>,
    ) {
        if !posture.is_grounded_locomotion() {
            return;
        }
        let Some(lower) = lower else {
            return;
        };

        let root_speed = lower.root_motion_velocity().length();
        if root_speed > 0.0 {
            let speed = body.planar_velocity().length() / root_speed;
            for (layer, state) in [(Layer::Lower, Some(lower)), (Layer::Upper, upper)] {
                if let Some(state) = state {
                    let s = if state.is_movement { speed } else { 1.0 };
                    self.bridge.set_playback_speed(layer, s);
                }
            }
        } else {
            self.bridge.set_playback_speed(Layer::Lower, 1.0);
            self.bridge.set_playback_speed(Layer::Upper, 1.0);
        }
    }

    fn commit<E: Environment + ?Sized>(
        &mut self,
        posture: Posture,
        body: &mut RigidBody,
        action: Action,
        env: &E,
        dt: f32,
    ) {
        body.velocity = Vec3::new(self.velocity.x, body.velocity.y, self.velocity.z);

        // rolls count as falling; Land hands the hardness back as 0
        let falling = matches!(
            posture,
            Posture::Jump | Posture::Fall | Posture::Roll | Posture::Tumble | Posture::Thrown
        );
        if falling {
            self.fall_timer += dt;
        } else if posture == Posture::Land {
            self.bridge.inputs_mut().land_hardness = 0;
        } else if self.grounded {
            let hardness = if self.fall_timer < HARD_LANDING_TIME { 1 } else { 2 };
            self.bridge.inputs_mut().land_hardness = hardness;
            if posture.is_grounded_locomotion() {
                self.fall_timer = 0.0;
            }
        }

        {
            let inputs = self.bridge.inputs_mut();
            inputs.world_velocity = body.velocity.length();
            inputs.move_velocity = self.velocity.length();
        }

        if action == Action::Jump {
            if self.grounded {
                self.fall_timer = 0.0;
            }
            let launch = (self.class.jump_height * -2.0 * env.gravity().y).max(0.0).sqrt();
            body.add_velocity_change(Vec3::Y * launch);
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
