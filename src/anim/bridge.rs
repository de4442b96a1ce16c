//! Contract between the soldier controller and the animation state machine.
//!
//! The machine owns postures, actions and input locks.  Every tick the
//! controller reads a [`BridgeOutputs`] snapshot, writes [`BridgeInputs`]
//! back, and may query the two playback layers.

use glam::Vec3;
use smallvec::SmallVec;

use crate::defs::{Action, AimType, InputEvents, InputFlags, Posture, TimeMode};

/// Parameters the controller writes every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeInputs {
    pub thrust_x: f32,
    pub thrust_y: f32,
    pub thrust_magnitude: f32,
    /// Degrees in `[0, 360)`, `atan2(-x, y)`.
    pub thrust_angle: f32,
    pub action: Action,
    /// Raw, unmasked button edges.
    pub events: InputEvents,
    pub energy: f32,
    pub grounded: bool,
    pub world_velocity: f32,
    pub move_velocity: f32,
    /// 0 = none yet, 1 = soft, 2 = hard.
    pub land_hardness: u8,
}

impl Default for BridgeInputs {
    fn default() -> Self {
        Self {
            thrust_x: 0.0,
            thrust_y: 0.0,
            thrust_magnitude: 0.0,
            thrust_angle: 0.0,
            action: Action::None,
            events: InputEvents::default(),
            energy: 100.0,
            grounded: true,
            world_velocity: 0.0,
            move_velocity: 0.0,
            land_hardness: 0,
        }
    }
}

/// One melee damage window published by the machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackOutput {
    /// Negative when the slot is unused.
    pub id: i32,
    pub damage: f32,
    /// Index into the melee weapon's edges.
    pub edge: i32,
    pub time_start: f32,
    pub time_end: f32,
    pub time_mode: TimeMode,
    pub length: f32,
    /// Scale `length` by the edge's blade length.
    pub length_from_edge: bool,
    pub width: f32,
    /// Scale `width` by the edge's blade width.
    pub width_from_edge: bool,
}

impl Default for AttackOutput {
    fn default() -> Self {
        Self {
            id: -1,
            damage: 0.0,
            edge: 0,
            time_start: 0.0,
            time_end: 0.0,
            time_mode: TimeMode::Seconds,
            length: 1.0,
            length_from_edge: false,
            width: 1.0,
            width_from_edge: false,
        }
    }
}

pub type Attacks = SmallVec<[AttackOutput; 2]>;

/// Values the controller reads every tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BridgeOutputs {
    pub posture: Posture,
    pub action: Action,
    pub input_locks: InputFlags,
    /// Seconds of upper-layer playback the locks hold for; 0 = whole state.
    pub input_lock_duration: f32,
    pub aim_type: AimType,
    /// The animation drives locomotion (rolls, combo lunges, ...).
    pub animated_move: bool,
    pub velocity_x: f32,
    pub velocity_z: f32,
    pub velocity_x_from_anim: bool,
    pub velocity_z_from_anim: bool,
    /// Combo override for the top forward speed.
    pub velocity_from_thrust: f32,
    /// Combo override for the top strafe speed.
    pub velocity_from_strafe: f32,
    pub strafe_backwards: bool,
    pub swing_sound: i32,
    pub attacks: Attacks,
}

/// The two playback layers of the humanoid machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Lower = 0,
    Upper = 1,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Lower, Layer::Upper];
}

/// Snapshot of a layer's active state and clip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerState {
    /// Playback time into the active clip, seconds.
    pub time: f32,
    pub clip_duration: f32,
    /// Root displacement over the whole clip.
    pub root_motion: Vec3,
    /// State is a locomotion cycle whose speed may be rescaled.
    pub is_movement: bool,
    /// State belongs to a melee combo chain.
    pub is_combo: bool,
}

impl LayerState {
    /// Average root-motion velocity of the clip.
    pub fn root_motion_velocity(&self) -> Vec3 {
        if self.clip_duration > 0.0 {
            self.root_motion / self.clip_duration
        } else {
            Vec3::ZERO
        }
    }
}

/// Any animation system exposing the humanoid parameter contract.
pub trait AnimBridge: Send + Sync {
    fn outputs(&self) -> &BridgeOutputs;

    fn inputs_mut(&mut self) -> &mut BridgeInputs;

    /// `None` while the layer has no valid player.
    fn layer(&self, layer: Layer) -> Option<LayerState>;

    fn set_playback_speed(&mut self, layer: Layer, speed: f32);

    /// Switch the weapon-specific animation bank (rifle, pistol, saber, ...).
    fn set_active_weapon_bank(&mut self, bank: &str);
}

impl<T: AnimBridge + ?Sized> AnimBridge for Box<T> {
    #[inline]
    fn outputs(&self) -> &BridgeOutputs {
        (**self).outputs()
    }

    #[inline]
    fn inputs_mut(&mut self) -> &mut BridgeInputs {
        (**self).inputs_mut()
    }

    #[inline]
    fn layer(&self, layer: Layer) -> Option<LayerState> {
        (**self).layer(layer)
    }

    #[inline]
    fn set_playback_speed(&mut self, layer: Layer, speed: f32) {
        (**self).set_playback_speed(layer, speed)
    }

    #[inline]
    fn set_active_weapon_bank(&mut self, bank: &str) {
        (**self).set_active_weapon_bank(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_motion_velocity_divides_by_duration() {
        let l = LayerState {
            clip_duration: 2.0,
            root_motion: Vec3::new(0.0, 0.0, 6.0),
            ..Default::default()
        };
        assert_eq!(l.root_motion_velocity(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn zero_length_clip_has_no_root_motion() {
        let l = LayerState {
            root_motion: Vec3::ONE,
            ..Default::default()
        };
        assert_eq!(l.root_motion_velocity(), Vec3::ZERO);
    }

    #[test]
    fn unused_attack_slots_are_negative() {
        assert!(AttackOutput::default().id < 0);
    }
}
