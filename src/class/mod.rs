//! Soldier class configuration.
//!
//! A class file describes one kind of soldier: speeds, jump height, the
//! per-posture control factors and the weapon loadout.  Loading validates
//! everything the per-tick code relies on, so a bad file is rejected here
//! and never reaches the controller.

mod control;
mod loader;

pub use control::{ControlFactors, ControlSpeedTable};

use glam::Vec2;
use std::io;
use thiserror::Error;

use crate::defs::Channel;

/// Errors that can be encountered while loading a soldier class.
#[derive(Error, Debug)]
pub enum ClassError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("cannot find control state '{0}'")]
    MissingControlSpeed(&'static str),

    #[error("control state '{0}' defined twice")]
    DuplicateControlSpeed(&'static str),

    #[error("weapon '{name}' uses channel {channel}, only 0 and 1 exist")]
    BadWeaponChannel { name: String, channel: i64 },

    #[error("property '{name}' must be finite and non-negative, got {value}")]
    BadScalar { name: &'static str, value: f32 },
}

/// One `WEAPONSECTION` of the class.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponEntry {
    pub name: String,
    pub channel: Channel,
    pub ammo: u32,
}

/// Validated, immutable soldier class.
#[derive(Clone, Debug)]
pub struct SoldierClass {
    pub name: String,
    pub max_health: f32,
    pub max_speed: f32,
    pub max_strafe_speed: f32,
    /// Multiplier on the 45°/tick base turn rate.
    pub max_turn_speed: f32,
    pub jump_height: f32,
    pub acceleration: f32,
    pub animation_name: String,
    pub skeleton_name: String,
    /// Max |pitch|, |yaw| of the aim in degrees.
    pub aim_constraint: Vec2,
    pub control_speed: ControlSpeedTable,
    pub weapons: Vec<WeaponEntry>,
}

impl SoldierClass {
    /// Animation set to drive the skeleton with.
    ///
    /// Most classes never set `AnimationName` and inherit `human`; when the
    /// skeleton is something else (droids, wookiees) the skeleton wins.
    pub fn character_animation(&self) -> &str {
        if self.animation_name.eq_ignore_ascii_case("human")
            && !self.skeleton_name.eq_ignore_ascii_case("human")
        {
            &self.skeleton_name
        } else {
            &self.animation_name
        }
    }

    /// Class with unit speeds, factors and no weapons.
    pub fn basic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_health: 100.0,
            max_speed: 1.0,
            max_strafe_speed: 1.0,
            max_turn_speed: 1.0,
            jump_height: 1.0,
            acceleration: 1.0,
            animation_name: "human".into(),
            skeleton_name: "human".into(),
            aim_constraint: Vec2::new(45.0, 180.0),
            control_speed: ControlSpeedTable::uniform(ControlFactors::ONE),
            weapons: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_overrides_default_human_animation() {
        let mut c = SoldierClass::basic("wok_inf_basic");
        assert_eq!(c.character_animation(), "human");

        c.skeleton_name = "wookiee".into();
        assert_eq!(c.character_animation(), "wookiee");

        c.animation_name = "bdroid".into();
        assert_eq!(c.character_animation(), "bdroid");
    }
}
