mod components;
mod melee;
mod motion;
mod posing;
mod posture;
mod soldier;
mod tic;
mod weapons;

#[cfg(test)]
pub(crate) mod testkit;

pub use components::ControlData;
pub use melee::{BF_FRAME_RATE, MeleeResolver, attack_window};
pub use motion::{Aim, AnimatedMove, Locomotion, VelocityBranch, resolve_velocity, select_branch};
pub use posing::update_pose;
pub use posture::PostureTracker;
pub use soldier::{Context, Soldier};
pub use tic::{DT, SIM_HZ, TicRunner};
pub use weapons::{
    Armory, Melee, SaberSection, Weapon, WeaponAnim, WeaponClassInfo, WeaponEvent, WeaponEvents,
    WeaponSlots,
};

use thiserror::Error;

/// Per-soldier failure of one tick.  The runner logs it and moves on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickError {
    #[error("roll reported before any posture it could borrow control factors from")]
    RollWithoutPredecessor,
}
