pub mod flags;
pub mod pose;
pub mod posture;

pub use self::{
    flags::{InputEvents, InputFlags},
    pose::{FivePoseState, NinePoseState, PilotAnimationType},
    posture::{Action, AimType, ControlPosture, Posture, TimeMode},
};

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Weapon channel index.  A soldier carries exactly two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Primary = 0,
    Secondary = 1,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Primary, Channel::Secondary];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: i64) -> Option<Self> {
        match idx {
            0 => Some(Channel::Primary),
            1 => Some(Channel::Secondary),
            _ => None,
        }
    }
}

static BY_CONTROL_NAME: Lazy<HashMap<&'static str, ControlPosture>> =
    Lazy::new(|| ControlPosture::ALL.iter().map(|p| (p.name(), *p)).collect());

/// Resolve a class-file control row name (`"stand"`, `"roll"`, ...).
pub fn control_by_name(name: &str) -> Option<ControlPosture> {
    BY_CONTROL_NAME.get(name).copied()
}
