//! Mock weapons and armory shared by the controller tests.

use glam::Vec3;
use std::sync::{Arc, Mutex};

use super::weapons::{
    Armory, Melee, SaberSection, Weapon, WeaponAnim, WeaponClassInfo, WeaponEvent, WeaponEvents,
};
use crate::class::WeaponEntry;
use crate::defs::Channel;
use crate::world::{ColliderId, Transform};

#[derive(Debug, Default)]
pub struct MockState {
    pub active: bool,
    pub ignored: Vec<ColliderId>,
    pub pending: Vec<WeaponEvent>,
}

/// Ranged weapon whose state the test keeps a handle to.
pub struct MockGun {
    bank: String,
    pub state: Arc<Mutex<MockState>>,
}

impl Weapon for MockGun {
    fn anim_info(&self) -> WeaponAnim {
        WeaponAnim {
            bank: self.bank.clone(),
            combo: None,
        }
    }

    fn set_active(&mut self, active: bool) {
        self.state.lock().unwrap().active = active;
    }

    fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }

    fn set_ignored_colliders(&mut self, colliders: &[ColliderId]) {
        self.state.lock().unwrap().ignored = colliders.to_vec();
    }

    fn reload_time(&self) -> f32 {
        1.5
    }

    fn drain_events(&mut self) -> WeaponEvents {
        self.state.lock().unwrap().pending.drain(..).collect()
    }
}

/// One-edge saber, blade along +Z at chest height.
pub struct MockSaber {
    pub active: bool,
    pub swings: Vec<i32>,
    pub state: Arc<Mutex<MockState>>,
}

impl MockSaber {
    pub fn new() -> Self {
        Self {
            active: false,
            swings: Vec::new(),
            state: Arc::default(),
        }
    }
}

impl Weapon for MockSaber {
    fn anim_info(&self) -> WeaponAnim {
        WeaponAnim {
            bank: "melee".into(),
            combo: Some("saber_combo".into()),
        }
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.state.lock().unwrap().active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_ignored_colliders(&mut self, colliders: &[ColliderId]) {
        self.state.lock().unwrap().ignored = colliders.to_vec();
    }

    fn reload_time(&self) -> f32 {
        0.0
    }

    fn drain_events(&mut self) -> WeaponEvents {
        WeaponEvents::new()
    }

    fn as_melee_mut(&mut self) -> Option<&mut dyn Melee> {
        Some(self)
    }
}

impl Melee for MockSaber {
    fn edge_count(&self) -> usize {
        1
    }

    fn edge_section(&self, edge: usize) -> Option<SaberSection> {
        (edge == 0).then_some(SaberSection {
            length: 2.0,
            width: 0.2,
        })
    }

    fn edge_transform(&self, edge: usize) -> Option<Transform> {
        (edge == 0).then(|| Transform::new(Vec3::new(0.0, 1.0, 0.3), Default::default()))
    }

    fn play_swing_sound(&mut self, sound: i32) {
        self.swings.push(sound);
    }
}

/// Knows `rifle`, `pistol`, `grenade`, `saber`, an award weapon and a
/// class that fails to instantiate.
#[derive(Default)]
pub struct MockArmory {
    pub created: Vec<Arc<Mutex<MockState>>>,
}

impl Armory for MockArmory {
    fn class_info(&self, name: &str) -> Option<WeaponClassInfo> {
        match name {
            "rifle" | "pistol" | "grenade" | "saber" | "broken" => Some(WeaponClassInfo::default()),
            "award_rifle" => Some(WeaponClassInfo {
                medals_type_to_unlock: 2,
            }),
            _ => None,
        }
    }

    fn instantiate(&mut self, name: &str, _ammo: u32) -> Option<Box<dyn Weapon>> {
        let state: Arc<Mutex<MockState>> = Arc::default();
        let weapon: Box<dyn Weapon> = match name {
            "rifle" | "pistol" | "grenade" | "award_rifle" => Box::new(MockGun {
                bank: name.into(),
                state: state.clone(),
            }),
            "saber" => Box::new(MockSaber {
                state: state.clone(),
                ..MockSaber::new()
            }),
            _ => return None,
        };
        self.created.push(state);
        Some(weapon)
    }
}

pub fn loadout(names: &[(&str, Channel)]) -> Vec<WeaponEntry> {
    names
        .iter()
        .map(|(name, channel)| WeaponEntry {
            name: (*name).into(),
            channel: *channel,
            ammo: 0,
        })
        .collect()
}
