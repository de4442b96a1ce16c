//! Weapon collaborator contract and the two weapon channels of a soldier.

use smallvec::SmallVec;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::class::WeaponEntry;
use crate::defs::Channel;
use crate::world::{ColliderId, Transform};

/// Something a weapon reports back to its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponEvent {
    Shot,
    Reload,
}

pub type WeaponEvents = SmallVec<[WeaponEvent; 4]>;

/// Animation bank a weapon drives the upper body with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WeaponAnim {
    pub bank: String,
    /// Combo tag of melee weapons.
    pub combo: Option<String>,
}

/// Blade geometry of one melee edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaberSection {
    pub length: f32,
    pub width: f32,
}

/// A weapon instance owned by a soldier.
pub trait Weapon: Send + Sync {
    fn anim_info(&self) -> WeaponAnim;

    /// Show/hide the weapon in the scene.
    fn set_active(&mut self, active: bool);

    fn is_active(&self) -> bool;

    /// Colliders this weapon's shots and blades pass through.
    fn set_ignored_colliders(&mut self, colliders: &[ColliderId]);

    fn reload_time(&self) -> f32;

    /// Events since the previous call.
    fn drain_events(&mut self) -> WeaponEvents;

    fn as_melee_mut(&mut self) -> Option<&mut dyn Melee> {
        None
    }
}

/// Extra surface of melee weapons.
pub trait Melee {
    fn edge_count(&self) -> usize;

    fn edge_section(&self, edge: usize) -> Option<SaberSection>;

    /// Edge placement relative to the soldier's body.
    fn edge_transform(&self, edge: usize) -> Option<Transform>;

    fn play_swing_sound(&mut self, sound: i32);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeaponClassInfo {
    /// Non-zero for award weapons unlocked by medals.
    pub medals_type_to_unlock: i32,
}

/// Resolves weapon class names and creates instances.
pub trait Armory {
    fn class_info(&self, name: &str) -> Option<WeaponClassInfo>;

    fn instantiate(&mut self, name: &str, ammo: u32) -> Option<Box<dyn Weapon>>;
}

type Slot = Option<Box<dyn Weapon>>;

/// Two channels of weapons with a cyclic active index each.
///
/// A channel without weapons holds a single `None` so indexing never
/// needs a length check.
pub struct WeaponSlots {
    channels: [Vec<Slot>; 2],
    active: [i32; 2],
    banks: Vec<WeaponAnim>,
    has_combo: bool,
}

impl std::fmt::Debug for WeaponSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaponSlots")
            .field("len", &[self.channels[0].len(), self.channels[1].len()])
            .field("active", &self.active)
            .field("has_combo", &self.has_combo)
            .finish()
    }
}

impl Default for WeaponSlots {
    fn default() -> Self {
        Self {
            channels: [vec![None], vec![None]],
            active: [-1; 2],
            banks: Vec::new(),
            has_combo: false,
        }
    }
}

impl WeaponSlots {
    /// Instantiate the class loadout.
    ///
    /// Award weapons are skipped silently, unknown classes and failed
    /// instantiation with a warning.  Every weapon starts hidden and
    /// ignores `owner_collider`.
    pub fn build(entries: &[WeaponEntry], armory: &mut dyn Armory, owner_collider: ColliderId) -> Self {
        let mut channels: [Vec<Slot>; 2] = [Vec::new(), Vec::new()];
        let mut seen: HashSet<WeaponAnim> = HashSet::new();
        let mut banks = Vec::new();
        let mut has_combo = false;

        for entry in entries {
            let Some(info) = armory.class_info(&entry.name) else {
                warn!(weapon = %entry.name, "cannot find weapon class");
                continue;
            };
            if info.medals_type_to_unlock != 0 {
                continue;
            }
            let Some(mut weapon) = armory.instantiate(&entry.name, entry.ammo) else {
                warn!(weapon = %entry.name, "instantiation of weapon class failed");
                continue;
            };

            weapon.set_ignored_colliders(&[owner_collider]);
            weapon.set_active(false);

            let anim = weapon.anim_info();
            if !anim.bank.is_empty() && seen.insert(anim.clone()) {
                has_combo |= anim.combo.as_deref().is_some_and(|c| !c.is_empty());
                banks.push(anim);
            }
            channels[entry.channel.index()].push(Some(weapon));
        }

        for ch in &mut channels {
            if ch.is_empty() {
                ch.push(None);
            }
        }

        Self {
            channels,
            active: [-1; 2],
            banks,
            has_combo,
        }
    }

    /// Distinct animation banks of the loadout, in load order.
    #[inline]
    pub fn banks(&self) -> &[WeaponAnim] {
        &self.banks
    }

    /// Some weapon carries a melee combo.
    #[inline]
    pub fn has_combo(&self) -> bool {
        self.has_combo
    }

    #[inline]
    pub fn len(&self, channel: Channel) -> usize {
        self.channels[channel.index()].len()
    }

    /// `-1` until the channel was cycled once.
    #[inline]
    pub fn active_index(&self, channel: Channel) -> i32 {
        self.active[channel.index()]
    }

    pub fn active(&self, channel: Channel) -> Option<&dyn Weapon> {
        let idx = usize::try_from(self.active_index(channel)).ok()?;
        self.channels[channel.index()].get(idx)?.as_deref()
    }

    pub fn active_mut(&mut self, channel: Channel) -> Option<&mut (dyn Weapon + 'static)> {
        let idx = usize::try_from(self.active_index(channel)).ok()?;
        self.channels[channel.index()].get_mut(idx)?.as_deref_mut()
    }

    /// Hide the current weapon, advance with wraparound, show the new one.
    ///
    /// Returns the animation bank to switch to, `None` on an empty slot.
    pub fn next(&mut self, channel: Channel) -> Option<String> {
        if let Some(w) = self.active_mut(channel) {
            w.set_active(false);
        }

        let len = self.len(channel) as i32;
        let slot = &mut self.active[channel.index()];
        *slot += 1;
        if *slot >= len {
            *slot = 0;
        }
        let idx = *slot;

        match self.active_mut(channel) {
            Some(w) => {
                w.set_active(true);
                let bank = w.anim_info().bank;
                debug!(?channel, index = idx, %bank, "weapon switched");
                Some(bank)
            }
            None => {
                warn!(?channel, index = idx, "encountered empty weapon slot");
                None
            }
        }
    }

    /// Show or hide the current weapon of `channel` without cycling.
    pub fn set_visible(&mut self, channel: Channel, visible: bool) {
        if let Some(w) = self.active_mut(channel) {
            w.set_active(visible);
        }
    }

    /// Drain every weapon's pending events, tagged with their channel.
    pub fn drain_events(&mut self) -> SmallVec<[(Channel, WeaponEvent); 4]> {
        let mut out = SmallVec::new();
        for channel in Channel::ALL {
            for w in self.channels[channel.index()].iter_mut().flatten() {
                out.extend(w.drain_events().into_iter().map(|e| (channel, e)));
            }
        }
        out
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testkit::{MockArmory, loadout};

    #[test]
    fn build_filters_and_hides() {
        let mut armory = MockArmory::default();
        let entries = loadout(&[
            ("rifle", Channel::Primary),
            ("award_rifle", Channel::Primary),
            ("missing", Channel::Primary),
            ("broken", Channel::Primary),
            ("pistol", Channel::Primary),
            ("grenade", Channel::Secondary),
        ]);
        let slots = WeaponSlots::build(&entries, &mut armory, ColliderId(7));

        assert_eq!(slots.len(Channel::Primary), 2);
        assert_eq!(slots.len(Channel::Secondary), 1);
        assert_eq!(slots.active_index(Channel::Primary), -1);
        assert!(slots.active(Channel::Primary).is_none());
        assert!(!slots.has_combo());
        assert_eq!(armory.created.len(), 3);
        for w in armory.created.iter() {
            let w = w.lock().unwrap();
            assert!(!w.active);
            assert_eq!(w.ignored, vec![ColliderId(7)]);
        }
    }

    #[test]
    fn cycling_is_a_cyclic_permutation() {
        let mut armory = MockArmory::default();
        let entries = loadout(&[
            ("rifle", Channel::Primary),
            ("pistol", Channel::Primary),
            ("saber", Channel::Primary),
        ]);
        let mut slots = WeaponSlots::build(&entries, &mut armory, ColliderId(1));
        assert_eq!(slots.next(Channel::Primary).as_deref(), Some("rifle"));
        let start = slots.active_index(Channel::Primary);
        let n = slots.len(Channel::Primary);
        for _ in 0..n {
            slots.next(Channel::Primary);
        }
        assert_eq!(slots.active_index(Channel::Primary), start);
        assert!(slots.has_combo());
    }

    #[test]
    fn only_current_weapon_is_shown() {
        let mut armory = MockArmory::default();
        let entries = loadout(&[("rifle", Channel::Primary), ("pistol", Channel::Primary)]);
        let mut slots = WeaponSlots::build(&entries, &mut armory, ColliderId(1));
        slots.next(Channel::Primary);
        slots.next(Channel::Primary);
        assert!(!armory.created[0].lock().unwrap().active);
        assert!(armory.created[1].lock().unwrap().active);

        slots.set_visible(Channel::Primary, false);
        assert!(!armory.created[1].lock().unwrap().active);
    }

    #[test]
    fn empty_channel_is_a_placeholder() {
        let mut slots = WeaponSlots::default();
        assert_eq!(slots.len(Channel::Secondary), 1);
        assert_eq!(slots.next(Channel::Secondary), None);
        assert_eq!(slots.active_index(Channel::Secondary), 0);
        assert_eq!(slots.next(Channel::Secondary), None);
        assert_eq!(slots.active_index(Channel::Secondary), 0);
    }

    #[test]
    fn events_are_tagged_with_channel() {
        let mut armory = MockArmory::default();
        let entries = loadout(&[("rifle", Channel::Primary), ("grenade", Channel::Secondary)]);
        let mut slots = WeaponSlots::build(&entries, &mut armory, ColliderId(1));
        armory.created[1].lock().unwrap().pending.push(WeaponEvent::Shot);
        armory.created[0].lock().unwrap().pending.push(WeaponEvent::Reload);
        let ev = slots.drain_events();
        assert_eq!(
            ev.as_slice(),
            &[
                (Channel::Primary, WeaponEvent::Reload),
                (Channel::Secondary, WeaponEvent::Shot)
            ]
        );
        assert!(slots.drain_events().is_empty());
    }
}
