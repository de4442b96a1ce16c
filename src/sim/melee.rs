//! Melee hit resolution.
//!
//! The animation machine publishes attack windows; while the upper layer's
//! clip time lies inside one, a capsule along the blade edge is swept and
//! everything it touches (except the attacker) takes damage.

use glam::Vec3;
use tracing::{error, info};

use super::weapons::Weapon;
use crate::anim::{AttackOutput, BridgeOutputs, LayerState};
use crate::defs::TimeMode;
use crate::world::{Environment, QueryFilter, RigidBody};

/// Battlefront animation frames per second.
pub const BF_FRAME_RATE: f32 = 30.0;

/// Attack window in seconds of clip time.
pub fn attack_window(attack: &AttackOutput, clip_duration: f32) -> (f32, f32) {
    match attack.time_mode {
        TimeMode::Seconds => (attack.time_start, attack.time_end),
        TimeMode::Frames => (
            attack.time_start / BF_FRAME_RATE,
            attack.time_end / BF_FRAME_RATE,
        ),
        TimeMode::FromAnim => (
            attack.time_start * clip_duration,
            attack.time_end * clip_duration,
        ),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeleeResolver {
    previous_swing_sound: i32,
}

impl MeleeResolver {
    /// One tick of melee handling.  Returns the number of capsule queries
    /// issued.
    pub fn update<E: Environment + ?Sized>(
        &mut self,
        outputs: &BridgeOutputs,
        upper: Option<LayerState>,
        mut weapon: Option<&mut (dyn Weapon + 'static)>,
        body: &RigidBody,
        env: &mut E,
    ) -> usize {
        if outputs.swing_sound != self.previous_swing_sound {
            if let Some(melee) = weapon.as_deref_mut().and_then(|w| w.as_melee_mut()) {
                melee.play_swing_sound(outputs.swing_sound);
            }
            self.previous_swing_sound = outputs.swing_sound;
        }

        let Some(upper) = upper else {
            return 0;
        };

        let mut queries = 0;
        for attack in outputs.attacks.iter().filter(|a| a.id >= 0) {
            let (start, end) = attack_window(attack, upper.clip_duration);
            if upper.time < start || upper.time > end {
                continue;
            }

            let Some(melee) = weapon.as_deref_mut().and_then(|w| w.as_melee_mut()) else {
                error!(attack = attack.id, "melee attack with no melee weapon in hand");
                continue;
            };

            let edges = melee.edge_count();
            let edge = match usize::try_from(attack.edge) {
                Ok(e) if e < edges => e,
                _ => {
                    error!(edge = attack.edge, edges, "melee attack on a missing edge");
                    continue;
                }
            };
            let (Some(section), Some(local)) = (melee.edge_section(edge), melee.edge_transform(edge))
            else {
                error!(edge, "melee edge without geometry");
                continue;
            };

            let length = if attack.length_from_edge {
                attack.length * section.length
            } else {
                attack.length
            };
            let width = if attack.width_from_edge {
                attack.width * section.width
            } else {
                attack.width
            };

            let from = body.position + body.rotation * local.position;
            let dir = body.rotation * local.rotation * Vec3::Z;
            let to = from + dir * length;

            queries += 1;
            for hit in env.overlap_capsule(from, to, width, QueryFilter::MELEE) {
                if hit.collider == body.collider {
                    continue;
                }
                info!(damage = attack.damage, target = ?hit.collider, "melee hit");
                env.apply_damage(hit.collider, attack.damage);
            }
        }
        queries
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
