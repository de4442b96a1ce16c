use hecs::{Entity, World};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

use super::components::ControlData;
use super::soldier::Soldier;
use super::weapons::Armory;
use crate::anim::AnimBridge;
use crate::class::SoldierClass;
use crate::world::{Environment, SoldierId, Transform};

pub const SIM_HZ: u32 = 50;
pub const DT: f32 = 1.0 / SIM_HZ as f32;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_HZ as u64);

/// Owns the ECS world of soldiers and steps them at a fixed rate.
pub struct TicRunner<B: AnimBridge + 'static = Box<dyn AnimBridge>> {
    world: World,
    last: Instant,
    tics: u64,
    next_id: u32,
    _bridge: PhantomData<fn() -> B>,
}

impl<B: AnimBridge + 'static> Default for TicRunner<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: AnimBridge + 'static> TicRunner<B> {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            last: Instant::now(),
            tics: 0,
            next_id: 0,
            _bridge: PhantomData,
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Tics run so far.
    #[inline]
    pub fn tics(&self) -> u64 {
        self.tics
    }

    /// Spawn a soldier entity with empty input.
    pub fn spawn_soldier<E: Environment + ?Sized>(
        &mut self,
        class: Arc<SoldierClass>,
        bridge: B,
        armory: &mut dyn Armory,
        env: &mut E,
        at: Transform,
    ) -> Entity {
        let id = SoldierId(self.next_id);
        self.next_id += 1;
        let soldier = Soldier::spawn(id, class, bridge, armory, env, at);
        self.world.spawn((soldier, ControlData::default()))
    }

    /// Replace the input a soldier sees on the next tick.
    pub fn set_input(&mut self, entity: Entity, data: ControlData) -> Result<(), hecs::ComponentError> {
        *self.world.get::<&mut ControlData>(entity)? = data;
        Ok(())
    }

    pub fn soldier(&self, entity: Entity) -> Option<hecs::Ref<'_, Soldier<B>>> {
        self.world.get::<&Soldier<B>>(entity).ok()
    }

    pub fn soldier_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, Soldier<B>>> {
        self.world.get::<&mut Soldier<B>>(entity).ok()
    }

    /// Advance enough tics to synchronise simulation with real time.
    pub fn pump<E: Environment + ?Sized>(&mut self, env: &mut E) {
        while self.last.elapsed() >= TIC {
            self.tick(env);
            self.last += TIC;
        }
    }

    /* ---------------------------------------------------------------- */
    /* one fixed-rate tic                                               */
    /* ---------------------------------------------------------------- */
    pub fn tick<E: Environment + ?Sized>(&mut self, env: &mut E) {
        for (entity, (soldier, control)) in self.world.query_mut::<(&mut Soldier<B>, &mut ControlData)>() {
            if let Err(err) = soldier.update_state(control, env, DT) {
                warn!(?entity, soldier = ?soldier.id(), %err, "soldier tick failed");
            }
            control.consume_edges();
        }

        for (_, soldier) in self.world.query_mut::<&mut Soldier<B>>() {
            soldier.integrate(env, DT);
        }

        let damage = env.drain_damage();
        if !damage.is_empty() {
            for (_, soldier) in self.world.query_mut::<&mut Soldier<B>>() {
                let id = soldier.id();
                for ev in damage.iter().filter(|ev| ev.victim == Some(id)) {
                    soldier.add_health(-ev.amount);
                }
            }
        }

        self.tics += 1;
        trace!(tic = self.tics, "tic done");
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
