//! Headless soldier harness: one soldier, a flat arena and a scripted pad.
//!
//! ```bash
//! cargo run --bin soldier_sim -- --script jump --ticks 120
//! cargo run --bin soldier_sim -- --class my_class.toml --log phx_soldier=debug
//! ```

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use glam::{Vec2, Vec3};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use phx_soldier::anim::ScriptedBridge;
use phx_soldier::class::SoldierClass;
use phx_soldier::defs::{Action, InputEvents, InputFlags, Posture};
use phx_soldier::sim::{
    Armory, ControlData, DT, SIM_HZ, TicRunner, Weapon, WeaponAnim, WeaponClassInfo, WeaponEvents,
};
use phx_soldier::world::{Arena, ColliderId, Transform};

const DEFAULT_CLASS: &str = include_str!("../../data/rifleman.toml");

/// Tick on which the jump script presses JUMP.
const JUMP_TICK: u32 = 10;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Script {
    Walk,
    Jump,
    Strafe,
    Idle,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Soldier class TOML (built-in rifleman if omitted)
    #[arg(long, value_name = "FILE")]
    class: Option<PathBuf>,

    /// Number of fixed-rate ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u32,

    /// Input played on the pad
    #[arg(long, value_enum, default_value_t = Script::Walk)]
    script: Script,

    /// Tracing filter, overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

/*──────────────────────────── Harness weapons ─────────────────────────*/

struct Rifle {
    bank: String,
    active: bool,
}

impl Weapon for Rifle {
    fn anim_info(&self) -> WeaponAnim {
        WeaponAnim {
            bank: self.bank.clone(),
            combo: None,
        }
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_ignored_colliders(&mut self, _colliders: &[ColliderId]) {}

    fn reload_time(&self) -> f32 {
        2.0
    }

    fn drain_events(&mut self) -> WeaponEvents {
        WeaponEvents::new()
    }
}

/// Hands out a [`Rifle`] for every name it is asked for.
struct HarnessArmory;

impl Armory for HarnessArmory {
    fn class_info(&self, _name: &str) -> Option<WeaponClassInfo> {
        Some(WeaponClassInfo::default())
    }

    fn instantiate(&mut self, name: &str, _ammo: u32) -> Option<Box<dyn Weapon>> {
        Some(Box::new(Rifle {
            bank: name.to_owned(),
            active: false,
        }))
    }
}

/*──────────────────────────── Scripted pad ────────────────────────────*/

fn pad(script: Script, tic: u32) -> (Vec2, Vec2, InputFlags) {
    match script {
        Script::Walk => (Vec2::new(0.0, 1.0), Vec2::ZERO, InputFlags::empty()),
        Script::Strafe => (Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0), InputFlags::empty()),
        Script::Jump if tic == JUMP_TICK => (Vec2::new(0.0, 1.0), Vec2::ZERO, InputFlags::JUMP),
        Script::Jump => (Vec2::new(0.0, 1.0), Vec2::ZERO, InputFlags::empty()),
        Script::Idle => (Vec2::ZERO, Vec2::ZERO, InputFlags::empty()),
    }
}

/// Stand-in for the animation machine's jump states.
fn next_posture(current: Posture, action: Action, grounded: bool, vy: f32) -> Posture {
    match current {
        Posture::Stand if action == Action::Jump => Posture::Jump,
        Posture::Jump if vy < 0.0 => Posture::Fall,
        Posture::Fall if grounded => Posture::Land,
        Posture::Land => Posture::Stand,
        p => p,
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let filter = match &opts.log {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("bad log filter `{f}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ─────────── class ────────────
    let class = match &opts.class {
        Some(path) => SoldierClass::from_file(path)
            .with_context(|| format!("loading class {}", path.display()))?,
        None => SoldierClass::from_toml_str(DEFAULT_CLASS).context("built-in class")?,
    };
    info!(class = %class.name, script = ?opts.script, ticks = opts.ticks, "starting");

    // ─────────── world ────────────
    let mut arena = Arena::new();
    let mut armory = HarnessArmory;
    let mut tr: TicRunner<ScriptedBridge> = TicRunner::new();
    let soldier = tr.spawn_soldier(
        Arc::new(class),
        ScriptedBridge::default(),
        &mut armory,
        &mut arena,
        Transform::default(),
    );

    // ─────────── run ──────────────
    let mut held = InputFlags::empty();
    for tic in 0..opts.ticks {
        let (movement, view_delta, now) = pad(opts.script, tic);
        tr.set_input(
            soldier,
            ControlData {
                movement,
                view_delta,
                events: InputEvents::from_levels(held, now),
            },
        )
        .context("soldier entity vanished")?;
        held = now;

        tr.tick(&mut arena);

        let mut s = tr.soldier_mut(soldier).context("soldier entity vanished")?;
        let vy = s.body().map_or(0.0, |b| b.velocity.y);
        let grounded = s.is_grounded();
        let bridge = s.bridge_mut();
        bridge.outputs.posture =
            next_posture(bridge.outputs.posture, bridge.inputs.action, grounded, vy);
        bridge.advance(DT);

        println!(
            "{:>5} {:>6.2}s {:<6?} pos {:>7.3} {:>7.3} {:>7.3}  vel {:>6.3} {:>6.3} {:>6.3}  {}",
            tic,
            (tic + 1) as f32 / SIM_HZ as f32,
            s.bridge().outputs.posture,
            s.position().x,
            s.position().y,
            s.position().z,
            s.velocity().x,
            vy,
            s.velocity().z,
            if grounded { "grounded" } else { "airborne" },
        );
    }

    let s = tr.soldier(soldier).context("soldier entity vanished")?;
    let end: Vec3 = s.position();
    info!(tics = tr.tics(), x = end.x, y = end.y, z = end.z, "done");
    Ok(())
}
