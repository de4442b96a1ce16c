//! Soldier character controller for the Phoenix Battlefront II client.
//!
//! The crate is headless: the animation state machine, the physics engine
//! and the vehicles are reached through the traits in [`anim`] and
//! [`world`]. [`sim::Soldier`] resolves one tick of input into aim, body
//! rotation, velocity and animation inputs; [`sim::TicRunner`] steps many
//! of them at a fixed rate.

pub mod anim;
pub mod class;
pub mod defs;
pub mod sim;
pub mod world;
