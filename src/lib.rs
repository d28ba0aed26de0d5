//! Arena Shooter - Simulation Core
//!
//! A single-threaded, per-frame stepped simulation of a destructible grid
//! world: a player, three enemy archetypes and two projectile populations,
//! all resolved against the same density grid. Uses `bevy_ecs` for the
//! entity-component-system architecture; rendering and input capture live
//! in the host, which feeds `InputState` and reads `Snapshot`s back.

pub mod api;
pub mod components;
pub mod grid;
pub mod input;
pub mod math;
pub mod rng;
pub mod snapshot;
pub mod systems;
pub mod worldgen;

pub use api::SimWorld;
pub use components::*;
pub use grid::{Cell, Grid};
pub use input::InputState;
pub use math::{Rect, Vec2};
pub use rng::SimRng;
pub use snapshot::{CellView, Snapshot, TerrainView};
pub use systems::*;
pub use worldgen::{Arena, RoomType};
