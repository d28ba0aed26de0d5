//! Procedural world generation.
//!
//! The arena partitions its grid into a coarse lattice of square rooms. Each
//! room draws one of three archetypes and stamps a density pattern into the
//! cells it covers; dense rooms occasionally get a straight corridor carved
//! through them. Generation fully overwrites the grid: nothing survives a
//! regeneration.

use crate::grid::Grid;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Room archetype, drawn uniformly at random per room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    /// 5% of cells solid.
    Empty,
    /// 15% of cells solid.
    Garbage,
    /// 50% of cells solid, with occasional carved corridors.
    Dense,
}

impl RoomType {
    const ALL: [RoomType; 3] = [RoomType::Empty, RoomType::Garbage, RoomType::Dense];

    fn solid_chance(&self) -> f32 {
        match self {
            RoomType::Empty => 0.05,
            RoomType::Garbage => 0.15,
            RoomType::Dense => 0.5,
        }
    }
}

/// Corridor carve parameters for dense rooms.
const CORRIDOR_CHANCE: f32 = 0.01;
const CORRIDOR_MIN_LEN: i32 = 5;
const CORRIDOR_MAX_LEN: i32 = 25;

/// The generated world: the density grid plus the room lattice that shaped
/// it. The room labels are kept only for inspection; runtime collision and
/// damage go through the grid.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub grid: Grid,
    /// Room labels, row-major over the room lattice.
    pub rooms: Vec<RoomType>,
    pub room_cols: usize,
    pub room_rows: usize,
    /// Room side length in grid cells.
    pub room_size: usize,
}

impl Arena {
    /// Empty (all-passable) arena of `cells x cells` grid cells grouped into
    /// `room_size`-cell rooms.
    pub fn new(cells: usize, room_size: usize, cell_size: f32) -> Self {
        let room_cols = cells / room_size;
        Self {
            grid: Grid::new(cells, cells, cell_size, cell_size),
            rooms: Vec::new(),
            room_cols,
            room_rows: room_cols,
            room_size,
        }
    }

    /// Regenerate the whole world from the given random stream.
    pub fn generate(&mut self, rng: &mut SimRng) {
        self.grid.fill(0.0);
        self.rooms.clear();
        self.rooms.reserve(self.room_cols * self.room_rows);

        for ry in 0..self.room_rows {
            for rx in 0..self.room_cols {
                let room = RoomType::ALL[rng.range_i32(0, 2) as usize];
                self.rooms.push(room);
                self.stamp_room(room, rx, ry, rng);
            }
        }
    }

    /// Stamp one room's density pattern into the grid cells it covers.
    fn stamp_room(&mut self, room: RoomType, rx: usize, ry: usize, rng: &mut SimRng) {
        let rs = self.room_size as i32;
        let x0 = rx as i32 * rs;
        let y0 = ry as i32 * rs;
        let chance = room.solid_chance();

        for cy in y0..y0 + rs {
            for cx in x0..x0 + rs {
                let density = if rng.chance(chance) { 1.0 } else { 0.0 };
                self.grid.set_density(cx, cy, density);
            }
        }

        if room == RoomType::Dense {
            for cy in y0..y0 + rs {
                for cx in x0..x0 + rs {
                    if rng.chance(CORRIDOR_CHANCE) {
                        let horizontal = rng.chance(0.5);
                        self.carve_corridor(cx, cy, horizontal, rng);
                    }
                }
            }
        }
    }

    /// Clear a straight line of cells centered on `(cx, cy)`. The carve wins
    /// over any density already stamped.
    fn carve_corridor(&mut self, cx: i32, cy: i32, horizontal: bool, rng: &mut SimRng) {
        let len = rng.range_i32(CORRIDOR_MIN_LEN, CORRIDOR_MAX_LEN);
        let (inc_x, inc_y) = if horizontal { (1, 0) } else { (0, 1) };
        let mut px = cx - len * inc_x / 2;
        let mut py = cy - len * inc_y / 2;
        for _ in 0..len {
            self.grid.set_density(px, py, 0.0);
            px += inc_x;
            py += inc_y;
        }
    }

    /// Room label at lattice coordinates.
    pub fn room_at(&self, rx: usize, ry: usize) -> Option<RoomType> {
        if rx < self.room_cols && ry < self.room_rows {
            self.rooms.get(ry * self.room_cols + rx).copied()
        } else {
            None
        }
    }
}
