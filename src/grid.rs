//! Destructible terrain grid.
//!
//! The world is a fixed array of density cells. A density of zero is empty
//! and passable; anything above zero is solid wall mass that collides and can
//! be ground down by weapon fire. Damage additionally raises a one-shot
//! `damaged_flash` flag per cell, consumed by the next render read, so the
//! host can briefly shade freshly hit walls.
//!
//! Queries that fall outside the grid return `None` / visit nothing: the
//! world edges are deliberately non-blocking, entities may leave the
//! populated area.

use crate::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A single terrain cell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Wall mass. `0.0` is empty, positive values collide.
    pub density: f32,
    /// Set when the cell takes damage, cleared by the next render read.
    pub damaged_flash: bool,
}

impl Cell {
    pub fn solid(&self) -> bool {
        self.density > 0.0
    }
}

/// Fixed `width x height` grid of density cells, each covering a
/// `cell_w x cell_h` pixel footprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cell_w: f32,
    pub cell_h: f32,
    /// Row-major cell storage.
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize, cell_w: f32, cell_h: f32) -> Self {
        Self {
            width,
            height,
            cell_w,
            cell_h,
            cells: vec![Cell::default(); width * height],
        }
    }

    /// Total pixel width of the grid.
    pub fn total_w(&self) -> f32 {
        self.width as f32 * self.cell_w
    }

    /// Total pixel height of the grid.
    pub fn total_h(&self) -> f32 {
        self.height as f32 * self.cell_h
    }

    fn cell_index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx >= 0 && cy >= 0 && (cx as usize) < self.width && (cy as usize) < self.height {
            Some(cy as usize * self.width + cx as usize)
        } else {
            None
        }
    }

    /// Bounds-checked cell read.
    pub fn cell_at(&self, cx: i32, cy: i32) -> Option<&Cell> {
        self.cell_index(cx, cy).map(|i| &self.cells[i])
    }

    /// Bounds-checked density write; out-of-range writes are a no-op.
    pub fn set_density(&mut self, cx: i32, cy: i32, density: f32) {
        if let Some(i) = self.cell_index(cx, cy) {
            self.cells[i].density = density;
            self.cells[i].damaged_flash = false;
        }
    }

    /// Reduce a cell's density by `amount`, clamping at zero and flagging the
    /// cell for a damage flash. Empty and out-of-range cells are untouched.
    pub fn damage_cell(&mut self, cx: i32, cy: i32, amount: f32) {
        if let Some(i) = self.cell_index(cx, cy) {
            let cell = &mut self.cells[i];
            if cell.density > 0.0 {
                cell.density = (cell.density - amount).max(0.0);
                cell.damaged_flash = true;
            }
        }
    }

    /// Convert a pixel position to cell indices by floor division.
    pub fn pixel_to_cell(&self, px: f32, py: f32) -> Option<(i32, i32)> {
        let cx = (px / self.cell_w).floor() as i32;
        let cy = (py / self.cell_h).floor() as i32;
        self.cell_index(cx, cy).map(|_| (cx, cy))
    }

    /// Cell covering a pixel position, with its indices.
    pub fn cell_at_pixel(&self, px: f32, py: f32) -> Option<(i32, i32, &Cell)> {
        let (cx, cy) = self.pixel_to_cell(px, py)?;
        self.cell_at(cx, cy).map(|c| (cx, cy, c))
    }

    /// Cell index range covered by a pixel rectangle, clipped to grid bounds.
    /// `None` when the rectangle lies entirely outside the grid.
    fn clip_to_cells(&self, rect: &Rect) -> Option<(i32, i32, i32, i32)> {
        let cx0 = (rect.min.x / self.cell_w).floor() as i32;
        let cy0 = (rect.min.y / self.cell_h).floor() as i32;
        let cx1 = (rect.max.x / self.cell_w).floor() as i32;
        let cy1 = (rect.max.y / self.cell_h).floor() as i32;
        if cx1 < 0 || cy1 < 0 || cx0 >= self.width as i32 || cy0 >= self.height as i32 {
            return None;
        }
        Some((
            cx0.max(0),
            cy0.max(0),
            cx1.min(self.width as i32 - 1),
            cy1.min(self.height as i32 - 1),
        ))
    }

    /// Visit every cell covered by a pixel rectangle in row-major order.
    pub fn for_each_in_pixel_rect<F>(&self, rect: Rect, mut visit: F)
    where
        F: FnMut(i32, i32, &Cell),
    {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_to_cells(&rect) else {
            return;
        };
        for cy in cy0..=cy1 {
            for cx in cx0..=cx1 {
                let i = cy as usize * self.width + cx as usize;
                visit(cx, cy, &self.cells[i]);
            }
        }
    }

    /// Mutable row-major visit, used for render flash consumption.
    pub fn for_each_in_pixel_rect_mut<F>(&mut self, rect: Rect, mut visit: F)
    where
        F: FnMut(i32, i32, &mut Cell),
    {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_to_cells(&rect) else {
            return;
        };
        for cy in cy0..=cy1 {
            for cx in cx0..=cx1 {
                let i = cy as usize * self.width + cx as usize;
                visit(cx, cy, &mut self.cells[i]);
            }
        }
    }

    /// Area damage: every covered cell loses `amount` density.
    pub fn damage_pixel_rect(&mut self, rect: Rect, amount: f32) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_to_cells(&rect) else {
            return;
        };
        for cy in cy0..=cy1 {
            for cx in cx0..=cx1 {
                self.damage_cell(cx, cy, amount);
            }
        }
    }

    /// AABB push-out query against solid cells.
    ///
    /// Finds all solid cells whose footprint intersects the query box and
    /// returns a single vector that separates the box from the *nearest*
    /// intersecting cell along the minimum-penetration axis. Equal
    /// penetration on both axes resolves to the horizontal axis. Only one
    /// cell is resolved per call; callers re-query after displacement if they
    /// need multi-cell correctness.
    pub fn collision_vector(&self, query: Rect) -> Option<Vec2> {
        let (cx0, cy0, cx1, cy1) = self.clip_to_cells(&query)?;
        let center = query.center();
        let mut best: Option<(f32, Vec2)> = None;

        for cy in cy0..=cy1 {
            for cx in cx0..=cx1 {
                let i = cy as usize * self.width + cx as usize;
                if !self.cells[i].solid() {
                    continue;
                }
                let cell_rect = Rect::new(
                    cx as f32 * self.cell_w,
                    cy as f32 * self.cell_h,
                    (cx + 1) as f32 * self.cell_w,
                    (cy + 1) as f32 * self.cell_h,
                );
                let overlap_x =
                    query.max.x.min(cell_rect.max.x) - query.min.x.max(cell_rect.min.x);
                let overlap_y =
                    query.max.y.min(cell_rect.max.y) - query.min.y.max(cell_rect.min.y);
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }

                let cell_center = cell_rect.center();
                let push = if overlap_x <= overlap_y {
                    let sign = if center.x < cell_center.x { -1.0 } else { 1.0 };
                    Vec2::new(sign * overlap_x, 0.0)
                } else {
                    let sign = if center.y < cell_center.y { -1.0 } else { 1.0 };
                    Vec2::new(0.0, sign * overlap_y)
                };

                let dist_sq = center.dist_sq(cell_center);
                if best.map_or(true, |(d, _)| dist_sq < d) {
                    best = Some((dist_sq, push));
                }
            }
        }

        best.map(|(_, push)| push)
    }

    /// Set every cell to a constant density, clearing damage flashes.
    pub fn fill(&mut self, density: f32) {
        for cell in &mut self.cells {
            cell.density = density;
            cell.damaged_flash = false;
        }
    }

    /// Raw cell slice, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_10x10() -> Grid {
        Grid::new(10, 10, 25.0, 25.0)
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut grid = grid_10x10();
        grid.set_density(3, 7, 0.5);
        assert_eq!(grid.cell_at(3, 7).map(|c| c.density), Some(0.5));
        assert_eq!(grid.cell_at(0, 0).map(|c| c.density), Some(0.0));
    }

    #[test]
    fn test_out_of_bounds_is_none_and_noop() {
        let mut grid = grid_10x10();
        assert!(grid.cell_at(-1, 0).is_none());
        assert!(grid.cell_at(0, 10).is_none());
        grid.set_density(-1, -1, 1.0); // must not panic
        grid.set_density(10, 10, 1.0);
        assert!(grid.cells().iter().all(|c| c.density == 0.0));
    }

    #[test]
    fn test_pixel_mapping_floor_division() {
        let grid = grid_10x10();
        assert_eq!(grid.pixel_to_cell(0.0, 0.0), Some((0, 0)));
        assert_eq!(grid.pixel_to_cell(24.9, 24.9), Some((0, 0)));
        assert_eq!(grid.pixel_to_cell(25.0, 50.0), Some((1, 2)));
        assert_eq!(grid.pixel_to_cell(-0.1, 0.0), None);
        assert_eq!(grid.pixel_to_cell(250.0, 0.0), None);
    }

    #[test]
    fn test_rect_iteration_clips_and_orders() {
        let grid = grid_10x10();
        let mut seen = Vec::new();
        grid.for_each_in_pixel_rect(Rect::new(-100.0, -100.0, 30.0, 30.0), |cx, cy, _| {
            seen.push((cx, cy));
        });
        assert_eq!(seen, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_collision_none_in_empty_space() {
        let grid = grid_10x10();
        assert!(grid.collision_vector(Rect::new(30.0, 30.0, 45.0, 45.0)).is_none());
        // Fully outside the grid is "no collision", not an error.
        assert!(grid
            .collision_vector(Rect::new(-500.0, -500.0, -480.0, -480.0))
            .is_none());
    }

    #[test]
    fn test_collision_push_out_separates() {
        let mut grid = grid_10x10();
        grid.set_density(2, 2, 1.0); // solid cell at pixels 50..75 both axes

        // Box penetrating the cell's left edge by 5 pixels.
        let query = Rect::new(35.0, 52.0, 55.0, 72.0);
        let push = grid.collision_vector(query).expect("should collide");
        assert_eq!(push, Vec2::new(-5.0, 0.0));

        let moved = Rect::new(
            query.min.x + push.x,
            query.min.y + push.y,
            query.max.x + push.x,
            query.max.y + push.y,
        );
        let cell_rect = Rect::new(50.0, 50.0, 75.0, 75.0);
        assert!(!moved.overlaps(&cell_rect));
    }

    #[test]
    fn test_collision_equal_penetration_prefers_horizontal() {
        let mut grid = grid_10x10();
        grid.set_density(2, 2, 1.0);
        // Box overlapping the cell's top-left corner by 5 pixels on each axis.
        let push = grid
            .collision_vector(Rect::new(35.0, 35.0, 55.0, 55.0))
            .expect("should collide");
        assert_eq!(push.y, 0.0);
        assert_eq!(push.x, -5.0);
    }

    #[test]
    fn test_damage_clamps_and_flags() {
        let mut grid = grid_10x10();
        grid.set_density(1, 1, 0.1);
        grid.damage_cell(1, 1, 0.5);
        let cell = grid.cell_at(1, 1).unwrap();
        assert_eq!(cell.density, 0.0);
        assert!(cell.damaged_flash);

        // Already-empty cells never flash.
        grid.damage_cell(0, 0, 0.5);
        assert!(!grid.cell_at(0, 0).unwrap().damaged_flash);
    }

    #[test]
    fn test_area_damage_covers_whole_rect() {
        let mut grid = grid_10x10();
        grid.fill(1.0);
        grid.damage_pixel_rect(Rect::new(0.0, 0.0, 49.0, 49.0), 0.25);
        for (cx, cy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(grid.cell_at(cx, cy).unwrap().density, 0.75);
        }
        assert_eq!(grid.cell_at(2, 2).unwrap().density, 1.0);
    }

    #[test]
    fn test_fill_overwrites_everything() {
        let mut grid = grid_10x10();
        grid.set_density(5, 5, 1.0);
        grid.damage_cell(5, 5, 0.1);
        grid.fill(0.0);
        assert!(grid.cells().iter().all(|c| c.density == 0.0 && !c.damaged_flash));
    }
}
