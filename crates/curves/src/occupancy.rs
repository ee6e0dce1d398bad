//! Fine raster of curve ownership used for collision avoidance.
//!
//! Each cell holds the ID of the curve that claimed it, or 0. A curve may
//! overwrite its own cells; any other nonzero token counts as a collision.
//! Neighborhoods are square windows of `ceil(radius / cell)` cells around
//! the cell containing the query point, clipped to the grid.

use flow_art_core::{FlowError, Grid};
use glam::DVec2;

#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Grid<u32>,
    cell_size: f64,
}

impl OccupancyGrid {
    /// Creates an empty grid of `ceil(width / cell) x ceil(height / cell)` cells.
    pub fn for_canvas(width: f64, height: f64, cell_size: f64) -> Result<Self, FlowError> {
        if cell_size.is_nan() || cell_size <= 0.0 || !width.is_finite() || !height.is_finite() {
            return Err(FlowError::InvalidDimensions);
        }
        let cols = (width / cell_size).ceil() as usize;
        let rows = (height / cell_size).ceil() as usize;
        Ok(Self {
            cells: Grid::new(cols, rows)?,
            cell_size,
        })
    }

    pub fn cols(&self) -> usize {
        self.cells.cols()
    }

    pub fn rows(&self) -> usize {
        self.cells.rows()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_of(&self, p: DVec2) -> (isize, isize) {
        (
            (p.x / self.cell_size).floor() as isize,
            (p.y / self.cell_size).floor() as isize,
        )
    }

    fn reach(&self, radius: f64) -> isize {
        (radius.max(0.0) / self.cell_size).ceil() as isize
    }

    /// Writes `id` into every in-bounds cell within `radius` of `p`.
    pub fn claim(&mut self, p: DVec2, radius: f64, id: u32) {
        let (c, r) = self.cell_of(p);
        let reach = self.reach(radius);
        self.cells.fill_window(c, r, reach, id);
    }

    /// True iff a cell within `radius` of `p` is held by a curve other than `id`.
    pub fn check(&self, p: DVec2, radius: f64, id: u32) -> bool {
        let (c, r) = self.cell_of(p);
        self.cells
            .window(c, r, self.reach(radius))
            .any(|(_, _, token)| token != 0 && token != id)
    }

    /// True iff `p` lies on the grid and its cell is unclaimed.
    pub fn is_free(&self, p: DVec2) -> bool {
        let (c, r) = self.cell_of(p);
        self.cells.get(c, r) == Some(0)
    }

    /// Token of the cell containing `p`, if on the grid.
    pub fn owner(&self, p: DVec2) -> Option<u32> {
        let (c, r) = self.cell_of(p);
        self.cells.get(c, r)
    }

    pub fn claimed_cells(&self) -> usize {
        self.cells.data().iter().filter(|&&t| t != 0).count()
    }
}
