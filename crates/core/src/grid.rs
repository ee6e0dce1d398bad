//! Two-dimensional cell grid with centralised bounds handling.
//!
//! `Grid<T>` stores `cols * rows` cells in column-major order so that
//! `(col, row)` indexing matches how the flow field and occupancy raster are
//! addressed. Every accessor decides its out-of-range policy here, once:
//! [`Grid::get_clamped`] clamps signed coordinates into the grid,
//! [`Grid::get`] and [`Grid::set`] skip (return `None` / do nothing).

use crate::error::FlowError;

/// A 2D grid of `T` with clamped and checked coordinate access.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid filled with `T::default()`.
    ///
    /// Returns `FlowError::InvalidDimensions` if either dimension is zero
    /// or if `cols * rows` overflows `usize`.
    pub fn new(cols: usize, rows: usize) -> Result<Self, FlowError> {
        Self::filled(cols, rows, T::default())
    }

    /// Resets every cell to `T::default()`.
    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T: Copy> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(cols: usize, rows: usize, value: T) -> Result<Self, FlowError> {
        if cols == 0 || rows == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = cols.checked_mul(rows).ok_or(FlowError::InvalidDimensions)?;
        Ok(Self {
            cols,
            rows,
            data: vec![value; len],
        })
    }

    /// Builds a grid by evaluating `f(col, row)` for every cell, column by column.
    pub fn from_fn(
        cols: usize,
        rows: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Self, FlowError> {
        if cols == 0 || rows == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = cols.checked_mul(rows).ok_or(FlowError::InvalidDimensions)?;
        let mut data = Vec::with_capacity(len);
        for col in 0..cols {
            for row in 0..rows {
                data.push(f(col, row));
            }
        }
        Ok(Self { cols, rows, data })
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Read-only access to the column-major cell data.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns true if `(col, row)` addresses a cell.
    pub fn contains(&self, col: isize, row: isize) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    fn index(&self, col: usize, row: usize) -> usize {
        col * self.rows + row
    }

    /// Gets the cell at `(col, row)`, or `None` when outside the grid.
    pub fn get(&self, col: isize, row: isize) -> Option<T> {
        if self.contains(col, row) {
            Some(self.data[self.index(col as usize, row as usize)])
        } else {
            None
        }
    }

    /// Gets the cell nearest to `(col, row)`, clamping both coordinates.
    pub fn get_clamped(&self, col: isize, row: isize) -> T {
        let c = col.clamp(0, self.cols as isize - 1) as usize;
        let r = row.clamp(0, self.rows as isize - 1) as usize;
        self.data[self.index(c, r)]
    }

    /// Sets the cell at `(col, row)`. Out-of-range writes are ignored.
    ///
    /// Returns whether the write landed.
    pub fn set(&mut self, col: isize, row: isize, value: T) -> bool {
        if !self.contains(col, row) {
            return false;
        }
        let idx = self.index(col as usize, row as usize);
        self.data[idx] = value;
        true
    }

    /// Inclusive `(c0, c1, r0, r1)` bounds of the square window centred on
    /// `(col, row)` with half-extent `radius`, clipped to the grid. `None`
    /// when the window misses the grid entirely.
    fn clip_window(
        &self,
        col: isize,
        row: isize,
        radius: isize,
    ) -> Option<(isize, isize, isize, isize)> {
        let radius = radius.max(0);
        let c0 = col.saturating_sub(radius).max(0);
        let c1 = col.saturating_add(radius).min(self.cols as isize - 1);
        let r0 = row.saturating_sub(radius).max(0);
        let r1 = row.saturating_add(radius).min(self.rows as isize - 1);
        (c0 <= c1 && r0 <= r1).then_some((c0, c1, r0, r1))
    }

    /// Iterates over in-range cells of the square window centred on
    /// `(col, row)` with half-extent `radius`, yielding `(col, row, value)`.
    pub fn window(
        &self,
        col: isize,
        row: isize,
        radius: isize,
    ) -> impl Iterator<Item = (isize, isize, T)> + '_ {
        self.clip_window(col, row, radius)
            .into_iter()
            .flat_map(move |(c0, c1, r0, r1)| {
                (c0..=c1).flat_map(move |c| {
                    (r0..=r1).map(move |r| (c, r, self.data[self.index(c as usize, r as usize)]))
                })
            })
    }

    /// Writes `value` into every in-range cell of the square window centred
    /// on `(col, row)` with half-extent `radius`.
    pub fn fill_window(&mut self, col: isize, row: isize, radius: isize, value: T) {
        let Some((c0, c1, r0, r1)) = self.clip_window(col, row, radius) else {
            return;
        };
        for c in c0..=c1 {
            for r in r0..=r1 {
                let idx = self.index(c as usize, r as usize);
                self.data[idx] = value;
            }
        }
    }

    /// Iterates over all cells as `(col, row, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.data.iter().enumerate().map(move |(i, &v)| {
            let col = i / self.rows;
            let row = i % self.rows;
            (col, row, v)
        })
    }
}
