// occupancy grid definition
// rows index the vertical axis, columns the horizontal one

use std::ops::Deref;

use itertools::iproduct;
use nalgebra::DMatrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{GridCell, RoboticsError, RoboticsResult};

/// Boolean occupancy map; `true` marks an obstacle cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OccupancyGrid {
    grid: DMatrix<bool>,
}

impl OccupancyGrid {
    pub fn new(grid: DMatrix<bool>) -> RoboticsResult<Self> {
        if grid.is_empty() {
            return Err(RoboticsError::InvalidParameter(
                "occupancy grid must not be empty".to_string(),
            ));
        }
        Ok(Self { grid })
    }

    /// Build from rows of integers, any non-zero value is an obstacle
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> RoboticsResult<Self> {
        let ncols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if let Some(row) = rows.iter().position(|r| r.as_ref().len() != ncols) {
            return Err(RoboticsError::InvalidParameter(format!(
                "row {} has {} columns, expected {}",
                row,
                rows[row].as_ref().len(),
                ncols
            )));
        }
        Self::new(DMatrix::from_fn(rows.len(), ncols, |i, j| {
            rows[i].as_ref()[j] != 0
        }))
    }

    /// All-free grid
    pub fn empty(nrows: usize, ncols: usize) -> RoboticsResult<Self> {
        Self::new(DMatrix::from_element(nrows, ncols, false))
    }

    /// Every cell replaced by a `scale` x `scale` block
    pub fn upscaled(&self, scale: usize) -> RoboticsResult<Self> {
        if scale < 1 {
            return Err(RoboticsError::InvalidParameter(
                "scale must be >= 1".to_string(),
            ));
        }
        let (nrows, ncols) = self.grid.shape();
        Self::new(DMatrix::from_fn(nrows * scale, ncols * scale, |i, j| {
            self.grid[(i / scale, j / scale)]
        }))
    }

    pub fn set_obstacle(&mut self, cell: GridCell, occupied: bool) -> RoboticsResult<()> {
        let index = self.index_of(cell).ok_or(RoboticsError::OutOfGrid(cell))?;
        self.grid[index] = occupied;
        Ok(())
    }

    /// Matrix index of `cell`, if it lies inside the grid
    pub fn index_of(&self, cell: GridCell) -> Option<(usize, usize)> {
        let (nrows, ncols) = self.grid.shape();
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        if row < nrows && col < ncols {
            Some((row, col))
        } else {
            None
        }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.index_of(cell).is_some()
    }

    /// True only for in-grid obstacle cells
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.index_of(cell).map_or(false, |index| self.grid[index])
    }

    /// Every cell of the grid in row-major order
    pub fn cells(&self) -> impl Iterator<Item = GridCell> {
        let (nrows, ncols) = self.grid.shape();
        iproduct!(0..nrows as i32, 0..ncols as i32).map(|(row, col)| GridCell::new(row, col))
    }
}

impl Deref for OccupancyGrid {
    type Target = DMatrix<bool>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}
