//! Docking search box around a reference ligand.

use serde::{Deserialize, Serialize};

use crate::error::{DockError, Result};
use crate::structure::AtomCoordinate;

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Axis-aligned search region handed to the docking engine.
///
/// For ligand coordinates with per-axis extremes `min`/`max` and padding `p`:
/// `center = (max + min) / 2` and `size = (max - min) + 2p`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBox {
    pub center: [f64; 3],
    pub size: [f64; 3],
}

impl SearchBox {
    /// Smallest box enclosing `coords`, grown by `padding` on every side.
    ///
    /// Values are kept at full precision. A degenerate axis (all atoms at the
    /// same position along it) comes out as `2 * padding`; use
    /// [`SearchBox::validate`] before handing the box to an engine.
    pub fn enclosing(coords: &[AtomCoordinate], padding: f64) -> Result<Self> {
        let (first, rest) = coords.split_first().ok_or(DockError::EmptyCoordinateSet)?;

        let mut min = first.to_array();
        let mut max = min;
        for coord in rest {
            for (axis, value) in coord.to_array().into_iter().enumerate() {
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }

        let mut center = [0.0; 3];
        let mut size = [0.0; 3];
        for axis in 0..3 {
            center[axis] = (max[axis] + min[axis]) / 2.0;
            size[axis] = (max[axis] - min[axis]) + 2.0 * padding;
        }

        Ok(Self { center, size })
    }

    /// Every axis must have a finite, strictly positive size.
    pub fn validate(&self) -> Result<()> {
        for (axis, size) in AXES.iter().zip(self.size) {
            if !(size.is_finite() && size > 0.0) {
                return Err(DockError::DegenerateSearchBox { axis: *axis, size });
            }
        }
        Ok(())
    }

    pub fn volume(&self) -> f64 {
        self.size.iter().product()
    }
}
