//! Array geometry and wiring configuration.
//!
//! [`ArrayLayout`] is constructed once per simulation run, validated up
//! front, and read-only afterwards. Per-timestep quantities (sun position,
//! irradiance components) arrive separately through
//! [`TimestepInputs`](crate::sim::engine::TimestepInputs).

use crate::error::{ShadeError, ShadeResult};
use serde::{Deserialize, Serialize};

/// Smallest admissible row-to-row spacing in metres.
///
/// Row spacing appears in denominators throughout the shadow geometry;
/// values at or below zero are floored to this epsilon.
pub const ROW_SPACING_EPS: f64 = 1.0e-5;

/// Physical orientation of a module within the racking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleOrientation {
    /// Long side of the module runs up the slope.
    Portrait,
    /// Long side of the module runs along the row.
    Landscape,
}

/// Electrical wiring direction of the strings within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringOrientation {
    /// Strings run up the slope of the row.
    Vertical,
    /// Strings run along the row.
    Horizontal,
}

/// Strategy for estimating the sky-obstruction mask angle of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskAngleMethod {
    /// Closed-form angle at the row's leading edge (default).
    WorstCase,
    /// Angle averaged across the collector band by numerical quadrature.
    ArrayAveraged,
}

/// Collector band extents derived from the module grid, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectorDims {
    /// Extent along the bottom of the row (Appelbaum's A).
    pub along_row: f64,
    /// Extent up the tilted slope (Appelbaum's B).
    pub slope: f64,
}

/// Geometry and wiring of a regularly spaced multi-row PV array.
///
/// All lengths are in metres. Counts describe one row of the array; rows
/// are assumed identical and equally spaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLayout {
    /// Module short-side dimension (m).
    pub module_width: f64,
    /// Module long-side dimension (m).
    pub module_length: f64,
    /// Modules stacked along the side of a row, up the slope.
    pub modules_along_side: u32,
    /// Modules placed along the bottom of a row.
    pub modules_along_bottom: u32,
    /// Bypass diodes per module; partial module shading is rounded up to
    /// whole diode segments.
    pub diodes_per_module: u32,
    /// Number of rows in the array.
    pub rows: u32,
    /// Row-to-row spacing (m), measured between leading edges.
    pub row_spacing: f64,
    /// Physical module orientation.
    pub module_orientation: ModuleOrientation,
    /// Electrical string orientation.
    pub string_orientation: StringOrientation,
    /// Parallel strings spanning one row.
    pub strings_per_row: u32,
    /// Mask-angle estimation strategy.
    pub mask_angle_method: MaskAngleMethod,
    /// Module fill factor FF0 (dimensionless, 0-1) at reference
    /// conditions; drives the empirical derate coefficients.
    pub fill_factor: f64,
}

impl Default for ArrayLayout {
    fn default() -> Self {
        ArrayLayout {
            module_width: 1.0,
            module_length: 1.7,
            modules_along_side: 2,
            modules_along_bottom: 10,
            diodes_per_module: 3,
            rows: 5,
            row_spacing: 5.0,
            module_orientation: ModuleOrientation::Portrait,
            string_orientation: StringOrientation::Vertical,
            strings_per_row: 1,
            mask_angle_method: MaskAngleMethod::WorstCase,
            fill_factor: 0.75,
        }
    }
}

impl ArrayLayout {
    /// Checks the layout for structural validity.
    ///
    /// Called once at model construction; per-timestep evaluation assumes
    /// a valid layout and never re-validates.
    pub fn validate(&self) -> ShadeResult<()> {
        if !(self.module_width > 0.0) || !self.module_width.is_finite() {
            return Err(ShadeError::InvalidLayout(format!(
                "module width must be positive, got {}",
                self.module_width
            )));
        }
        if !(self.module_length > 0.0) || !self.module_length.is_finite() {
            return Err(ShadeError::InvalidLayout(format!(
                "module length must be positive, got {}",
                self.module_length
            )));
        }
        if self.modules_along_side == 0 {
            return Err(ShadeError::InvalidLayout(
                "modules along row side must be at least 1".to_string(),
            ));
        }
        if self.modules_along_bottom == 0 {
            return Err(ShadeError::InvalidLayout(
                "modules along row bottom must be at least 1".to_string(),
            ));
        }
        if self.diodes_per_module == 0 {
            return Err(ShadeError::InvalidLayout(
                "bypass diode count must be at least 1".to_string(),
            ));
        }
        if self.rows == 0 {
            return Err(ShadeError::InvalidLayout(
                "row count must be at least 1".to_string(),
            ));
        }
        if self.strings_per_row == 0 {
            return Err(ShadeError::InvalidLayout(
                "strings per row must be at least 1".to_string(),
            ));
        }
        if !self.row_spacing.is_finite() {
            return Err(ShadeError::InvalidLayout(format!(
                "row spacing must be finite, got {}",
                self.row_spacing
            )));
        }
        if !(self.fill_factor > 0.0 && self.fill_factor <= 1.0) {
            return Err(ShadeError::InvalidLayout(format!(
                "fill factor must lie in (0, 1], got {}",
                self.fill_factor
            )));
        }
        Ok(())
    }

    /// Row spacing floored to [`ROW_SPACING_EPS`].
    ///
    /// Every consumer of spacing goes through this accessor so a zero or
    /// negative configured value cannot reach a denominator.
    pub fn effective_row_spacing(&self) -> f64 {
        self.row_spacing.max(ROW_SPACING_EPS)
    }

    /// Collector band extents for the configured module orientation.
    ///
    /// Portrait stacks module lengths up the slope and widths along the
    /// row; landscape swaps the two.
    pub fn collector_dims(&self) -> CollectorDims {
        let m = f64::from(self.modules_along_side);
        let n = f64::from(self.modules_along_bottom);
        match self.module_orientation {
            ModuleOrientation::Portrait => CollectorDims {
                along_row: self.module_width * n,
                slope: self.module_length * m,
            },
            ModuleOrientation::Landscape => CollectorDims {
                along_row: self.module_length * n,
                slope: self.module_width * m,
            },
        }
    }

    /// Ground-coverage ratio: slope extent over row spacing.
    pub fn ground_coverage_ratio(&self) -> f64 {
        self.collector_dims().slope / self.effective_row_spacing()
    }
}
