//! Shading-fraction resolution.
//!
//! Resolves the two scalars the empirical derate model runs on:
//!
//! - **X** - fraction of the array's parallel strings that see any shade
//! - **S** - fraction of a shaded string's submodules that are shaded
//!
//! The row shadow is projected from sun position via Appelbaum and Bany
//! eqns 11-13, then quantized to module and bypass-diode boundaries in a
//! four-way case split over wiring and module orientation. The four cases
//! are structurally symmetric but swap which of the shadow height and
//! shadow offset (and which module dimension) plays the cross-string vs.
//! along-string role, so the role assignment is kept explicit per arm.

use crate::math::{cosd, sind, tand};
use crate::sim::engine::TimestepInputs;
use crate::sim::layout::{ArrayLayout, ModuleOrientation, StringOrientation};

/// Per-timestep shading fractions, both in [0, 1]. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingFractions {
    /// Fraction of parallel strings shaded.
    pub x: f64,
    /// Fraction of a shaded string's submodules shaded.
    pub s: f64,
}

impl ShadingFractions {
    /// No shading at all.
    pub fn unshaded() -> Self {
        ShadingFractions { x: 0.0, s: 0.0 }
    }
}

/// Wraps an angle difference into (-180, 180] degrees.
fn wrap_degrees(mut deg: f64) -> f64 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}

/// Resolves X and S for one timestep.
///
/// Returns the unshaded pair when the sun is below the horizon, more than
/// 90 degrees off the array-facing azimuth, or the effective tilt is zero:
/// a flat array cannot shade its neighbor and a set sun casts no row
/// shadow, so no string sees shade.
///
/// Under one-axis tracking the shadow height is taken from the externally
/// supplied geometric shade fraction (`Hs = fraction x B`) and S is forced
/// to 1, treating the whole tracked row as shaded along its axis.
pub fn shading_fractions(layout: &ArrayLayout, inputs: &TimestepInputs) -> ShadingFractions {
    let dims = layout.collector_dims();
    let a = dims.along_row;
    let b = dims.slope;
    let spacing = layout.effective_row_spacing();

    let m = f64::from(layout.modules_along_side);
    let n = f64::from(layout.modules_along_bottom);
    let d = f64::from(layout.diodes_per_module);
    let rows = f64::from(layout.rows);
    let w = layout.module_width;
    let l = layout.module_length;

    let tilt = inputs.tilt_deg;
    let rel_azimuth = wrap_degrees(inputs.solar_azimuth_deg - inputs.azimuth_deg);
    let altitude = 90.0 - inputs.solar_zenith_deg;

    if inputs.solar_zenith_deg >= 90.0 || rel_azimuth.abs() >= 90.0 || tilt == 0.0 {
        return ShadingFractions::unshaded();
    }

    // Appelbaum eqns 12 and 11: cross-row and along-row components of the
    // leading row's shadow on the ground plane.
    let py = a * (cosd(tilt) + cosd(rel_azimuth) * sind(tilt) / tand(altitude));
    let px = a * sind(tilt) * sind(rel_azimuth) / tand(altitude);

    // Appelbaum eqn A12: shadow offset from the row edge, positive and no
    // longer than the row.
    let mut g = if py == 0.0 {
        0.0
    } else {
        (spacing * px / py).abs().min(a)
    };
    // Horizontal wiring with several strings across a row behaves like an
    // endless row: the offset is dropped (empirical override).
    if layout.string_orientation == StringOrientation::Horizontal && layout.strings_per_row > 1 {
        g = 0.0;
    }

    // Appelbaum eqn A13: shadow height along the inclined plane. One-axis
    // tracking replaces it with the geometrically computed row fraction.
    let hs = if inputs.tracking {
        inputs.tracked_shade_fraction * b
    } else if py == 0.0 {
        0.0
    } else {
        a * (1.0 - spacing / py)
    };
    let hs = hs.clamp(0.0, b);

    // Whole-module shadow bands across the row stack; the leading row is
    // never shaded, hence the (rows - 1)/rows factor.
    let row_quantized = |q: f64, dim: f64| ((q / dim).ceil() / (m * rows)) * (rows - 1.0);
    // Partial module shading rounds up to the next bypass-diode segment.
    let diode_quantized = |q: f64, dim: f64| (q * d / dim).ceil() / d;

    let (x, s) = match (layout.string_orientation, layout.module_orientation) {
        (StringOrientation::Horizontal, ModuleOrientation::Landscape) => {
            if hs <= w {
                // Shadow within the bottom module course.
                let x = row_quantized(hs, w);
                let s = diode_quantized(hs, w) * (1.0 - (g / l).floor() / n);
                (x, s)
            } else {
                // Shadow spills past the first course: every submodule of
                // a shaded string is shaded.
                (row_quantized(hs, w), 1.0)
            }
        }
        (StringOrientation::Horizontal, ModuleOrientation::Portrait) => {
            let x = row_quantized(hs, l);
            let s = 1.0 - (g * d / w).floor() / (d * n);
            (x, s)
        }
        (StringOrientation::Vertical, ModuleOrientation::Portrait) => {
            let x = 1.0 - (g / w).floor() / n;
            let s = row_quantized(hs, l);
            (x, s)
        }
        (StringOrientation::Vertical, ModuleOrientation::Landscape) => {
            let x = 1.0 - (g / l).floor() / n;
            let s = (diode_quantized(hs, w) / (m * rows)) * (rows - 1.0);
            (x, s)
        }
    };

    let s = if inputs.tracking { 1.0 } else { s };

    ShadingFractions {
        x: x.clamp(0.0, 1.0),
        s: s.clamp(0.0, 1.0),
    }
}

/// X and S for a horizontally wired row with an externally computed shade
/// fraction, as used by one-axis tracker hosts that resolve the row
/// shadow geometrically.
///
/// `shade_fraction` is the fraction of the assembly shaded up from its
/// long edge, in [0, 1]. The shadow offset is taken as zero (very long
/// rows).
#[allow(clippy::too_many_arguments)]
pub fn horizontal_string_fractions(
    orientation: ModuleOrientation,
    module_width: f64,
    module_length: f64,
    rows: u32,
    modules_along_side: u32,
    modules_along_bottom: u32,
    diodes_per_module: u32,
    shade_fraction: f64,
) -> ShadingFractions {
    let m = f64::from(modules_along_side);
    let n = f64::from(modules_along_bottom);
    let d = f64::from(diodes_per_module);
    let r = f64::from(rows);
    let w = module_width;
    let l = module_length;
    let g = 0.0_f64; // assume very long rows

    let (x, s) = match orientation {
        ModuleOrientation::Landscape => {
            let hs = shade_fraction * m * w;
            let x = ((hs / w).ceil() / (m * r)) * (r - 1.0);
            if hs <= w {
                let s = ((hs * d / w).ceil() / d) * (1.0 - (g / l).floor() / n);
                (x, s)
            } else {
                (x, 1.0)
            }
        }
        ModuleOrientation::Portrait => {
            let hs = shade_fraction * m * l;
            let x = ((hs / l).ceil() / (m * r)) * (r - 1.0);
            let s = 1.0 - ((g * d / w).floor() / (d * n));
            (x, s)
        }
    };

    ShadingFractions {
        x: x.clamp(0.0, 1.0),
        s: s.clamp(0.0, 1.0),
    }
}
