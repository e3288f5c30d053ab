//! Diffuse and ground-reflected irradiance reduction.
//!
//! Adjacent rows obstruct part of the sky dome and part of the ground a
//! tilted collector would otherwise see. This module reduces the
//! plane-of-array sky-diffuse and ground-reflected components by
//! isotropic-sky view factors driven by the mask angle, ground-coverage
//! ratio, and row count. Beam irradiance is never derated here: beam
//! shading is boolean per cell and already captured by X and S.

use crate::math::{cosd, sind};
use serde::Serialize;

/// Plane-of-array diffuse level below which reduction is skipped (W/m2).
const MIN_POA_DIFFUSE: f64 = 0.1;

/// Floor for the sun-angle-dependent ground view-factor offset (m).
const Y1_FLOOR: f64 = 1.0e-5;

/// Reduced irradiance components and their derate ratios for one
/// timestep, returned by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrradianceReduction {
    /// Sky-diffuse irradiance after row obstruction (W/m2).
    pub reduced_diffuse: f64,
    /// Reduced over unreduced sky diffuse.
    pub diffuse_derate: f64,
    /// Ground-reflected irradiance after row obstruction (W/m2).
    pub reduced_reflected: f64,
    /// Reduced over unreduced ground reflected.
    pub reflected_derate: f64,
}

/// Reduces sky-diffuse and ground-reflected irradiance for row shading.
///
/// # Arguments
/// * `solar_zenith_deg` - solar zenith angle (degrees)
/// * `tilt_deg` - effective surface tilt (degrees)
/// * `beam_normal` - beam normal irradiance (W/m2)
/// * `poa_diffuse` - plane-of-array diffuse, sky + ground (W/m2)
/// * `gcr` - ground-coverage ratio, slope extent over row spacing
/// * `mask_angle_deg` - average row mask angle (degrees)
/// * `albedo` - ground reflectance
/// * `rows` - number of rows in the array
///
/// When the diffuse input is effectively zero (below 0.1 W/m2) there is
/// nothing to reduce: both derate ratios are 1 and the reduced components
/// equal their unreduced counterparts.
#[allow(clippy::too_many_arguments)]
pub fn diffuse_reduce(
    solar_zenith_deg: f64,
    tilt_deg: f64,
    beam_normal: f64,
    poa_diffuse: f64,
    gcr: f64,
    mask_angle_deg: f64,
    albedo: f64,
    rows: u32,
) -> IrradianceReduction {
    let nrows = f64::from(rows);

    // Isotropic-sky conversions: POA diffuse back to horizontal diffuse,
    // beam normal down to beam on horizontal.
    let gd = poa_diffuse;
    let gdh = gd * 2.0 / (1.0 + cosd(tilt_deg));
    let gbh = beam_normal * cosd(solar_zenith_deg);

    // Unshaded single-row ground-reflection view factor and the
    // irradiance it would deliver.
    let f1 = albedo * sind(tilt_deg / 2.0).powi(2);
    let gr1 = f1 * (gbh + gdh);

    if gd < MIN_POA_DIFFUSE {
        return IrradianceReduction {
            reduced_diffuse: gd,
            diffuse_derate: 1.0,
            reduced_reflected: gr1,
            reflected_derate: 1.0,
        };
    }

    // Sky diffuse: interior rows lose the slice of sky dome subtended by
    // the mask angle; the leading row sees the full dome.
    let reduced_diffuse =
        gd - gdh * (1.0 - cosd(mask_angle_deg / 2.0).powi(2)) * (nrows - 1.0) / nrows;
    let diffuse_derate = reduced_diffuse / gd;

    // Ground reflection on a unit collector band.
    let b = 1.0;
    let r = b / gcr;
    let solalt = 90.0 - solar_zenith_deg;

    // Beam-lit strip seen by an interior row, floored so the square root
    // below stays in domain.
    let y1 = (r - b * sind(180.0 - solalt - tilt_deg) / sind(solalt)).max(Y1_FLOOR);
    let f2 = 0.5
        * albedo
        * (1.0 + y1 / b
            - (y1.powi(2) / b.powi(2) - 2.0 * y1 / b * cosd(180.0 - tilt_deg) + 1.0).sqrt());
    let f3 = 0.5
        * albedo
        * (1.0 + r / b - (r.powi(2) / b.powi(2) - 2.0 * r / b * cosd(180.0 - tilt_deg) + 1.0).sqrt());

    // Blend the unshaded leading row with the interior rows.
    let reduced_reflected =
        ((f1 + (nrows - 1.0) * f2) / nrows) * gbh + ((f1 + (nrows - 1.0) * f3) / nrows) * gdh;

    let reflected_derate = if gr1 > 0.0 {
        reduced_reflected / gr1
    } else {
        1.0
    };

    IrradianceReduction {
        reduced_diffuse,
        diffuse_derate,
        reduced_reflected,
        reflected_derate,
    }
}
