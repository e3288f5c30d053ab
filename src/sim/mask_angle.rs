//! Mask-angle estimation.
//!
//! The mask angle is the angle subtended by the adjacent row's top edge
//! as seen from a point on a given row; it determines how much of the sky
//! dome that point loses. Two interchangeable estimators are provided:
//! the closed-form worst case at the row's leading edge, and an average
//! over the whole collector band computed by Romberg quadrature.

use crate::error::ShadeResult;
use crate::math::romberg::DEFAULT_TOLERANCE;
use crate::math::{cosd, romberg, sind};
use crate::sim::layout::{MaskAngleMethod, ROW_SPACING_EPS};

/// Mask angle (radians) at position `x` up the slope of a row.
///
/// `r` is the row spacing, `b` the collector band extent up the slope,
/// `tilt_deg` the effective surface tilt. At `x = 0` this reduces to the
/// worst-case leading-edge angle.
fn mask_angle_at(x: f64, r: f64, b: f64, tilt_deg: f64) -> f64 {
    ((b - x) * sind(tilt_deg)).atan2(r - b * cosd(tilt_deg) + x * cosd(tilt_deg))
}

/// Estimates the row mask angle in degrees.
///
/// # Arguments
/// * `method` - worst-case closed form or array-averaged quadrature
/// * `slope` - collector band extent up the slope (m)
/// * `row_spacing` - row-to-row spacing (m), floored internally
/// * `tilt_deg` - effective surface tilt (degrees)
///
/// The averaged strategy integrates the pointwise angle over `[0, slope]`
/// and can fail with a quadrature non-convergence error; the closed form
/// cannot fail.
pub fn mask_angle_deg(
    method: MaskAngleMethod,
    slope: f64,
    row_spacing: f64,
    tilt_deg: f64,
) -> ShadeResult<f64> {
    let r = row_spacing.max(ROW_SPACING_EPS);
    let angle_rad = match method {
        MaskAngleMethod::WorstCase => (slope * sind(tilt_deg)).atan2(r - slope * cosd(tilt_deg)),
        MaskAngleMethod::ArrayAveraged => {
            romberg(
                |x| mask_angle_at(x, r, slope, tilt_deg),
                0.0,
                slope,
                DEFAULT_TOLERANCE,
            )? / slope
        }
    };
    Ok(angle_rad.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn worst_case_reference_geometry() {
        // tilt 30 deg, slope 1 m, spacing 2 m:
        // atan2(sin 30, 2 - cos 30) = atan2(0.5, 1.1339746) = 23.79 deg
        let angle = mask_angle_deg(MaskAngleMethod::WorstCase, 1.0, 2.0, 30.0).unwrap();
        assert_relative_eq!(angle, 23.794, max_relative = 1e-4);
    }

    #[test]
    fn averaged_is_below_worst_case() {
        // The leading edge sees the largest obstruction; averaging over
        // the band can only shrink the angle.
        let worst = mask_angle_deg(MaskAngleMethod::WorstCase, 1.0, 2.0, 30.0).unwrap();
        let averaged = mask_angle_deg(MaskAngleMethod::ArrayAveraged, 1.0, 2.0, 30.0).unwrap();
        assert!(
            averaged > 0.0 && averaged < worst,
            "averaged {averaged} should lie strictly between 0 and worst case {worst}"
        );
    }

    #[test]
    fn averaged_converges_to_worst_case_for_vanishing_band() {
        // As the band shrinks the averaged angle and the leading-edge
        // angle both collapse to the same limit.
        let slope = 1.0e-8;
        let worst = mask_angle_deg(MaskAngleMethod::WorstCase, slope, 2.0, 30.0).unwrap();
        let averaged = mask_angle_deg(MaskAngleMethod::ArrayAveraged, slope, 2.0, 30.0).unwrap();
        assert!(
            (averaged - worst).abs() < 1.0e-6,
            "averaged {averaged} and worst case {worst} should agree for a vanishing band"
        );
    }

    #[test]
    fn zero_spacing_is_floored_not_divided() {
        let angle = mask_angle_deg(MaskAngleMethod::WorstCase, 1.0, 0.0, 30.0).unwrap();
        assert!(angle.is_finite());
        // With spacing collapsed to epsilon the adjacent row towers over
        // the observer: the angle approaches 180 - tilt.
        assert!(angle > 90.0);
    }
}
