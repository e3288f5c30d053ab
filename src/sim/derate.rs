//! Empirical DC power derate.
//!
//! Closed-form replacement for a full array power-flow simulation, from
//! C. Deline et al., "A simplified model of uniform shading in large
//! photovoltaic arrays" (Solar Energy, 2013). Three regression-derived
//! candidate expressions bracket the array's operating point; the most
//! favorable one wins, scaled by the shaded-string fraction so an
//! unshaded array derates to exactly 1.

/// X ceiling applied when evaluating the quadratic c2 coefficient.
const C2_X_CAP: f64 = 0.65;

/// DC power derate factor in [0, 1].
///
/// # Arguments
/// * `x` - fraction of parallel strings shaded, [0, 1]
/// * `s` - fraction of a shaded string's submodules shaded, [0, 1]
/// * `ff0` - module fill factor at reference conditions
/// * `dbh_ratio` - diffuse-to-global incident irradiance ratio
///
/// Published coefficient set of 1/18/13.
pub fn dc_derate(x: f64, s: f64, ff0: f64, dbh_ratio: f64) -> f64 {
    let x_capped = x.min(C2_X_CAP);

    let c1 = (109.0 * ff0 - 54.3) * (-4.5 * x).exp();
    let c2 = -6.0 * x_capped.powi(2) + 5.0 * x_capped + 0.28;
    let c3_0 = (-0.05 * dbh_ratio - 0.01) * x + (0.85 * ff0 - 0.7) * dbh_ratio - 0.085 * ff0 + 0.05;
    let c3 = c3_0.max(dbh_ratio - 1.0);

    // Candidate derates: quadratic in S, linear X/S interpolation, and
    // linear in S anchored at the diffuse ratio.
    let eqn5 = 1.0 - c1 * s.powi(2) - c2 * s;
    let eqn9 = if x != 0.0 { (x - s) / x } else { 0.0 };
    let eqn10 = c3 * (s - 1.0) + dbh_ratio;

    let reduc = eqn5.max(eqn9).max(eqn10);
    (x * reduc + (1.0 - x)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn published_reference_point() {
        // X = 0.3, S = 0.5, FF0 = 0.8, dbh = 0.1:
        // c1 = 8.5290, c2 = 1.24, c3 = -0.0245,
        // candidates -1.7522 / -0.6667 / 0.1123, blended 0.7337.
        let derate = dc_derate(0.3, 0.5, 0.8, 0.1);
        assert_relative_eq!(derate, 0.733675, max_relative = 1e-4);
    }

    #[test]
    fn no_shaded_strings_means_no_derate() {
        // X = 0 collapses the blend to 1 regardless of S.
        for s in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(dc_derate(0.0, s, 0.75, 0.3), 1.0);
        }
    }

    #[test]
    fn fully_shaded_diffuse_only_array_keeps_diffuse_fraction() {
        // X = S = 1: eqn5 = 1 - c1 - c2 (well below 0), eqn9 = 0,
        // eqn10 = dbh. The array keeps exactly its diffuse share.
        let dbh = 0.4;
        let derate = dc_derate(1.0, 1.0, 0.75, dbh);
        assert_relative_eq!(derate, dbh, max_relative = 1e-12);
    }

    #[test]
    fn output_is_clamped_to_unit_interval() {
        for &(x, s) in &[(1.0, 1.0), (0.9, 1.0), (0.65, 0.8), (0.2, 1.0)] {
            for dbh in [0.0, 0.5, 1.0] {
                let derate = dc_derate(x, s, 0.8, dbh);
                assert!(
                    (0.0..=1.0).contains(&derate),
                    "derate {derate} out of range for X={x}, S={s}, dbh={dbh}"
                );
            }
        }
    }

    #[test]
    fn deeper_shading_never_helps() {
        // For fixed X, growing S can only lower the derate.
        let mut previous = f64::INFINITY;
        for i in 0..=10 {
            let s = f64::from(i) / 10.0;
            let derate = dc_derate(0.4, s, 0.75, 0.2);
            assert!(
                derate <= previous + 1e-12,
                "derate should be non-increasing in S, got {derate} after {previous}"
            );
            previous = derate;
        }
    }
}
