//! Per-timestep orchestration of the self-shading pipeline.
//!
//! [`SelfShadeModel`] owns a validated [`ArrayLayout`] and sequences the
//! pipeline once per timestep: mask angle, shading fractions, irradiance
//! reduction, diffuse-to-global ratio, DC derate. Evaluation takes
//! `&self`, holds no mutable state, and performs no I/O, so one model can
//! serve any number of timesteps - or threads - concurrently.

use crate::error::{ShadeError, ShadeResult};
use crate::sim::derate::dc_derate;
use crate::sim::fractions::shading_fractions;
use crate::sim::irradiance::diffuse_reduce;
use crate::sim::layout::ArrayLayout;
use crate::sim::mask_angle::mask_angle_deg;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-timestep inputs supplied by the host's solar-position and
/// irradiance-decomposition stages.
///
/// All angles in degrees, irradiances in W/m2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestepInputs {
    /// Effective surface tilt; varies per timestep under tracking.
    pub tilt_deg: f64,
    /// Effective surface azimuth.
    pub azimuth_deg: f64,
    /// Solar zenith angle.
    pub solar_zenith_deg: f64,
    /// Solar azimuth angle, same convention as `azimuth_deg`.
    pub solar_azimuth_deg: f64,
    /// Beam normal irradiance.
    pub beam_normal: f64,
    /// Plane-of-array beam irradiance.
    pub poa_beam: f64,
    /// Plane-of-array diffuse irradiance, sky + ground.
    pub poa_diffuse: f64,
    /// Ground albedo.
    pub albedo: f64,
    /// One-axis tracking mode.
    pub tracking: bool,
    /// Geometric row shade fraction in [0, 1], supplied by the tracker
    /// geometry routine; read only when `tracking` is set.
    pub tracked_shade_fraction: f64,
}

/// Self-shading outputs for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerateResult {
    /// Sky-diffuse irradiance after row obstruction (W/m2).
    pub reduced_diffuse: f64,
    /// Sky-diffuse derate ratio.
    pub diffuse_derate: f64,
    /// Ground-reflected irradiance after row obstruction (W/m2).
    pub reduced_reflected: f64,
    /// Ground-reflected derate ratio.
    pub reflected_derate: f64,
    /// DC power derate factor in [0, 1].
    pub dc_derate: f64,
    /// Resolved fraction of parallel strings shaded (X).
    pub shaded_string_fraction: f64,
    /// Resolved fraction of a shaded string's submodules shaded (S).
    pub shaded_submodule_fraction: f64,
    /// Mask angle used for the sky-diffuse reduction (degrees).
    pub mask_angle_deg: f64,
}

impl DerateResult {
    /// Surfaces any NaN or infinity instead of letting it propagate into
    /// the host's energy accounting.
    fn ensure_finite(&self) -> ShadeResult<()> {
        let checks = [
            ("reduced diffuse irradiance", self.reduced_diffuse),
            ("diffuse derate", self.diffuse_derate),
            ("reduced reflected irradiance", self.reduced_reflected),
            ("reflected derate", self.reflected_derate),
            ("dc derate", self.dc_derate),
            ("shaded string fraction", self.shaded_string_fraction),
            ("shaded submodule fraction", self.shaded_submodule_fraction),
            ("mask angle", self.mask_angle_deg),
        ];
        for (quantity, value) in checks {
            if !value.is_finite() {
                return Err(ShadeError::NonFinite { quantity, value });
            }
        }
        Ok(())
    }
}

/// Self-shading evaluator for a fixed array layout.
#[derive(Debug, Clone)]
pub struct SelfShadeModel {
    layout: ArrayLayout,
}

impl SelfShadeModel {
    /// Builds a model from a layout, validating it once.
    ///
    /// Per-timestep evaluation never re-validates; a structurally invalid
    /// configuration is rejected here and nowhere else.
    pub fn new(layout: ArrayLayout) -> ShadeResult<Self> {
        layout.validate()?;
        Ok(SelfShadeModel { layout })
    }

    /// The validated layout this model evaluates.
    pub fn layout(&self) -> &ArrayLayout {
        &self.layout
    }

    /// Evaluates self-shading for one timestep.
    ///
    /// # Pipeline
    ///
    /// 1. mask angle for the configured method
    /// 2. shading fractions X and S from the sun-projected row shadow
    /// 3. sky-diffuse and ground-reflected irradiance reduction
    /// 4. diffuse-to-global incidence ratio over the reduced components
    /// 5. empirical DC derate
    ///
    /// Identical inputs yield bitwise-identical results: no state crosses
    /// the call boundary.
    pub fn evaluate(&self, inputs: &TimestepInputs) -> ShadeResult<DerateResult> {
        let dims = self.layout.collector_dims();

        let mask_angle = mask_angle_deg(
            self.layout.mask_angle_method,
            dims.slope,
            self.layout.row_spacing,
            inputs.tilt_deg,
        )?;

        let fractions = shading_fractions(&self.layout, inputs);

        let reduction = diffuse_reduce(
            inputs.solar_zenith_deg,
            inputs.tilt_deg,
            inputs.beam_normal,
            inputs.poa_diffuse,
            self.layout.ground_coverage_ratio(),
            mask_angle,
            inputs.albedo,
            self.layout.rows,
        );

        // Diffuse share of everything incident on the (reduced) plane of
        // array; beam keeps its unreduced POA value.
        let incident_diffuse = reduction.reduced_diffuse + reduction.reduced_reflected;
        let incident_total = inputs.poa_beam + incident_diffuse;
        let dbh_ratio = if incident_total != 0.0 {
            incident_diffuse / incident_total
        } else {
            0.0
        };

        let dc = dc_derate(
            fractions.x,
            fractions.s,
            self.layout.fill_factor,
            dbh_ratio,
        );

        let result = DerateResult {
            reduced_diffuse: reduction.reduced_diffuse,
            diffuse_derate: reduction.diffuse_derate,
            reduced_reflected: reduction.reduced_reflected,
            reflected_derate: reduction.reflected_derate,
            dc_derate: dc,
            shaded_string_fraction: fractions.x,
            shaded_submodule_fraction: fractions.s,
            mask_angle_deg: mask_angle,
        };
        result.ensure_finite()?;
        Ok(result)
    }

    /// Evaluates a slice of timesteps in parallel.
    ///
    /// Timesteps are independent, so the work is split across the rayon
    /// thread pool; results keep input order and the first error wins.
    pub fn evaluate_series(&self, steps: &[TimestepInputs]) -> ShadeResult<Vec<DerateResult>> {
        steps.par_iter().map(|step| self.evaluate(step)).collect()
    }
}
