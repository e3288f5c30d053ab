//! Property-based tests for the self-shading pipeline's range and
//! finiteness invariants.

use proptest::prelude::*;
use rowshade::{
    ArrayLayout, MaskAngleMethod, ModuleOrientation, SelfShadeModel, StringOrientation,
    TimestepInputs,
};

fn arb_layout() -> impl Strategy<Value = ArrayLayout> {
    (
        0.3f64..2.5,
        0.3f64..2.5,
        1u32..6,
        1u32..12,
        1u32..5,
        1u32..20,
        0.05f64..25.0,
        prop_oneof![
            Just(ModuleOrientation::Portrait),
            Just(ModuleOrientation::Landscape)
        ],
        prop_oneof![
            Just(StringOrientation::Vertical),
            Just(StringOrientation::Horizontal)
        ],
        1u32..4,
    )
        .prop_map(
            |(width, length, m, n, diodes, rows, spacing, module_orient, string_orient, strings)| {
                ArrayLayout {
                    module_width: width,
                    module_length: length,
                    modules_along_side: m,
                    modules_along_bottom: n,
                    diodes_per_module: diodes,
                    rows,
                    row_spacing: spacing,
                    module_orientation: module_orient,
                    string_orientation: string_orient,
                    strings_per_row: strings,
                    mask_angle_method: MaskAngleMethod::WorstCase,
                    fill_factor: 0.75,
                }
            },
        )
}

fn arb_inputs() -> impl Strategy<Value = TimestepInputs> {
    (
        0.0f64..89.0,
        0.0f64..360.0,
        0.0f64..120.0,
        0.0f64..360.0,
        0.0f64..1100.0,
        0.0f64..1100.0,
        0.0f64..500.0,
        0.05f64..0.9,
        any::<bool>(),
        0.0f64..1.0,
    )
        .prop_map(
            |(
                tilt,
                azimuth,
                zenith,
                solar_azimuth,
                beam_normal,
                poa_beam,
                poa_diffuse,
                albedo,
                tracking,
                shade_fraction,
            )| {
                TimestepInputs {
                    tilt_deg: tilt,
                    azimuth_deg: azimuth,
                    solar_zenith_deg: zenith,
                    solar_azimuth_deg: solar_azimuth,
                    beam_normal,
                    poa_beam,
                    poa_diffuse,
                    albedo,
                    tracking,
                    tracked_shade_fraction: shade_fraction,
                }
            },
        )
}

proptest! {
    /// X, S, and the DC derate stay in [0, 1] for every valid layout and
    /// physically plausible timestep, and every output is finite.
    #[test]
    fn fractions_and_derate_stay_in_unit_interval(
        layout in arb_layout(),
        inputs in arb_inputs(),
    ) {
        let model = SelfShadeModel::new(layout).expect("generated layout is valid");
        let result = model.evaluate(&inputs).expect("evaluation stays finite");

        prop_assert!((0.0..=1.0).contains(&result.shaded_string_fraction),
            "X = {}", result.shaded_string_fraction);
        prop_assert!((0.0..=1.0).contains(&result.shaded_submodule_fraction),
            "S = {}", result.shaded_submodule_fraction);
        prop_assert!((0.0..=1.0).contains(&result.dc_derate),
            "derate = {}", result.dc_derate);
        prop_assert!(result.reduced_diffuse.is_finite());
        prop_assert!(result.reduced_reflected.is_finite());
        prop_assert!(result.diffuse_derate.is_finite());
        prop_assert!(result.reflected_derate.is_finite());
    }

    /// A sun below the horizon, a flat array, or a sun behind the array
    /// never produces shaded strings.
    #[test]
    fn no_projection_means_no_shaded_strings(
        layout in arb_layout(),
        inputs in arb_inputs(),
        zenith in 90.0f64..140.0,
    ) {
        let night = TimestepInputs {
            solar_zenith_deg: zenith,
            tracking: false,
            ..inputs
        };
        let model = SelfShadeModel::new(layout).expect("generated layout is valid");
        let result = model.evaluate(&night).expect("evaluation stays finite");
        prop_assert_eq!(result.shaded_string_fraction, 0.0);
        prop_assert_eq!(result.dc_derate, 1.0);
    }

    /// The diffuse derate ratio times the unreduced input reproduces the
    /// reduced output in every branch.
    #[test]
    fn diffuse_derate_is_consistent_with_reduction(
        layout in arb_layout(),
        inputs in arb_inputs(),
    ) {
        let model = SelfShadeModel::new(layout).expect("generated layout is valid");
        let result = model.evaluate(&inputs).expect("evaluation stays finite");
        let recomposed = result.diffuse_derate * inputs.poa_diffuse;
        prop_assert!((recomposed - result.reduced_diffuse).abs() <= 1e-9 * inputs.poa_diffuse.max(1.0),
            "derate {} x input {} != reduced {}",
            result.diffuse_derate, inputs.poa_diffuse, result.reduced_diffuse);
    }
}
