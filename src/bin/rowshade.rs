use anyhow::Context;
use clap::{Parser, Subcommand};
use rowshade::{ArrayLayout, DerateResult, SelfShadeModel, TimestepInputs};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rowshade")]
#[command(about = "PV inter-row self-shading derate calculator", long_about = None)]
struct Cli {
    /// Array layout JSON file; defaults to the built-in reference layout
    #[arg(short, long, global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluates a single timestep from explicit sun/irradiance inputs
    Eval {
        /// Effective surface tilt (degrees)
        #[arg(long, default_value_t = 30.0)]
        tilt: f64,

        /// Surface azimuth (degrees)
        #[arg(long, default_value_t = 180.0)]
        azimuth: f64,

        /// Solar zenith angle (degrees)
        #[arg(long)]
        zenith: f64,

        /// Solar azimuth angle (degrees)
        #[arg(long)]
        solar_azimuth: f64,

        /// Beam normal irradiance (W/m2)
        #[arg(long, default_value_t = 0.0)]
        beam_normal: f64,

        /// Plane-of-array beam irradiance (W/m2)
        #[arg(long, default_value_t = 0.0)]
        poa_beam: f64,

        /// Plane-of-array diffuse irradiance, sky + ground (W/m2)
        #[arg(long, default_value_t = 0.0)]
        poa_diffuse: f64,

        /// Ground albedo
        #[arg(long, default_value_t = 0.2)]
        albedo: f64,

        /// Treat the row as one-axis tracked
        #[arg(long)]
        tracking: bool,

        /// Geometric row shade fraction for tracking mode (0-1)
        #[arg(long, default_value_t = 0.0)]
        shade_fraction: f64,
    },

    /// Sweeps a built-in synthetic clear day hour by hour
    Sweep {
        /// Output format
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output_file: Option<PathBuf>,
    },
}

/// One hour of the demo sweep, flattened for serialization.
#[derive(Serialize)]
struct SweepRow {
    hour: u32,
    solar_zenith_deg: f64,
    solar_azimuth_deg: f64,
    #[serde(flatten)]
    result: DerateResult,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let layout = match &cli.layout {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading layout file {:?}", path))?;
            serde_json::from_str::<ArrayLayout>(&text)
                .with_context(|| format!("parsing layout file {:?}", path))?
        }
        None => ArrayLayout::default(),
    };
    let model = SelfShadeModel::new(layout)?;

    match cli.command {
        Commands::Eval {
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
        } => {
            let inputs = TimestepInputs {
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
            };
            let result = model.evaluate(&inputs)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Sweep {
            format,
            output_file,
        } => {
            let steps = synthetic_clear_day();
            let inputs: Vec<TimestepInputs> = steps.iter().map(|&(_, step)| step).collect();
            let results = model.evaluate_series(&inputs)?;

            let rows: Vec<SweepRow> = steps
                .iter()
                .zip(results)
                .map(|(&(hour, step), result)| SweepRow {
                    hour,
                    solar_zenith_deg: step.solar_zenith_deg,
                    solar_azimuth_deg: step.solar_azimuth_deg,
                    result,
                })
                .collect();

            let output = match format.as_str() {
                "markdown" => to_markdown(&rows),
                "csv" => to_csv(&rows),
                "json" => serde_json::to_string_pretty(&rows)?,
                _ => anyhow::bail!("Unsupported format: {}", format),
            };

            if let Some(path) = output_file {
                std::fs::write(&path, output)?;
                println!("Sweep saved to {:?}", path);
            } else {
                println!("{}", output);
            }
        }
    }

    Ok(())
}

/// Synthetic clear-day sun path and irradiance, hour by hour.
///
/// Parametric stand-in for a weather file and solar-position stage, which
/// are host responsibilities: a sine-arc sun path peaking at 65 degrees
/// altitude with a clear-sky irradiance envelope. Good enough to exercise
/// every branch of the model from the command line.
fn synthetic_clear_day() -> Vec<(u32, TimestepInputs)> {
    (5..=19)
        .map(|hour| {
            let day_fraction = (f64::from(hour) - 6.0) / 12.0;
            let altitude = 65.0 * (std::f64::consts::PI * day_fraction).sin();
            let zenith = 90.0 - altitude;
            let azimuth = 90.0 + 180.0 * day_fraction;

            let (beam_normal, poa_beam, poa_diffuse) = if altitude > 0.0 {
                let air = altitude.to_radians().sin();
                (900.0 * air.powf(0.3), 750.0 * air, 60.0 + 80.0 * air)
            } else {
                (0.0, 0.0, 0.0)
            };

            let inputs = TimestepInputs {
                tilt_deg: 30.0,
                azimuth_deg: 180.0,
                solar_zenith_deg: zenith,
                solar_azimuth_deg: azimuth,
                beam_normal,
                poa_beam,
                poa_diffuse,
                albedo: 0.2,
                tracking: false,
                tracked_shade_fraction: 0.0,
            };
            (hour, inputs)
        })
        .collect()
}

fn to_markdown(rows: &[SweepRow]) -> String {
    let mut out = String::from(
        "| Hour | Zenith | X | S | Diffuse derate | Reflected derate | DC derate |\n\
         |------|--------|---|---|----------------|------------------|-----------|\n",
    );
    for row in rows {
        out.push_str(&format!(
            "| {:02}:00 | {:6.2} | {:.3} | {:.3} | {:.4} | {:.4} | {:.4} |\n",
            row.hour,
            row.solar_zenith_deg,
            row.result.shaded_string_fraction,
            row.result.shaded_submodule_fraction,
            row.result.diffuse_derate,
            row.result.reflected_derate,
            row.result.dc_derate,
        ));
    }
    out
}

fn to_csv(rows: &[SweepRow]) -> String {
    let mut out = String::from(
        "hour,solar_zenith_deg,solar_azimuth_deg,x,s,reduced_diffuse,diffuse_derate,\
         reduced_reflected,reflected_derate,dc_derate\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            row.hour,
            row.solar_zenith_deg,
            row.solar_azimuth_deg,
            row.result.shaded_string_fraction,
            row.result.shaded_submodule_fraction,
            row.result.reduced_diffuse,
            row.result.diffuse_derate,
            row.result.reduced_reflected,
            row.result.reflected_derate,
            row.result.dc_derate,
        ));
    }
    out
}
