//! Inter-row self-shading model for photovoltaic arrays.
//!
//! This crate computes, for a single simulation timestep, how much a PV
//! array's DC power output and incident irradiance are reduced by
//! self-shading between adjacent rows of modules. It implements the
//! empirical model published in C. Deline et al., "A simplified model of
//! uniform shading in large photovoltaic arrays" (Solar Energy, 2013),
//! with row-shadow geometry from Appelbaum and Bany, "Shadow effect of
//! adjacent solar collectors in large scale systems" (Solar Energy, 1979).
//!
//! # Key Components
//!
//! - **ArrayLayout**: validated array geometry and wiring configuration
//! - **SelfShadeModel**: per-timestep evaluation of shading derates
//! - **DerateResult**: reduced irradiances, derate ratios, and the DC
//!   power derate factor for one timestep
//!
//! Solar position, plane-of-array irradiance decomposition, and weather
//! input are the caller's responsibility; this crate consumes their
//! outputs per timestep and is free of I/O and shared mutable state, so
//! timesteps can be evaluated in parallel.
//!
//! # Example
//!
//! ```rust
//! use rowshade::{ArrayLayout, SelfShadeModel, TimestepInputs};
//!
//! let model = SelfShadeModel::new(ArrayLayout::default()).unwrap();
//! let inputs = TimestepInputs {
//!     tilt_deg: 30.0,
//!     azimuth_deg: 180.0,
//!     solar_zenith_deg: 40.0,
//!     solar_azimuth_deg: 180.0,
//!     beam_normal: 800.0,
//!     poa_beam: 700.0,
//!     poa_diffuse: 120.0,
//!     albedo: 0.2,
//!     tracking: false,
//!     tracked_shade_fraction: 0.0,
//! };
//!
//! let result = model.evaluate(&inputs).unwrap();
//! assert!(result.dc_derate >= 0.0 && result.dc_derate <= 1.0);
//! ```

pub mod error;
pub mod math;
pub mod sim;

pub use error::{ShadeError, ShadeResult};
pub use sim::engine::{DerateResult, SelfShadeModel, TimestepInputs};
pub use sim::layout::{ArrayLayout, MaskAngleMethod, ModuleOrientation, StringOrientation};
