use thiserror::Error;

/// Errors produced by the self-shading model.
#[derive(Error, Debug)]
pub enum ShadeError {
    /// A structurally invalid array configuration, reported once at
    /// construction rather than per timestep.
    #[error("invalid array layout: {0}")]
    InvalidLayout(String),

    /// The Romberg integrator ran out of refinement levels without
    /// meeting the requested relative tolerance.
    #[error(
        "quadrature failed to converge after {levels} refinements \
         (estimate {estimate}, error {error})"
    )]
    QuadratureNonConvergence {
        levels: usize,
        estimate: f64,
        error: f64,
    },

    /// A NaN or infinity surfaced mid-computation.
    #[error("non-finite {quantity} computed: {value}")]
    NonFinite { quantity: &'static str, value: f64 },
}

pub type ShadeResult<T> = Result<T, ShadeError>;
