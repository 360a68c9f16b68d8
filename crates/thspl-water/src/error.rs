//! Property engine errors.

use thiserror::Error;
use thspl_core::CoreError;
use thspl_spline::SplineError;

/// Result type for engine operations.
pub type WaterResult<T> = Result<T, WaterError>;

#[derive(Error, Debug)]
pub enum WaterError {
    /// Non-finite input or intermediate value.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Spline error: {0}")]
    Spline(#[from] SplineError),

    /// A patch failed structural validation.
    #[error("Patch '{patch}': {source}")]
    Patch { patch: String, source: SplineError },

    /// Coefficient data is missing pieces or inconsistent.
    #[error("Malformed property table: {what}")]
    MalformedTable { what: String },

    /// Boiling enthalpy above dew enthalpy: the table cannot be trusted.
    #[error(
        "Saturation curves inverted at p = {pressure} Pa: boiling {boiling} J/kg > dew {dew} J/kg"
    )]
    SaturationInversion {
        pressure: f64,
        boiling: f64,
        dew: f64,
    },

    /// Query outside the declared domain or a region's fitted range.
    #[error("{what} = {value} outside [{lower}, {upper}]")]
    OutOfDomain {
        what: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Derivative order above `MAX_DERIVATIVE_ORDER`.
    #[error("Derivative order {order} exceeds the supported maximum {max}")]
    DerivativeOrder { order: usize, max: usize },

    /// Batch arguments of different lengths.
    #[error("Length mismatch: {enthalpies} enthalpies vs {pressures} pressures")]
    LengthMismatch { enthalpies: usize, pressures: usize },

    /// A failed batch element, tagged with its position.
    #[error("Element {index}: {source}")]
    Element {
        index: usize,
        source: Box<WaterError>,
    },

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl WaterError {
    /// True for query-time domain violations, as opposed to data or usage errors.
    pub fn is_out_of_domain(&self) -> bool {
        match self {
            WaterError::OutOfDomain { .. } => true,
            WaterError::Element { source, .. } => source.is_out_of_domain(),
            _ => false,
        }
    }
}
