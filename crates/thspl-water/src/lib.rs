//! thspl-water: water and steam properties from fitted splines over
//! specific enthalpy and pressure.
//!
//! The engine is table-driven. A packaged JSON table carries the saturation
//! curves and, per phase region, bicubic patches for density, temperature and
//! fluidity (reciprocal dynamic viscosity in 1/(mPa·s)).
//!
//! ```no_run
//! use thspl_water::WaterEngine;
//!
//! let engine = WaterEngine::bundled()?;
//! let states = engine.properties(&[1e3, 4.5e6], &[611.657, 1e8])?.into_values()?;
//! let h_liq = engine.boiling_enthalpy(1e6)?.value;
//! let slopes = engine.temperature(&[1e5, 1e6, 3e6], 23e6, 1)?;
//! # Ok::<(), thspl_water::WaterError>(())
//! ```

pub mod batch;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod property;
pub mod region;
pub mod saturation;
pub mod store;

pub use batch::{Batch, Samples};
pub use config::{DomainPolicy, EngineConfig};
pub use engine::WaterEngine;
pub use error::{WaterError, WaterResult};
pub use property::{
    Encoding, Evaluated, MAX_DERIVATIVE_ORDER, Property, PropertyVector, TemperatureVector,
};
pub use region::{Region, RegionClassifier};
pub use saturation::{Curve, SaturationCurves};
pub use store::{Patch, PatchStore};
