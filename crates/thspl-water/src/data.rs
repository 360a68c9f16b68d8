//! On-disk coefficient table schema.
//!
//! The table is produced by an external fitting pipeline and is only read here.
//! Deserialization checks field types; `TableFile::validate` checks the
//! header-level invariants. Per-patch and per-curve shape checks happen when
//! the store and saturation curves are built from the definitions.

use crate::error::{WaterError, WaterResult};
use crate::property::{Encoding, Property};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Only table format understood by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Packaged water/steam table.
pub const BUNDLED_TABLE: &str = include_str!("../data/water_hp.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableFile {
    pub format_version: u32,
    pub fluid: String,
    #[serde(default)]
    pub description: String,
    pub domain: DomainDef,
    pub saturation: SaturationDef,
    pub patches: Vec<PatchDef>,
}

/// Declared enthalpy-pressure rectangle and the two special pressures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainDef {
    /// [J/kg]
    pub h_min: f64,
    pub h_max: f64,
    /// [Pa]
    pub p_min: f64,
    pub p_max: f64,
    pub p_crit: f64,
    /// Lowest pressure at which the saturation curves are fitted.
    pub p_sat_min: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaturationDef {
    pub breakpoints: Vec<f64>,
    pub boiling: CurveDef,
    pub dew: CurveDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurveDef {
    pub degree: usize,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchDef {
    pub name: String,
    pub region: Region,
    pub enthalpy_axis: AxisDef,
    pub degree: [usize; 2],
    pub x_breakpoints: Vec<f64>,
    pub p_breakpoints: Vec<f64>,
    pub properties: Vec<SurfaceDef>,
}

/// Meaning of a patch's first coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisDef {
    /// Raw specific enthalpy.
    Enthalpy,
    /// `(h - lower(p)) / (upper(p) - lower(p))`.
    Reduced { lower: AxisBound, upper: AxisBound },
}

/// Enthalpy bound of a reduced axis, as a function of pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisBound {
    HMin,
    Boiling,
    Dew,
    HMax,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceDef {
    pub property: Property,
    pub encoding: Encoding,
    pub coefficients: Vec<f64>,
}

impl TableFile {
    pub fn from_json_str(raw: &str) -> WaterResult<Self> {
        let table: TableFile = serde_json::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    /// Header-level checks: version, domain ordering, presence of patches.
    pub fn validate(&self) -> WaterResult<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(malformed(format!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        let d = &self.domain;
        let values = [d.h_min, d.h_max, d.p_min, d.p_max, d.p_crit, d.p_sat_min];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(malformed("domain bounds must be finite".to_string()));
        }
        if d.h_min >= d.h_max {
            return Err(malformed(format!(
                "h_min {} must be below h_max {}",
                d.h_min, d.h_max
            )));
        }
        if d.p_min > d.p_sat_min || d.p_sat_min >= d.p_crit || d.p_crit >= d.p_max {
            return Err(malformed(format!(
                "pressures must satisfy p_min <= p_sat_min < p_crit < p_max, got {} {} {} {}",
                d.p_min, d.p_sat_min, d.p_crit, d.p_max
            )));
        }
        if self.patches.is_empty() {
            return Err(malformed("table has no patches".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn malformed(what: String) -> WaterError {
    WaterError::MalformedTable { what }
}

/// SHA-256 of the raw table bytes, lowercase hex.
pub fn fingerprint(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    format!("{:x}", hasher.finalize())
}
