//! Phase regions of the enthalpy-pressure plane.

use crate::error::WaterResult;
use crate::saturation::SaturationCurves;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four regions that partition the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    CompressedLiquid,
    TwoPhase,
    SuperHeated,
    SuperCritical,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::CompressedLiquid,
        Region::TwoPhase,
        Region::SuperHeated,
        Region::SuperCritical,
    ];

    /// Dense index, matching the order of `ALL`.
    pub fn index(self) -> usize {
        match self {
            Region::CompressedLiquid => 0,
            Region::TwoPhase => 1,
            Region::SuperHeated => 2,
            Region::SuperCritical => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::CompressedLiquid => "compressed_liquid",
            Region::TwoPhase => "two_phase",
            Region::SuperHeated => "super_heated",
            Region::SuperCritical => "super_critical",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Assigns query points to regions from the critical pressure, the lower
/// saturation bound, and the saturation curves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionClassifier {
    p_crit: f64,
    saturation_floor: f64,
}

impl RegionClassifier {
    pub fn new(p_crit: f64, saturation_floor: f64) -> Self {
        Self {
            p_crit,
            saturation_floor,
        }
    }

    pub fn p_crit(&self) -> f64 {
        self.p_crit
    }

    /// Pressure below which everything is super-heated.
    pub fn saturation_floor(&self) -> f64 {
        self.saturation_floor
    }

    /// Region of `(h, p)`.
    ///
    /// The point is assumed admitted to the domain already. The only failure is
    /// a saturation inversion reported by `saturation`.
    pub fn classify(&self, h: f64, p: f64, saturation: &SaturationCurves) -> WaterResult<Region> {
        if p >= self.p_crit {
            return Ok(Region::SuperCritical);
        }
        if p < self.saturation_floor {
            return Ok(Region::SuperHeated);
        }
        let (boiling, dew) = saturation.bounds(p)?;
        Ok(if h < boiling {
            Region::CompressedLiquid
        } else if h <= dew {
            Region::TwoPhase
        } else {
            Region::SuperHeated
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_follows_all() {
        for (i, r) in Region::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
        }
    }

    #[test]
    fn names_match_serde() {
        for r in Region::ALL {
            let json = serde_json::to_string(&r).unwrap();
            assert_eq!(json, format!("\"{}\"", r.name()));
            assert_eq!(r.to_string(), r.name());
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::data::{BUNDLED_TABLE, TableFile};
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn bundled() -> &'static (RegionClassifier, SaturationCurves) {
        static CELL: OnceLock<(RegionClassifier, SaturationCurves)> = OnceLock::new();
        CELL.get_or_init(|| {
            let table = TableFile::from_json_str(BUNDLED_TABLE).unwrap();
            let d = table.domain;
            let sat = SaturationCurves::from_def(&table.saturation, d.p_sat_min, d.p_crit).unwrap();
            (RegionClassifier::new(d.p_crit, d.p_sat_min), sat)
        })
    }

    proptest! {
        #[test]
        fn at_or_above_critical_is_super_critical(h in 1e3..4.5e6_f64, p in 22.064e6..1e8_f64) {
            let (classifier, sat) = bundled();
            prop_assert_eq!(classifier.classify(h, p, sat).unwrap(), Region::SuperCritical);
        }

        #[test]
        fn sub_critical_regions_follow_saturation(
            h in 1e3..4.5e6_f64,
            log_p in 1041.0_f64.ln()..22.064e6_f64.ln(),
        ) {
            let (classifier, sat) = bundled();
            let p = log_p.exp().clamp(1041.0, 22.063e6);
            let (boiling, dew) = sat.bounds(p).unwrap();
            prop_assert!(boiling <= dew);
            let expected = if h < boiling {
                Region::CompressedLiquid
            } else if h <= dew {
                Region::TwoPhase
            } else {
                Region::SuperHeated
            };
            prop_assert_eq!(classifier.classify(h, p, sat).unwrap(), expected);
        }
    }
}
