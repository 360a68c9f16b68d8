//! The water/steam property engine.
//!
//! A `WaterEngine` owns the saturation curves, the region classifier and the
//! patch store. It is built once from a coefficient table and is read-only
//! afterwards, so one instance can serve any number of threads.
//!
//! Query path for one point:
//!
//! 1. admit `h` and `p` to the declared domain (strict or clamp)
//! 2. classify the region against the saturation curves
//! 3. resolve the region's patch holding `p`
//! 4. map `h` to the patch's first coordinate (raw or reduced enthalpy)
//! 5. evaluate each property surface and decode its encoding

use crate::batch::{Batch, Samples, broadcast_len, dispatch};
use crate::config::{DEFAULT_PARALLEL_MIN_BATCH, DomainPolicy, EngineConfig};
use crate::data::{AxisBound, AxisDef, BUNDLED_TABLE, DomainDef, TableFile, fingerprint};
use crate::error::{WaterError, WaterResult};
use crate::property::{
    Evaluated, MAX_DERIVATIVE_ORDER, Property, PropertyVector, TemperatureVector,
};
use crate::region::{Region, RegionClassifier};
use crate::saturation::{Curve, SaturationCurves};
use crate::store::{Patch, PatchStore};
use std::io::Read;
use std::path::Path;
use thspl_core::{clamp_flagged, ensure_finite};
use thspl_core::timing::{AccumulatingTimer, Timer, query_timing};
use thspl_spline::breakpoints::EDGE_SLACK;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct WaterEngine {
    fluid: String,
    fingerprint: String,
    domain: DomainDef,
    saturation: SaturationCurves,
    classifier: RegionClassifier,
    store: PatchStore,
    policy: DomainPolicy,
    parallel_min_batch: usize,
}

/// A point mapped onto its patch.
struct Located<'a> {
    patch: &'a Patch,
    region: Region,
    /// Patch first coordinate.
    x: f64,
    p: f64,
    /// `dx/dh` at fixed pressure.
    scale: f64,
    clamped: bool,
}

impl WaterEngine {
    /// Engine over the packaged water table, strict policy.
    pub fn bundled() -> WaterResult<Self> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    pub fn from_json_str(raw: &str) -> WaterResult<Self> {
        let timer = Timer::start();
        let table = TableFile::from_json_str(raw)?;
        let engine = Self::build(table, fingerprint(raw.as_bytes()))?;
        timer.stop_into(&query_timing::TABLE_LOADS);
        Ok(engine)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> WaterResult<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_json_str(&raw)
    }

    pub fn from_path(path: &Path) -> WaterResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Build from a configuration: table source, policy, floor and batch threshold.
    pub fn from_config(config: &EngineConfig) -> WaterResult<Self> {
        config.validate()?;
        let engine = match &config.table_path {
            Some(path) => Self::from_path(path)?,
            None => Self::bundled()?,
        };
        let engine = engine
            .with_policy(config.domain_policy)
            .with_parallel_min_batch(config.parallel_min_batch);
        match config.saturation_floor_pa {
            Some(floor) => engine.with_saturation_floor(floor),
            None => Ok(engine),
        }
    }

    fn build(table: TableFile, fingerprint: String) -> WaterResult<Self> {
        let TableFile {
            format_version,
            fluid,
            domain,
            saturation,
            patches,
            ..
        } = table;
        let saturation = SaturationCurves::from_def(&saturation, domain.p_sat_min, domain.p_crit)?;
        let store = PatchStore::from_defs(patches, &domain)?;
        info!(
            fluid = %fluid,
            patches = store.patches().len(),
            format_version,
            fingerprint = %fingerprint,
            "coefficient table loaded"
        );
        Ok(Self {
            fluid,
            fingerprint,
            classifier: RegionClassifier::new(domain.p_crit, domain.p_sat_min),
            domain,
            saturation,
            store,
            policy: DomainPolicy::default(),
            parallel_min_batch: DEFAULT_PARALLEL_MIN_BATCH,
        })
    }

    pub fn with_policy(mut self, policy: DomainPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_parallel_min_batch(mut self, min_batch: usize) -> Self {
        self.parallel_min_batch = min_batch;
        self
    }

    /// Move the pressure below which every point is super-heated.
    ///
    /// The floor must lie within the saturation curves' fitted range and below
    /// the critical pressure.
    pub fn with_saturation_floor(mut self, floor: f64) -> WaterResult<Self> {
        let (lo, hi) = self.saturation.domain();
        if !floor.is_finite() || floor < lo || floor >= hi {
            return Err(WaterError::InvalidConfig {
                what: format!("saturation floor {floor} Pa outside [{lo}, {hi}) Pa"),
            });
        }
        if floor != self.classifier.saturation_floor() {
            warn!(
                floor_pa = floor,
                table_floor_pa = lo,
                "saturation floor overridden"
            );
        }
        self.classifier = RegionClassifier::new(self.domain.p_crit, floor);
        Ok(self)
    }

    pub fn fluid(&self) -> &str {
        &self.fluid
    }

    /// SHA-256 of the table source, lowercase hex.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn domain(&self) -> &DomainDef {
        &self.domain
    }

    pub fn policy(&self) -> DomainPolicy {
        self.policy
    }

    pub fn parallel_min_batch(&self) -> usize {
        self.parallel_min_batch
    }

    pub fn store(&self) -> &PatchStore {
        &self.store
    }

    pub fn saturation(&self) -> &SaturationCurves {
        &self.saturation
    }

    pub fn saturation_floor(&self) -> f64 {
        self.classifier.saturation_floor()
    }

    // ---- batch queries ----

    /// Density, temperature and fluidity at every `(h, p)` pair.
    ///
    /// Either argument may be a scalar, which is broadcast. Mismatched slice
    /// lengths fail before any point is evaluated; otherwise each element
    /// succeeds or fails on its own.
    pub fn properties<'a>(
        &self,
        enthalpies: impl Into<Samples<'a>>,
        pressures: impl Into<Samples<'a>>,
    ) -> WaterResult<Batch<PropertyVector>> {
        self.run(
            enthalpies.into(),
            pressures.into(),
            &query_timing::PROPERTIES_CALLS,
            |h, p| self.vector_at(h, p, 0),
        )
    }

    /// Like `properties`, with each property slot holding its `dx`-th enthalpy
    /// derivative at fixed pressure. Enthalpy and pressure are still echoed.
    pub fn derivatives<'a>(
        &self,
        enthalpies: impl Into<Samples<'a>>,
        pressures: impl Into<Samples<'a>>,
        dx: usize,
    ) -> WaterResult<Batch<PropertyVector>> {
        check_order(dx)?;
        self.run(
            enthalpies.into(),
            pressures.into(),
            &query_timing::DERIVATIVES_CALLS,
            |h, p| self.vector_at(h, p, dx),
        )
    }

    /// Temperature and its `dx`-th enthalpy derivative at fixed pressure.
    ///
    /// Orders above `MAX_DERIVATIVE_ORDER` fail the whole call.
    pub fn temperature<'a>(
        &self,
        enthalpies: impl Into<Samples<'a>>,
        pressures: impl Into<Samples<'a>>,
        dx: usize,
    ) -> WaterResult<Batch<TemperatureVector>> {
        check_order(dx)?;
        self.run(
            enthalpies.into(),
            pressures.into(),
            &query_timing::TEMPERATURE_CALLS,
            |h, p| self.temperature_at(h, p, dx),
        )
    }

    fn run<T, F>(
        &self,
        enthalpies: Samples<'_>,
        pressures: Samples<'_>,
        timer_acc: &AccumulatingTimer,
        point: F,
    ) -> WaterResult<Batch<T>>
    where
        T: Send,
        F: Fn(f64, f64) -> WaterResult<Evaluated<T>> + Sync + Send,
    {
        let timer = Timer::start();
        let len = broadcast_len(&enthalpies, &pressures)?;
        let parallel = len >= self.parallel_min_batch;
        let entries = dispatch(len, parallel, |i| point(enthalpies.get(i), pressures.get(i)));
        timer.stop_into(timer_acc);
        Ok(Batch::new(entries))
    }

    // ---- single points ----

    /// Property vector at one point.
    pub fn state(&self, h: f64, p: f64) -> WaterResult<Evaluated<PropertyVector>> {
        self.vector_at(h, p, 0)
    }

    /// Region of one point, after domain admission.
    pub fn region(&self, h: f64, p: f64) -> WaterResult<Evaluated<Region>> {
        let (h, ch) = self.admit(h, self.domain.h_min, self.domain.h_max, "enthalpy")?;
        let (p, cp) = self.admit(p, self.domain.p_min, self.domain.p_max, "pressure")?;
        Ok(Evaluated {
            value: self.classifier.classify(h, p, &self.saturation)?,
            clamped: ch || cp,
        })
    }

    pub fn boiling_enthalpy(&self, p: f64) -> WaterResult<Evaluated<f64>> {
        self.saturation_enthalpy(Curve::Boiling, p, 0)
    }

    pub fn dew_enthalpy(&self, p: f64) -> WaterResult<Evaluated<f64>> {
        self.saturation_enthalpy(Curve::Dew, p, 0)
    }

    /// `order`-th pressure derivative of a saturation enthalpy.
    ///
    /// Admitted over the curves' fitted range, not the configured floor.
    pub fn saturation_enthalpy(
        &self,
        curve: Curve,
        p: f64,
        order: usize,
    ) -> WaterResult<Evaluated<f64>> {
        let timer = Timer::start();
        let (lo, hi) = self.saturation.domain();
        let (p, clamped) = self.admit(p, lo, hi, "saturation pressure")?;
        let value = self.saturation.evaluate(curve, p, order)?;
        timer.stop_into(&query_timing::SATURATION_CALLS);
        Ok(Evaluated { value, clamped })
    }

    fn vector_at(&self, h: f64, p: f64, order: usize) -> WaterResult<Evaluated<PropertyVector>> {
        let loc = self.locate(h, p)?;
        Ok(Evaluated {
            value: PropertyVector {
                h,
                p,
                density: self.evaluate(&loc, Property::Density, order)?.1,
                temperature: self.evaluate(&loc, Property::Temperature, order)?.1,
                fluidity: self.evaluate(&loc, Property::Fluidity, order)?.1,
                region: loc.region,
            },
            clamped: loc.clamped,
        })
    }

    fn temperature_at(
        &self,
        h: f64,
        p: f64,
        order: usize,
    ) -> WaterResult<Evaluated<TemperatureVector>> {
        let loc = self.locate(h, p)?;
        let (temperature, derivative) = self.evaluate(&loc, Property::Temperature, order)?;
        Ok(Evaluated {
            value: TemperatureVector {
                h,
                p,
                order,
                temperature,
                derivative,
                region: loc.region,
            },
            clamped: loc.clamped,
        })
    }

    /// `(value, order-th h-derivative)` of one property at a located point.
    fn evaluate(
        &self,
        loc: &Located<'_>,
        property: Property,
        order: usize,
    ) -> WaterResult<(f64, f64)> {
        let surface = loc.patch.surface(property);
        let mut g = surface.surface.x_derivatives(loc.x, loc.p, order)?;
        let mut factor = 1.0;
        for gk in g.iter_mut().skip(1) {
            factor *= loc.scale;
            *gk *= factor;
        }
        let value = surface.encoding.decode(&g, 0);
        let derivative = surface.encoding.decode(&g, order);
        if !value.is_finite() || !derivative.is_finite() {
            return Err(WaterError::NonPhysical {
                what: property.name(),
            });
        }
        Ok((value, derivative))
    }

    fn locate(&self, h: f64, p: f64) -> WaterResult<Located<'_>> {
        let (h, ch) = self.admit(h, self.domain.h_min, self.domain.h_max, "enthalpy")?;
        let (p, cp) = self.admit(p, self.domain.p_min, self.domain.p_max, "pressure")?;
        let region = self.classifier.classify(h, p, &self.saturation)?;
        let patch = self.store.resolve(region, p)?;
        let (x, scale, cx) = match patch.axis() {
            AxisDef::Enthalpy => (h, 1.0, false),
            AxisDef::Reduced { lower, upper } => {
                let lower = self.axis_bound(lower, p)?;
                let width = self.axis_bound(upper, p)? - lower;
                if width <= 0.0 {
                    return Err(WaterError::NonPhysical {
                        what: "reduced enthalpy width",
                    });
                }
                let (x, cx) = self.admit((h - lower) / width, 0.0, 1.0, "reduced enthalpy")?;
                (x, 1.0 / width, cx)
            }
        };
        Ok(Located {
            patch,
            region,
            x,
            p,
            scale,
            clamped: ch || cp || cx,
        })
    }

    fn axis_bound(&self, bound: AxisBound, p: f64) -> WaterResult<f64> {
        match bound {
            AxisBound::HMin => Ok(self.domain.h_min),
            AxisBound::HMax => Ok(self.domain.h_max),
            AxisBound::Boiling => self.saturation.boiling(p),
            AxisBound::Dew => self.saturation.dew(p),
        }
    }

    /// Apply the domain policy to one coordinate.
    ///
    /// Values within `EDGE_SLACK` of the range are snapped in and not flagged.
    fn admit(
        &self,
        value: f64,
        lower: f64,
        upper: f64,
        what: &'static str,
    ) -> WaterResult<(f64, bool)> {
        ensure_finite(value, what)?;
        let slack = EDGE_SLACK * (upper - lower);
        if value >= lower - slack && value <= upper + slack {
            return Ok((value.clamp(lower, upper), false));
        }
        match self.policy {
            DomainPolicy::Strict => Err(WaterError::OutOfDomain {
                what,
                value,
                lower,
                upper,
            }),
            DomainPolicy::Clamp => Ok(clamp_flagged(value, lower, upper)),
        }
    }
}

fn check_order(order: usize) -> WaterResult<()> {
    if order > MAX_DERIVATIVE_ORDER {
        return Err(WaterError::DerivativeOrder {
            order,
            max: MAX_DERIVATIVE_ORDER,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> WaterEngine {
        WaterEngine::bundled().unwrap()
    }

    #[test]
    fn bundled_engine_reports_table_identity() {
        let engine = engine();
        assert_eq!(engine.fluid(), "water");
        assert_eq!(engine.fingerprint(), fingerprint(BUNDLED_TABLE.as_bytes()));
        assert_eq!(engine.saturation_floor(), 1041.0);
        assert_eq!(engine.policy(), DomainPolicy::Strict);
    }

    #[test]
    fn liquid_point_is_plausible() {
        let v = engine().state(5e5, 1e6).unwrap();
        assert!(!v.clamped);
        assert_eq!(v.value.region, Region::CompressedLiquid);
        assert!((v.value.density - 944.3).abs() < 5.0);
        assert!((v.value.temperature - 392.1).abs() < 1.0);
    }

    #[test]
    fn zeroth_derivative_equals_value() {
        let engine = engine();
        let state = engine.state(3e6, 1e6).unwrap().value;
        let d0 = engine.derivatives(3e6, 1e6, 0).unwrap().into_values().unwrap();
        assert_eq!(d0[0], state);
        let t = engine.temperature(3e6, 1e6, 0).unwrap().into_values().unwrap();
        assert_eq!(t[0].derivative, t[0].temperature);
        assert_eq!(t[0].temperature, state.temperature);
    }

    #[test]
    fn non_finite_input_is_rejected_under_both_policies() {
        for policy in [DomainPolicy::Strict, DomainPolicy::Clamp] {
            let engine = engine().with_policy(policy);
            assert!(matches!(
                engine.state(f64::NAN, 1e6),
                Err(WaterError::Core(_))
            ));
        }
    }

    #[test]
    fn admit_snaps_within_slack() {
        let engine = engine();
        let (v, clamped) = engine.admit(1.0 + 1e-14, 0.0, 1.0, "x").unwrap();
        assert_eq!(v, 1.0);
        assert!(!clamped);
        assert!(engine.admit(1.01, 0.0, 1.0, "x").is_err());
        let clamp = engine.with_policy(DomainPolicy::Clamp);
        assert_eq!(clamp.admit(1.01, 0.0, 1.0, "x").unwrap(), (1.0, true));
    }

    #[test]
    fn floor_override_is_range_checked() {
        assert!(engine().with_saturation_floor(500.0).is_err());
        assert!(engine().with_saturation_floor(22.064e6).is_err());
        assert!(engine().with_saturation_floor(f64::INFINITY).is_err());
        let engine = engine().with_saturation_floor(5000.0).unwrap();
        assert_eq!(engine.saturation_floor(), 5000.0);
        assert_eq!(engine.region(1e5, 3000.0).unwrap().value, Region::SuperHeated);
    }
}
