//! Patch coefficient store: the per-region surfaces, validated once at load.

use crate::data::{AxisBound, AxisDef, DomainDef, PatchDef, malformed};
use crate::error::{WaterError, WaterResult};
use crate::property::{Encoding, Property};
use crate::region::Region;
use thspl_spline::{Breakpoints, SplineError, TensorPolynomial};
use tracing::debug;

/// Relative tolerance when matching patch edges against each other and the domain.
const EDGE_TOL: f64 = 1e-9;

/// One property surface of a patch.
#[derive(Clone, Debug)]
pub struct PropertySurface {
    pub property: Property,
    pub encoding: Encoding,
    pub surface: TensorPolynomial,
}

/// A rectangular piece of one region with its own breakpoint grid.
#[derive(Clone, Debug)]
pub struct Patch {
    name: String,
    region: Region,
    axis: AxisDef,
    /// Indexed by `Property::ALL` order.
    surfaces: Vec<PropertySurface>,
}

impl Patch {
    fn from_def(def: PatchDef) -> WaterResult<Self> {
        let PatchDef {
            name,
            region,
            enthalpy_axis,
            degree,
            x_breakpoints,
            p_breakpoints,
            properties,
        } = def;
        let with_name = |source: SplineError| WaterError::Patch {
            patch: name.clone(),
            source,
        };

        let x = Breakpoints::new(x_breakpoints, "patch enthalpy axis").map_err(with_name)?;
        let y = Breakpoints::new(p_breakpoints, "patch pressure axis").map_err(with_name)?;

        let mut slots: Vec<Option<PropertySurface>> = vec![None; Property::ALL.len()];
        for surface in properties {
            let slot = surface.property.index();
            if slots[slot].is_some() {
                return Err(malformed(format!(
                    "patch '{name}' defines {} twice",
                    surface.property.name()
                )));
            }
            let poly = TensorPolynomial::new(
                x.clone(),
                y.clone(),
                degree,
                surface.coefficients,
                surface.property.name(),
            )
            .map_err(with_name)?;
            slots[slot] = Some(PropertySurface {
                property: surface.property,
                encoding: surface.encoding,
                surface: poly,
            });
        }
        let mut surfaces = Vec::with_capacity(slots.len());
        for (slot, property) in slots.into_iter().zip(Property::ALL) {
            match slot {
                Some(s) => surfaces.push(s),
                None => {
                    return Err(malformed(format!(
                        "patch '{name}' has no {} surface",
                        property.name()
                    )));
                }
            }
        }

        Ok(Self {
            name,
            region,
            axis: enthalpy_axis,
            surfaces,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn axis(&self) -> AxisDef {
        self.axis
    }

    pub fn surfaces(&self) -> &[PropertySurface] {
        &self.surfaces
    }

    pub fn surface(&self, property: Property) -> &PropertySurface {
        &self.surfaces[property.index()]
    }

    /// First-coordinate range (enthalpy or reduced enthalpy).
    pub fn x_range(&self) -> (f64, f64) {
        let bp = self.surfaces[0].surface.x_breakpoints();
        (bp.first(), bp.last())
    }

    pub fn pressure_range(&self) -> (f64, f64) {
        let bp = self.surfaces[0].surface.y_breakpoints();
        (bp.first(), bp.last())
    }

    /// `(x cells, p cells)`.
    pub fn shape(&self) -> (usize, usize) {
        self.surfaces[0].surface.shape()
    }

    pub fn contains_pressure(&self, p: f64) -> bool {
        self.surfaces[0].surface.y_breakpoints().contains(p)
    }

    /// Decoded property value at first coordinate `x`.
    fn value_at(&self, property: Property, x: f64, p: f64) -> WaterResult<f64> {
        let surface = self.surface(property);
        let g = surface.surface.evaluate(x, p, 0, 0)?;
        Ok(surface.encoding.decode(&[g], 0))
    }
}

/// Immutable, validated collection of patches grouped by region.
#[derive(Clone, Debug)]
pub struct PatchStore {
    patches: Vec<Patch>,
    /// Patch indices per region, sorted by starting pressure.
    by_region: [Vec<usize>; 4],
}

impl PatchStore {
    /// Build every patch and check that each region is covered.
    pub fn from_defs(defs: Vec<PatchDef>, domain: &DomainDef) -> WaterResult<Self> {
        let patches = defs
            .into_iter()
            .map(Patch::from_def)
            .collect::<WaterResult<Vec<_>>>()?;

        let mut by_region: [Vec<usize>; 4] = Default::default();
        for (i, patch) in patches.iter().enumerate() {
            by_region[patch.region.index()].push(i);
        }
        for indices in &mut by_region {
            indices.sort_by(|&a, &b| {
                patches[a]
                    .pressure_range()
                    .0
                    .total_cmp(&patches[b].pressure_range().0)
            });
        }

        let store = Self { patches, by_region };
        store.validate(domain)?;
        for patch in &store.patches {
            let (nx, np) = patch.shape();
            debug!(
                patch = patch.name(),
                region = %patch.region(),
                cells_x = nx,
                cells_p = np,
                "patch loaded"
            );
        }
        Ok(store)
    }

    fn validate(&self, domain: &DomainDef) -> WaterResult<()> {
        for patch in &self.patches {
            validate_axis(patch, domain)?;
        }
        for region in Region::ALL {
            let (lo, hi) = required_pressure_range(region, domain);
            self.validate_coverage(region, lo, hi)?;
        }
        self.validate_seams()
    }

    /// Patches meeting at a saturation curve must agree in value along it.
    fn validate_seams(&self) -> WaterResult<()> {
        for below in &self.patches {
            let AxisDef::Reduced { upper: seam, .. } = below.axis else {
                continue;
            };
            if !matches!(seam, AxisBound::Boiling | AxisBound::Dew) {
                continue;
            }
            let above_patches = self.patches.iter().filter(|above| {
                above.region != below.region
                    && matches!(above.axis, AxisDef::Reduced { lower, .. } if lower == seam)
            });
            for above in above_patches {
                for p in seam_pressures(below, above) {
                    for property in Property::ALL {
                        let a = below.value_at(property, below.x_range().1, p)?;
                        let b = above.value_at(property, above.x_range().0, p)?;
                        if !close(a, b) {
                            return Err(malformed(format!(
                                "patches '{}' and '{}' disagree on {} along the {seam:?} curve \
                                 at {p} Pa ({a} vs {b})",
                                below.name,
                                above.name,
                                property.name()
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_coverage(&self, region: Region, lo: f64, hi: f64) -> WaterResult<()> {
        let patches: Vec<&Patch> = self.lookup(region).collect();
        let (Some(first), Some(last)) = (patches.first(), patches.last()) else {
            return Err(malformed(format!("no patch for region {region}")));
        };
        if !close(first.pressure_range().0, lo) {
            return Err(malformed(format!(
                "region {region} starts at {} Pa, expected {lo} Pa",
                first.pressure_range().0
            )));
        }
        for pair in patches.windows(2) {
            let (end, start) = (pair[0].pressure_range().1, pair[1].pressure_range().0);
            if !close(end, start) {
                return Err(malformed(format!(
                    "patches '{}' and '{}' of region {region} do not abut ({end} Pa vs {start} Pa)",
                    pair[0].name(),
                    pair[1].name()
                )));
            }
        }
        if !close(last.pressure_range().1, hi) {
            return Err(malformed(format!(
                "region {region} ends at {} Pa, expected {hi} Pa",
                last.pressure_range().1
            )));
        }
        Ok(())
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Patches of `region`, lowest pressure first.
    pub fn lookup(&self, region: Region) -> impl Iterator<Item = &Patch> + '_ {
        self.by_region[region.index()]
            .iter()
            .map(move |&i| &self.patches[i])
    }

    /// The patch of `region` whose pressure range holds `p`.
    ///
    /// On a shared edge the lower patch wins; both agree there.
    pub fn resolve(&self, region: Region, p: f64) -> WaterResult<&Patch> {
        if let Some(patch) = self.lookup(region).find(|patch| patch.contains_pressure(p)) {
            return Ok(patch);
        }
        let lower = self
            .lookup(region)
            .next()
            .map_or(f64::NAN, |patch| patch.pressure_range().0);
        let upper = self
            .lookup(region)
            .last()
            .map_or(f64::NAN, |patch| patch.pressure_range().1);
        Err(WaterError::OutOfDomain {
            what: "pressure",
            value: p,
            lower,
            upper,
        })
    }
}

fn close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= EDGE_TOL * a.abs().max(b.abs())
}

/// Breakpoints of both patches inside their shared pressure range, plus the
/// midpoints between them.
fn seam_pressures(a: &Patch, b: &Patch) -> Vec<f64> {
    let lo = a.pressure_range().0.max(b.pressure_range().0);
    let hi = a.pressure_range().1.min(b.pressure_range().1);
    let mut knots: Vec<f64> = [a, b]
        .into_iter()
        .flat_map(|patch| patch.surfaces[0].surface.y_breakpoints().as_slice())
        .copied()
        .filter(|&p| p >= lo && p <= hi)
        .collect();
    knots.sort_by(f64::total_cmp);
    knots.dedup();
    let midpoints: Vec<f64> = knots.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    knots.extend(midpoints);
    knots
}

fn required_pressure_range(region: Region, domain: &DomainDef) -> (f64, f64) {
    match region {
        Region::CompressedLiquid | Region::TwoPhase => (domain.p_sat_min, domain.p_crit),
        Region::SuperHeated => (domain.p_min, domain.p_crit),
        Region::SuperCritical => (domain.p_crit, domain.p_max),
    }
}

fn validate_axis(patch: &Patch, domain: &DomainDef) -> WaterResult<()> {
    let (x_lo, x_hi) = patch.x_range();
    let (want_lo, want_hi) = match patch.axis {
        AxisDef::Enthalpy => (domain.h_min, domain.h_max),
        AxisDef::Reduced { lower, upper } => {
            if lower >= upper {
                return Err(malformed(format!(
                    "patch '{}' has reduced bounds out of order ({lower:?} >= {upper:?})",
                    patch.name
                )));
            }
            let uses_saturation = [lower, upper]
                .iter()
                .any(|b| matches!(b, AxisBound::Boiling | AxisBound::Dew));
            if uses_saturation && patch.pressure_range().0 < domain.p_sat_min {
                return Err(malformed(format!(
                    "patch '{}' reduces against the saturation curves below their fitted range",
                    patch.name
                )));
            }
            (0.0, 1.0)
        }
    };
    if !close(x_lo, want_lo) || !close(x_hi, want_hi) {
        return Err(malformed(format!(
            "patch '{}' spans [{x_lo}, {x_hi}] on its enthalpy axis, expected [{want_lo}, {want_hi}]",
            patch.name
        )));
    }
    Ok(())
}
