//! Property identifiers, encodings and result vectors.

use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::ops::Index;
use thspl_core::units::{
    Density, DynVisc, Pressure, SpecEnthalpy, Temperature, j_per_kg, k, kg_per_m3, pa, pa_s,
};

/// A tabulated property. Every patch carries one surface per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Density [kg/m³].
    Density,
    /// Temperature [K].
    Temperature,
    /// Reciprocal dynamic viscosity [1/(mPa·s)].
    Fluidity,
}

impl Property {
    pub const ALL: [Property; 3] = [Property::Density, Property::Temperature, Property::Fluidity];

    /// Dense index, matching the order of `ALL`.
    pub fn index(self) -> usize {
        self.slot() - 2
    }

    /// Position in a `PropertyVector`.
    pub fn slot(self) -> usize {
        match self {
            Property::Density => 2,
            Property::Temperature => 3,
            Property::Fluidity => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::Density => "density",
            Property::Temperature => "temperature",
            Property::Fluidity => "fluidity",
        }
    }
}

/// Highest enthalpy derivative order the engine evaluates.
///
/// Past it the factorial weights of the power basis overflow `f64` (`171!` does).
pub const MAX_DERIVATIVE_ORDER: usize = 170;

/// How a stored surface maps to its property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// The surface is the property.
    Direct,
    /// The surface is the reciprocal of the property.
    Reciprocal,
}

impl Encoding {
    /// The `order`-th enthalpy derivative of the property, given the surface
    /// derivatives `g[0..]` along the same direction.
    ///
    /// `g` may stop at the surface degree; missing higher terms are zero.
    /// For `F = 1/g`, differentiating `F g = 1` gives
    /// `F^(n) = -(1/g) * sum_{m=1..n} C(n,m) g^(m) F^(n-m)`, and only the last
    /// `g.len() - 1` values of `F` are needed at each step.
    pub fn decode(self, g: &[f64], order: usize) -> f64 {
        match self {
            Encoding::Direct => g.get(order).copied().unwrap_or(0.0),
            Encoding::Reciprocal => {
                let inv = 1.0 / g[0];
                let depth = g.len() - 1;
                // recent[m - 1] = F^(n - m)
                let mut recent = VecDeque::with_capacity(depth + 1);
                recent.push_front(inv);
                let mut f = inv;
                for n in 1..=order {
                    let mut binom = 1.0;
                    let mut sum = 0.0;
                    for (m, fk) in (1..=depth.min(n)).zip(&recent) {
                        binom = binom * (n - m + 1) as f64 / m as f64;
                        sum += binom * g[m] * fk;
                    }
                    f = -sum * inv;
                    recent.push_front(f);
                    recent.truncate(depth);
                }
                f
            }
        }
    }
}

/// A value with a flag telling whether the domain policy clamped its inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluated<T> {
    pub value: T,
    pub clamped: bool,
}

impl<T> Evaluated<T> {
    pub fn exact(value: T) -> Self {
        Self {
            value,
            clamped: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Evaluated<U> {
        Evaluated {
            value: f(self.value),
            clamped: self.clamped,
        }
    }
}

/// Properties at one query point.
///
/// Index layout is a stable contract: `[h, p, density, temperature, fluidity]`.
/// Enthalpy and pressure echo the query as given, even when clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyVector {
    /// Specific enthalpy [J/kg]
    pub h: f64,
    /// Pressure [Pa]
    pub p: f64,
    /// Density [kg/m³]
    pub density: f64,
    /// Temperature [K]
    pub temperature: f64,
    /// Fluidity, the reciprocal of dynamic viscosity [1/(mPa·s)]
    pub fluidity: f64,
    /// Region the point was evaluated in
    pub region: Region,
}

impl PropertyVector {
    pub const LEN: usize = 5;

    pub fn as_array(&self) -> [f64; Self::LEN] {
        [self.h, self.p, self.density, self.temperature, self.fluidity]
    }

    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::Density => self.density,
            Property::Temperature => self.temperature,
            Property::Fluidity => self.fluidity,
        }
    }

    pub fn enthalpy(&self) -> SpecEnthalpy {
        j_per_kg(self.h)
    }

    pub fn pressure(&self) -> Pressure {
        pa(self.p)
    }

    pub fn rho(&self) -> Density {
        kg_per_m3(self.density)
    }

    pub fn t(&self) -> Temperature {
        k(self.temperature)
    }

    /// Dynamic viscosity from the fluidity slot.
    ///
    /// Only meaningful on value vectors, not on derivative vectors.
    pub fn viscosity(&self) -> DynVisc {
        pa_s(1e-3 / self.fluidity)
    }
}

impl fmt::Display for PropertyVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at h = {:.1} J/kg, p = {:.0} Pa: rho = {:.3} kg/m3, T = {:.2} K, fluidity = {:.4} 1/(mPa s)",
            self.region, self.h, self.p, self.density, self.temperature, self.fluidity
        )
    }
}

impl Index<usize> for PropertyVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.h,
            1 => &self.p,
            2 => &self.density,
            3 => &self.temperature,
            4 => &self.fluidity,
            _ => panic!("PropertyVector index {index} out of range (len 5)"),
        }
    }
}

/// Temperature and one of its enthalpy derivatives at a query point.
///
/// Index layout: `[h, p, order, temperature, d^order T / dh^order]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemperatureVector {
    pub h: f64,
    pub p: f64,
    /// Derivative order
    pub order: usize,
    /// Temperature [K]
    pub temperature: f64,
    /// `d^order T / dh^order` at fixed pressure [K·(kg/J)^order]
    pub derivative: f64,
    pub region: Region,
}

impl TemperatureVector {
    pub const LEN: usize = 5;

    pub fn as_array(&self) -> [f64; Self::LEN] {
        [
            self.h,
            self.p,
            self.order as f64,
            self.temperature,
            self.derivative,
        ]
    }
}
