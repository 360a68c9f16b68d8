// thspl-core/src/units.rs

use uom::si::f64::{
    AvailableEnergy as UomAvailableEnergy, DynamicViscosity as UomDynamicViscosity,
    MassDensity as UomMassDensity, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type DynVisc = UomDynamicViscosity;
pub type Pressure = UomPressure;
pub type SpecEnthalpy = UomAvailableEnergy;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn pa_s(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::pascal_second;
    DynVisc::new::<pascal_second>(v)
}

#[inline]
pub fn j_per_kg(v: f64) -> SpecEnthalpy {
    use uom::si::available_energy::joule_per_kilogram;
    SpecEnthalpy::new::<joule_per_kilogram>(v)
}

pub mod constants {
    /// Critical pressure of water [Pa].
    pub const PCRIT_PA: f64 = 22.064e6;
    /// Triple-point pressure of water [Pa].
    pub const PTRIPLE_PA: f64 = 611.657;
}
