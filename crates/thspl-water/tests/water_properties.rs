//! Property engine tests against the packaged water table.
//!
//! Reference values come from IAPWS-IF97 at the same (h, p). The table is a
//! coarse fit, so tolerances are broad; the checks enforce physical
//! plausibility and the structural guarantees of the engine.

use thspl_core::linspace;
use thspl_core::units::constants::{PCRIT_PA, PTRIPLE_PA};
use thspl_water::{MAX_DERIVATIVE_ORDER, Property, PropertyVector, Region, WaterEngine, WaterError};

fn engine() -> WaterEngine {
    WaterEngine::bundled().unwrap()
}

fn state(engine: &WaterEngine, h: f64, p: f64) -> PropertyVector {
    engine.state(h, p).unwrap().value
}

#[test]
fn domain_corners_give_finite_states() {
    let engine = engine();
    let states = engine
        .properties(&[1e3, 4.5e6], &[611.657, 1e8])
        .unwrap()
        .into_values()
        .unwrap();
    assert_eq!(states.len(), 2);
    for s in &states {
        for v in s.as_array() {
            assert!(v.is_finite(), "{s}");
        }
        assert!(s.density > 0.0 && s.temperature > 0.0 && s.fluidity > 0.0);
    }
    assert_eq!(states[0].region, Region::SuperHeated);
    assert!(states[1].density > 100.0 && states[1].density < 250.0);
    assert!(states[1].temperature > 1200.0 && states[1].temperature < 1400.0);
    assert_eq!(states[1].region, Region::SuperCritical);
}

#[test]
fn stable_index_layout() {
    let engine = engine();
    let s = state(&engine, 5e5, 1e6);
    assert_eq!(s[0], 5e5);
    assert_eq!(s[1], 1e6);
    assert_eq!(s[2], s.density);
    assert_eq!(s[3], s.temperature);
    assert_eq!(s[4], s.fluidity);
}

#[test]
fn saturation_brackets_two_phase_at_1_mpa() {
    let engine = engine();
    let h_liq = engine.boiling_enthalpy(1e6).unwrap().value;
    let h_vap = engine.dew_enthalpy(1e6).unwrap().value;
    // IF97: 762.7 kJ/kg and 2777.1 kJ/kg
    assert!((h_liq - 762.7e3).abs() < 2e3, "h_liq = {h_liq}");
    assert!((h_vap - 2777.1e3).abs() < 5e3, "h_vap = {h_vap}");
    assert!(h_liq < h_vap);

    let mid = 0.5 * (h_liq + h_vap);
    assert_eq!(engine.region(mid, 1e6).unwrap().value, Region::TwoPhase);
    assert_eq!(
        engine.region(h_liq - 1e4, 1e6).unwrap().value,
        Region::CompressedLiquid
    );
    assert_eq!(
        engine.region(h_vap + 1e4, 1e6).unwrap().value,
        Region::SuperHeated
    );
}

#[test]
fn boiling_never_exceeds_dew_below_critical() {
    let engine = engine();
    let floor = engine.saturation_floor();
    let n = 5000;
    for k in 1..n {
        // log-spaced over (floor, PCRIT)
        let p = floor * (PCRIT_PA / floor).powf(k as f64 / n as f64);
        let h_liq = engine.boiling_enthalpy(p).unwrap().value;
        let h_vap = engine.dew_enthalpy(p).unwrap().value;
        assert!(h_liq <= h_vap, "p = {p}: {h_liq} > {h_vap}");
    }
}

#[test]
fn saturation_curves_meet_at_critical_pressure() {
    let engine = engine();
    let h_liq = engine.boiling_enthalpy(PCRIT_PA).unwrap().value;
    let h_vap = engine.dew_enthalpy(PCRIT_PA).unwrap().value;
    assert!((h_liq - h_vap).abs() < 1e-3);
    // critical enthalpy is about 2087.5 kJ/kg
    assert!((h_liq - 2087.5e3).abs() < 5e3);
}

#[test]
fn critical_and_above_is_always_super_critical() {
    let engine = engine();
    for p in [PCRIT_PA, 22.07e6, 30e6, 1e8] {
        for h in linspace(1e3, 4.5e6, 50).unwrap() {
            assert_eq!(engine.region(h, p).unwrap().value, Region::SuperCritical);
        }
    }
}

#[test]
fn below_saturation_floor_is_super_heated() {
    let engine = engine();
    for p in [PTRIPLE_PA, 800.0, 1040.0] {
        for h in [1e3, 1e6, 4.5e6] {
            let s = state(&engine, h, p);
            assert_eq!(s.region, Region::SuperHeated);
        }
    }
}

#[test]
fn continuous_across_critical_pressure_patch_edge() {
    let engine = engine();
    let h_crit = engine.boiling_enthalpy(PCRIT_PA).unwrap().value;
    for h in linspace(1e3, 4.5e6, 120).unwrap() {
        if (h - h_crit).abs() < 1e5 {
            continue;
        }
        let below = state(&engine, h, PCRIT_PA * (1.0 - 1e-9));
        let above = state(&engine, h, PCRIT_PA);
        assert_ne!(below.region, above.region);
        for property in Property::ALL {
            let (a, b) = (below.get(property), above.get(property));
            assert!(
                (a - b).abs() <= 1e-5 * b.abs(),
                "{} at h = {h}: {a} vs {b}",
                property.name()
            );
        }
    }
}

#[test]
fn continuous_across_saturation_floor_patch_edge() {
    let engine = engine();
    let floor = engine.saturation_floor();
    let h_vap = engine.dew_enthalpy(floor).unwrap().value;
    for h in linspace(h_vap + 1e4, 4.5e6, 60).unwrap() {
        let below = state(&engine, h, floor * (1.0 - 1e-9));
        let above = state(&engine, h, floor * (1.0 + 1e-9));
        assert_eq!(below.region, Region::SuperHeated);
        assert_eq!(above.region, Region::SuperHeated);
        for property in Property::ALL {
            let (a, b) = (below.get(property), above.get(property));
            assert!(
                (a - b).abs() <= 1e-6 * b.abs(),
                "{} at h = {h}: {a} vs {b}",
                property.name()
            );
        }
    }
}

#[test]
fn continuous_across_the_saturation_curves() {
    let engine = engine();
    let floor = engine.saturation_floor();
    let n = 200;
    let mut pressures: Vec<f64> = (0..n)
        .map(|k| floor * (PCRIT_PA / floor).powf(k as f64 / n as f64))
        .collect();
    pressures.extend([4.67e6, 22.0e6, 22.06e6, 2.206e7]);
    for p in pressures {
        let boiling = engine.boiling_enthalpy(p).unwrap().value;
        let dew = engine.dew_enthalpy(p).unwrap().value;
        for (h, inside, outside) in [
            (boiling, Region::TwoPhase, Region::CompressedLiquid),
            (dew, Region::TwoPhase, Region::SuperHeated),
        ] {
            let eps = 1e-9 * h;
            let (lo, hi) = (state(&engine, h - eps, p), state(&engine, h + eps, p));
            let regions = [lo.region, hi.region];
            assert!(regions.contains(&inside) && regions.contains(&outside));
            for property in Property::ALL {
                let (a, b) = (lo.get(property), hi.get(property));
                assert!(
                    (a - b).abs() <= 1e-5 * b.abs(),
                    "{} at ({h}, {p}): {a} vs {b}",
                    property.name()
                );
            }
        }
    }
}

#[test]
fn first_derivative_matches_central_difference() {
    let engine = engine();
    let step = 1.0;
    let points = [
        (5e5, 1e6),     // compressed liquid
        (1.5e6, 1e6),   // two-phase
        (3e6, 1e6),     // super-heated
        (2.9e6, 5e3),   // low-pressure vapour
        (3e6, 800.0),   // below the saturation floor
        (1e6, 23e6),    // super-critical, liquid-like
        (2.5e6, 50e6),  // super-critical
        (1.2e6, 15e6),  // compressed liquid, high pressure
        (2.2e6, 15e6),  // two-phase, high pressure
    ];
    for (h, p) in points {
        let analytic = engine
            .derivatives(h, p, 1)
            .unwrap()
            .into_values()
            .unwrap()[0];
        let hi = state(&engine, h + step, p);
        let lo = state(&engine, h - step, p);
        assert_eq!(hi.region, lo.region, "stencil straddles a region at ({h}, {p})");
        for property in Property::ALL {
            let fd = (hi.get(property) - lo.get(property)) / (2.0 * step);
            let got = analytic.get(property);
            assert!(
                (got - fd).abs() <= 1e-3 * fd.abs() + 1e-9,
                "d{}/dh at ({h}, {p}): analytic {got} vs fd {fd}",
                property.name()
            );
        }
    }
}

#[test]
fn orders_above_the_cubic_degree() {
    let engine = engine();
    for (h, p) in [(5e5, 1e6), (1.5e6, 1e6), (3e6, 1e6), (2.5e6, 50e6)] {
        let d4 = engine
            .derivatives(h, p, 4)
            .unwrap()
            .into_values()
            .unwrap()[0];
        // direct surfaces are cubic in enthalpy
        assert_eq!(d4.temperature, 0.0);
        assert_eq!(d4.fluidity, 0.0);
        // density is the reciprocal of a cubic, so it keeps going
        assert!(d4.density.is_finite());

        let top = engine
            .temperature(h, p, MAX_DERIVATIVE_ORDER)
            .unwrap()
            .into_values()
            .unwrap()[0];
        assert_eq!(top.derivative, 0.0);
        assert_eq!(top.temperature, state(&engine, h, p).temperature);
    }
}

#[test]
fn absurd_derivative_orders_fail_the_call() {
    let engine = engine();
    for order in [MAX_DERIVATIVE_ORDER + 1, usize::MAX] {
        assert!(matches!(
            engine.temperature(&[1e6], 1e6, order),
            Err(WaterError::DerivativeOrder { max: MAX_DERIVATIVE_ORDER, .. })
        ));
        assert!(matches!(
            engine.derivatives(1e6, 1e6, order),
            Err(WaterError::DerivativeOrder { .. })
        ));
    }
}

#[test]
fn temperature_slope_along_supercritical_isobar() {
    let engine = engine();
    let h = linspace(1e3, 4.5e6, 500).unwrap();
    let samples = engine
        .temperature(&h, 23e6, 1)
        .unwrap()
        .into_values()
        .unwrap();
    assert_eq!(samples.len(), h.len());
    for (s, &hi) in samples.iter().zip(&h) {
        let row = s.as_array();
        assert_eq!(row[0], hi);
        assert_eq!(row[1], 23e6);
        assert_eq!(row[2], 1.0);
        assert!(row[4].is_finite());
        // temperature rises with enthalpy on an isobar
        assert!(row[4] > 0.0, "dT/dh = {} at h = {hi}", row[4]);
    }
    for pair in samples.windows(2) {
        assert!(pair[1].temperature > pair[0].temperature);
    }
}

#[test]
fn temperature_slope_across_the_dome_is_finite() {
    let engine = engine();
    let h = linspace(1e3, 4.5e6, 400).unwrap();
    let samples = engine.temperature(&h, 1e6, 1).unwrap();
    assert_eq!(samples.failures().count(), 0);
    let t_sat: Vec<f64> = samples
        .values()
        .flatten()
        .filter(|s| s.region == Region::TwoPhase)
        .map(|s| s.temperature)
        .collect();
    assert!(!t_sat.is_empty());
    // saturation temperature at 1 MPa is 453.0 K
    for t in t_sat {
        assert!((t - 453.0).abs() < 1.5, "T = {t}");
    }
}

#[test]
fn order_is_preserved_under_permutation() {
    let engine = engine();
    let h = [1e5, 3e6, 1.5e6, 4e6, 2e6, 7e5];
    let p = [1e5, 1e6, 2e6, 50e6, 700.0, 22e6];
    let forward = engine.properties(&h, &p).unwrap().into_values().unwrap();

    let perm = [3, 0, 5, 1, 4, 2];
    let hp: Vec<f64> = perm.iter().map(|&i| h[i]).collect();
    let pp: Vec<f64> = perm.iter().map(|&i| p[i]).collect();
    let permuted = engine.properties(&hp, &pp).unwrap().into_values().unwrap();

    for (k, &i) in perm.iter().enumerate() {
        assert_eq!(permuted[k], forward[i]);
        assert_eq!(permuted[k].h, h[i]);
    }
}

#[test]
fn parallel_and_sequential_dispatch_agree_bitwise() {
    let h = linspace(1e3, 4.5e6, 3000).unwrap();
    let p: Vec<f64> = (0..h.len())
        .map(|i| PTRIPLE_PA * (1e8 / PTRIPLE_PA).powf(i as f64 / 2999.0))
        .collect();
    let sequential = engine().with_parallel_min_batch(usize::MAX);
    let parallel = engine().with_parallel_min_batch(1);
    let a = sequential.properties(&h, &p).unwrap().into_values().unwrap();
    let b = parallel.properties(&h, &p).unwrap().into_values().unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        for (u, v) in x.as_array().iter().zip(y.as_array()) {
            assert_eq!(u.to_bits(), v.to_bits());
        }
        assert_eq!(x.region, y.region);
    }
}

#[test]
fn scalar_pressure_broadcasts_and_scalar_enthalpy_too() {
    let engine = engine();
    let h = [5e5, 1.5e6, 3e6];
    let by_scalar = engine.properties(&h, 1e6).unwrap().into_values().unwrap();
    let by_slice = engine
        .properties(&h, &[1e6, 1e6, 1e6])
        .unwrap()
        .into_values()
        .unwrap();
    assert_eq!(by_scalar, by_slice);

    let p = [1e5, 1e6];
    let by_scalar_h = engine.properties(3e6, &p).unwrap().into_values().unwrap();
    assert_eq!(by_scalar_h.len(), 2);
    assert_eq!(by_scalar_h[1], by_scalar[2]);
}

#[test]
fn plausible_against_reference_points() {
    let engine = engine();
    // (h, p, rho, T) from IAPWS-IF97
    let reference = [
        (1e5, 1e5, 997.4, 296.9),
        (5e5, 1e6, 944.5, 392.2),
        (3e6, 1e6, 4.06, 549.1),
        (1e6, 23e6, 843.8, 504.2),
    ];
    for (h, p, rho, t) in reference {
        let s = state(&engine, h, p);
        assert!((s.density - rho).abs() < 0.01 * rho, "{s}");
        assert!((s.temperature - t).abs() < 1.0, "{s}");
    }
    // liquid water near 120 °C: about 0.23 mPa·s
    let mu = state(&engine, 5e5, 1e6).viscosity().value;
    assert!(mu > 0.2e-3 && mu < 0.26e-3, "mu = {mu}");
}
