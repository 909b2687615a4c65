// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Two charged spheres on the z-axis compared with a direct linear solve

use approx::assert_relative_eq;
use nalgebra::{Matrix4, Vector4};
use pbam::{
    Medium, Molecule, MultipoleSolver, Point, SolveStatus, SolverSettingsBuilder, System,
};

const KAPPA: f64 = 0.1;
const RADIUS: f64 = 2.0;
const DISTANCE: f64 = 6.0;
const LAMBDA: f64 = 2.0;
const EPS_P: f64 = 4.0;
const EPS_S: f64 = 80.0;
const CHARGES: [f64; 2] = [1.0, -0.5];

fn solve(order: usize) -> MultipoleSolver {
    let system = System::new(vec![
        Molecule::with_central_charge(CHARGES[0], RADIUS, Point::zeros()),
        Molecule::with_central_charge(CHARGES[1], RADIUS, Point::new(0.0, 0.0, DISTANCE)),
    ]);
    let medium = Medium::with_kappa(298.15, EPS_P, EPS_S, KAPPA);
    let settings = SolverSettingsBuilder::default()
        .order(order)
        .lambda(LAMBDA)
        .build()
        .unwrap();
    let mut solver = MultipoleSolver::new(&system, &medium, settings).unwrap();
    let status = solver.solve(1e-13).unwrap();
    assert!(matches!(status, SolveStatus::Converged { .. }));
    solver
}

/// Closed forms of Γ(n) and Δ(n) for n = 0, 1
fn reaction_scalars() -> ([f64; 2], [f64; 2]) {
    let z = KAPPA * RADIUS;
    let ratio = EPS_P / EPS_S;
    let k = [1.0, 1.0 + z, 1.0 + z + z * z / 3.0];
    let i = [
        z.sinh() / z,
        3.0 * (z * z.cosh() - z.sinh()) / z.powi(3),
        15.0 * ((z * z + 3.0) * z.sinh() - 3.0 * z * z.cosh()) / z.powi(5),
    ];
    let gamma = [z.exp() / k[1], 3.0 * z.exp() / (3.0 * k[2] + k[1] * (ratio - 1.0))];
    let delta = [
        RADIUS * z * z * i[1] / 3.0,
        RADIUS * (RADIUS / LAMBDA).powi(2) / 3.0 * ((1.0 - ratio) * i[1] + z * z * i[2] / 5.0),
    ];
    (gamma, delta)
}

#[test]
fn monopole_only() {
    // with p = 1 only the screened Coulomb coupling of the net charges remains
    let solver = solve(1);
    let (gamma, delta) = reaction_scalars();
    let s = (-KAPPA * DISTANCE).exp() / DISTANCE;
    let g = gamma[0] * delta[0] * s;
    let a1 = (gamma[0] * CHARGES[0] + g * gamma[0] * CHARGES[1]) / (1.0 - g * g);
    let a2 = (gamma[0] * CHARGES[1] + g * gamma[0] * CHARGES[0]) / (1.0 - g * g);
    assert_relative_eq!(solver.gamma(0, 0).unwrap(), gamma[0], epsilon = 1e-12);
    assert_relative_eq!(solver.delta(1, 0).unwrap(), delta[0], epsilon = 1e-12);
    assert_relative_eq!(solver.multipole(0, 0, 0).unwrap().re, a1, epsilon = 1e-10);
    assert_relative_eq!(solver.multipole(1, 0, 0).unwrap().re, a2, epsilon = 1e-10);
    assert_relative_eq!(solver.multipole(0, 0, 0).unwrap().re, 1.0165734133826, epsilon = 1e-9);
}

#[test]
fn monopole_and_dipole() {
    let solver = solve(2);
    let (gamma, delta) = reaction_scalars();
    for n in 0..2 {
        assert_relative_eq!(solver.gamma(0, n).unwrap(), gamma[n], epsilon = 1e-10);
        assert_relative_eq!(solver.delta(0, n).unwrap(), delta[n], epsilon = 1e-8);
    }

    // coaxial translation coefficients S(l,n)
    let (t, decay) = (DISTANCE, (-KAPPA * DISTANCE).exp());
    let s01 = LAMBDA * decay * (1.0 + KAPPA * t) / (t * t);
    let s = [
        [decay / t, s01],
        [
            -s01,
            -LAMBDA.powi(2) * decay * (2.0 / t.powi(3) + 2.0 * KAPPA / (t * t) + KAPPA * KAPPA / t),
        ],
    ];

    // unknowns (A₁₀₀, A₁₁₀, A₂₀₀, A₂₁₀); the field of sphere 2 reaches sphere 1 from +z
    let mut matrix = Matrix4::<f64>::identity();
    let mut rhs = Vector4::<f64>::zeros();
    for n in 0..2 {
        for k in 0..2 {
            let sign = if (n + k) % 2 == 0 { 1.0 } else { -1.0 };
            matrix[(n, 2 + k)] = -gamma[n] * delta[n] * sign * s[n][k];
            matrix[(2 + n, k)] = -gamma[n] * delta[n] * s[n][k];
        }
    }
    rhs[0] = gamma[0] * CHARGES[0];
    rhs[2] = gamma[0] * CHARGES[1];
    let expected = matrix.lu().solve(&rhs).unwrap();

    let a = |molecule, n| solver.multipole(molecule, n, 0).unwrap().re;
    assert_relative_eq!(a(0, 0), expected[0], epsilon = 1e-8);
    assert_relative_eq!(a(0, 1), expected[1], epsilon = 1e-8);
    assert_relative_eq!(a(1, 0), expected[2], epsilon = 1e-8);
    assert_relative_eq!(a(1, 1), expected[3], epsilon = 1e-8);
    assert_relative_eq!(solver.multipole(0, 1, 1).unwrap().norm(), 0.0, epsilon = 1e-12);

    // the dipoles point along the axis joining the spheres
    assert!(a(0, 1) < 0.0 && a(1, 1) < 0.0);
}

#[test]
fn local_expansion_without_reaction_field() {
    let solver = solve(2);
    let local = solver.local_expansions().unwrap();
    let s00 = (-KAPPA * DISTANCE).exp() / DISTANCE;
    let s01 = LAMBDA * s00 * (1.0 + KAPPA * DISTANCE) / DISTANCE;
    let a = |molecule, n| solver.multipole(molecule, n, 0).unwrap().re;
    // L₂ = S A₁ as sphere 1 is below sphere 2
    assert_relative_eq!(
        local[1].get(0, 0).unwrap().re,
        s00 * a(0, 0) + s01 * a(0, 1),
        epsilon = 1e-12
    );
    // the fixed point reads A = Γ(Δ L + E)
    for molecule in 0..2 {
        for n in 0..2 {
            let gamma = solver.gamma(molecule, n).unwrap();
            let delta = solver.delta(molecule, n).unwrap();
            let e = solver.fixed_charge(molecule, n, 0).unwrap().re;
            let l = local[molecule].get(n, 0).unwrap().re;
            assert_relative_eq!(a(molecule, n), gamma * (delta * l + e), epsilon = 1e-11);
        }
    }
}

#[test]
fn symmetric_pair() {
    // equal spheres placed off-axis must end up with mirrored multipoles
    let system = System::new(vec![
        Molecule::with_central_charge(1.0, RADIUS, Point::new(-1.0, 2.0, 3.0)),
        Molecule::with_central_charge(1.0, RADIUS, Point::new(3.0, -1.0, 1.0)),
    ]);
    let medium = Medium::with_kappa(298.15, EPS_P, EPS_S, KAPPA);
    let settings = SolverSettingsBuilder::default().order(5).build().unwrap();
    let mut solver = MultipoleSolver::new(&system, &medium, settings).unwrap();
    assert!(solver.solve(1e-12).unwrap().is_converged());

    let (a0, a1) = (&solver.multipoles()[0], &solver.multipoles()[1]);
    assert_relative_eq!(a0.norm(), a1.norm(), epsilon = 1e-10);
    assert_relative_eq!(
        a0.get(0, 0).unwrap().re,
        a1.get(0, 0).unwrap().re,
        epsilon = 1e-12
    );
}
