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

//! # Analytical Poisson-Boltzmann Electrostatics for Spherical Molecules
//!
//! This library solves the linearized Poisson-Boltzmann equation for a collection
//! of spherical, low-dielectric molecules immersed in a salt solution using the
//! analytical multipole re-expansion method of
//! [Lotan and Head-Gordon](https://doi.org/10.1021/ct050263p).
//!
//! Each molecule carries a truncated multipole expansion of its fixed point charges.
//! The expansion is iteratively corrected by the field of every other molecule,
//! re-expanded into the local frame of the molecule through a rotation followed by a
//! coaxial translation.
//!
//! The building blocks are:
//!
//! - [`bessel`]: scaled modified spherical Bessel functions, î and k̂.
//! - [`harmonics`]: spherical harmonics in the Schmidt semi-normalized convention.
//! - [`reexpansion`]: rotation and translation coefficients for a pair of molecules.
//! - [`solver`]: the fixed-point iteration for the multipole vector.
//!
//! ## Example
//!
//! Two unit charges of opposite sign, each at the center of a sphere:
//! ~~~
//! use pbam::{Molecule, MultipoleSolver, SolverSettingsBuilder, System, Medium, SolveStatus};
//! let system = System::new(vec![
//!     Molecule::with_central_charge(1.0, 2.0, [0.0, 0.0, 0.0].into()),
//!     Molecule::with_central_charge(-1.0, 2.0, [0.0, 0.0, 8.0].into()),
//! ]);
//! let medium = Medium::new(298.15, 4.0, 80.0, Some(0.05));
//! let settings = SolverSettingsBuilder::default().order(4).build().unwrap();
//! let mut solver = MultipoleSolver::new(&system, &medium, settings).unwrap();
//! let status = solver.solve(1e-8).unwrap();
//! assert!(matches!(status, SolveStatus::Converged { .. }));
//! ~~~

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Point = nalgebra::Vector3<f64>;
/// Complex number used for all expansion coefficients
pub type Complex = num::complex::Complex64;

pub mod bessel;
pub mod coordinates;
mod error;
pub mod harmonics;
pub mod medium;
pub mod reexpansion;
pub mod solver;
pub mod system;
pub mod table;

pub use bessel::{BesselEngine, BesselTable};
pub use coordinates::SphericalPoint;
pub use error::{PbError, Result};
pub use harmonics::{HarmonicTable, SphericalHarmonics};
pub use medium::Medium;
pub use reexpansion::{ReExpansionConstants, ReExpansionOperator, Recurrence};
pub use solver::{
    ConvergenceMetric, MultipoleSolver, SolveStatus, SolverSettings, SolverSettingsBuilder,
};
pub use system::{Charge, Input, Molecule, System};
pub use table::CoefficientTable;

/// Largest truncation order accepted by the engines.
///
/// The rotation recurrence runs to degree 2p-2 and the scaled Bessel functions
/// grow factorially with the degree, so very large orders are rejected up front.
pub const MAX_ORDER: usize = 80;

/// Checks that a truncation order is usable
pub(crate) fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(PbError::InvalidArgument(
            "truncation order must be positive".to_string(),
        ));
    }
    if order > MAX_ORDER {
        return Err(PbError::InvalidArgument(format!(
            "truncation order {} exceeds the maximum of {}",
            order, MAX_ORDER
        )));
    }
    Ok(())
}
