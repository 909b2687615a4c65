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

//! # Self-consistent multipoles of a many-sphere system
//!
//! The multipole expansion, A, of every molecule is the fixed point of
//!
//! $$ A_i = \Gamma_i \left( \Delta_i \sum_{j \ne i} T_{j \to i} A_j + E_i \right), $$
//!
//! where E is the expansion of the fixed charges, Γ and Δ are the diagonal
//! single-sphere reaction operators, and T is the re-expansion operator.
//! The fixed point is found by Jacobi iteration starting from A = E.

use crate::{
    bessel::BesselEngine, check_order, harmonics::SphericalHarmonics, medium::Medium,
    reexpansion::{ReExpansionConstants, ReExpansionOperator},
    system::{Molecule, System},
    CoefficientTable, Complex, PbError, Result, SphericalPoint,
};
use derive_builder::Builder;
use derive_getters::Getters;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use validator::Validate;

const DEFAULT_TOLERANCE: f64 = 1e-6;
const DEFAULT_MAX_ITERATIONS: usize = 200;

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

/// How per-molecule changes are combined into a single convergence measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceMetric {
    /// Largest change of any molecule
    #[default]
    Max,
    /// Sum of changes over all molecules
    Sum,
}

impl ConvergenceMetric {
    fn combine(&self, changes: impl Iterator<Item = f64>) -> f64 {
        match self {
            ConvergenceMetric::Max => changes.fold(0.0, f64::max),
            ConvergenceMetric::Sum => changes.sum(),
        }
    }
}

/// Settings for [`MultipoleSolver`]
///
/// ~~~
/// use pbam::{ConvergenceMetric, SolverSettingsBuilder};
/// let settings = SolverSettingsBuilder::default()
///     .order(6)
///     .metric(ConvergenceMetric::Sum)
///     .build()
///     .unwrap();
/// assert_eq!(*settings.max_iterations(), 200);
/// assert!(SolverSettingsBuilder::default().order(0).build().is_err());
/// ~~~
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize, Getters)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(deny_unknown_fields)]
pub struct SolverSettings {
    /// Truncation order, p; degrees 0..p are kept
    order: usize,
    /// Default convergence threshold
    #[builder(default = "DEFAULT_TOLERANCE")]
    #[serde(default = "default_tolerance")]
    tolerance: f64,
    /// Iteration budget
    #[builder(default = "DEFAULT_MAX_ITERATIONS")]
    #[serde(default = "default_max_iterations")]
    max_iterations: usize,
    #[builder(default)]
    #[serde(default)]
    metric: ConvergenceMetric,
    /// Uniform length scale, λ; defaults to the mean molecular radius
    #[builder(setter(strip_option), default)]
    #[serde(default)]
    lambda: Option<f64>,
}

impl SolverSettingsBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(order) = self.order {
            check_order(order).map_err(|err| err.to_string())?;
        }
        if self.tolerance.is_some_and(|tolerance| !(tolerance > 0.0)) {
            return Err("tolerance must be positive".to_string());
        }
        if self.max_iterations == Some(0) {
            return Err("at least one iteration is required".to_string());
        }
        if let Some(Some(lambda)) = self.lambda {
            if !(lambda > 0.0) {
                return Err("length scale must be positive".to_string());
            }
        }
        Ok(())
    }
}

impl SolverSettings {
    /// Same checks as the builder, for settings read from input
    pub(crate) fn check(&self) -> Result<()> {
        check_order(self.order)?;
        check_tolerance(self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(PbError::InvalidArgument(
                "at least one iteration is required".to_string(),
            ));
        }
        if self.lambda.is_some_and(|lambda| !(lambda > 0.0)) {
            return Err(PbError::InvalidArgument(
                "length scale must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if !(tolerance > 0.0) {
        return Err(PbError::InvalidArgument(format!(
            "tolerance must be positive, got {}",
            tolerance
        )));
    }
    Ok(())
}

/// Outcome of [`MultipoleSolver::solve`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// The change dropped below the tolerance
    Converged { iterations: usize, change: f64 },
    /// The iteration budget ran out; the multipoles are usable at reduced accuracy
    MaxIterationsExceeded { iterations: usize, change: f64 },
}

impl SolveStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveStatus::Converged { .. })
    }
    /// Total number of iterations performed
    pub fn iterations(&self) -> usize {
        match self {
            SolveStatus::Converged { iterations, .. }
            | SolveStatus::MaxIterationsExceeded { iterations, .. } => *iterations,
        }
    }
    /// Change in the last iteration
    pub fn change(&self) -> f64 {
        match self {
            SolveStatus::Converged { change, .. }
            | SolveStatus::MaxIterationsExceeded { change, .. } => *change,
        }
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Converged { iterations, change } => write!(
                f,
                "converged after {} iterations (change {:.3e})",
                iterations, change
            ),
            SolveStatus::MaxIterationsExceeded { iterations, change } => write!(
                f,
                "not converged after {} iterations (change {:.3e})",
                iterations, change
            ),
        }
    }
}

/// Single-sphere reaction scalars Γ(n) and Δ(n), n < order
fn reaction_scalars(
    bessel: &BesselEngine,
    order: usize,
    radius: f64,
    kappa: f64,
    lambda: f64,
    permittivity_ratio: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let z = kappa * radius;
    let table = bessel.evaluate(order + 1, z)?;
    let (i, k) = (table.i_values(), table.k_values());
    let scale = (radius / lambda).powi(2);
    let (gamma, delta) = (0..order)
        .map(|n| {
            let nf = n as f64;
            let odd = 2.0 * nf + 1.0;
            let gamma = odd * z.exp()
                / (odd * k[n + 1] + nf * k[n] * (permittivity_ratio - 1.0));
            let delta = radius * scale.powi(n as i32) / odd
                * (nf * (1.0 - permittivity_ratio) * i[n]
                    + z * z * i[n + 1] / (2.0 * nf + 3.0));
            (gamma, delta)
        })
        .unzip();
    Ok((gamma, delta))
}

/// Expansion of the fixed charges, E(n,m) = Σ q (ρ/λ)ⁿ conj(Y(n,m)(θ,φ))
fn fixed_charge_expansion(
    molecule: &Molecule,
    harmonics: &SphericalHarmonics,
    lambda: f64,
) -> CoefficientTable {
    let mut expansion = CoefficientTable::zeros(harmonics.order());
    for charge in molecule.charges() {
        let position = SphericalPoint::from_cartesian(*charge.position());
        let y = harmonics.evaluate_at(&position);
        let ratio = position.r() / lambda;
        let mut contribution = CoefficientTable::zeros(harmonics.order());
        for (n, m, value) in y.iter() {
            contribution.set_unchecked(n, m, *charge.value() * ratio.powi(n as i32) * value.conj());
        }
        expansion += &contribution;
    }
    expansion
}

/// # Iterative solver for the multipole expansions
///
/// Built once per geometry. Construction evaluates the fixed-charge expansions,
/// the reaction scalars, and the N(N-1) re-expansion operators; the iteration
/// itself only applies the stored operators.
///
/// ~~~
/// use pbam::{Medium, Molecule, MultipoleSolver, SolverSettingsBuilder, System};
/// let system = System::new(vec![Molecule::with_central_charge(1.0, 3.0, [0.0; 3].into())]);
/// let medium = Medium::with_kappa(298.15, 4.0, 80.0, 0.1);
/// let settings = SolverSettingsBuilder::default().order(3).build().unwrap();
/// let mut solver = MultipoleSolver::new(&system, &medium, settings).unwrap();
/// let status = solver.solve(1e-10).unwrap();
/// assert_eq!(status.iterations(), 2);
/// ~~~
#[derive(Debug, Clone)]
pub struct MultipoleSolver {
    settings: SolverSettings,
    kappa: f64,
    lambda: f64,
    /// Fixed-charge expansions, E
    fixed: Vec<CoefficientTable>,
    gamma: Vec<Vec<f64>>,
    delta: Vec<Vec<f64>>,
    /// Operators indexed by target * N + source; none on the diagonal
    operators: Vec<Option<ReExpansionOperator>>,
    /// Current multipoles, A
    multipoles: Vec<CoefficientTable>,
    /// Multipoles before the last iteration
    previous: Vec<CoefficientTable>,
    history: Vec<f64>,
}

impl MultipoleSolver {
    pub fn new(system: &System, medium: &Medium, settings: SolverSettings) -> Result<Self> {
        settings.check()?;
        if system.is_empty() {
            return Err(PbError::InvalidArgument("no molecules to solve for".to_string()));
        }
        system
            .validate()
            .map_err(|err| PbError::InvalidArgument(err.to_string()))?;
        medium
            .validate()
            .map_err(|err| PbError::InvalidArgument(err.to_string()))?;

        let order = settings.order;
        let kappa = medium.kappa()?;
        let lambda = match settings.lambda {
            Some(lambda) => lambda,
            None => system.mean_radius().ok_or_else(|| {
                PbError::InvalidArgument("no molecules to define a length scale".to_string())
            })?,
        };
        let num_molecules = system.len();
        log::debug!(
            "Setting up {} molecules with order {}, κ = {:.4} Å⁻¹, λ = {:.3} Å",
            num_molecules,
            order,
            kappa,
            lambda
        );

        let bessel = BesselEngine::new(2 * order)?;
        let charge_harmonics = SphericalHarmonics::new(order)?;
        let direction_harmonics = SphericalHarmonics::new(2 * order - 1)?;
        let constants = ReExpansionConstants::new(order)?;

        let molecules = system.molecules();
        let fixed: Vec<_> = molecules
            .iter()
            .map(|molecule| fixed_charge_expansion(molecule, &charge_harmonics, lambda))
            .collect();

        let (gamma, delta): (Vec<_>, Vec<_>) = molecules
            .iter()
            .map(|molecule| {
                reaction_scalars(
                    &bessel,
                    order,
                    *molecule.radius(),
                    kappa,
                    lambda,
                    medium.permittivity_ratio(),
                )
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        let operators = iproduct!(0..num_molecules, 0..num_molecules)
            .map(|(target, source)| {
                if target == source {
                    return Ok(None);
                }
                let separation = SphericalPoint::displacement(
                    molecules[source].center(),
                    molecules[target].center(),
                );
                let table = bessel.evaluate(2 * order - 1, kappa * separation.r())?;
                ReExpansionOperator::new(
                    order,
                    &separation,
                    &table,
                    kappa,
                    lambda,
                    &constants,
                    &direction_harmonics,
                )
                .map(Some)
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "Computed {} re-expansion operators",
            operators.iter().flatten().count()
        );

        Ok(Self {
            settings,
            kappa,
            lambda,
            multipoles: fixed.clone(),
            previous: fixed.clone(),
            fixed,
            gamma,
            delta,
            operators,
            history: Vec::new(),
        })
    }

    /// Number of molecules
    pub fn len(&self) -> usize {
        self.fixed.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty()
    }
    /// Truncation order, p
    pub fn order(&self) -> usize {
        self.settings.order
    }
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
    /// Screening parameter, κ (1/Å)
    pub fn kappa(&self) -> f64 {
        self.kappa
    }
    /// Uniform length scale, λ (Å)
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    fn check_molecule(&self, molecule: usize) -> Result<()> {
        if molecule >= self.len() {
            return Err(PbError::InvalidArgument(format!(
                "molecule {} out of range for {} molecules",
                molecule,
                self.len()
            )));
        }
        Ok(())
    }

    fn check_degree(&self, molecule: usize, n: usize) -> Result<()> {
        self.check_molecule(molecule)?;
        if n >= self.order() {
            return Err(PbError::IndexOutOfRange {
                n,
                m: 0,
                order: self.order(),
            });
        }
        Ok(())
    }

    /// Reaction scalar Γ(n) of a molecule
    pub fn gamma(&self, molecule: usize, n: usize) -> Result<f64> {
        self.check_degree(molecule, n)?;
        Ok(self.gamma[molecule][n])
    }

    /// Reaction scalar Δ(n) of a molecule
    pub fn delta(&self, molecule: usize, n: usize) -> Result<f64> {
        self.check_degree(molecule, n)?;
        Ok(self.delta[molecule][n])
    }

    /// Fixed-charge coefficient E(n,m) of a molecule
    pub fn fixed_charge(&self, molecule: usize, n: usize, m: isize) -> Result<Complex> {
        self.check_molecule(molecule)?;
        self.fixed[molecule].get(n, m)
    }

    /// Multipole coefficient A(n,m) of a molecule
    pub fn multipole(&self, molecule: usize, n: usize, m: isize) -> Result<Complex> {
        self.check_molecule(molecule)?;
        self.multipoles[molecule].get(n, m)
    }

    /// Fixed-charge expansions of all molecules
    pub fn fixed_charge_expansions(&self) -> &[CoefficientTable] {
        &self.fixed
    }

    /// Current multipole expansions of all molecules
    pub fn multipoles(&self) -> &[CoefficientTable] {
        &self.multipoles
    }

    /// Re-expansion operator from `source` to `target`; `None` if they coincide or are out of range
    pub fn operator(&self, source: usize, target: usize) -> Option<&ReExpansionOperator> {
        if source >= self.len() || target >= self.len() {
            return None;
        }
        self.operators[target * self.len() + source].as_ref()
    }

    /// Change recorded after each iteration
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of iterations performed
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    /// Sum of all other molecules' multipoles, re-expanded around `target`
    fn incoming(&self, target: usize, multipoles: &[CoefficientTable]) -> Result<CoefficientTable> {
        let mut sum = CoefficientTable::zeros(self.order());
        for (source, source_multipoles) in multipoles.iter().enumerate() {
            if let Some(operator) = self.operator(source, target) {
                sum += &operator.re_expand(source_multipoles)?;
            }
        }
        Ok(sum)
    }

    /// New multipoles of one molecule from the current multipoles of all others
    fn updated(&self, molecule: usize) -> Result<CoefficientTable> {
        let mut updated = self.incoming(molecule, &self.multipoles)?;
        let (gamma, delta) = (&self.gamma[molecule], &self.delta[molecule]);
        updated.scale_degrees(|n| delta[n]);
        updated += &self.fixed[molecule];
        updated.scale_degrees(|n| gamma[n]);
        Ok(updated)
    }

    /// Perform one Jacobi step and return the change.
    ///
    /// All molecules are updated from the multipoles of the previous step.
    pub fn iterate(&mut self) -> Result<f64> {
        let updated = (0..self.len())
            .map(|molecule| self.updated(molecule))
            .collect::<Result<Vec<_>>>()?;
        self.previous = std::mem::replace(&mut self.multipoles, updated);
        let change = self.change();
        self.history.push(change);
        log::trace!("Iteration {}: change = {:.6e}", self.iterations(), change);
        Ok(change)
    }

    /// Change between the current and previous multipoles; zero before the first step
    pub fn change(&self) -> f64 {
        self.settings.metric.combine(
            self.multipoles
                .iter()
                .zip(self.previous.iter())
                .map(|(current, previous)| (current - previous).norm()),
        )
    }

    /// Iterate until the change drops below `tolerance` or the budget is spent
    pub fn solve(&mut self, tolerance: f64) -> Result<SolveStatus> {
        self.solve_with(tolerance, |_, _| {})
    }

    /// As [`MultipoleSolver::solve`], calling `observer(iteration, change)` after each step
    pub fn solve_with(
        &mut self,
        tolerance: f64,
        mut observer: impl FnMut(usize, f64),
    ) -> Result<SolveStatus> {
        check_tolerance(tolerance)?;
        let mut change = f64::INFINITY;
        for _ in 0..self.settings.max_iterations {
            change = self.iterate()?;
            observer(self.iterations(), change);
            if change < tolerance {
                log::info!(
                    "Converged after {} iterations (change {:.3e})",
                    self.iterations(),
                    change
                );
                return Ok(SolveStatus::Converged {
                    iterations: self.iterations(),
                    change,
                });
            }
        }
        log::warn!(
            "No convergence after {} iterations (change {:.3e} > {:.3e})",
            self.iterations(),
            change,
            tolerance
        );
        Ok(SolveStatus::MaxIterationsExceeded {
            iterations: self.iterations(),
            change,
        })
    }

    /// Local expansions, L, of the field from all other molecules at the current multipoles
    pub fn local_expansions(&self) -> Result<Vec<CoefficientTable>> {
        (0..self.len())
            .map(|molecule| self.incoming(molecule, &self.multipoles))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use approx::assert_relative_eq;

    fn settings(order: usize) -> SolverSettings {
        SolverSettingsBuilder::default().order(order).build().unwrap()
    }

    fn pair(distance: f64) -> System {
        System::new(vec![
            Molecule::with_central_charge(1.0, 2.0, Point::zeros()),
            Molecule::with_central_charge(-0.5, 2.0, Point::new(0.0, 0.0, distance)),
        ])
    }

    #[test]
    fn builder_defaults() {
        let s = settings(4);
        assert_eq!(s.tolerance(), &DEFAULT_TOLERANCE);
        assert_eq!(s.metric(), &ConvergenceMetric::Max);
        assert_eq!(s.lambda(), &None);
        assert!(SolverSettingsBuilder::default().build().is_err());
        assert!(SolverSettingsBuilder::default()
            .order(3)
            .tolerance(-1.0)
            .build()
            .is_err());
        assert!(SolverSettingsBuilder::default()
            .order(3)
            .lambda(0.0)
            .build()
            .is_err());
    }

    #[test]
    fn settings_from_yaml() {
        let s: SolverSettings =
            serde_yaml::from_str("order: 4\nmetric: sum\nlambda: 2.5").unwrap();
        assert_eq!(s.metric(), &ConvergenceMetric::Sum);
        assert_eq!(s.lambda(), &Some(2.5));
        assert_eq!(s.max_iterations(), &200);
        let s: SolverSettings = serde_yaml::from_str("order: 0").unwrap();
        assert!(s.check().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn metrics() {
        let values = [0.5, 2.0, 1.0];
        assert_eq!(ConvergenceMetric::Max.combine(values.into_iter()), 2.0);
        assert_eq!(ConvergenceMetric::Sum.combine(values.into_iter()), 3.5);
    }

    #[test]
    fn single_molecule() {
        let system = System::new(vec![Molecule::new(
            Point::new(1.0, 2.0, 3.0),
            3.0,
            vec![
                crate::Charge::new(Point::new(1.0, 0.0, 0.0), 1.0),
                crate::Charge::new(Point::new(0.0, -1.5, 0.5), -0.5),
            ],
        )]);
        let medium = Medium::with_kappa(298.15, 4.0, 80.0, 0.1);
        let mut solver = MultipoleSolver::new(&system, &medium, settings(4)).unwrap();
        assert!(solver.operator(0, 0).is_none());
        let status = solver.solve(1e-12).unwrap();
        assert_eq!(status, SolveStatus::Converged { iterations: 2, change: 0.0 });
        // without neighbours the answer is Γ∘E
        for n in 0..4 {
            for m in -(n as isize)..=n as isize {
                let expected = solver.gamma(0, n).unwrap() * solver.fixed_charge(0, n, m).unwrap();
                assert_eq!(solver.multipole(0, n, m).unwrap(), expected);
            }
        }
        assert_eq!(solver.local_expansions().unwrap()[0].norm(), 0.0);
    }

    #[test]
    fn reaction_scalars_of_a_sphere() {
        // monopole term of a Debye-Hückel sphere, Γ(0) = exp(κa)/(1+κa)
        let (kappa, radius) = (0.1, 2.0);
        let bessel = BesselEngine::new(6).unwrap();
        let (gamma, delta) = reaction_scalars(&bessel, 3, radius, kappa, radius, 0.05).unwrap();
        assert_relative_eq!(gamma[0], (kappa * radius).exp() / (1.0 + kappa * radius), epsilon = 1e-12);
        let z = kappa * radius;
        let i1 = 3.0 * (z * z.cosh() - z.sinh()) / z.powi(3);
        assert_relative_eq!(delta[0], radius * z * z * i1 / 3.0, epsilon = 1e-12);
        assert!(delta[1] > 0.0 && gamma[1] > 0.0);
    }

    #[test]
    fn fixed_charge_expansion_of_a_dipole() {
        let molecule = Molecule::new(
            Point::zeros(),
            2.0,
            vec![
                crate::Charge::new(Point::new(0.0, 0.0, 1.0), 1.0),
                crate::Charge::new(Point::new(0.0, 0.0, -1.0), -1.0),
            ],
        );
        let harmonics = SphericalHarmonics::new(3).unwrap();
        let e = fixed_charge_expansion(&molecule, &harmonics, 2.0);
        assert_relative_eq!(e.get(0, 0).unwrap().re, 0.0);
        assert_relative_eq!(e.get(1, 0).unwrap().re, 1.0); // 2·q·(1/2)
        assert_relative_eq!(e.get(2, 0).unwrap().re, 0.0, epsilon = 1e-15);
        assert_relative_eq!(e.get(1, 1).unwrap().norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn jacobi_history() {
        let medium = Medium::with_kappa(298.15, 4.0, 80.0, 0.1);
        let mut solver = MultipoleSolver::new(&pair(12.0), &medium, settings(5)).unwrap();
        assert_eq!(solver.change(), 0.0);
        let status = solver.solve(1e-10).unwrap();
        assert!(status.is_converged());
        assert_eq!(solver.history().len(), status.iterations());
        assert!(solver
            .history()
            .windows(2)
            .all(|pair| pair[1] <= pair[0]));
        assert!(solver.operator(0, 1).is_some());
        assert!(solver.operator(0, 2).is_none());
    }

    #[test]
    fn budget_exhausted() {
        let medium = Medium::with_kappa(298.15, 4.0, 80.0, 0.1);
        let settings = SolverSettingsBuilder::default()
            .order(3)
            .max_iterations(1)
            .build()
            .unwrap();
        let mut solver = MultipoleSolver::new(&pair(6.0), &medium, settings).unwrap();
        let status = solver.solve(1e-14).unwrap();
        assert!(matches!(
            status,
            SolveStatus::MaxIterationsExceeded { iterations: 1, .. }
        ));
        assert!(status.to_string().starts_with("not converged after 1 iterations"));
    }

    #[test]
    fn invalid_arguments() {
        let medium = Medium::with_kappa(298.15, 4.0, 80.0, 0.1);
        let mut solver = MultipoleSolver::new(&pair(6.0), &medium, settings(2)).unwrap();
        assert!(solver.solve(0.0).unwrap_err().is_invalid_argument());
        assert!(solver.solve(-1e-3).unwrap_err().is_invalid_argument());
        assert!(solver.gamma(2, 0).is_err());
        assert!(solver.delta(0, 2).is_err());
        assert!(solver.multipole(0, 1, 2).is_err());

        let zero_order: SolverSettings = serde_yaml::from_str("order: 0").unwrap();
        let err = MultipoleSolver::new(&pair(6.0), &medium, zero_order).unwrap_err();
        assert!(err.is_invalid_argument());

        let unscreened = Medium::new(298.15, 4.0, 80.0, None);
        assert!(MultipoleSolver::new(&pair(6.0), &unscreened, settings(2)).is_err());
        assert!(MultipoleSolver::new(&pair(3.0), &medium, settings(2)).is_err());
        assert!(MultipoleSolver::new(&System::new(vec![]), &medium, settings(2)).is_err());
    }
}
