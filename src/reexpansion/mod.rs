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

//! # Re-expansion of multipoles between two spheres
//!
//! The multipole expansion of molecule j,
//!
//! $$ \phi(\mathbf{r}) = \sum_{n,m} A_{nm} \lambda^n \frac{e^{-\kappa r} \hat{k}_n(\kappa r)}{r^{n+1}} Y_n^m(\hat{r}), $$
//!
//! is re-expanded into the local basis $(r/\lambda)^n \hat{i}_n(\kappa r) Y_n^m(\hat{r})$
//! centered at molecule i. This is done in three steps:
//!
//! 1. rotate into the frame whose z-axis points from j towards i ([`RotationTable`]),
//! 2. translate along the z-axis, mixing degrees but not orders ([`TranslationTable`]),
//! 3. rotate back into the laboratory frame.
//!
//! Both tables are built by recurrences in the degree, seeded by the spherical
//! harmonics of the separation direction and by the scaled Bessel functions
//! of the screened distance, respectively.

use crate::{
    check_order, BesselTable, CoefficientTable, PbError, Result, SphericalHarmonics,
    SphericalPoint,
};

mod rotation;
mod translation;

pub use rotation::RotationTable;
pub use translation::TranslationTable;

/// Families of recurrence coefficients held by [`ReExpansionConstants`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// a(m,n) = sqrt((n-m)(n+m))
    A,
    /// b(m,n) = sqrt((n-m)(n-m-1))
    B,
    /// alpha(m,n) = sqrt((n+m+1)(n-m+1))
    Alpha,
    /// beta(m,n) = sqrt((n+m)(n-m)) / ((2n-1)(2n+1))
    Beta,
    /// nu(m,n) = sqrt((n-m+1)(n-m))
    Nu,
    /// mu(m,n) = sqrt((n+m+1)(n+m)) / ((2n-1)(2n+1))
    Mu,
}

/// Geometry independent recurrence coefficients, tabulated for |m| <= n < 2p
///
/// ~~~
/// use pbam::{reexpansion::Recurrence, ReExpansionConstants};
/// let constants = ReExpansionConstants::new(3).unwrap();
/// assert_eq!(constants.get(Recurrence::A, 0, 2).unwrap(), 2.0);
/// assert!(constants.get(Recurrence::A, 5, 2).is_err());
/// ~~~
#[derive(Debug, Clone)]
pub struct ReExpansionConstants {
    order: usize,
    a: Vec<f64>,
    b: Vec<f64>,
    alpha: Vec<f64>,
    beta: Vec<f64>,
    nu: Vec<f64>,
    mu: Vec<f64>,
}

#[inline]
fn offset(m: isize, n: usize) -> usize {
    debug_assert!(m.unsigned_abs() <= n);
    n * n + (m + n as isize) as usize
}

impl ReExpansionConstants {
    pub fn new(order: usize) -> Result<Self> {
        check_order(order)?;
        let size = (2 * order) * (2 * order);
        let mut constants = Self {
            order,
            a: vec![0.0; size],
            b: vec![0.0; size],
            alpha: vec![0.0; size],
            beta: vec![0.0; size],
            nu: vec![0.0; size],
            mu: vec![0.0; size],
        };
        for n in 0..2 * order {
            let ni = n as isize;
            let odd = ((2 * ni - 1) * (2 * ni + 1)) as f64;
            for m in -ni..=ni {
                let i = offset(m, n);
                constants.a[i] = (((ni - m) * (ni + m)) as f64).sqrt();
                constants.b[i] = (((ni - m) * (ni - m - 1)) as f64).sqrt();
                constants.alpha[i] = (((ni + m + 1) * (ni - m + 1)) as f64).sqrt();
                constants.beta[i] = (((ni + m) * (ni - m)) as f64).sqrt() / odd;
                constants.nu[i] = (((ni - m + 1) * (ni - m)) as f64).sqrt();
                constants.mu[i] = (((ni + m + 1) * (ni + m)) as f64).sqrt() / odd;
            }
        }
        Ok(constants)
    }

    /// Truncation order the constants were tabulated for
    pub fn order(&self) -> usize {
        self.order
    }

    /// Coefficient of a family at (m,n); fails unless |m| <= n < 2p
    pub fn get(&self, family: Recurrence, m: isize, n: usize) -> Result<f64> {
        if n >= 2 * self.order || m.unsigned_abs() > n {
            return Err(PbError::IndexOutOfRange {
                n,
                m,
                order: 2 * self.order,
            });
        }
        let values = match family {
            Recurrence::A => &self.a,
            Recurrence::B => &self.b,
            Recurrence::Alpha => &self.alpha,
            Recurrence::Beta => &self.beta,
            Recurrence::Nu => &self.nu,
            Recurrence::Mu => &self.mu,
        };
        Ok(values[offset(m, n)])
    }

    // Unchecked lookups for the recurrences, which stay within |m| <= n < 2p

    pub(crate) fn a(&self, m: isize, n: usize) -> f64 {
        self.a[offset(m, n)]
    }
    pub(crate) fn b(&self, m: isize, n: usize) -> f64 {
        self.b[offset(m, n)]
    }
    pub(crate) fn alpha(&self, m: isize, n: usize) -> f64 {
        self.alpha[offset(m, n)]
    }
    pub(crate) fn beta(&self, m: isize, n: usize) -> f64 {
        self.beta[offset(m, n)]
    }
    pub(crate) fn nu(&self, m: isize, n: usize) -> f64 {
        self.nu[offset(m, n)]
    }
    pub(crate) fn mu(&self, m: isize, n: usize) -> f64 {
        self.mu[offset(m, n)]
    }
}

/// # Re-expansion operator for an ordered pair of molecules
///
/// Maps the multipole expansion of a source molecule onto the local expansion
/// around a target molecule displaced by `separation` from the source.
/// The operator depends only on the geometry and the medium so it is computed
/// once and applied in every iteration.
#[derive(Debug, Clone)]
pub struct ReExpansionOperator {
    order: usize,
    separation: SphericalPoint,
    rotation: RotationTable,
    translation: TranslationTable,
}

impl ReExpansionOperator {
    /// Operator for the displacement `separation` = target center - source center.
    ///
    /// `bessel` must hold at least 2p-1 degrees evaluated at κ|separation|, and
    /// `harmonics` must be able to evaluate 2p-1 degrees.
    pub fn new(
        order: usize,
        separation: &SphericalPoint,
        bessel: &BesselTable,
        kappa: f64,
        lambda: f64,
        constants: &ReExpansionConstants,
        harmonics: &SphericalHarmonics,
    ) -> Result<Self> {
        check_order(order)?;
        if constants.order() < order {
            return Err(PbError::InvalidArgument(format!(
                "re-expansion constants for order {} cannot serve order {}",
                constants.order(),
                order
            )));
        }
        if !(separation.r() > 0.0) {
            return Err(PbError::InvalidArgument(
                "re-expansion requires distinct centers".to_string(),
            ));
        }
        let argument = kappa * separation.r();
        if (bessel.argument() - argument).abs() > 1e-12 * argument {
            return Err(PbError::InvalidArgument(format!(
                "Bessel table evaluated at {} but the screened distance is {}",
                bessel.argument(),
                argument
            )));
        }
        let rotation = RotationTable::new(order, separation, constants, harmonics)?;
        let translation =
            TranslationTable::new(order, separation.r(), bessel, kappa, lambda, constants)?;
        Ok(Self {
            order,
            separation: *separation,
            rotation,
            translation,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }
    /// Displacement from the source to the target center
    pub fn separation(&self) -> &SphericalPoint {
        &self.separation
    }
    pub fn rotation(&self) -> &RotationTable {
        &self.rotation
    }
    pub fn translation(&self) -> &TranslationTable {
        &self.translation
    }

    /// Local expansion around the target produced by the multipoles of the source
    pub fn re_expand(&self, multipoles: &CoefficientTable) -> Result<CoefficientTable> {
        if multipoles.order() != self.order {
            return Err(PbError::InvalidArgument(format!(
                "cannot re-expand a table of order {} with an operator of order {}",
                multipoles.order(),
                self.order
            )));
        }
        let rotated = self.rotation.to_local_frame(multipoles);
        let translated = self.translation.translate(&rotated);
        Ok(self.rotation.from_local_frame(&translated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BesselEngine, Complex, Point};
    use approx::assert_relative_eq;

    fn operator(order: usize, displacement: Point, kappa: f64, lambda: f64) -> ReExpansionOperator {
        let separation = SphericalPoint::from_cartesian(displacement);
        let bessel = BesselEngine::new(2 * order)
            .unwrap()
            .evaluate(2 * order - 1, kappa * separation.r())
            .unwrap();
        let constants = ReExpansionConstants::new(order).unwrap();
        let harmonics = SphericalHarmonics::new(2 * order - 1).unwrap();
        ReExpansionOperator::new(order, &separation, &bessel, kappa, lambda, &constants, &harmonics)
            .unwrap()
    }

    #[test]
    fn constants() {
        let c = ReExpansionConstants::new(3).unwrap();
        assert_relative_eq!(c.a(1, 3), 8.0_f64.sqrt());
        assert_relative_eq!(c.b(-2, 4), 30.0_f64.sqrt());
        assert_eq!(c.b(4, 4), 0.0);
        assert_relative_eq!(c.alpha(0, 0), 1.0);
        assert_relative_eq!(c.beta(1, 2), 3.0_f64.sqrt() / 15.0);
        assert_eq!(c.beta(2, 2), 0.0);
        assert_relative_eq!(c.nu(0, 1), 2.0_f64.sqrt());
        assert_relative_eq!(c.mu(1, 5), 42.0_f64.sqrt() / 99.0);
        assert!(ReExpansionConstants::new(0).is_err());
    }

    #[test]
    fn constants_out_of_range() {
        let c = ReExpansionConstants::new(3).unwrap();
        assert_eq!(c.get(Recurrence::A, 1, 3).unwrap(), c.a(1, 3));
        assert_eq!(c.get(Recurrence::Mu, -4, 5).unwrap(), c.mu(-4, 5));
        // |m| > n must not alias another (m,n)
        let err = c.get(Recurrence::A, 5, 2).unwrap_err();
        assert_eq!(err, PbError::IndexOutOfRange { n: 2, m: 5, order: 6 });
        assert!(err.is_invalid_argument());
        assert!(c.get(Recurrence::B, -3, 2).is_err());
        // degrees are tabulated for n < 2p
        assert!(c.get(Recurrence::Nu, 0, 6).is_err());
        assert!(c.get(Recurrence::Alpha, 0, 5).is_ok());
    }

    #[test]
    fn coaxial_monopole() {
        // monopole at the source seen from a target on its z-axis
        let (kappa, lambda, t) = (0.3, 1.5, 4.0);
        let op = operator(3, Point::new(0.0, 0.0, t), kappa, lambda);
        let mut a = CoefficientTable::zeros(3);
        a.set(0, 0, Complex::new(2.0, 0.0)).unwrap();
        let l = op.re_expand(&a).unwrap();
        let decay = (-kappa * t).exp();
        assert_relative_eq!(l.get(0, 0).unwrap().re, 2.0 * decay / t, epsilon = 1e-12);
        assert_relative_eq!(
            l.get(1, 0).unwrap().re,
            -2.0 * lambda * decay * (1.0 + kappa * t) / (t * t),
            epsilon = 1e-12
        );
        assert_relative_eq!(l.get(1, 1).unwrap().norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn mismatched_input() {
        let op = operator(2, Point::new(1.0, 2.0, 3.0), 0.1, 1.0);
        assert!(op.re_expand(&CoefficientTable::zeros(3)).is_err());

        let separation = SphericalPoint::from_cartesian(Point::new(0.0, 0.0, 2.0));
        let engine = BesselEngine::new(4).unwrap();
        let constants = ReExpansionConstants::new(2).unwrap();
        let harmonics = SphericalHarmonics::new(3).unwrap();
        // wrong Bessel argument
        let bessel = engine.evaluate(3, 1.0).unwrap();
        assert!(ReExpansionOperator::new(2, &separation, &bessel, 0.1, 1.0, &constants, &harmonics)
            .is_err());
        // coinciding centers
        let origin = SphericalPoint::from_cartesian(Point::zeros());
        let bessel = engine.evaluate(3, 0.2).unwrap();
        assert!(ReExpansionOperator::new(2, &origin, &bessel, 0.1, 1.0, &constants, &harmonics)
            .is_err());
    }
}
