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

//! # Scaled modified spherical Bessel functions
//!
//! The re-expansion method works with the scaled functions of
//! [Lotan and Head-Gordon](https://doi.org/10.1021/ct050263p),
//!
//! $$ \hat{i}_n(z) = \frac{(2n+1)!!}{z^n} i_n(z), \qquad
//!    \hat{k}_n(z) = \frac{2}{\pi} \frac{z^{n+1} e^z}{(2n-1)!!} k_n(z) $$
//!
//! which are of order unity for small arguments, $\hat{i}_n(0) = \hat{k}_n(0) = 1$.
//! Both obey three-term recurrences with the argument independent prefactor
//! $c_n = 1 / ((2n+1)(2n-1))$:
//!
//! - $\hat{k}_{n+1} = \hat{k}_n + z^2 c_n \hat{k}_{n-1}$, stable upwards for all $z$.
//! - $\hat{i}_{n-1} = \hat{i}_n + z^2 c_{n+1} \hat{i}_{n+1}$, stable downwards and used when
//!   the order is large compared to $z$. When $z$ dominates the order the
//!   upward direction is safe and is seeded with the closed forms for $n = 0, 1$.

use crate::{PbError, Result};

/// Relative size of the last series term at which summation stops
const SERIES_EPSILON: f64 = 1e-17;
/// Number of series terms after which the series is considered divergent
const MAX_SERIES_TERMS: usize = 100_000;

/// Argument independent prefactors, c_n = 1 / ((2n+1)(2n-1)), for n = 0..order.
///
/// # Examples
/// ~~~
/// let c = pbam::bessel::constants(3).unwrap();
/// assert_eq!(c[0], -1.0);
/// assert_eq!(c[1], 1.0 / 3.0);
/// assert_eq!(c[2], 1.0 / 15.0);
/// ~~~
pub fn constants(order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Err(PbError::InvalidArgument(
            "number of Bessel constants must be positive".to_string(),
        ));
    }
    Ok((0..order)
        .map(|n| {
            let n = n as f64;
            1.0 / ((2.0 * n + 1.0) * (2.0 * n - 1.0))
        })
        .collect())
}

/// Scaled Bessel functions for a single argument
#[derive(Debug, Clone, PartialEq)]
pub struct BesselTable {
    argument: f64,
    i: Vec<f64>,
    k: Vec<f64>,
}

impl BesselTable {
    /// The argument, z, the table was evaluated at
    pub fn argument(&self) -> f64 {
        self.argument
    }
    /// Number of degrees in the table
    pub fn order(&self) -> usize {
        self.k.len()
    }
    fn check_degree(&self, n: usize) -> Result<()> {
        if n >= self.order() {
            return Err(PbError::IndexOutOfRange {
                n,
                m: 0,
                order: self.order(),
            });
        }
        Ok(())
    }
    /// Scaled function of the first kind, î_n(z)
    pub fn i(&self, n: usize) -> Result<f64> {
        self.check_degree(n)?;
        Ok(self.i[n])
    }
    /// Scaled function of the second kind, k̂_n(z)
    pub fn k(&self, n: usize) -> Result<f64> {
        self.check_degree(n)?;
        Ok(self.k[n])
    }
    /// All î_n(z)
    pub fn i_values(&self) -> &[f64] {
        &self.i
    }
    /// All k̂_n(z)
    pub fn k_values(&self) -> &[f64] {
        &self.k
    }
}

/// # Evaluator for scaled modified spherical Bessel functions
///
/// Holds the read-only recurrence prefactors up to a maximum order and is
/// otherwise stateless, so a single instance can be shared by reference
/// between any number of re-expansion computations.
///
/// # Examples
/// ~~~
/// # use approx::assert_relative_eq;
/// use pbam::BesselEngine;
/// let bessel = BesselEngine::new(4).unwrap();
/// let k = bessel.evaluate_k(4, 2.0).unwrap();
/// assert_relative_eq!(k[1], 3.0); // 1 + z
/// let i = bessel.evaluate_i(4, 2.0).unwrap();
/// assert_relative_eq!(i[0], 2.0_f64.sinh() / 2.0, epsilon = 1e-12);
/// ~~~
#[derive(Debug, Clone)]
pub struct BesselEngine {
    constants: Vec<f64>,
}

impl BesselEngine {
    /// New engine able to evaluate up to `max_order` degrees
    pub fn new(max_order: usize) -> Result<Self> {
        Ok(Self {
            constants: constants(max_order)?,
        })
    }

    /// Maximum number of degrees that can be evaluated
    pub fn max_order(&self) -> usize {
        self.constants.len()
    }

    /// Precomputed prefactors, c_n = 1 / ((2n+1)(2n-1))
    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    fn check_arguments(&self, order: usize, z: f64) -> Result<()> {
        if order == 0 {
            return Err(PbError::InvalidArgument(
                "Bessel order must be positive".to_string(),
            ));
        }
        if order > self.max_order() {
            return Err(PbError::InvalidArgument(format!(
                "Bessel order {} exceeds the engine capacity of {}",
                order,
                self.max_order()
            )));
        }
        if !(z > 0.0) || !z.is_finite() {
            return Err(PbError::InvalidArgument(format!(
                "Bessel argument must be positive and finite, got {}",
                z
            )));
        }
        Ok(())
    }

    /// Scaled modified spherical Bessel functions of the first kind, î_n(z) for n = 0..order
    pub fn evaluate_i(&self, order: usize, z: f64) -> Result<Vec<f64>> {
        self.check_arguments(order, z)?;
        let values = if z > order as f64 {
            self.upward_i(order, z)
        } else {
            self.downward_i(order, z)?
        };
        check_finite(&values, "î", z)?;
        Ok(values)
    }

    /// Scaled modified spherical Bessel functions of the second kind, k̂_n(z) for n = 0..order
    pub fn evaluate_k(&self, order: usize, z: f64) -> Result<Vec<f64>> {
        self.check_arguments(order, z)?;
        let z2 = z * z;
        let mut k = Vec::with_capacity(order);
        k.push(1.0);
        if order > 1 {
            k.push(1.0 + z);
        }
        for n in 2..order {
            k.push(k[n - 1] + z2 * k[n - 2] * self.constants[n - 1]);
        }
        check_finite(&k, "k̂", z)?;
        Ok(k)
    }

    /// Both kinds evaluated at the same argument
    pub fn evaluate(&self, order: usize, z: f64) -> Result<BesselTable> {
        Ok(BesselTable {
            argument: z,
            i: self.evaluate_i(order, z)?,
            k: self.evaluate_k(order, z)?,
        })
    }

    /// Upward recurrence from the closed forms of î_0 and î_1; requires z > order
    fn upward_i(&self, order: usize, z: f64) -> Vec<f64> {
        let z2 = z * z;
        let mut i = Vec::with_capacity(order);
        i.push(z.sinh() / z);
        if order > 1 {
            i.push(3.0 * (z * z.cosh() - z.sinh()) / (z2 * z));
        }
        for n in 1..order - 1 {
            let next = (i[n - 1] - i[n]) / (z2 * self.constants[n + 1]);
            i.push(next);
        }
        i
    }

    /// Downward recurrence seeded by the power series of the two highest degrees
    fn downward_i(&self, order: usize, z: f64) -> Result<Vec<f64>> {
        let z2 = z * z;
        let mut i = vec![0.0; order];
        i[order - 1] = series_i(order - 1, z)?;
        if order > 1 {
            i[order - 2] = series_i(order - 2, z)?;
        }
        for n in (0..order.saturating_sub(2)).rev() {
            i[n] = i[n + 1] + z2 * i[n + 2] * self.constants[n + 2];
        }
        Ok(i)
    }
}

/// Power series, î_n(z) = Σₖ (z²/2)ᵏ / (k! (2n+3)(2n+5)···(2n+2k+1)), all terms positive
fn series_i(n: usize, z: f64) -> Result<f64> {
    let half_z2 = 0.5 * z * z;
    let two_n = 2.0 * n as f64;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..MAX_SERIES_TERMS {
        let k = k as f64;
        term *= half_z2 / (k * (two_n + 2.0 * k + 1.0));
        sum += term;
        if term < SERIES_EPSILON * sum {
            return Ok(sum);
        }
    }
    Err(PbError::NumericInstability(format!(
        "power series for î_{}({}) did not converge",
        n, z
    )))
}

fn check_finite(values: &[f64], name: &str, z: f64) -> Result<()> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(n) => Err(PbError::NumericOverflow(format!(
            "{}_{}({}) is not finite",
            name, n, z
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use approx::assert_relative_eq;

    const ORDER: usize = 10;
    const PRECISION: f64 = 1e-4;

    #[test]
    fn prefactors() {
        let expected = [
            -1.0, 0.33333333, 0.06666667, 0.02857143, 0.01587302, 0.01010101, 0.00699301,
            0.00512821, 0.00392157, 0.00309598,
        ];
        let bessel = BesselEngine::new(ORDER).unwrap();
        assert_eq!(bessel.max_order(), ORDER);
        for (c, e) in bessel.constants().iter().zip(expected) {
            assert_abs_diff_eq!(*c, e, epsilon = PRECISION);
        }
    }

    #[test]
    fn tabulated_values() {
        let i1 = [
            1.17520119e+00, 1.10363832e+00, 1.07344305e+00, 1.05683451e+00, 1.04633846e+00,
            1.03910889e+00, 1.03382786e+00, 1.02980185e+00, 1.02663135e+00, 1.02407006e+00,
        ];
        let i10 = [
            1.10132329e+03, 2.97357289e+02, 1.20594900e+02, 6.18668362e+01, 3.69986800e+01,
            2.46194746e+01, 1.77022637e+01, 1.34885612e+01, 1.07449415e+01, 8.86189182e+00,
        ];
        let k1 = [
            1.00000000e+00, 2.00000000e+00, 2.33333333e+00, 2.46666667e+00, 2.53333333e+00,
            2.57248677e+00, 2.59807600e+00, 2.61606542e+00, 2.62938888e+00, 2.63964796e+00,
        ];
        let k10 = [
            1.00000000e+00, 1.10000000e+01, 4.43333333e+01, 1.17666667e+02, 2.44333333e+02,
            4.31105820e+02, 6.77907167e+02, 9.79379768e+02, 1.32702447e+03, 1.71109497e+03,
        ];
        let bessel = BesselEngine::new(ORDER).unwrap();
        let cases = [
            (bessel.evaluate_i(ORDER, 1.0).unwrap(), i1),
            (bessel.evaluate_i(ORDER, 10.0).unwrap(), i10),
            (bessel.evaluate_k(ORDER, 1.0).unwrap(), k1),
            (bessel.evaluate_k(ORDER, 10.0).unwrap(), k10),
        ];
        for (calculated, expected) in cases {
            assert_eq!(calculated.len(), ORDER);
            for (c, e) in calculated.iter().zip(expected) {
                assert_abs_diff_eq!(*c, e, epsilon = PRECISION);
            }
        }
    }

    #[test]
    fn closed_forms() {
        let bessel = BesselEngine::new(4).unwrap();
        for z in [0.01, 0.3, 2.5, 7.0, 30.0] {
            let table = bessel.evaluate(4, z).unwrap();
            assert_eq!(table.argument(), z);
            assert_eq!(table.order(), 4);
            assert_relative_eq!(table.i(0).unwrap(), z.sinh() / z, max_relative = 1e-12);
            assert_relative_eq!(table.k(1).unwrap(), 1.0 + z, max_relative = 1e-14);
            assert_relative_eq!(table.k(2).unwrap(), 1.0 + z + z * z / 3.0, max_relative = 1e-14);
        }
    }

    #[test]
    fn table_out_of_range() {
        let table = BesselEngine::new(4).unwrap().evaluate(3, 1.0).unwrap();
        assert_eq!(table.k(2).unwrap(), table.k_values()[2]);
        assert_eq!(
            table.k(5).unwrap_err(),
            PbError::IndexOutOfRange { n: 5, m: 0, order: 3 }
        );
        assert!(table.i(3).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn recurrence_directions_agree() {
        // z = 4.5 is evaluated upwards with order 4 and downwards with order 10
        let bessel = BesselEngine::new(ORDER).unwrap();
        let upward = bessel.evaluate_i(4, 4.5).unwrap();
        let downward = bessel.evaluate_i(ORDER, 4.5).unwrap();
        for n in 0..4 {
            assert_relative_eq!(upward[n], downward[n], max_relative = 1e-10);
        }
    }

    #[test]
    fn small_argument_limit() {
        let bessel = BesselEngine::new(ORDER).unwrap();
        let table = bessel.evaluate(ORDER, 1e-8).unwrap();
        for n in 0..ORDER {
            assert_relative_eq!(table.i(n).unwrap(), 1.0, max_relative = 1e-12);
            assert_relative_eq!(table.k(n).unwrap(), 1.0, max_relative = 1e-7);
        }
    }

    #[test]
    fn invalid_arguments() {
        let bessel = BesselEngine::new(ORDER).unwrap();
        assert!(matches!(
            bessel.evaluate_i(ORDER, 0.0),
            Err(PbError::InvalidArgument(_))
        ));
        assert!(matches!(
            bessel.evaluate_k(ORDER, -1.0),
            Err(PbError::InvalidArgument(_))
        ));
        assert!(matches!(
            bessel.evaluate_i(0, 1.0),
            Err(PbError::InvalidArgument(_))
        ));
        assert!(matches!(
            bessel.evaluate_k(ORDER + 1, 1.0),
            Err(PbError::InvalidArgument(_))
        ));
        assert!(matches!(
            bessel.evaluate_i(ORDER, f64::NAN),
            Err(PbError::InvalidArgument(_))
        ));
        assert!(BesselEngine::new(0).is_err());
    }

    #[test]
    fn overflow_is_reported() {
        let bessel = BesselEngine::new(ORDER).unwrap();
        assert!(matches!(
            bessel.evaluate_i(ORDER, 800.0),
            Err(PbError::NumericOverflow(_))
        ));
        assert!(matches!(
            bessel.evaluate_k(ORDER, 1e200),
            Err(PbError::NumericOverflow(_))
        ));
    }
}
