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

//! # Spherical harmonics
//!
//! Harmonics are Schmidt semi-normalized and without the Condon-Shortley phase,
//!
//! $$ Y_n^m(\theta, \phi) = \sqrt{\frac{(n-|m|)!}{(n+|m|)!}} P_n^{|m|}(\cos\theta) e^{im\phi} $$
//!
//! so that $Y_n^{-m} = \overline{Y_n^m}$, $Y_0^0 = 1$, and the addition theorem reads
//! $P_n(\hat{a}\cdot\hat{b}) = \sum_m Y_n^m(\hat{a})\overline{Y_n^m(\hat{b})}$.

use crate::{table::CoefficientTable, Complex, PbError, Result, SphericalPoint};

/// Triangular table of harmonics, Y(n,m), for 0 <= n < order
pub type HarmonicTable = CoefficientTable;

/// Evaluator for spherical harmonics up to a fixed order
#[derive(Debug, Clone)]
pub struct SphericalHarmonics {
    order: usize,
}

impl SphericalHarmonics {
    /// Engine for degrees n < order
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 {
            return Err(PbError::InvalidArgument(
                "number of harmonic degrees must be positive".to_string(),
            ));
        }
        Ok(Self { order })
    }

    /// Number of degrees evaluated
    pub fn order(&self) -> usize {
        self.order
    }

    /// Harmonics for the direction given by the polar and azimuthal angles
    ///
    /// # Examples
    /// ~~~
    /// # use approx::assert_relative_eq;
    /// use pbam::SphericalHarmonics;
    /// let y = SphericalHarmonics::new(3).unwrap().evaluate(0.0, 0.0);
    /// assert_relative_eq!(y.get(2, 0).unwrap().re, 1.0);
    /// assert_relative_eq!(y.get(2, 1).unwrap().norm(), 0.0);
    /// ~~~
    pub fn evaluate(&self, theta: f64, phi: f64) -> HarmonicTable {
        let legendre = normalized_legendre(self.order, theta.cos(), theta.sin());
        let mut table = CoefficientTable::zeros(self.order);
        for n in 0..self.order {
            for m in 0..=n {
                let value = Complex::from_polar(legendre[legendre_index(n, m)], m as f64 * phi);
                table.set_unchecked(n, m, value);
            }
        }
        table
    }

    /// Harmonics for the direction of a point
    pub fn evaluate_at(&self, point: &SphericalPoint) -> HarmonicTable {
        self.evaluate(point.theta(), point.phi())
    }
}

#[inline]
fn legendre_index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

/// Schmidt semi-normalized associated Legendre functions, P̃(n,m), 0 <= m <= n < order
fn normalized_legendre(order: usize, cos_theta: f64, sin_theta: f64) -> Vec<f64> {
    let mut p = vec![0.0; order * (order + 1) / 2];
    p[0] = 1.0;
    for m in 0..order {
        if m > 0 {
            let mf = m as f64;
            p[legendre_index(m, m)] = p[legendre_index(m - 1, m - 1)]
                * sin_theta
                * ((2.0 * mf - 1.0) / (2.0 * mf)).sqrt();
        }
        if m + 1 < order {
            p[legendre_index(m + 1, m)] =
                (2.0 * m as f64 + 1.0).sqrt() * cos_theta * p[legendre_index(m, m)];
        }
        for n in (m + 2)..order {
            let (nf, mf) = (n as f64, m as f64);
            p[legendre_index(n, m)] = ((2.0 * nf - 1.0) * cos_theta * p[legendre_index(n - 1, m)]
                - ((nf + mf - 1.0) * (nf - mf - 1.0)).sqrt() * p[legendre_index(n - 2, m)])
                / ((nf - mf) * (nf + mf)).sqrt();
        }
    }
    p
}
