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

use super::ReExpansionConstants;
use crate::{check_order, BesselTable, CoefficientTable, PbError, Result};

/// # Coaxial translation coefficients S(m)(l,n)
///
/// Translating an outgoing harmonic of degree n by the distance t along z
/// gives local harmonics of the same order m,
///
/// $$ O_n^m(\mathbf{r} + t\hat{z}) = \sum_l S^{(m)}_{l,n} I_l^m(\mathbf{r}). $$
///
/// The coefficients are real, S(-m) = S(m), and S(m)(l,n) = (-1)^(l+n) S(m)(n,l).
/// Sector m is stored as a dense (p-m)×(p-m) block for m <= l,n < p.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    order: usize,
    starts: Vec<usize>,
    values: Vec<f64>,
}

impl TranslationTable {
    /// Translation by `distance` for degrees l,n < order
    ///
    /// `bessel` must hold k̂ₗ(κt) for l <= 2p-2 since raising n consumes
    /// one degree of l per step.
    pub fn new(
        order: usize,
        distance: f64,
        bessel: &BesselTable,
        kappa: f64,
        lambda: f64,
        constants: &ReExpansionConstants,
    ) -> Result<Self> {
        check_order(order)?;
        if !(distance > 0.0) || !(kappa > 0.0) || !(lambda > 0.0) {
            return Err(PbError::InvalidArgument(format!(
                "translation needs positive distance, κ and λ, got {}, {} and {}",
                distance, kappa, lambda
            )));
        }
        let rows = 2 * order - 1;
        if bessel.order() < rows {
            return Err(PbError::InvalidArgument(format!(
                "translation of order {} needs {} Bessel degrees, got {}",
                order,
                rows,
                bessel.order()
            )));
        }
        let p = order;
        let screening = (lambda * kappa).powi(2);
        let at = |l: usize, n: usize| l * p + n;

        // seed S(0)(l,0) = (-1)ˡ λˡ e^{-κt} k̂ₗ(κt) / tˡ⁺¹
        let mut work = vec![0.0; rows * p];
        let mut prefactor = (-kappa * distance).exp() / distance;
        for (l, k) in bessel.k_values().iter().take(rows).enumerate() {
            work[at(l, 0)] = prefactor * k;
            prefactor *= -lambda / distance;
        }

        let mut starts = Vec::with_capacity(p + 1);
        let mut values = Vec::new();
        for m in 0..p {
            let mi = m as isize;
            if m > 0 {
                let previous = std::mem::replace(&mut work, vec![0.0; rows * p]);
                let norm = ((2 * m - 1) as f64 * (2 * m) as f64).sqrt();
                for l in m..=(rows - 1 - m) {
                    work[at(l, m)] = (constants.nu(mi - 1, l) * previous[at(l + 1, m - 1)]
                        - screening * constants.mu(mi - 1, l) * previous[at(l - 1, m - 1)])
                        / norm;
                }
            }
            for n in m..p - 1 {
                for l in m..=(rows - 2 - n) {
                    let mut value = constants.alpha(mi, l) * work[at(l + 1, n)];
                    if l > m {
                        value += screening * constants.beta(mi, l) * work[at(l - 1, n)];
                    }
                    if n > m {
                        value += screening * constants.beta(mi, n) * work[at(l, n - 1)];
                    }
                    work[at(l, n + 1)] = -value / constants.alpha(mi, n);
                }
            }
            starts.push(values.len());
            for l in m..p {
                values.extend_from_slice(&work[at(l, m)..at(l, p)]);
            }
        }
        starts.push(values.len());

        if let Some(position) = values.iter().position(|value| !value.is_finite()) {
            return Err(PbError::NumericOverflow(format!(
                "translation coefficient {} over distance {} is not finite",
                position, distance
            )));
        }
        Ok(Self {
            order,
            starts,
            values,
        })
    }

    /// Number of degrees in the table
    pub fn order(&self) -> usize {
        self.order
    }

    /// Coefficient S(m)(l,n) for |m| <= l,n < order
    pub fn get(&self, m: isize, l: usize, n: usize) -> Result<f64> {
        let sector = m.unsigned_abs();
        if l >= self.order || n >= self.order || sector > l.min(n) {
            return Err(PbError::IndexOutOfRange {
                n: l.max(n),
                m,
                order: self.order,
            });
        }
        Ok(self.get_unchecked(sector, l, n))
    }

    #[inline]
    fn get_unchecked(&self, m: usize, l: usize, n: usize) -> f64 {
        let width = self.order - m;
        self.values[self.starts[m] + (l - m) * width + (n - m)]
    }

    /// Coaxial translation of an expansion given in the rotated frame,
    /// L'(l,s) = Σₙ S(s)(l,n) A'(n,s)
    pub fn translate(&self, table: &CoefficientTable) -> CoefficientTable {
        let order = table.order().min(self.order);
        let mut translated = CoefficientTable::zeros(order);
        for l in 0..order {
            for s in 0..=l {
                let value = (s..order)
                    .map(|n| self.get_unchecked(s, l, n) * table.get_unchecked(n, s))
                    .sum();
                translated.set_unchecked(l, s, value);
            }
        }
        translated
    }
}
