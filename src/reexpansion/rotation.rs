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
use crate::{check_order, CoefficientTable, Complex, PbError, Result, SphericalHarmonics, SphericalPoint};

/// # Rotation coefficients R(n)(s,m)
///
/// For the rotation Q taking the z-axis onto the direction û,
/// a harmonic in the rotated frame is expanded in the laboratory harmonics as
///
/// $$ Y_n^s(Q^T\mathbf{r}) = \sum_{m=-n}^{n} R^{(n)}_{s,m} Y_n^m(\mathbf{r}). $$
///
/// Only rows s >= 0 are stored, in one flat array ordered by degree;
/// negative rows follow from R(n)(-s,-m) = conj(R(n)(s,m)).
/// Each block R(n) is unitary.
#[derive(Debug, Clone)]
pub struct RotationTable {
    order: usize,
    values: Vec<Complex>,
}

/// First element of degree n, Σₖ (k+1)(2k+1) for k < n
#[inline]
fn degree_start(n: usize) -> usize {
    n * (n + 1) * (4 * n).saturating_sub(1) / 6
}

#[inline]
fn index(n: usize, s: usize, m: isize) -> usize {
    degree_start(n) + s * (2 * n + 1) + (m + n as isize) as usize
}

#[inline]
fn sign(k: isize) -> f64 {
    if k >= 0 {
        1.0
    } else {
        -1.0
    }
}

impl RotationTable {
    /// Rotation onto the direction of `direction` for degrees n < order
    ///
    /// The recurrence lowers the degree by one for every row, so it is seeded
    /// with the harmonics of degrees up to 2p-2.
    pub fn new(
        order: usize,
        direction: &SphericalPoint,
        constants: &ReExpansionConstants,
        harmonics: &SphericalHarmonics,
    ) -> Result<Self> {
        check_order(order)?;
        let top = 2 * order - 2;
        if harmonics.order() <= top {
            return Err(PbError::InvalidArgument(format!(
                "rotation of order {} needs harmonics of order {}, got {}",
                order,
                top + 1,
                harmonics.order()
            )));
        }
        if constants.order() < order {
            return Err(PbError::InvalidArgument(format!(
                "re-expansion constants for order {} cannot serve order {}",
                constants.order(),
                order
            )));
        }
        let (theta, phi) = (direction.theta(), direction.phi());
        let (sin_theta, cos_theta) = theta.sin_cos();
        let plus = 0.5 * (1.0 + cos_theta) * Complex::from_polar(1.0, -phi);
        let minus = 0.5 * (1.0 - cos_theta) * Complex::from_polar(1.0, phi);

        let y = harmonics.evaluate(theta, phi);
        let mut values = vec![Complex::default(); degree_start(top + 1)];
        for n in 0..=top {
            for m in -(n as isize)..=n as isize {
                values[index(n, 0, m)] = y.get_signed(n, m).conj();
            }
        }
        for s in 0..order.saturating_sub(1) {
            let si = s as isize;
            for n in (s + 2)..=(top - s) {
                let ni = n as isize;
                let scale = sign(si) / constants.b(si, n);
                for m in -(ni - 1)..=(ni - 1) {
                    let value = sin_theta * constants.a(m, n) * values[index(n, s, m)]
                        + plus * sign(m - 1) * constants.b(m - 1, n) * values[index(n, s, m - 1)]
                        - minus
                            * sign(-m - 1)
                            * constants.b(-m - 1, n)
                            * values[index(n, s, m + 1)];
                    values[index(n - 1, s + 1, m)] = scale * value;
                }
            }
        }
        values.truncate(degree_start(order));
        Ok(Self { order, values })
    }

    /// Number of degrees in the table
    pub fn order(&self) -> usize {
        self.order
    }

    /// Coefficient R(n)(s,m) for |s|, |m| <= n < order
    pub fn get(&self, n: usize, s: isize, m: isize) -> Result<Complex> {
        if n >= self.order || s.unsigned_abs() > n || m.unsigned_abs() > n {
            return Err(PbError::IndexOutOfRange { n, m, order: self.order });
        }
        Ok(self.get_signed(n, s, m))
    }

    #[inline]
    fn get_signed(&self, n: usize, s: isize, m: isize) -> Complex {
        if s < 0 {
            self.values[index(n, s.unsigned_abs(), -m)].conj()
        } else {
            self.values[index(n, s as usize, m)]
        }
    }

    /// Coefficients of the same expansion in the rotated frame,
    /// A'(n,s) = Σₘ A(n,m) conj(R(n)(s,m))
    pub fn to_local_frame(&self, table: &CoefficientTable) -> CoefficientTable {
        let order = table.order().min(self.order);
        let mut rotated = CoefficientTable::zeros(order);
        for n in 0..order {
            let ni = n as isize;
            for s in 0..=n {
                let value = (-ni..=ni)
                    .map(|m| table.get_signed(n, m) * self.get_signed(n, s as isize, m).conj())
                    .sum();
                rotated.set_unchecked(n, s, value);
            }
        }
        rotated
    }

    /// Inverse of [`RotationTable::to_local_frame`],
    /// L(n,m) = Σₛ L'(n,s) R(n)(s,m)
    pub fn from_local_frame(&self, table: &CoefficientTable) -> CoefficientTable {
        let order = table.order().min(self.order);
        let mut rotated = CoefficientTable::zeros(order);
        for n in 0..order {
            let ni = n as isize;
            for m in 0..=n {
                let value = (-ni..=ni)
                    .map(|s| table.get_signed(n, s) * self.get_signed(n, s, m as isize))
                    .sum();
                rotated.set_unchecked(n, m, value);
            }
        }
        rotated
    }
}
