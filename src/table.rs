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

//! # Complex coefficient tables indexed by degree and order
//!
//! All multipole and local expansions, as well as the spherical harmonics,
//! are stored as triangular tables holding only the non-negative orders,
//! m = 0..=n, for each degree n < order. Negative orders are read through
//! the conjugate symmetry X(n,-m) = conj(X(n,m)).

use crate::{Complex, PbError, Result};
use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Sub};

/// Values below this magnitude are printed as zero
const PRINT_THRESHOLD: f64 = 1e-9;

/// Triangular complex table with conjugate symmetry in the order index
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    order: usize,
    values: Vec<Complex>,
}

#[inline]
fn offset(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

impl CoefficientTable {
    /// Table of zeros holding degrees 0..order
    pub fn zeros(order: usize) -> Self {
        Self {
            order,
            values: vec![Complex::default(); offset(order, 0)],
        }
    }

    /// Number of degrees in the table
    pub fn order(&self) -> usize {
        self.order
    }

    fn check_index(&self, n: usize, m: isize) -> Result<()> {
        if n >= self.order || m.unsigned_abs() > n {
            return Err(PbError::IndexOutOfRange {
                n,
                m,
                order: self.order,
            });
        }
        Ok(())
    }

    /// Coefficient (n,m) for -n <= m <= n
    pub fn get(&self, n: usize, m: isize) -> Result<Complex> {
        self.check_index(n, m)?;
        Ok(self.get_signed(n, m))
    }

    /// Set coefficient (n,m). Setting a negative order stores the conjugate at (n,|m|).
    pub fn set(&mut self, n: usize, m: isize, value: Complex) -> Result<()> {
        self.check_index(n, m)?;
        if m < 0 {
            self.set_unchecked(n, m.unsigned_abs(), value.conj());
        } else {
            self.set_unchecked(n, m as usize, value);
        }
        Ok(())
    }

    /// Coefficient for a non-negative order that is known to be in range
    #[inline]
    pub(crate) fn get_unchecked(&self, n: usize, m: usize) -> Complex {
        self.values[offset(n, m)]
    }

    #[inline]
    pub(crate) fn set_unchecked(&mut self, n: usize, m: usize, value: Complex) {
        self.values[offset(n, m)] = value;
    }

    /// Coefficient for a signed order that is known to be in range
    #[inline]
    pub(crate) fn get_signed(&self, n: usize, m: isize) -> Complex {
        let value = self.get_unchecked(n, m.unsigned_abs());
        if m < 0 {
            value.conj()
        } else {
            value
        }
    }

    /// Iterator over stored `(n, m, value)` with m >= 0
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Complex)> + '_ {
        (0..self.order)
            .flat_map(|n| (0..=n).map(move |m| (n, m)))
            .zip(self.values.iter())
            .map(|((n, m), value)| (n, m, *value))
    }

    /// Multiply every coefficient of degree n by `factor(n)`
    pub fn scale_degrees(&mut self, factor: impl Fn(usize) -> f64) {
        for n in 0..self.order {
            let f = factor(n);
            self.values[offset(n, 0)..offset(n + 1, 0)]
                .iter_mut()
                .for_each(|value| *value *= f);
        }
    }

    fn check_same_order(&self, other: &Self) -> Result<()> {
        if self.order != other.order {
            return Err(PbError::InvalidArgument(format!(
                "coefficient tables differ in order ({} vs. {})",
                self.order, other.order
            )));
        }
        Ok(())
    }

    /// Inner product summed over all degrees and signed orders,
    /// ⟨U,V⟩ = Σₙ Σₘ U(n,m) conj(V(n,m)), with m = -n..=n.
    ///
    /// # Examples
    /// ~~~
    /// use pbam::{CoefficientTable, Complex};
    /// let mut u = CoefficientTable::zeros(2);
    /// u.set(1, 1, Complex::new(0.0, 2.0)).unwrap();
    /// assert_eq!(u.inner_product(&u).unwrap(), Complex::new(8.0, 0.0));
    /// ~~~
    pub fn inner_product(&self, other: &Self) -> Result<Complex> {
        self.check_same_order(other)?;
        Ok(self
            .iter()
            .zip(other.values.iter())
            .map(|((_, m, u), v)| {
                let product = u * v.conj();
                match m {
                    0 => product,
                    // m and -m together give twice the real part
                    _ => Complex::new(2.0 * product.re, 0.0),
                }
            })
            .sum())
    }

    /// Norm induced by the inner product
    pub fn norm(&self) -> f64 {
        self.iter()
            .map(|(_, m, value)| match m {
                0 => value.norm_sqr(),
                _ => 2.0 * value.norm_sqr(),
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Rows of `(re, im)` pairs, one row per degree with m = -n..=n
    pub fn rows(&self) -> Vec<Vec<(f64, f64)>> {
        (0..self.order)
            .map(|n| {
                (-(n as isize)..=n as isize)
                    .map(|m| {
                        let value = self.get_signed(n, m);
                        (value.re, value.im)
                    })
                    .collect()
            })
            .collect()
    }
}

impl AddAssign<&CoefficientTable> for CoefficientTable {
    fn add_assign(&mut self, other: &CoefficientTable) {
        assert_eq!(self.order, other.order, "coefficient tables differ in order");
        self.values
            .iter_mut()
            .zip(other.values.iter())
            .for_each(|(a, b)| *a += b);
    }
}

impl Add for &CoefficientTable {
    type Output = CoefficientTable;
    fn add(self, other: &CoefficientTable) -> CoefficientTable {
        let mut sum = self.clone();
        sum += other;
        sum
    }
}

impl Sub for &CoefficientTable {
    type Output = CoefficientTable;
    fn sub(self, other: &CoefficientTable) -> CoefficientTable {
        assert_eq!(self.order, other.order, "coefficient tables differ in order");
        CoefficientTable {
            order: self.order,
            values: self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| a - b)
                .collect(),
        }
    }
}

impl Display for CoefficientTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clip = |x: f64| if x.abs() > PRINT_THRESHOLD { x } else { 0.0 };
        for row in self.rows() {
            for (re, im) in row {
                write!(f, "({},{})  ", clip(re), clip(im))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
