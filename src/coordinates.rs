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

use crate::Point;
use std::f64::consts::PI;

/// # Point with both euclidean and spherical coordinates
///
/// Both representations are computed once at construction and the value is
/// immutable afterwards. The polar angle, θ, is in [0, π] and the azimuthal
/// angle, φ, in (-π, π]. The origin maps to θ = φ = 0.
///
/// # Examples
/// ~~~
/// # use approx::assert_relative_eq;
/// use pbam::SphericalPoint;
/// let p = SphericalPoint::from_cartesian([0.0, 2.0, 0.0].into());
/// assert_relative_eq!(p.r(), 2.0);
/// assert_relative_eq!(p.theta(), std::f64::consts::FRAC_PI_2);
/// assert_relative_eq!(p.phi(), std::f64::consts::FRAC_PI_2);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPoint {
    cartesian: Point,
    r: f64,
    theta: f64,
    phi: f64,
}

impl SphericalPoint {
    /// From euclidean coordinates
    pub fn from_cartesian(cartesian: Point) -> Self {
        let (x, y, z) = (cartesian.x, cartesian.y, cartesian.z);
        // rounding may leave the norm slightly below |z|
        let r = cartesian.norm().max(z.abs());
        let theta = if r == 0.0 { 0.0 } else { (z / r).acos() };
        let phi = if x == 0.0 && y == 0.0 {
            0.0
        } else {
            y.atan2(x)
        };
        Self {
            cartesian,
            r,
            theta,
            phi,
        }
    }

    /// From radius, polar angle, and azimuthal angle
    pub fn from_spherical(r: f64, theta: f64, phi: f64) -> Self {
        let cartesian = Point::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        );
        Self {
            cartesian,
            r,
            theta,
            phi: wrap_angle(phi),
        }
    }

    /// Displacement vector `to - from`
    pub fn displacement(from: &Point, to: &Point) -> Self {
        Self::from_cartesian(to - from)
    }

    pub fn cartesian(&self) -> &Point {
        &self.cartesian
    }
    pub fn x(&self) -> f64 {
        self.cartesian.x
    }
    pub fn y(&self) -> f64 {
        self.cartesian.y
    }
    pub fn z(&self) -> f64 {
        self.cartesian.z
    }
    /// Radial distance
    pub fn r(&self) -> f64 {
        self.r
    }
    /// Polar angle
    pub fn theta(&self) -> f64 {
        self.theta
    }
    /// Azimuthal angle
    pub fn phi(&self) -> f64 {
        self.phi
    }
}

impl From<Point> for SphericalPoint {
    fn from(cartesian: Point) -> Self {
        Self::from_cartesian(cartesian)
    }
}

/// Map an angle onto (-π, π]
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}
