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

//! # Molecules and input
//!
//! Molecules are rigid, low-dielectric spheres holding point charges. Positions
//! of the charges are relative to the molecular center. A complete calculation
//! is described by an [`Input`] read from YAML:
//!
//! ~~~ yaml
//! medium:
//!   temperature: 298.15
//!   eps_p: 4.0
//!   eps_s: 78.0
//!   molarity: 0.05
//! solver:
//!   order: 5
//!   tolerance: 1.0e-6
//! molecules:
//!   - name: cation
//!     center: [0.0, 0.0, 0.0]
//!     radius: 3.0
//!     charges:
//!       - { position: [0.0, 0.0, 1.0], value: 1.0 }
//! ~~~

use crate::{medium::Medium, solver::SolverSettings, Point};
use anyhow::Context;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};
use validator::{Validate, ValidationError};

/// Point charge inside a molecule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(deny_unknown_fields)]
pub struct Charge {
    /// Position relative to the molecular center (Å)
    position: Point,
    /// Charge number
    value: f64,
}

impl Charge {
    pub fn new(position: Point, value: f64) -> Self {
        Self { position, value }
    }
}

/// Spherical molecule with fixed point charges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_molecule"))]
pub struct Molecule {
    /// Optional name used in output
    #[serde(default)]
    name: Option<String>,
    /// Center of the sphere
    center: Point,
    /// Radius of the sphere (Å)
    radius: f64,
    /// Charges inside the sphere
    #[serde(default)]
    charges: Vec<Charge>,
}

fn validate_molecule(molecule: &Molecule) -> Result<(), ValidationError> {
    if !(molecule.radius > 0.0) {
        return Err(ValidationError::new("molecular radius must be positive"));
    }
    // the multipole expansion converges only for charges within the sphere
    if molecule
        .charges
        .iter()
        .any(|charge| !(charge.position.norm() <= molecule.radius))
    {
        return Err(ValidationError::new("charge outside molecular sphere"));
    }
    Ok(())
}

impl Molecule {
    pub fn new(center: Point, radius: f64, charges: Vec<Charge>) -> Self {
        Self {
            name: None,
            center,
            radius,
            charges,
        }
    }

    /// Sphere with a single charge at its center
    pub fn with_central_charge(value: f64, radius: f64, center: Point) -> Self {
        Self::new(center, radius, vec![Charge::new(Point::zeros(), value)])
    }

    /// Set the name used in output
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Net charge of the molecule
    pub fn net_charge(&self) -> f64 {
        self.charges.iter().map(|charge| charge.value).sum()
    }
}

/// Collection of molecules solved together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Validate)]
#[validate(schema(function = "validate_system"))]
pub struct System {
    #[validate(nested)]
    molecules: Vec<Molecule>,
}

fn validate_system(system: &System) -> Result<(), ValidationError> {
    for (i, a) in system.molecules.iter().enumerate() {
        for b in system.molecules.iter().skip(i + 1) {
            if (a.center - b.center).norm() < a.radius + b.radius {
                return Err(ValidationError::new("overlapping molecules"));
            }
        }
    }
    Ok(())
}

impl System {
    pub fn new(molecules: Vec<Molecule>) -> Self {
        Self { molecules }
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// Mean molecular radius; used as the default length scale
    pub fn mean_radius(&self) -> Option<f64> {
        if self.molecules.is_empty() {
            return None;
        }
        Some(self.molecules.iter().map(|m| m.radius).sum::<f64>() / self.molecules.len() as f64)
    }
}

/// Complete calculation read from YAML
#[derive(Debug, Clone, Serialize, Deserialize, Getters, Validate)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[validate(nested)]
    medium: Medium,
    solver: SolverSettings,
    #[validate(nested)]
    molecules: Vec<Molecule>,
}

impl FromStr for Input {
    type Err = anyhow::Error;

    /// Parse and validate a yaml-formatted string
    fn from_str(string: &str) -> anyhow::Result<Self> {
        let input = serde_yaml::from_str::<Input>(string)?;
        input.validate()?;
        input.solver.check()?;
        System::new(input.molecules.clone()).validate()?;
        Ok(input)
    }
}

impl Input {
    /// Read and validate a yaml file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Could not open input file {}", path.display()))?;
        Self::from_str(&yaml).with_context(|| format!("Invalid input in {}", path.display()))
    }

    /// The molecules as a system
    pub fn system(&self) -> System {
        System::new(self.molecules.clone())
    }
}
