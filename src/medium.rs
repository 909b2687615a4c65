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

//! # Dielectric medium and electrolyte screening
//!
//! Provides the permittivities of the molecular interior and of the solvent,
//! together with the screening parameter κ = 1/λ𝐷 of a 1:1 salt solution.

use crate::{PbError, Result};
use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::{self, Display, Formatter};
use validator::{Validate, ValidationError};

const ANGSTROM_PER_METER: f64 = 1e10;
const LITER_PER_ANGSTROM3: f64 = 1e-27;

/// Calculates the Bjerrum length, λ𝐵 = e²/4πε𝑘𝑇 (ångström).
///
/// # Examples
/// ~~~
/// # use approx::assert_relative_eq;
/// use pbam::medium::bjerrum_length;
/// assert_relative_eq!(bjerrum_length(293.0, 80.0), 7.1288799871283, epsilon = 1e-10);
/// ~~~
pub fn bjerrum_length(kelvin: f64, relative_permittivity: f64) -> f64 {
    ELEMENTARY_CHARGE * ELEMENTARY_CHARGE * ANGSTROM_PER_METER
        / (4.0
            * PI
            * relative_permittivity
            * VACUUM_ELECTRIC_PERMITTIVITY
            * BOLTZMANN_CONSTANT
            * kelvin)
}

/// Calculates the Debye length in angstrom, λ𝐷 = 1/√(8π·λ𝐵·𝐼·𝑁𝐴·𝑉), where 𝐼 is the ionic strength in mol/l.
///
/// # Examples
/// ~~~
/// # use approx::assert_relative_eq;
/// use pbam::medium::debye_length;
/// assert_relative_eq!(debye_length(293.0, 80.0, 0.03), 17.576538097378368, epsilon = 1e-10);
/// ~~~
pub fn debye_length(kelvin: f64, relative_permittivity: f64, ionic_strength: f64) -> f64 {
    (8.0 * PI
        * bjerrum_length(kelvin, relative_permittivity)
        * ionic_strength
        * AVOGADRO_CONSTANT
        * LITER_PER_ANGSTROM3)
        .sqrt()
        .recip()
}

/// # Dielectric medium surrounding the molecules
///
/// The solvent contains an optional 1:1 salt which sets the screening. The
/// screening parameter may also be given directly which then takes precedence.
///
/// ~~~
/// # use approx::assert_relative_eq;
/// use pbam::Medium;
/// let medium = Medium::new(298.15, 4.0, 80.0, Some(0.1));
/// assert_relative_eq!(medium.permittivity_ratio(), 0.05);
/// assert_relative_eq!(medium.debye_length().unwrap(), 9.711, epsilon = 0.01);
/// assert_relative_eq!(medium.kappa().unwrap(), 1.0 / medium.debye_length().unwrap());
/// ~~~
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_medium"))]
pub struct Medium {
    /// Temperature in Kelvin
    temperature: f64,
    /// Relative permittivity inside the molecules, ε𝑝
    #[serde(alias = "eps_p")]
    protein_permittivity: f64,
    /// Relative permittivity of the solvent, ε𝑠
    #[serde(alias = "eps_s")]
    solvent_permittivity: f64,
    /// Molarity of a 1:1 salt (mol/l)
    #[serde(default)]
    molarity: Option<f64>,
    /// Explicit inverse Debye length (1/Å)
    #[serde(default)]
    kappa: Option<f64>,
}

fn validate_medium(medium: &Medium) -> std::result::Result<(), ValidationError> {
    if !(medium.temperature > 0.0) {
        return Err(ValidationError::new("temperature must be positive"));
    }
    if !(medium.protein_permittivity > 0.0 && medium.solvent_permittivity > 0.0) {
        return Err(ValidationError::new("permittivities must be positive"));
    }
    if medium.molarity.is_some_and(|molarity| !(molarity >= 0.0)) {
        return Err(ValidationError::new("molarity must be non-negative"));
    }
    if medium.kappa.is_some_and(|kappa| !(kappa > 0.0)) {
        return Err(ValidationError::new("kappa must be positive"));
    }
    Ok(())
}

impl Medium {
    /// Medium with a 1:1 salt of the given molarity, if any
    pub fn new(
        temperature: f64,
        protein_permittivity: f64,
        solvent_permittivity: f64,
        molarity: Option<f64>,
    ) -> Self {
        Self {
            temperature,
            protein_permittivity,
            solvent_permittivity,
            molarity,
            kappa: None,
        }
    }

    /// Medium with an explicit screening parameter
    pub fn with_kappa(
        temperature: f64,
        protein_permittivity: f64,
        solvent_permittivity: f64,
        kappa: f64,
    ) -> Self {
        Self {
            kappa: Some(kappa),
            ..Self::new(temperature, protein_permittivity, solvent_permittivity, None)
        }
    }

    /// Temperature in Kelvin
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
    pub fn protein_permittivity(&self) -> f64 {
        self.protein_permittivity
    }
    pub fn solvent_permittivity(&self) -> f64 {
        self.solvent_permittivity
    }
    /// Ratio ε𝑝/ε𝑠 entering the boundary conditions
    pub fn permittivity_ratio(&self) -> f64 {
        self.protein_permittivity / self.solvent_permittivity
    }
    /// Salt molarity, if any
    pub fn molarity(&self) -> Option<f64> {
        self.molarity
    }
    /// Ionic strength in mol/l; equals the molarity of a 1:1 salt
    pub fn ionic_strength(&self) -> Option<f64> {
        self.molarity.filter(|molarity| *molarity > 0.0)
    }
    /// Bjerrum length of the solvent in angstrom
    pub fn bjerrum_length(&self) -> f64 {
        bjerrum_length(self.temperature, self.solvent_permittivity)
    }

    /// Debye length in angstrom or `None` in the absence of screening
    pub fn debye_length(&self) -> Option<f64> {
        match self.kappa {
            Some(kappa) => Some(kappa.recip()),
            None => self
                .ionic_strength()
                .map(|i| debye_length(self.temperature, self.solvent_permittivity, i)),
        }
    }

    /// Screening parameter κ = 1/λ𝐷 (1/Å). Unscreened media are rejected.
    pub fn kappa(&self) -> Result<f64> {
        match self.debye_length() {
            Some(debye_length) if debye_length.is_finite() && debye_length > 0.0 => {
                Ok(debye_length.recip())
            }
            _ => Err(PbError::InvalidArgument(
                "the screening parameter must be positive; add salt or set kappa".to_string(),
            )),
        }
    }
}

impl Display for Medium {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Medium: 𝑇 = {:.2} K, ε𝑝 = {:.1}, ε𝑠 = {:.1}, λᴮ = {:.1} Å, λᴰ = {:.1} Å",
            self.temperature,
            self.protein_permittivity,
            self.solvent_permittivity,
            self.bjerrum_length(),
            self.debye_length().unwrap_or(f64::INFINITY),
        )?;
        if let Some(molarity) = self.molarity {
            write!(f, ", {:.3} M 1:1 salt", molarity)?;
        }
        Ok(())
    }
}
