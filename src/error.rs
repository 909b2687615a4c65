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

//! Error types for the Bessel, re-expansion and solver engines

use thiserror::Error;

/// Errors raised by the numerical engines.
///
/// All engines are deterministic functions of their input so none of these
/// are worth retrying without changing the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PbError {
    /// Argument outside the domain of the operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Coefficient index outside 0 <= n < order, |m| <= n
    #[error("Index (n = {n}, m = {m}) is out of range for order {order}")]
    IndexOutOfRange { n: usize, m: isize, order: usize },

    /// A recurrence produced a non-finite value
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// A result lost all significance
    #[error("Numeric instability: {0}")]
    NumericInstability(String),
}

impl PbError {
    /// True for errors caused by the caller passing an invalid argument or index
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            PbError::InvalidArgument(_) | PbError::IndexOutOfRange { .. }
        )
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, PbError>;
