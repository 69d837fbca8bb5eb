//! Quantity value object: a strictly positive batch size.
//!
//! Instances carry batches of interchangeable units, so quantity arithmetic
//! (split on assignment, merge on return) lives here rather than on raw
//! integers. A `Quantity` can never hold zero; "no residual" is expressed as
//! `Option<Quantity>`.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Strictly positive quantity of interchangeable units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Merge two batches into one.
    pub fn checked_add(self, other: Quantity) -> DomainResult<Self> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::validation("quantity overflow"))?;
        Ok(Self(sum))
    }

    /// Take `requested` units out of this batch.
    ///
    /// Returns the residual quantity left behind, or `None` when the whole
    /// batch is taken. Taking more than the batch holds fails with
    /// `InsufficientQuantity`.
    pub fn split(self, requested: Quantity) -> DomainResult<Option<Quantity>> {
        if requested.0 > self.0 {
            return Err(DomainError::insufficient_quantity(requested.0, self.0));
        }
        if requested.0 == self.0 {
            return Ok(None);
        }
        Ok(Some(Self(self.0 - requested.0)))
    }
}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
