/*
    gcrfdc

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/config.rs

    Controller configuration.
*/

use crate::{types::ZoneTable, FdcError, DEFAULT_BIT_CELL_NS};
use std::time::Duration;

/// The number of cells the live engine may run past the host's current time before it parks and
/// asks to be woken.
pub const DEFAULT_SPECULATION_LIMIT: u32 = 64;
pub const DEFAULT_CYLINDERS: u8 = 80;

/// Configuration for a [`FloppyController`](crate::FloppyController).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdcConfig {
    #[doc = "The period of one bit cell of the controller's bit clock."]
    pub bit_cell: Duration,
    #[doc = "The number of cells the engine may run ahead of the host before parking."]
    pub speculation_limit: u32,
    #[doc = "The number of cylinders the drive heads can reach."]
    pub cylinders: u8,
    #[doc = "The spindle speed zones, by cylinder."]
    pub zones: ZoneTable,
}

impl Default for FdcConfig {
    fn default() -> Self {
        FdcConfig {
            bit_cell: Duration::from_nanos(DEFAULT_BIT_CELL_NS),
            speculation_limit: DEFAULT_SPECULATION_LIMIT,
            cylinders: DEFAULT_CYLINDERS,
            zones: ZoneTable::default(),
        }
    }
}

impl FdcConfig {
    pub fn new() -> FdcConfig {
        Default::default()
    }

    pub fn with_bit_cell(mut self, bit_cell: Duration) -> FdcConfig {
        self.bit_cell = bit_cell;
        self
    }

    /// Set the speculation limit. A limit of zero disables running ahead entirely: the engine
    /// then parks after every cell that ends past the host's time.
    pub fn with_speculation_limit(mut self, cells: u32) -> FdcConfig {
        self.speculation_limit = cells;
        self
    }

    pub fn with_cylinders(mut self, cylinders: u8) -> FdcConfig {
        self.cylinders = cylinders;
        self
    }

    pub fn with_zones(mut self, zones: ZoneTable) -> FdcConfig {
        self.zones = zones;
        self
    }

    pub fn validate(&self) -> Result<(), FdcError> {
        if self.bit_cell.as_nanos() < 2 {
            log::error!("FdcConfig::validate(): Bit cell too short: {:?}", self.bit_cell);
            return Err(FdcError::InvalidConfig(format!("bit cell of {:?}", self.bit_cell)));
        }
        if self.cylinders == 0 {
            return Err(FdcError::InvalidConfig("zero cylinders".to_string()));
        }
        self.zones.validate(self.cylinders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FdcConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bit_cell, Duration::from_nanos(2130));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            FdcConfig::new().with_bit_cell(Duration::ZERO).validate(),
            Err(FdcError::InvalidConfig(_))
        ));
        assert!(matches!(
            FdcConfig::new().with_cylinders(0).validate(),
            Err(FdcError::InvalidConfig(_))
        ));
        // The default zone table only covers 80 cylinders.
        assert_eq!(
            FdcConfig::new().with_cylinders(84).validate(),
            Err(FdcError::ZoneGap(80))
        );
    }
}
