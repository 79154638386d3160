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
*/

//! Speed zone types for multi-zone constant angular velocity recording.
//!
//! The controller's bit clock never changes. Instead, the spindle turns slower on the outer
//! cylinders and faster on the inner ones, so that each cylinder holds roughly the same linear
//! bit density. The zone a cylinder falls in determines the spindle speed and the number of
//! sectors a format places on it.

use crate::FdcError;
use std::time::Duration;

/// A [SpeedZone] is a contiguous range of cylinders sharing one spindle speed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedZone {
    pub first_cylinder: u8,
    pub last_cylinder: u8,
    pub sectors: u8,
    pub rpm: u32,
}

impl SpeedZone {
    pub const fn new(first_cylinder: u8, last_cylinder: u8, sectors: u8, rpm: u32) -> Self {
        SpeedZone {
            first_cylinder,
            last_cylinder,
            sectors,
            rpm,
        }
    }

    pub fn contains(&self, cylinder: u8) -> bool {
        (self.first_cylinder..=self.last_cylinder).contains(&cylinder)
    }
}

const DEFAULT_ZONES: [SpeedZone; 8] = [
    SpeedZone::new(0, 3, 19, 252),
    SpeedZone::new(4, 15, 18, 267),
    SpeedZone::new(16, 26, 17, 283),
    SpeedZone::new(27, 37, 16, 300),
    SpeedZone::new(38, 47, 15, 320),
    SpeedZone::new(48, 59, 14, 343),
    SpeedZone::new(60, 70, 13, 370),
    SpeedZone::new(71, 79, 12, 402),
];

/// A [ZoneTable] maps each cylinder to its [SpeedZone].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneTable {
    zones: Vec<SpeedZone>,
}

impl Default for ZoneTable {
    /// The default table covers 80 cylinders in 8 zones, from 19 sectors at 252 RPM on the
    /// outermost cylinders to 12 sectors at 402 RPM on the innermost.
    fn default() -> Self {
        ZoneTable {
            zones: DEFAULT_ZONES.to_vec(),
        }
    }
}

impl ZoneTable {
    pub fn new(zones: Vec<SpeedZone>) -> Self {
        ZoneTable { zones }
    }

    /// Build a table with a single zone spinning at `rpm` for all `cylinders`.
    pub fn constant(cylinders: u8, sectors: u8, rpm: u32) -> Self {
        ZoneTable {
            zones: vec![SpeedZone::new(0, cylinders.saturating_sub(1), sectors, rpm)],
        }
    }

    pub fn zones(&self) -> &[SpeedZone] {
        &self.zones
    }

    /// Return the zone containing `cylinder`. Cylinders past the last zone use the last zone,
    /// as the head cannot leave the final zone's speed without a new speed command.
    pub fn zone_for(&self, cylinder: u8) -> Option<&SpeedZone> {
        self.zones
            .iter()
            .find(|zone| zone.contains(cylinder))
            .or_else(|| self.zones.last())
    }

    /// Return the spindle speed for `cylinder`, in revolutions per minute.
    pub fn rpm_for(&self, cylinder: u8) -> u32 {
        self.zone_for(cylinder).map_or(300, |zone| zone.rpm)
    }

    /// Return the time of one revolution at the speed of `cylinder`.
    pub fn revolution(&self, cylinder: u8) -> Duration {
        revolution_for_rpm(self.rpm_for(cylinder))
    }

    /// Check that the zones cover cylinders `0..cylinders` contiguously and in order.
    pub fn validate(&self, cylinders: u8) -> Result<(), FdcError> {
        let mut expected = 0u8;
        for zone in &self.zones {
            if zone.first_cylinder != expected || zone.last_cylinder < zone.first_cylinder || zone.rpm == 0 {
                return Err(FdcError::ZoneGap(expected));
            }
            expected = zone.last_cylinder.saturating_add(1);
            if expected >= cylinders {
                return Ok(());
            }
        }
        Err(FdcError::ZoneGap(expected))
    }
}

/// Return the time of one revolution at `rpm` revolutions per minute.
pub(crate) fn revolution_for_rpm(rpm: u32) -> Duration {
    Duration::from_nanos(60_000_000_000 / u64::from(rpm.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zones() {
        let table = ZoneTable::default();
        assert!(table.validate(80).is_ok());
        assert_eq!(table.rpm_for(0), 252);
        assert_eq!(table.rpm_for(3), 252);
        assert_eq!(table.rpm_for(4), 267);
        assert_eq!(table.rpm_for(79), 402);
        // Out of range cylinders stay in the last zone.
        assert_eq!(table.rpm_for(90), 402);
    }

    #[test]
    fn test_revolution_time() {
        let table = ZoneTable::constant(80, 16, 300);
        assert_eq!(table.revolution(10), Duration::from_millis(200));
    }

    #[test]
    fn test_zone_gap() {
        let table = ZoneTable::new(vec![SpeedZone::new(0, 9, 19, 252), SpeedZone::new(12, 79, 18, 267)]);
        assert_eq!(table.validate(80), Err(FdcError::ZoneGap(10)));

        let short = ZoneTable::new(vec![SpeedZone::new(0, 39, 19, 252)]);
        assert_eq!(short.validate(80), Err(FdcError::ZoneGap(40)));
    }
}
