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

    src/drive/mod.rs

    Drive mechanics: head position, spindle motor and the inserted medium
*/
pub mod spindle;
pub mod stepper;

use crate::{
    flux::FluxMedium,
    types::{StepDirection, Time, ZoneTable},
};

pub use spindle::SpindleCommand;
pub use stepper::Stepper;

/// A [Drive] is one floppy drive mechanism attached to the controller.
#[derive(Clone)]
pub struct Drive {
    index: usize,
    cylinders: u8,
    cylinder: u8,
    side: u8,
    motor: bool,
    stepper: Stepper,
    medium: Option<Box<dyn FluxMedium>>,
}

impl Drive {
    pub fn new(index: usize, cylinders: u8) -> Self {
        Drive {
            index,
            cylinders: cylinders.max(1),
            cylinder: 0,
            side: 0,
            motor: false,
            stepper: Stepper::default(),
            medium: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cylinder(&self) -> u8 {
        self.cylinder
    }

    pub fn side(&self) -> u8 {
        self.side
    }

    pub fn motor_on(&self) -> bool {
        self.motor
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    /// Track zero sense. Asserted whenever the head is at the outermost cylinder.
    pub fn track_zero(&self) -> bool {
        self.cylinder == 0
    }

    /// Write protect sense. A drive with no medium reports write protect, as the sensor sees no
    /// notch.
    pub fn write_protected(&self) -> bool {
        self.medium.as_ref().map_or(true, |medium| medium.write_protected())
    }

    pub fn has_medium(&self) -> bool {
        self.medium.is_some()
    }

    pub fn medium(&self) -> Option<&dyn FluxMedium> {
        self.medium.as_deref()
    }

    /// Insert a medium, replacing and returning any medium already present. The medium is
    /// positioned under the head at the current cylinder's zone speed.
    pub fn insert(&mut self, mut medium: Box<dyn FluxMedium>, zones: &ZoneTable) -> Option<Box<dyn FluxMedium>> {
        log::debug!("Drive::insert(): Drive {} medium inserted", self.index);
        medium.set_head(self.cylinder, self.side);
        medium.set_rpm(zones.rpm_for(self.cylinder));
        self.medium.replace(medium)
    }

    pub fn eject(&mut self) -> Option<Box<dyn FluxMedium>> {
        if self.medium.is_some() {
            log::debug!("Drive::eject(): Drive {} medium ejected", self.index);
        }
        self.medium.take()
    }

    pub fn set_motor(&mut self, state: bool) {
        if self.motor != state {
            log::debug!(
                "Drive::set_motor(): Drive {} motor {}",
                self.index,
                if state { "on" } else { "off" }
            );
        }
        self.motor = state;
    }

    pub fn set_side(&mut self, side: u8) {
        if self.side != side {
            self.side = side;
            if let Some(medium) = self.medium.as_mut() {
                medium.set_head(self.cylinder, side);
            }
        }
    }

    /// Latch a stepper phase pattern, moving the head if it forms a step. Returns true if the
    /// head moved.
    pub fn step(&mut self, phase: u8, enabled: bool, zones: &ZoneTable) -> bool {
        let new_cylinder = match self.stepper.update(phase, enabled) {
            Some(StepDirection::Inward) => self.cylinder.saturating_add(1).min(self.cylinders - 1),
            Some(StepDirection::Outward) => self.cylinder.saturating_sub(1),
            None => return false,
        };

        if new_cylinder == self.cylinder {
            return false;
        }

        log::debug!(
            "Drive::step(): Drive {} head {} -> {}",
            self.index,
            self.cylinder,
            new_cylinder
        );
        self.cylinder = new_cylinder;
        if let Some(medium) = self.medium.as_mut() {
            medium.set_head(new_cylinder, self.side);
            medium.set_rpm(zones.rpm_for(new_cylinder));
        }
        true
    }

    /// Return the next flux transition under the head strictly after `after`. A stopped disk
    /// produces no transitions.
    pub fn next_transition(&self, after: Time) -> Option<Time> {
        if !self.motor {
            return None;
        }
        self.medium.as_ref()?.next_transition(after)
    }

    /// Record the flux written in `(from, to]` onto the medium.
    pub fn commit(&mut self, from: Time, to: Time, transitions: &[Time]) {
        let motor = self.motor;
        let Some(medium) = self.medium.as_mut()
        else {
            log::warn!(
                "Drive::commit(): Drive {} has no medium, discarding {} transitions",
                self.index,
                transitions.len()
            );
            return;
        };

        if !motor {
            log::warn!("Drive::commit(): Drive {} motor is off, discarding write", self.index);
            return;
        }
        if medium.write_protected() {
            log::warn!("Drive::commit(): Drive {} is write protected, discarding write", self.index);
            return;
        }

        log::trace!(
            "Drive::commit(): Drive {} {}..{}, {} transitions",
            self.index,
            from,
            to,
            transitions.len()
        );
        medium.commit(from, to, transitions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux::MemoryDisk;

    #[test]
    fn test_head_clamps() {
        let zones = ZoneTable::default();
        let mut drive = Drive::new(0, 2);
        assert!(drive.track_zero());

        assert!(!drive.step(0x6, true, &zones));
        assert!(drive.step(0xA, true, &zones));
        assert_eq!(drive.cylinder(), 1);
        assert!(!drive.step(0x9, true, &zones));
        assert_eq!(drive.cylinder(), 1);

        assert!(drive.step(0xA, true, &zones));
        assert!(drive.track_zero());
        assert!(!drive.step(0x6, true, &zones));
        assert!(drive.track_zero());
    }

    #[test]
    fn test_write_protect_sense() {
        let zones = ZoneTable::default();
        let mut drive = Drive::new(1, 80);
        assert!(drive.write_protected());

        drive.insert(Box::new(MemoryDisk::new(80, 2)), &zones);
        assert!(!drive.write_protected());

        drive.insert(Box::new(MemoryDisk::new(80, 2).with_write_protect(true)), &zones);
        assert!(drive.write_protected());

        assert!(drive.eject().is_some());
        assert!(drive.write_protected());
    }

    #[test]
    fn test_motor_gates_flux() {
        let zones = ZoneTable::constant(80, 16, 300);
        let mut disk = MemoryDisk::new(80, 2);
        disk.commit(Time::ZERO, Time::from_nanos(10_000), &[Time::from_nanos(5000)]);

        let mut drive = Drive::new(0, 80);
        drive.insert(Box::new(disk), &zones);
        assert_eq!(drive.next_transition(Time::ZERO), None);

        drive.set_motor(true);
        assert_eq!(drive.next_transition(Time::ZERO), Some(Time::from_nanos(5000)));
    }
}
