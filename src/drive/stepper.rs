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

    src/drive/stepper.rs

    Four-phase head stepper decoding
*/
use crate::types::StepDirection;

/// Coil energizing sequence. Advancing one position steps the head inward.
const PHASE_SEQUENCE: [u8; 4] = [0x6, 0xA, 0x9, 0x5];

/// A [Stepper] tracks the last phase pattern written to a drive's stepper coils.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stepper {
    phase: u8,
}

impl Stepper {
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Latch a new 4-bit phase pattern and return the resulting head motion, if any.
    /// Only a move to an adjacent position in the sequence steps the head, and only while
    /// `enabled` is set.
    pub fn update(&mut self, phase: u8, enabled: bool) -> Option<StepDirection> {
        let phase = phase & 0x0F;
        let old = sequence_index(self.phase);
        self.phase = phase;

        if !enabled {
            return None;
        }

        match (old, sequence_index(phase)) {
            (Some(old), Some(new)) => match (new + 4 - old) % 4 {
                1 => Some(StepDirection::Inward),
                3 => Some(StepDirection::Outward),
                _ => None,
            },
            _ => None,
        }
    }
}

fn sequence_index(phase: u8) -> Option<usize> {
    PHASE_SEQUENCE.iter().position(|&p| p == phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sequence() {
        let mut stepper = Stepper::default();
        assert_eq!(stepper.update(0x6, true), None);
        assert_eq!(stepper.update(0xA, true), Some(StepDirection::Inward));
        assert_eq!(stepper.update(0x9, true), Some(StepDirection::Inward));
        assert_eq!(stepper.update(0x5, true), Some(StepDirection::Inward));
        assert_eq!(stepper.update(0x6, true), Some(StepDirection::Inward));
        assert_eq!(stepper.update(0x5, true), Some(StepDirection::Outward));
        assert_eq!(stepper.update(0x9, true), Some(StepDirection::Outward));
    }

    #[test]
    fn test_invalid_and_disabled() {
        let mut stepper = Stepper::default();
        stepper.update(0x6, true);
        // Skipping a position is not a step.
        assert_eq!(stepper.update(0x9, true), None);
        // Disabled steppers latch the phase without moving.
        assert_eq!(stepper.update(0x5, false), None);
        assert_eq!(stepper.phase(), 0x5);
        assert_eq!(stepper.update(0x6, true), Some(StepDirection::Inward));
        assert_eq!(stepper.update(0x3, true), None);
    }
}
