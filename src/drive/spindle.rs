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

    src/drive/spindle.rs

    Spindle start/stop line decoding
*/

/// The action the spindle sequencer takes for a pair of start/stop line levels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpindleCommand {
    Start,
    Stop,
    Hold,
}

impl SpindleCommand {
    pub fn from_lines(start: bool, stop: bool) -> Self {
        match (start, stop) {
            (true, false) => SpindleCommand::Start,
            (false, true) => SpindleCommand::Stop,
            _ => SpindleCommand::Hold,
        }
    }

    /// Return the motor state after applying this command to a motor in state `motor`.
    pub fn apply(&self, motor: bool) -> bool {
        match self {
            SpindleCommand::Start => true,
            SpindleCommand::Stop => false,
            SpindleCommand::Hold => motor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spindle_lines() {
        assert!(SpindleCommand::from_lines(true, false).apply(false));
        assert!(!SpindleCommand::from_lines(false, true).apply(true));
        assert!(SpindleCommand::from_lines(true, true).apply(true));
        assert!(!SpindleCommand::from_lines(false, false).apply(false));
    }
}
