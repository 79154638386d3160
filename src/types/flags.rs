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

    flags.rs

    Defines the status line set and the register port bit layouts
*/

use bitflags::bitflags;

bitflags! {
    /// The host-visible status lines driven by the live engine.
    /// All lines are expressed in positive logic: a set bit means the line is asserted.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[rustfmt::skip]
    pub struct StatusLines: u8 {
        #[doc = "A complete 10-bit word has been framed (read) or consumed (write)"]
        const BYTE_READY            = 0b0000_0001;
        #[doc = "Byte ready has fired since the host last accessed the data registers"]
        const LATCHED_BYTE_READY    = 0b0000_0010;
        #[doc = "The read shift register holds the sync word"]
        const SYNC                  = 0b0000_0100;
        #[doc = "The fifteenth word after the last sync mark is being framed"]
        const SYN                   = 0b0000_1000;
        #[doc = "The framed word is not a valid GCR code pair"]
        const GCR_ERROR             = 0b0001_0000;
    }
}

bitflags! {
    /// Bit layout of the drive control port.
    /// SIDE and DRIVE are written by the host, the remaining bits are sense inputs.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[rustfmt::skip]
    pub struct DriveControlPort: u8 {
        #[doc = "Drive A head is at cylinder 0"]
        const TRACK0_A      = 0b0000_0010;
        #[doc = "Drive B head is at cylinder 0"]
        const TRACK0_B      = 0b0000_1000;
        #[doc = "Head select"]
        const SIDE          = 0b0001_0000;
        #[doc = "Drive select (0 = A, 1 = B)"]
        const DRIVE         = 0b0010_0000;
        #[doc = "Selected drive's medium is write protected"]
        const WRITE_PROTECT = 0b0100_0000;
        #[doc = "Sync word present in the read shift register"]
        const SYNC          = 0b1000_0000;
    }
}

bitflags! {
    /// Bit layout of the spindle control port.
    /// The START and STOP lines are written by the host, MOTOR bits report spindle state.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[rustfmt::skip]
    pub struct SpindlePort: u8 {
        const START0        = 0b0000_0001;
        const STOP0         = 0b0000_0010;
        const START1        = 0b0000_0100;
        const STOP1         = 0b0000_1000;
        const MOTOR0        = 0b0001_0000;
        const MOTOR1        = 0b0010_0000;
    }
}

impl SpindlePort {
    /// Return the (start, stop) line levels for the specified drive.
    pub fn lines(&self, drive: usize) -> (bool, bool) {
        match drive {
            0 => (self.contains(SpindlePort::START0), self.contains(SpindlePort::STOP0)),
            _ => (self.contains(SpindlePort::START1), self.contains(SpindlePort::STOP1)),
        }
    }

    /// Return the motor status bit for the specified drive.
    pub fn motor(drive: usize) -> SpindlePort {
        match drive {
            0 => SpindlePort::MOTOR0,
            _ => SpindlePort::MOTOR1,
        }
    }
}
