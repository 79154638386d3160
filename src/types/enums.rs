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

    enums.rs

    Defines common enum types
*/
use crate::types::StatusLines;
use std::{
    fmt,
    fmt::{Display, Formatter},
};
use strum::EnumIter;

/// A single host-visible status line. Iterating with `StatusLine::iter()` yields the lines in
/// the fixed order that edge callbacks are delivered at a syncpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusLine {
    LatchedByteReady,
    Syn,
    ByteReady,
    Sync,
    GcrError,
}

impl StatusLine {
    /// Return the [StatusLines] bit for this line.
    pub fn flag(&self) -> StatusLines {
        match self {
            StatusLine::LatchedByteReady => StatusLines::LATCHED_BYTE_READY,
            StatusLine::Syn => StatusLines::SYN,
            StatusLine::ByteReady => StatusLines::BYTE_READY,
            StatusLine::Sync => StatusLines::SYNC,
            StatusLine::GcrError => StatusLines::GCR_ERROR,
        }
    }
}

impl Display for StatusLine {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            StatusLine::LatchedByteReady => write!(f, "LBRDY"),
            StatusLine::Syn => write!(f, "SYN"),
            StatusLine::ByteReady => write!(f, "BRDY"),
            StatusLine::Sync => write!(f, "SYNC"),
            StatusLine::GcrError => write!(f, "GCRERR"),
        }
    }
}

/// The direction of a single head step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepDirection {
    /// Toward the spindle (higher cylinder numbers).
    Inward,
    /// Toward the edge of the disk (cylinder 0).
    Outward,
}
