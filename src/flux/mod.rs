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

    src/flux/mod.rs

    The flux medium interface seen by the drive head
*/
use crate::types::Time;
use dyn_clone::{clone_trait_object, DynClone};
use std::any::Any;

mod memory;

pub use memory::MemoryDisk;

/// Format a nanosecond count as microseconds.
#[doc(hidden)]
#[macro_export]
macro_rules! format_us {
    ($value:expr) => {
        format!("{:.3}μs", $value as f64 / 1_000.0)
    };
}

/// Format a nanosecond count as milliseconds.
#[doc(hidden)]
#[macro_export]
macro_rules! format_ms {
    ($value:expr) => {
        format!("{:.3}ms", $value as f64 / 1_000_000.0)
    };
}

/// A [FluxMedium] is the magnetic surface under a drive's read/write head.
///
/// Times passed to and returned from a medium are absolute [Time]s on the host clock. A medium
/// is responsible for mapping them onto its rotational position.
pub trait FluxMedium: DynClone + Any + Send + Sync {
    /// Return the time of the first flux transition strictly after `after` on the track under
    /// the head, or `None` if the track holds no transitions.
    fn next_transition(&self, after: Time) -> Option<Time>;
    /// Replace the flux in the interval `(from, to]` with `transitions`, which are sorted and
    /// all lie within the interval. An empty slice erases the interval.
    fn commit(&mut self, from: Time, to: Time, transitions: &[Time]);
    /// Position the head over the specified cylinder and side.
    fn set_head(&mut self, _cylinder: u8, _side: u8) {}
    /// Set the rotation speed of the medium in revolutions per minute.
    fn set_rpm(&mut self, _rpm: u32) {}
    /// Return true if the medium refuses writes.
    fn write_protected(&self) -> bool {
        false
    }
    /// Return a reference to the medium as a `dyn Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;
}

clone_trait_object!(FluxMedium);
