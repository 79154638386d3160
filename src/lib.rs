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

//! # gcrfdc
//!
//! gcrfdc emulates the read/write electronics of a GCR floppy disk controller with two drives.
//! The controller's bit clock runs independently of the host CPU, so the [live] engine steps
//! through bit cells on its own time line, runs ahead of the host when it can, and rolls back
//! whenever the host touches a register at an earlier point in time.
//!
//! The host owns the scheduler. After any register access it should ask the controller for
//! [FloppyController::next_wakeup] and call [FloppyController::on_wakeup] at that time.

pub mod config;
pub mod controller;
pub mod drive;
pub mod flux;
pub mod gcr;
pub mod live;
pub mod signals;
pub mod types;

use thiserror::Error;

/// The number of drives attached to a controller.
pub const DRIVE_COUNT: usize = 2;
/// The default bit cell period of the controller's bit clock, in nanoseconds.
pub const DEFAULT_BIT_CELL_NS: u64 = 2130;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FdcError {
    #[error("A GCR ROM image must be 2048 bytes, got {0}")]
    InvalidRomSize(usize),
    #[error("Drive {0} does not exist")]
    InvalidDrive(usize),
    #[error("Invalid controller configuration: {0}")]
    InvalidConfig(String),
    #[error("Cylinder {0} is not covered by the zone table")]
    ZoneGap(u8),
}

pub use crate::{
    config::FdcConfig,
    controller::{ControlLine, FdcStats, FloppyController, Register},
    drive::Drive,
    flux::{FluxMedium, MemoryDisk},
    gcr::GcrRom,
    live::{LiveStage, LiveState},
    signals::{EdgeLog, FdcSignals, SignalEdge},
    types::{StatusLine, StatusLines, Time, ZoneTable},
};

pub mod prelude {
    pub use crate::{
        config::FdcConfig,
        controller::{ControlLine, FdcStats, FloppyController, Register},
        flux::{FluxMedium, MemoryDisk},
        gcr::GcrRom,
        live::{LiveStage, LiveState},
        signals::{EdgeLog, FdcSignals},
        types::{DriveControlPort, SpindlePort, StatusLine, StatusLines, Time},
        FdcError,
    };
}
