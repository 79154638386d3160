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

    src/controller.rs

    The register-level front end of the controller.
*/

//! # Controller front end
//!
//! [FloppyController] owns the drives and the live engine. The host drives it entirely through
//! register reads and writes and control line changes, each stamped with the host's current
//! time. Every access first brings the live engine to that time, applies the change, and then
//! lets the engine run ahead again.

use crate::{
    config::FdcConfig,
    drive::{Drive, SpindleCommand},
    flux::FluxMedium,
    gcr::GcrRom,
    live::{LiveStage, LiveState},
    signals::FdcSignals,
    types::{DriveControlPort, SpindlePort, StatusLine, StatusLines, Time},
    FdcError,
    DRIVE_COUNT,
};
use strum::EnumIter;

/// The controller's host-visible registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Register {
    /// Read: the byte latched at the last byte ready. Reading releases the latched byte ready
    /// line.
    ReadData,
    /// Write: the next byte to encode. Writing releases the latched byte ready line.
    WriteData,
    /// Stepper coil phases. Bits 0-3 drive A, bits 4-7 drive B.
    Stepper,
    /// See [DriveControlPort].
    DriveControl,
    /// See [SpindlePort].
    Spindle,
    /// Read only. See [StatusLines].
    Status,
}

/// Single-bit control lines driven by the host's peripheral adapter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ControlLine {
    WriteGate,
    EraseGate,
    WriteSync,
    StepperEnable(usize),
}

/// Counters useful for tuning the speculation limit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FdcStats {
    pub rollbacks:  u64,
    pub syncpoints: u64,
}

#[derive(Clone)]
pub struct FloppyController<S: FdcSignals = ()> {
    pub(crate) config: FdcConfig,
    pub(crate) rom: GcrRom,
    pub(crate) drives: [Drive; DRIVE_COUNT],
    pub(crate) stepper_enable: [bool; DRIVE_COUNT],
    pub(crate) stepper_phases: u8,
    pub(crate) spindle: SpindlePort,

    pub(crate) cur: LiveState,
    pub(crate) checkpoint: LiveState,
    pub(crate) next_edge: Option<Time>,
    pub(crate) wakeup: Option<Time>,
    pub(crate) last_access: Time,

    pub(crate) signals: S,
    pub(crate) stats: FdcStats,
}

impl FloppyController<()> {
    /// Create a controller with the reference codec ROM and no edge receiver.
    pub fn new(config: FdcConfig) -> Result<Self, FdcError> {
        FloppyController::with_signals(config, GcrRom::default(), ())
    }
}

impl<S: FdcSignals> FloppyController<S> {
    pub fn with_signals(config: FdcConfig, rom: GcrRom, signals: S) -> Result<Self, FdcError> {
        config.validate()?;
        let cylinders = config.cylinders;
        Ok(FloppyController {
            config,
            rom,
            drives: [Drive::new(0, cylinders), Drive::new(1, cylinders)],
            stepper_enable: [false; DRIVE_COUNT],
            stepper_phases: 0,
            spindle: SpindlePort::empty(),
            cur: LiveState::default(),
            checkpoint: LiveState::default(),
            next_edge: None,
            wakeup: None,
            last_access: Time::ZERO,
            signals,
            stats: FdcStats::default(),
        })
    }

    pub fn config(&self) -> &FdcConfig {
        &self.config
    }

    pub fn rom(&self) -> &GcrRom {
        &self.rom
    }

    /// The current live state. It may be ahead of the host's time while the engine speculates.
    pub fn live(&self) -> &LiveState {
        &self.cur
    }

    /// The last settled live state.
    pub fn checkpoint_state(&self) -> &LiveState {
        &self.checkpoint
    }

    pub fn drive(&self, drive: usize) -> Option<&Drive> {
        self.drives.get(drive)
    }

    pub fn signals(&self) -> &S {
        &self.signals
    }

    pub fn signals_mut(&mut self) -> &mut S {
        &mut self.signals
    }

    pub fn into_signals(self) -> S {
        self.signals
    }

    pub fn stats(&self) -> FdcStats {
        self.stats
    }

    /// The time at which the host should call [FloppyController::on_wakeup], if any.
    pub fn next_wakeup(&self) -> Option<Time> {
        self.wakeup
    }

    /// Bring the engine to `now`, apply `f`, then settle and let the engine run ahead.
    fn access<R>(&mut self, now: Time, f: impl FnOnce(&mut Self) -> R) -> R {
        debug_assert!(
            now >= self.last_access,
            "FloppyController::access(): time went backwards: {} < {}",
            now,
            self.last_access
        );
        self.last_access = now;

        self.sync(now);
        debug_assert!(self.cur.time.map_or(true, |time| time <= now));

        let result = f(self);
        self.save_checkpoint();
        self.live_run(now, None);
        result
    }

    /// Insert a medium into `drive`, returning the medium it replaces.
    pub fn insert_medium(
        &mut self,
        drive: usize,
        medium: Box<dyn FluxMedium>,
        now: Time,
    ) -> Result<Option<Box<dyn FluxMedium>>, FdcError> {
        if drive >= DRIVE_COUNT {
            return Err(FdcError::InvalidDrive(drive));
        }
        Ok(self.access(now, |fdc| fdc.drives[drive].insert(medium, &fdc.config.zones)))
    }

    /// Remove the medium from `drive`.
    pub fn eject(&mut self, drive: usize, now: Time) -> Result<Option<Box<dyn FluxMedium>>, FdcError> {
        if drive >= DRIVE_COUNT {
            return Err(FdcError::InvalidDrive(drive));
        }
        Ok(self.access(now, |fdc| fdc.drives[drive].eject()))
    }

    pub fn read(&mut self, register: Register, now: Time) -> u8 {
        self.access(now, |fdc| fdc.read_register(register, now))
    }

    pub fn write(&mut self, register: Register, value: u8, now: Time) {
        self.access(now, |fdc| fdc.write_register(register, value, now))
    }

    pub fn set_line(&mut self, line: ControlLine, level: bool, now: Time) {
        self.access(now, |fdc| fdc.set_control_line(line, level))
    }

    fn read_register(&mut self, register: Register, now: Time) -> u8 {
        match register {
            Register::ReadData => {
                self.release_latch(now);
                self.cur.read_latch
            }
            Register::WriteData => self.cur.write_data,
            Register::Stepper => self.stepper_phases,
            Register::DriveControl => self.drive_control().bits(),
            Register::Spindle => {
                let mut port = self.spindle;
                for (i, drive) in self.drives.iter().enumerate() {
                    port.set(SpindlePort::motor(i), drive.motor_on());
                }
                port.bits()
            }
            Register::Status => self.cur.lines.bits(),
        }
    }

    fn drive_control(&self) -> DriveControlPort {
        let mut port = DriveControlPort::empty();
        port.set(DriveControlPort::TRACK0_A, self.drives[0].track_zero());
        port.set(DriveControlPort::TRACK0_B, self.drives[1].track_zero());
        port.set(DriveControlPort::SIDE, self.cur.side != 0);
        port.set(DriveControlPort::DRIVE, self.cur.drive != 0);
        port.set(DriveControlPort::WRITE_PROTECT, self.drives[self.cur.drive].write_protected());
        port.set(DriveControlPort::SYNC, self.cur.lines.contains(StatusLines::SYNC));
        port
    }

    fn write_register(&mut self, register: Register, value: u8, now: Time) {
        match register {
            Register::WriteData => {
                self.cur.write_data = value;
                self.release_latch(now);
            }
            Register::Stepper => {
                self.stepper_phases = value;
                for (i, phase) in [value & 0x0F, value >> 4].into_iter().enumerate() {
                    let enabled = self.stepper_enable[i];
                    self.drives[i].step(phase, enabled, &self.config.zones);
                }
            }
            Register::DriveControl => {
                let port = DriveControlPort::from_bits_truncate(value);
                let side = port.contains(DriveControlPort::SIDE) as u8;
                let drive = port.contains(DriveControlPort::DRIVE) as usize;
                if side != self.cur.side || drive != self.cur.drive {
                    log::debug!("FloppyController::write_register(): Select drive {} side {}", drive, side);
                }
                self.cur.side = side;
                self.cur.drive = drive;
                // Head select is common to both drives.
                self.drives.iter_mut().for_each(|d| d.set_side(side));
            }
            Register::Spindle => {
                self.spindle = SpindlePort::from_bits_truncate(value & 0x0F);
                for i in 0..DRIVE_COUNT {
                    let (start, stop) = self.spindle.lines(i);
                    let motor = SpindleCommand::from_lines(start, stop).apply(self.drives[i].motor_on());
                    self.drives[i].set_motor(motor);
                }
                self.update_motors(now);
            }
            Register::ReadData | Register::Status => {
                log::warn!(
                    "FloppyController::write_register(): Write to read-only register {:?}: {:02X}",
                    register,
                    value
                );
            }
        }
    }

    fn set_control_line(&mut self, line: ControlLine, level: bool) {
        match line {
            ControlLine::WriteGate => {
                if self.cur.write_gate == level {
                    return;
                }
                log::debug!(
                    "FloppyController::set_control_line(): Write gate {}",
                    if level { "on" } else { "off" }
                );
                self.cur.write_gate = level;
                if self.cur.state != LiveStage::Idle {
                    if level {
                        self.start_writing();
                    }
                    else {
                        self.stop_writing();
                    }
                }
            }
            ControlLine::EraseGate => self.cur.erase_gate = level,
            ControlLine::WriteSync => self.cur.write_sync = level,
            ControlLine::StepperEnable(drive) => match self.stepper_enable.get_mut(drive) {
                Some(enable) => *enable = level,
                None => {
                    log::warn!("FloppyController::set_control_line(): No stepper for drive {}", drive);
                }
            },
        }
    }

    /// Start or stop the live engine to follow the spindle motors.
    fn update_motors(&mut self, now: Time) {
        let any_motor = self.drives.iter().any(|drive| drive.motor_on());
        match (any_motor, self.cur.state == LiveStage::Idle) {
            (true, true) => self.live_start(now),
            (false, false) => self.live_abort(now),
            _ => {}
        }
    }

    /// Release the latched byte ready line, delivering its falling edge at `now`.
    fn release_latch(&mut self, now: Time) {
        if self.cur.lines.contains(StatusLines::LATCHED_BYTE_READY) {
            self.cur.lines.remove(StatusLines::LATCHED_BYTE_READY);
            self.signals.line_changed(now, StatusLine::LatchedByteReady, false);
        }
    }
}
