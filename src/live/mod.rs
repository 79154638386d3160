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

    src/live/mod.rs

    The live engine state and the per-cell step function
*/

//! # Live engine
//!
//! The live engine models the controller's read/write electronics as a state machine clocked by
//! the bit cell period. All of its state lives in a single [LiveState] value, so a checkpoint is
//! a plain copy and a rollback is a plain assignment.
//!
//! A cell covers the half-open interval `(time, time + bit_cell]`. In read mode the cell's bit is
//! a 1 if a flux transition falls inside it. In write mode the top bit of the write shift
//! register is emitted, and a 1 records a transition at the middle of the cell.
//!
//! The scheduling half of the engine (running, syncpoints, checkpoint, rollback and sync) is
//! implemented on [FloppyController](crate::FloppyController) in the `engine` module.

mod engine;

use crate::{
    gcr::{decode_byte, encode_word, read_address, write_address, GcrRom, GCR_VALID, SYNC_WORD, WORD_MASK},
    types::{StatusLines, Time},
};
use std::time::Duration;

/// The number of written transitions that can be held between two commits.
pub const WRITE_BUFFER_SIZE: usize = 32;

const BYTE_READY_COUNT: u8 = 9;
const SYN_COUNT: u8 = 15;

/// The phase of the live engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiveStage {
    /// No motor is running. The engine has no time.
    #[default]
    Idle,
    /// Stepping bit cells.
    Running,
    /// One or more status lines changed at `time` and their edges are due.
    RunningSyncpoint,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiveState {
    pub(crate) time: Option<Time>,
    pub(crate) state: LiveStage,
    pub(crate) next_state: Option<LiveStage>,

    pub(crate) shift_reg: u16,
    pub(crate) shift_reg_write: u16,
    pub(crate) bit_counter: u8,
    pub(crate) sync_bit_counter: u8,
    pub(crate) sync_byte_counter: u8,

    pub(crate) drive: usize,
    pub(crate) side: u8,
    pub(crate) write_gate: bool,
    pub(crate) write_data: u8,
    pub(crate) write_sync: bool,
    pub(crate) erase_gate: bool,

    pub(crate) gcr_input: u16,
    pub(crate) gcr_output: u8,
    pub(crate) lines: StatusLines,
    pub(crate) changed: StatusLines,
    pub(crate) read_latch: u8,

    pub(crate) write_start_time: Option<Time>,
    pub(crate) write_position: usize,
    pub(crate) write_buffer: [Time; WRITE_BUFFER_SIZE],
}

impl Default for LiveState {
    fn default() -> Self {
        LiveState {
            time: None,
            state: LiveStage::Idle,
            next_state: None,
            shift_reg: 0,
            shift_reg_write: 0,
            bit_counter: 0,
            sync_bit_counter: 0,
            sync_byte_counter: 0,
            drive: 0,
            side: 0,
            write_gate: false,
            write_data: 0,
            write_sync: false,
            erase_gate: false,
            gcr_input: 0,
            gcr_output: 0,
            lines: StatusLines::empty(),
            changed: StatusLines::empty(),
            read_latch: 0,
            write_start_time: None,
            write_position: 0,
            write_buffer: [Time::ZERO; WRITE_BUFFER_SIZE],
        }
    }
}

impl LiveState {
    /// The time up to which the engine has evaluated, or `None` when idle.
    pub fn time(&self) -> Option<Time> {
        self.time
    }

    pub fn stage(&self) -> LiveStage {
        self.state
    }

    /// A transition deferred until `time` is reached by the host.
    pub fn next_stage(&self) -> Option<LiveStage> {
        self.next_state
    }

    pub fn shift_register(&self) -> u16 {
        self.shift_reg
    }

    pub fn write_shift_register(&self) -> u16 {
        self.shift_reg_write
    }

    pub fn bit_counter(&self) -> u8 {
        self.bit_counter
    }

    pub fn sync_bit_counter(&self) -> u8 {
        self.sync_bit_counter
    }

    pub fn sync_byte_counter(&self) -> u8 {
        self.sync_byte_counter
    }

    pub fn drive(&self) -> usize {
        self.drive
    }

    pub fn side(&self) -> u8 {
        self.side
    }

    pub fn write_gate(&self) -> bool {
        self.write_gate
    }

    pub fn write_data(&self) -> u8 {
        self.write_data
    }

    pub fn write_sync(&self) -> bool {
        self.write_sync
    }

    pub fn erase_gate(&self) -> bool {
        self.erase_gate
    }

    pub fn gcr_input(&self) -> u16 {
        self.gcr_input
    }

    pub fn gcr_output(&self) -> u8 {
        self.gcr_output
    }

    pub fn lines(&self) -> StatusLines {
        self.lines
    }

    /// Lines that changed since their edges were last delivered.
    pub fn changed(&self) -> StatusLines {
        self.changed
    }

    pub fn read_latch(&self) -> u8 {
        self.read_latch
    }

    pub fn write_start_time(&self) -> Option<Time> {
        self.write_start_time
    }

    /// The transitions written since the last commit.
    pub fn pending_writes(&self) -> &[Time] {
        &self.write_buffer[..self.write_position]
    }

    /// Enter the running stage at `now` with cleared framing. Latched register fields and the
    /// latched byte ready flag survive.
    pub(crate) fn start(&mut self, now: Time) {
        self.time = Some(now);
        self.state = LiveStage::Running;
        self.next_state = None;
        self.shift_reg = 0;
        self.shift_reg_write = 0;
        self.bit_counter = 0;
        self.sync_bit_counter = 0;
        self.sync_byte_counter = 0;
        self.gcr_input = 0;
        self.gcr_output = 0;
        self.lines &= StatusLines::LATCHED_BYTE_READY;
        self.changed = StatusLines::empty();
        self.write_start_time = None;
        self.write_position = 0;
    }

    /// Begin a write at the current time. The write shift register is loaded with the encoding
    /// of the current write data, and the bit counter is set so that byte ready fires after
    /// ten cells.
    pub(crate) fn start_write(&mut self, rom: &GcrRom) {
        self.write_start_time = self.time;
        self.write_position = 0;
        self.bit_counter = BYTE_READY_COUNT;
        let address = write_address(self.write_data, self.write_sync, self.erase_gate);
        self.shift_reg_write = encode_word(rom.lookup(address), address);
    }

    fn push_transition(&mut self, time: Time) {
        if self.write_position < WRITE_BUFFER_SIZE {
            self.write_buffer[self.write_position] = time;
            self.write_position += 1;
        }
        else {
            log::warn!("LiveState::push_transition(): Write buffer full, dropping transition at {}", time);
        }
    }

    /// Evaluate one bit cell. `flux` is set if a flux transition falls inside the cell; it is
    /// ignored while writing. Returns true if any host-visible line changed, making the end of
    /// the cell a syncpoint.
    pub(crate) fn clock_cell(&mut self, rom: &GcrRom, flux: bool, bit_cell: Duration) -> bool {
        let Some(start) = self.time
        else {
            return false;
        };

        let old_lines = self.lines;
        // Sync detection is disabled while writing.
        let prev_sync = !self.write_gate && old_lines.contains(StatusLines::SYNC);

        let bit = if self.write_gate {
            let bit = self.shift_reg_write & 0x200 != 0;
            if bit {
                self.push_transition(start + bit_cell / 2);
            }
            bit
        }
        else {
            flux
        };

        self.shift_reg = ((self.shift_reg << 1) | bit as u16) & WORD_MASK;
        let sync = !self.write_gate && self.shift_reg == SYNC_WORD;

        if sync {
            self.bit_counter = 0;
            self.sync_bit_counter = 0;
            self.sync_byte_counter = 0;
        }
        else if !prev_sync {
            self.bit_counter = (self.bit_counter + 1) % 10;
            self.sync_bit_counter += 1;
            if self.sync_bit_counter == 10 {
                self.sync_bit_counter = 0;
                self.sync_byte_counter = (self.sync_byte_counter + 1) % 16;
            }
        }

        self.gcr_input = if self.write_gate {
            write_address(self.write_data, self.write_sync, self.erase_gate)
        }
        else {
            read_address(self.shift_reg)
        };
        self.gcr_output = rom.lookup(self.gcr_input);

        let byte_ready = self.bit_counter == BYTE_READY_COUNT;
        let gcr_error = byte_ready && !self.write_gate && self.gcr_output & GCR_VALID == 0;

        if byte_ready {
            self.shift_reg_write = encode_word(self.gcr_output, self.gcr_input);
        }
        else {
            self.shift_reg_write = (self.shift_reg_write << 1) & WORD_MASK;
        }

        let mut lines = old_lines;
        lines.set(StatusLines::BYTE_READY, byte_ready);
        lines.set(StatusLines::SYNC, sync);
        lines.set(StatusLines::SYN, self.sync_byte_counter == SYN_COUNT);
        lines.set(StatusLines::GCR_ERROR, gcr_error);

        if byte_ready && !old_lines.contains(StatusLines::BYTE_READY) {
            lines.insert(StatusLines::LATCHED_BYTE_READY);
            if !self.write_gate {
                self.read_latch = decode_byte(self.gcr_output, self.gcr_input);
            }
        }

        self.lines = lines;
        let diff = old_lines ^ lines;
        self.changed |= diff;
        self.time = Some(start + bit_cell);
        !diff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcr::encode_byte;

    const P: Duration = Duration::from_nanos(2130);

    fn feed(state: &mut LiveState, rom: &GcrRom, word: u16, bits: usize) {
        for i in (0..bits).rev() {
            state.clock_cell(rom, word & (1 << i) != 0, P);
        }
    }

    #[test]
    fn test_sync_then_byte() {
        let rom = GcrRom::default();
        let mut state = LiveState::default();
        state.start(Time::ZERO);

        feed(&mut state, &rom, SYNC_WORD, 10);
        assert!(state.lines.contains(StatusLines::SYNC));
        assert_eq!(state.bit_counter, 0);

        feed(&mut state, &rom, encode_byte(0x07), 10);
        assert!(!state.lines.contains(StatusLines::SYNC));
        assert_eq!(state.bit_counter, 9);
        assert!(state.lines.contains(StatusLines::BYTE_READY));
        assert!(state.lines.contains(StatusLines::LATCHED_BYTE_READY));
        assert!(!state.lines.contains(StatusLines::GCR_ERROR));
        assert_eq!(state.read_latch, 0x07);
        assert_eq!(state.time, Some(Time::ZERO.after_cells(P, 20)));
    }

    #[test]
    fn test_write_preload() {
        let rom = GcrRom::default();
        let mut state = LiveState::default();
        state.start(Time::ZERO);
        state.write_gate = true;
        state.write_data = 0xA5;
        state.start_write(&rom);

        let mut ready_at = None;
        for cell in 1..=10 {
            state.clock_cell(&rom, false, P);
            if state.lines.contains(StatusLines::BYTE_READY) && ready_at.is_none() {
                ready_at = Some(cell);
            }
        }
        assert_eq!(ready_at, Some(10));
        assert_eq!(state.shift_reg, encode_byte(0xA5));
        assert_eq!(state.pending_writes().len(), 7);
        assert_eq!(state.pending_writes()[0], Time::from_nanos(1065));
    }

    #[test]
    fn test_checkpoint_is_copy() {
        let rom = GcrRom::default();
        let mut state = LiveState::default();
        state.start(Time::ZERO);
        let snapshot = state;
        feed(&mut state, &rom, 0x2AA, 10);
        assert_ne!(state, snapshot);
        state = snapshot;
        assert_eq!(state.time, Some(Time::ZERO));
    }
}
