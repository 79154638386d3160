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

    tests/common/mod.rs

    Common support routines for tests
*/
#![allow(dead_code)]

use bit_vec::BitVec;
use gcrfdc::{
    gcr::{encode_stream, sync_stream},
    prelude::*,
    SignalEdge,
    ZoneTable,
};

use hex::encode;
use sha1::{Digest, Sha1};
use std::{any::Any, time::Duration};

/// Bit cell period used by every test, in nanoseconds.
pub const P: u64 = 2130;
/// Zero cells ahead of the sync mark on test tracks.
pub const LEAD: u64 = 20;
/// Data following the sync mark. The first byte's code must begin with a zero cell, or the
/// sync mark would appear to continue.
pub const DATA: [u8; 15] = [
    0x07, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
];

/// The end of cell `n`, counting from the start of the engine at time zero.
pub fn cells(n: u64) -> Time {
    Time::from_nanos(n * P)
}

/// The middle of cell `n` (1-based).
pub fn cell_mid(n: u64) -> Time {
    Time::from_nanos((n - 1) * P + P / 2)
}

pub fn ns_after(t: Time, ns: u64) -> Time {
    Time::from_nanos(t.as_nanos() + ns)
}

pub fn config(speculation_limit: u32) -> FdcConfig {
    FdcConfig::default()
        .with_bit_cell(Duration::from_nanos(P))
        .with_speculation_limit(speculation_limit)
        .with_zones(ZoneTable::constant(80, 16, 300))
}

pub fn controller(speculation_limit: u32) -> FloppyController<EdgeLog> {
    FloppyController::with_signals(config(speculation_limit), GcrRom::default(), EdgeLog::new()).unwrap()
}

/// Fire every wakeup the controller requests at or before `t`, as a host scheduler would.
pub fn run_until<S: FdcSignals>(fdc: &mut FloppyController<S>, t: Time) {
    while let Some(wakeup) = fdc.next_wakeup() {
        if wakeup > t {
            break;
        }
        fdc.on_wakeup(wakeup);
    }
}

/// Build a track of `lead` zero cells, a sync mark, then `data`.
pub fn sync_track(lead: u64, data: &[u8]) -> BitVec {
    let mut bits = BitVec::from_elem(lead as usize, false);
    bits.extend(sync_stream(10).iter());
    bits.extend(encode_stream(data).iter());
    bits
}

/// A disk whose cylinder 0 side 0 holds `bits`, recorded from time zero.
pub fn disk_with_track(bits: &BitVec) -> MemoryDisk {
    let mut disk = MemoryDisk::new(80, 2);
    disk.write_cells(0, 0, bits, Duration::from_nanos(P), Time::ZERO);
    disk
}

/// A medium with no flux that records every commit it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingMedium {
    pub commits: Vec<(Time, Time, Vec<Time>)>,
}

impl FluxMedium for RecordingMedium {
    fn next_transition(&self, _after: Time) -> Option<Time> {
        None
    }

    fn commit(&mut self, from: Time, to: Time, transitions: &[Time]) {
        self.commits.push((from, to, transitions.to_vec()));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn recorded_commits<S: FdcSignals>(fdc: &FloppyController<S>, drive: usize) -> Vec<(Time, Time, Vec<Time>)> {
    fdc.drive(drive)
        .and_then(|drive| drive.medium())
        .and_then(|medium| medium.as_any().downcast_ref::<RecordingMedium>())
        .map(|medium| medium.commits.clone())
        .unwrap_or_default()
}

pub fn memory_track<S: FdcSignals>(fdc: &FloppyController<S>, drive: usize, cylinder: u8, side: u8) -> Vec<u64> {
    fdc.drive(drive)
        .and_then(|drive| drive.medium())
        .and_then(|medium| medium.as_any().downcast_ref::<MemoryDisk>())
        .and_then(|disk| disk.track(cylinder, side))
        .map(|track| track.to_vec())
        .unwrap_or_default()
}

/// Edges of `line` that fall in `(from, to]`, as (time, level) pairs.
pub fn edges_between(edges: &[SignalEdge], line: StatusLine, from: Time, to: Time) -> Vec<(Time, bool)> {
    edges
        .iter()
        .filter(|edge| edge.line == line && edge.time > from && edge.time <= to)
        .map(|edge| (edge.time, edge.level))
        .collect()
}

pub fn compute_edge_hash(edges: &[SignalEdge]) -> String {
    let mut hasher = Sha1::new();
    for edge in edges {
        hasher.update(edge.time.as_nanos().to_le_bytes());
        hasher.update(edge.line.to_string().as_bytes());
        hasher.update([edge.level as u8]);
    }
    encode(hasher.finalize())
}

pub fn compute_commit_hash(commits: &[(Time, Time, Vec<Time>)]) -> String {
    let mut hasher = Sha1::new();
    for (from, to, transitions) in commits {
        hasher.update(from.as_nanos().to_le_bytes());
        hasher.update(to.as_nanos().to_le_bytes());
        for t in transitions {
            hasher.update(t.as_nanos().to_le_bytes());
        }
    }
    encode(hasher.finalize())
}

pub struct ReadRun {
    pub edges: Vec<SignalEdge>,
    pub bytes: Vec<u8>,
    pub rollbacks: u64,
}

/// Read the standard test track, reading the data register 100ns after each byte ready that
/// follows the sync mark.
pub fn run_read_scenario(speculation_limit: u32) -> ReadRun {
    let mut fdc = controller(speculation_limit);
    let bits = sync_track(LEAD, &DATA);
    fdc.insert_medium(0, Box::new(disk_with_track(&bits)), Time::ZERO)
        .unwrap();
    fdc.write(Register::Spindle, SpindlePort::START0.bits(), Time::ZERO);

    let mut bytes = Vec::new();
    for n in 1..=DATA.len() as u64 {
        let t = ns_after(cells(LEAD + 10 + 10 * n), 100);
        run_until(&mut fdc, t);
        bytes.push(fdc.read(Register::ReadData, t));
    }

    let end = cells(200);
    run_until(&mut fdc, end);
    fdc.sync(end);

    ReadRun {
        edges: fdc.signals().edges().to_vec(),
        bytes,
        rollbacks: fdc.stats().rollbacks,
    }
}

/// Write 0xA5 then 0x00 to a recording medium and stop the spindle at `stop`.
pub fn run_write_scenario(speculation_limit: u32, stop: Time) -> (Vec<SignalEdge>, Vec<(Time, Time, Vec<Time>)>) {
    let mut fdc = controller(speculation_limit);
    fdc.insert_medium(0, Box::new(RecordingMedium::default()), Time::ZERO)
        .unwrap();
    fdc.write(Register::WriteData, 0xA5, Time::ZERO);
    fdc.set_line(ControlLine::WriteGate, true, Time::ZERO);
    fdc.write(Register::Spindle, SpindlePort::START0.bits(), Time::ZERO);

    let t = cells(5);
    run_until(&mut fdc, t);
    fdc.write(Register::WriteData, 0x00, t);

    run_until(&mut fdc, stop);
    fdc.write(Register::Spindle, SpindlePort::STOP0.bits(), stop);

    let commits = recorded_commits(&fdc, 0);
    (fdc.signals().edges().to_vec(), commits)
}
