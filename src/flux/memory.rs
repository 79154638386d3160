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

    src/flux/memory.rs

    An in-memory flux medium
*/

//! A [MemoryDisk] stores each track as a sorted list of flux transition offsets, in
//! nanoseconds from the index position. The disk is considered to have been spinning since
//! time zero, so the rotational position at an absolute time `t` is `t % revolution`.

use crate::{
    flux::FluxMedium,
    types::{duration_ns, revolution_for_rpm, Time},
};
use bit_vec::BitVec;
use std::{any::Any, time::Duration};

const DEFAULT_RPM: u32 = 300;

#[derive(Clone, Debug)]
pub struct MemoryDisk {
    cylinders: u8,
    sides: u8,
    tracks: Vec<Vec<u64>>,
    cylinder: u8,
    side: u8,
    revolution_ns: u64,
    write_protect: bool,
}

impl MemoryDisk {
    /// Create a blank, unformatted disk with the specified geometry.
    pub fn new(cylinders: u8, sides: u8) -> Self {
        let sides = sides.max(1);
        MemoryDisk {
            cylinders,
            sides,
            tracks: vec![Vec::new(); cylinders as usize * sides as usize],
            cylinder: 0,
            side: 0,
            revolution_ns: duration_ns(revolution_for_rpm(DEFAULT_RPM)),
            write_protect: false,
        }
    }

    pub fn with_write_protect(mut self, state: bool) -> Self {
        self.write_protect = state;
        self
    }

    pub fn set_write_protect(&mut self, state: bool) {
        self.write_protect = state;
    }

    pub fn cylinders(&self) -> u8 {
        self.cylinders
    }

    pub fn sides(&self) -> u8 {
        self.sides
    }

    /// Return the current revolution period.
    pub fn revolution(&self) -> Duration {
        Duration::from_nanos(self.revolution_ns)
    }

    /// Return the transition offsets of the specified track, if it exists.
    pub fn track(&self, cylinder: u8, side: u8) -> Option<&[u64]> {
        self.track_index(cylinder, side).map(|ti| self.tracks[ti].as_slice())
    }

    /// Replace the specified track with flux transitions produced by recording `bits` one cell
    /// per `bit_cell`, with the first cell beginning at absolute time `start`. Each one bit
    /// places a transition in the middle of its cell. Cells past one revolution wrap around.
    ///
    /// Returns false if the track does not exist.
    pub fn write_cells(&mut self, cylinder: u8, side: u8, bits: &BitVec, bit_cell: Duration, start: Time) -> bool {
        let Some(ti) = self.track_index(cylinder, side)
        else {
            log::warn!("MemoryDisk::write_cells(): No track at c:{} h:{}", cylinder, side);
            return false;
        };

        let period = duration_ns(bit_cell);
        let rev = self.revolution_ns;
        let base = start.as_nanos() + period / 2;
        let mut offsets: Vec<u64> = bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .map(|(i, _)| (base + i as u64 * period) % rev)
            .collect();

        offsets.sort_unstable();
        offsets.dedup();
        log::trace!(
            "MemoryDisk::write_cells(): c:{} h:{} {} cells, {} transitions",
            cylinder,
            side,
            bits.len(),
            offsets.len()
        );
        self.tracks[ti] = offsets;
        true
    }

    fn track_index(&self, cylinder: u8, side: u8) -> Option<usize> {
        if cylinder < self.cylinders && side < self.sides {
            Some(cylinder as usize * self.sides as usize + side as usize)
        }
        else {
            None
        }
    }

    fn head_track(&self) -> Option<&Vec<u64>> {
        self.track_index(self.cylinder, self.side).map(|ti| &self.tracks[ti])
    }
}

impl FluxMedium for MemoryDisk {
    fn next_transition(&self, after: Time) -> Option<Time> {
        let track = self.head_track()?;
        let first = *track.first()?;

        let rev = self.revolution_ns;
        let pos = after.as_nanos() % rev;
        let base = after.as_nanos() - pos;

        let idx = track.partition_point(|&offset| offset <= pos);
        match track.get(idx) {
            Some(&offset) => Some(Time::from_nanos(base + offset)),
            None => Some(Time::from_nanos(base + rev + first)),
        }
    }

    fn commit(&mut self, from: Time, to: Time, transitions: &[Time]) {
        let rev = self.revolution_ns;
        let Some(ti) = self.track_index(self.cylinder, self.side)
        else {
            return;
        };
        let span = to.as_nanos().saturating_sub(from.as_nanos());
        let start = from.as_nanos() % rev;

        let track = &mut self.tracks[ti];
        if span >= rev {
            track.clear();
        }
        else {
            track.retain(|&offset| {
                let d = (offset + rev - start) % rev;
                d == 0 || d > span
            });
        }

        track.extend(transitions.iter().map(|t| t.as_nanos() % rev));
        track.sort_unstable();
        track.dedup();
    }

    fn set_head(&mut self, cylinder: u8, side: u8) {
        self.cylinder = cylinder;
        self.side = side;
    }

    /// Offsets are angular positions, so every track is rescaled to the new revolution period.
    fn set_rpm(&mut self, rpm: u32) {
        let old_rev = self.revolution_ns;
        let new_rev = duration_ns(revolution_for_rpm(rpm)).max(1);
        if new_rev == old_rev {
            return;
        }
        log::debug!("MemoryDisk::set_rpm(): {} rpm, revolution {}", rpm, crate::format_ms!(new_rev));

        for track in self.tracks.iter_mut() {
            for offset in track.iter_mut() {
                let scaled = (*offset as u128 * new_rev as u128 + old_rev as u128 / 2) / old_rev as u128;
                *offset = (scaled as u64).min(new_rev - 1);
            }
            track.dedup();
        }
        self.revolution_ns = new_rev;
    }

    fn write_protected(&self) -> bool {
        self.write_protect
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
