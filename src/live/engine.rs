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

    src/live/engine.rs

    Running, checkpointing and rolling back the live engine
*/

//! The engine runs in two modes. Up to the host's current time it runs for real: syncpoints
//! deliver their edges and take a checkpoint, which also commits written flux to the medium.
//! Past the host's time it speculates: it keeps stepping cells until a line would change or
//! the speculation limit is reached, then parks with a deferred [LiveStage] and publishes a
//! wakeup time. If the host touches the controller before that time, the speculated cells are
//! discarded by rolling back to the last checkpoint and replaying up to the host's time.

use crate::{
    controller::FloppyController,
    live::LiveStage,
    signals::FdcSignals,
    types::{StatusLine, StatusLines, Time},
};
use strum::IntoEnumIterator;

impl<S: FdcSignals> FloppyController<S> {
    /// Step the engine. Cells ending at or before `now` are final; cells ending after `now` are
    /// speculative. No cell ending after `limit` is evaluated.
    pub(crate) fn live_run(&mut self, now: Time, limit: Option<Time>) {
        if self.cur.state == LiveStage::Idle || self.cur.next_state.is_some() {
            return;
        }

        let bit_cell = self.config.bit_cell;
        let mut speculated = 0u32;

        loop {
            match self.cur.state {
                LiveStage::Idle => return,
                LiveStage::Running => {
                    let Some(time) = self.cur.time
                    else {
                        return;
                    };
                    let cell_end = time + bit_cell;
                    if limit.is_some_and(|limit| cell_end > limit) {
                        return;
                    }

                    if cell_end > now {
                        if speculated >= self.config.speculation_limit {
                            self.cur.next_state = Some(LiveStage::Running);
                            self.wakeup = Some(if time > now { time } else { cell_end });
                            return;
                        }
                        speculated += 1;
                    }

                    let flux = self.take_flux(cell_end);
                    if self.cur.clock_cell(&self.rom, flux, bit_cell) && self.live_delay(now, LiveStage::RunningSyncpoint)
                    {
                        return;
                    }
                }
                LiveStage::RunningSyncpoint => {
                    self.fire_edges();
                    self.cur.state = LiveStage::Running;
                    self.stats.syncpoints += 1;
                    self.save_checkpoint();
                }
            }
        }
    }

    /// Move to `next` at the current engine time. If that time is still ahead of the host, the
    /// move is deferred and the engine parks until then. Returns true if the engine parked.
    fn live_delay(&mut self, now: Time, next: LiveStage) -> bool {
        match self.cur.time {
            Some(time) if time > now => {
                self.cur.next_state = Some(next);
                self.wakeup = Some(time);
                true
            }
            _ => {
                self.cur.state = next;
                false
            }
        }
    }

    /// Return whether a flux transition falls at or before `cell_end`, consuming every
    /// transition that does.
    fn take_flux(&mut self, cell_end: Time) -> bool {
        match self.next_edge {
            Some(edge) if edge <= cell_end => {
                self.next_edge = self.drives[self.cur.drive].next_transition(cell_end);
                true
            }
            _ => false,
        }
    }

    /// Deliver an edge for every line changed since the last syncpoint.
    fn fire_edges(&mut self) {
        let Some(time) = self.cur.time
        else {
            return;
        };
        let changed = self.cur.changed;
        for line in StatusLine::iter().filter(|line| changed.contains(line.flag())) {
            let level = self.cur.lines.contains(line.flag());
            self.signals.line_changed(time, line, level);
        }
        self.cur.changed = StatusLines::empty();
    }

    /// Bring the engine to `now`. If the engine has speculated past `now`, roll back to the last
    /// checkpoint and replay. Otherwise apply any deferred transition that is now due and catch
    /// up. Ends with a checkpoint, so the engine is settled at a time at or before `now`.
    pub fn sync(&mut self, now: Time) {
        self.wakeup = None;
        let Some(time) = self.cur.time
        else {
            return;
        };

        if time > now {
            log::trace!(
                "FloppyController::sync(): Rolling back from {} to {} for access at {}",
                time,
                self.checkpoint.time.unwrap_or(Time::ZERO),
                now
            );
            self.rollback();
        }
        else if let Some(next) = self.cur.next_state.take() {
            self.cur.state = next;
        }

        self.live_run(now, Some(now));
        self.cur.next_state = None;
        self.save_checkpoint();
    }

    /// Called by the host at the time returned by [FloppyController::next_wakeup].
    pub fn on_wakeup(&mut self, now: Time) {
        if self.cur.state == LiveStage::Idle {
            log::trace!("FloppyController::on_wakeup(): Stale wakeup at {}", now);
            return;
        }
        self.sync(now);
        self.live_run(now, None);
    }

    /// Settle the engine at `now` and take a checkpoint there, then let it run ahead again.
    /// Nothing the engine speculated past `now` reaches the medium.
    pub fn checkpoint(&mut self, now: Time) {
        self.sync(now);
        self.live_run(now, None);
    }

    /// Commit pending writes up to the current engine time and snapshot the live state. The
    /// engine must not be ahead of the host.
    pub(crate) fn save_checkpoint(&mut self) {
        if let Some(time) = self.cur.time {
            self.commit(time);
        }
        self.checkpoint = self.cur;
        self.next_edge = self.flux_after(self.cur.time);
    }

    /// Discard everything since the last checkpoint.
    pub fn rollback(&mut self) {
        self.cur = self.checkpoint;
        self.next_edge = self.flux_after(self.cur.time);
        self.stats.rollbacks += 1;
    }

    fn flux_after(&self, time: Option<Time>) -> Option<Time> {
        self.drives[self.cur.drive].next_transition(time?)
    }

    /// Write the transitions buffered since the write start time to the selected drive, covering
    /// the interval up to `to`. An interval with no transitions is still committed, erasing it.
    fn commit(&mut self, to: Time) {
        let Some(from) = self.cur.write_start_time
        else {
            return;
        };
        if to == from {
            return;
        }

        let position = self.cur.write_position;
        self.drives[self.cur.drive].commit(from, to, &self.cur.write_buffer[..position]);
        self.cur.write_start_time = Some(to);
        self.cur.write_position = 0;
    }

    pub(crate) fn live_start(&mut self, now: Time) {
        log::debug!("FloppyController::live_start(): Starting live engine at {}", now);
        self.cur.start(now);
        if self.cur.write_gate {
            self.start_writing();
        }
    }

    pub(crate) fn live_abort(&mut self, now: Time) {
        log::debug!("FloppyController::live_abort(): Stopping live engine at {}", now);
        self.stop_writing();

        let asserted = self.cur.lines - StatusLines::LATCHED_BYTE_READY;
        for line in StatusLine::iter().filter(|line| asserted.contains(line.flag())) {
            self.signals.line_changed(now, line, false);
        }

        self.cur.lines &= StatusLines::LATCHED_BYTE_READY;
        self.cur.changed = StatusLines::empty();
        self.cur.time = None;
        self.cur.state = LiveStage::Idle;
        self.cur.next_state = None;
        self.next_edge = None;
        self.wakeup = None;
    }

    pub(crate) fn start_writing(&mut self) {
        log::debug!(
            "FloppyController::start_writing(): Drive {} write at {}",
            self.cur.drive,
            self.cur.time.unwrap_or(Time::ZERO)
        );
        self.cur.start_write(&self.rom);
    }

    pub(crate) fn stop_writing(&mut self) {
        if let Some(time) = self.cur.time {
            self.commit(time);
        }
        self.cur.write_start_time = None;
        self.cur.write_position = 0;
    }
}
