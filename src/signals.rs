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

    src/signals.rs

    Status line edge delivery to the host
*/
use crate::types::{StatusLine, Time};
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// Receiver for status line edges. Edges are delivered in time order and only once the engine
/// has committed to them, never while it is running ahead of the host.
pub trait FdcSignals {
    fn line_changed(&mut self, _time: Time, _line: StatusLine, _level: bool) {}
}

impl FdcSignals for () {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalEdge {
    pub time:  Time,
    pub line:  StatusLine,
    pub level: bool,
}

impl Display for SignalEdge {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}{}", self.time, if self.level { "+" } else { "-" }, self.line)
    }
}

/// An [EdgeLog] records every edge it receives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeLog {
    edges: Vec<SignalEdge>,
}

impl EdgeLog {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn edges(&self) -> &[SignalEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Iterate over the edges of a single line.
    pub fn line(&self, line: StatusLine) -> impl Iterator<Item = &SignalEdge> {
        self.edges.iter().filter(move |edge| edge.line == line)
    }

    /// Return the times at which `line` was asserted.
    pub fn rising(&self, line: StatusLine) -> Vec<Time> {
        self.line(line).filter(|edge| edge.level).map(|edge| edge.time).collect()
    }

    /// Return the times at which `line` was released.
    pub fn falling(&self, line: StatusLine) -> Vec<Time> {
        self.line(line).filter(|edge| !edge.level).map(|edge| edge.time).collect()
    }

    /// Return the level of `line` after the last recorded edge, or false if it never changed.
    pub fn level(&self, line: StatusLine) -> bool {
        self.line(line).last().is_some_and(|edge| edge.level)
    }
}

impl FdcSignals for EdgeLog {
    fn line_changed(&mut self, time: Time, line: StatusLine, level: bool) {
        log::trace!("EdgeLog::line_changed(): {} {}: {}", time, line, level);
        self.edges.push(SignalEdge { time, line, level });
    }
}
