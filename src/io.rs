// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use std::collections::VecDeque;

use crate::Fault;

/// Where `IN` instructions get their values and `OUT` instructions send them
pub trait Io {
    /// Get the next input value
    fn read(&mut self) -> Result<i64, Fault>;
    /// Emit an output value
    fn write(&mut self, val: i64) -> Result<(), Fault>;
}

/// Synchronous I/O: input is preloaded and consumed in order, output is collected.
///
/// Reading past the end of the input is a [Fault::OutOfInput], as callers are expected to supply
/// exactly what the program needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedIo {
    input: VecDeque<i64>,
    written: Vec<i64>,
}

impl BufferedIo {
    /// Preload `input`
    pub fn new(input: impl IntoIterator<Item = i64>) -> Self {
        Self {
            input: input.into_iter().collect(),
            written: Vec::new(),
        }
    }

    /// Append a value to the remaining input
    pub fn push_input(&mut self, val: i64) {
        self.input.push_back(val);
    }

    /// Number of input values not consumed yet
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Everything written so far
    pub fn written(&self) -> &[i64] {
        &self.written
    }

    /// Consume `self`, returning everything written
    pub fn into_written(self) -> Vec<i64> {
        self.written
    }
}

impl Io for BufferedIo {
    fn read(&mut self) -> Result<i64, Fault> {
        self.input.pop_front().ok_or(Fault::OutOfInput)
    }

    fn write(&mut self, val: i64) -> Result<(), Fault> {
        self.written.push(val);
        Ok(())
    }
}
