// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! The fetch-decode-execute loop

use log::debug;

use crate::instr::decode;
use crate::{Fault, Io, Ram, RunError};

/// Where execution goes after an instruction
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
    /// Continue with the instruction at the contained address
    Continue(u64),
    /// A `HALT` instruction was executed
    Halt,
}

/// The execution context of a single run: memory, I/O, and the relative base register.
///
/// It borrows both its memory and its I/O exclusively for as long as it exists, so memory can be
/// inspected once the run is over.
pub struct Resources<'a> {
    ram: &'a mut Ram,
    io: &'a mut dyn Io,
    rel_base: i64,
    steps: u64,
}

impl<'a> Resources<'a> {
    /// Create a context with the relative base set to `0`
    pub fn new(ram: &'a mut Ram, io: &'a mut dyn Io) -> Self {
        Self {
            ram,
            io,
            rel_base: 0,
            steps: 0,
        }
    }

    /// The current relative base
    pub fn rel_base(&self) -> i64 {
        self.rel_base
    }

    pub(crate) fn adjust_rel_base(&mut self, delta: i64) {
        self.rel_base = self.rel_base.wrapping_add(delta);
    }

    /// The memory being executed
    pub fn ram(&self) -> &Ram {
        &*self.ram
    }

    /// Mutable access to the memory being executed
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut *self.ram
    }

    pub(crate) fn input(&mut self) -> Result<i64, Fault> {
        self.io.read()
    }

    pub(crate) fn output(&mut self, val: i64) -> Result<(), Fault> {
        self.io.write(val)
    }

    /// Number of instructions decoded and executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Decode and execute the single instruction at `pc`
    ///
    /// ```
    /// use intcode_vm::{BufferedIo, Flow, Ram, Resources};
    /// let mut ram = Ram::new([1101, 99, 0, 4, 12345]);
    /// let mut io = BufferedIo::default();
    /// let mut res = Resources::new(&mut ram, &mut io);
    /// assert_eq!(res.step(0).unwrap(), Flow::Continue(4));
    /// assert_eq!(res.ram().read(4), 99);
    /// assert_eq!(res.step(4).unwrap(), Flow::Halt);
    /// ```
    pub fn step(&mut self, pc: u64) -> Result<Flow, RunError> {
        let instr = decode(&*self.ram, pc)?;
        self.steps += 1;
        instr
            .execute(self, pc)
            .map_err(|fault| RunError::Fault { fault, pc })
    }

    /// Execute from `pc` until the program halts or fails
    pub fn run(&mut self, mut pc: u64) -> Result<(), RunError> {
        loop {
            match self.step(pc)? {
                Flow::Continue(next) => pc = next,
                Flow::Halt => {
                    debug!("halted at {pc} after {} instructions", self.steps);
                    return Ok(());
                }
            }
        }
    }
}

/// Run the program in `ram` from `pc` until it halts.
///
/// There's no limit on the number of instructions executed, so a program that never halts will
/// never return.
pub fn run(ram: &mut Ram, io: &mut impl Io, pc: u64) -> Result<(), RunError> {
    Resources::new(ram, io).run(pc)
}
