// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use std::fmt::{self, Display};

use crate::Fault;
use crate::machine::Resources;

/// Parameter mode for Intcode instruction
///
/// Intcode instruction parameters each have a mode:  [position], [immediate], or [relative].
///
/// When executing an intcode instruction, the instruction's parameters are interpreted in
/// accordance with their associated modes.
///
/// [position]: ParamMode::Position
/// [immediate]: ParamMode::Immediate
/// [relative]: ParamMode::Relative
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum ParamMode {
    /// Position Mode
    ///
    /// A parameter in position mode evaluates to the value at the address specified by the
    /// parameter.
    Position = 0,
    /// Immediate Mode
    ///
    /// A parameter in immediate mode evaluates directly to the value specified. Instructions which
    /// write to memory may not use immediate mode for their destinations.
    Immediate = 1,
    /// Relative Mode
    ///
    /// A parameter in relative mode evaluates to the value at the address specified by the
    /// parameter, added to the [Relative Base], which starts out as `0` but can be modified
    /// throughout the program's execution.
    ///
    /// [Relative Base]: https://adventofcode.com/2019/day/9
    Relative = 2,
}

impl TryFrom<i64> for ParamMode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Position),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(i),
        }
    }
}

impl ParamMode {
    /// Extract the modes of all three parameters from an instruction word, returning the first
    /// unknown mode digit on failure.
    pub fn extract(word: i64) -> Result<[ParamMode; 3], i64> {
        Ok([
            ((word / 100) % 10).try_into()?,   // hundreds place
            ((word / 1000) % 10).try_into()?,  // thousands place
            ((word / 10000) % 10).try_into()?, // ten thousands place
        ])
    }
}

/// A decoded instruction parameter, tagged with how it's resolved
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Operand {
    /// A literal value. Can't be written to.
    Immediate(i64),
    /// An absolute address
    Position(i64),
    /// An offset from the relative base
    Relative(i64),
}

fn to_address(addr: i64) -> Result<u64, Fault> {
    u64::try_from(addr).map_err(|_| Fault::NegativeAddress(addr))
}

impl Operand {
    /// Wrap the raw parameter `raw` according to `mode`
    pub const fn new(mode: ParamMode, raw: i64) -> Self {
        match mode {
            ParamMode::Position => Operand::Position(raw),
            ParamMode::Immediate => Operand::Immediate(raw),
            ParamMode::Relative => Operand::Relative(raw),
        }
    }

    /// The mode this operand was decoded with
    pub const fn mode(self) -> ParamMode {
        match self {
            Operand::Position(_) => ParamMode::Position,
            Operand::Immediate(_) => ParamMode::Immediate,
            Operand::Relative(_) => ParamMode::Relative,
        }
    }

    /// The raw parameter as stored in memory
    pub const fn raw(self) -> i64 {
        match self {
            Operand::Position(i) | Operand::Immediate(i) | Operand::Relative(i) => i,
        }
    }

    fn address(self, res: &Resources<'_>) -> Result<u64, Fault> {
        match self {
            Operand::Immediate(imm) => Err(Fault::WriteToImmediate(imm)),
            Operand::Position(addr) => to_address(addr),
            Operand::Relative(offset) => {
                let rel_base = res.rel_base();
                let addr = rel_base
                    .checked_add(offset)
                    .ok_or(Fault::AddressOverflow { rel_base, offset })?;
                to_address(addr)
            }
        }
    }

    /// Resolve the operand's value
    pub fn read(self, res: &Resources<'_>) -> Result<i64, Fault> {
        match self {
            Operand::Immediate(imm) => Ok(imm),
            _ => Ok(res.ram().read(self.address(res)?)),
        }
    }

    /// Store `val` wherever the operand points. Immediate operands always fault.
    pub fn write(self, res: &mut Resources<'_>, val: i64) -> Result<(), Fault> {
        let addr = self.address(res)?;
        res.ram_mut().write(addr, val);
        Ok(())
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate(imm) => write!(f, "{imm}"),
            Operand::Position(addr) => write!(f, "*{addr}"),
            Operand::Relative(offset) => write!(f, "*R{offset}"),
        }
    }
}
