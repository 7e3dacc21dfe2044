// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Opcodes, decoding, and instruction semantics

use log::{Level, debug, log_enabled, trace};
use std::fmt::{self, Display};

use crate::machine::{Flow, Resources};
use crate::operand::{Operand, ParamMode};
use crate::{DecodeError, Fault, Ram};

/// An Intcode opcode, stored in the low two decimal digits of an instruction word
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[allow(missing_docs, reason = "trivial")]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Rbo = 9,
    Halt = 99,
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            1 => Ok(OpCode::Add),
            2 => Ok(OpCode::Mul),
            3 => Ok(OpCode::In),
            4 => Ok(OpCode::Out),
            5 => Ok(OpCode::Jnz),
            6 => Ok(OpCode::Jz),
            7 => Ok(OpCode::Lt),
            8 => Ok(OpCode::Eq),
            9 => Ok(OpCode::Rbo),
            99 => Ok(OpCode::Halt),
            n => Err(n),
        }
    }
}

impl OpCode {
    /// Number of parameters the instruction takes
    pub const fn arity(self) -> usize {
        match self {
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq => 3,
            OpCode::Jnz | OpCode::Jz => 2,
            OpCode::In | OpCode::Out | OpCode::Rbo => 1,
            OpCode::Halt => 0,
        }
    }

    /// Size of the instruction in memory, including the instruction word itself
    pub const fn size(self) -> u64 {
        self.arity() as u64 + 1
    }

    /// Short name used when logging and disassembling
    pub const fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Add => "add",
            OpCode::Mul => "mul",
            OpCode::In => "in",
            OpCode::Out => "out",
            OpCode::Jnz => "jit",
            OpCode::Jz => "jif",
            OpCode::Lt => "lt",
            OpCode::Eq => "eq",
            OpCode::Rbo => "setrelbase",
            OpCode::Halt => "hlt",
        }
    }
}

/// A single decoded instruction with its operands
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Instruction {
    /// `c := a + b`
    Add(Operand, Operand, Operand),
    /// `c := a * b`
    Multiply(Operand, Operand, Operand),
    /// `a := input`
    Input(Operand),
    /// output `a`
    Output(Operand),
    /// jump to `b` if `a` is nonzero
    JumpIfTrue(Operand, Operand),
    /// jump to `b` if `a` is zero
    JumpIfFalse(Operand, Operand),
    /// `c := a < b`
    LessThan(Operand, Operand, Operand),
    /// `c := a == b`
    Equals(Operand, Operand, Operand),
    /// add `a` to the relative base
    SetRelativeBase(Operand),
    /// stop the machine
    Halt,
}

/// Decode the instruction at `pc`
///
/// Given a 5 digit number, digits ABCDE are used as follows:
/// DE is the two-digit opcode,
/// C is the 1st parameter's mode,
/// B is the 2nd parameter's mode,
/// A is the 3rd parameter's mode.
///
/// So `21202` is a multiply whose 1st parameter is relative, 2nd is immediate and 3rd is relative.
///
/// ```
/// use intcode_vm::{Instruction, Operand, Ram, decode};
/// let ram = Ram::new([1002, 4, 3, 4, 33]);
/// assert_eq!(
///     decode(&ram, 0).unwrap(),
///     Instruction::Multiply(Operand::Position(4), Operand::Immediate(3), Operand::Position(4))
/// );
/// ```
pub fn decode(ram: &Ram, pc: u64) -> Result<Instruction, DecodeError> {
    let word = ram.read(pc);
    let opcode =
        OpCode::try_from(word % 100).map_err(|opcode| DecodeError::UnknownOpcode { opcode, addr: pc })?;
    let modes: [ParamMode; 3] =
        ParamMode::extract(word).map_err(|mode| DecodeError::UnknownMode { mode, addr: pc })?;

    let param = |n: usize| Operand::new(modes[n], ram.read(pc.wrapping_add(n as u64 + 1)));

    let instr = match opcode {
        OpCode::Add => Instruction::Add(param(0), param(1), param(2)),
        OpCode::Mul => Instruction::Multiply(param(0), param(1), param(2)),
        OpCode::In => Instruction::Input(param(0)),
        OpCode::Out => Instruction::Output(param(0)),
        OpCode::Jnz => Instruction::JumpIfTrue(param(0), param(1)),
        OpCode::Jz => Instruction::JumpIfFalse(param(0), param(1)),
        OpCode::Lt => Instruction::LessThan(param(0), param(1), param(2)),
        OpCode::Eq => Instruction::Equals(param(0), param(1), param(2)),
        OpCode::Rbo => Instruction::SetRelativeBase(param(0)),
        OpCode::Halt => Instruction::Halt,
    };

    if log_enabled!(Level::Debug) {
        let words = ram.get_range(pc..pc.saturating_add(opcode.size()));
        debug!("{pc}: {instr} {words:?}");
    }
    Ok(instr)
}

fn jump_to(target: i64) -> Result<Flow, Fault> {
    u64::try_from(target)
        .map(Flow::Continue)
        .map_err(|_| Fault::JumpToNegative(target))
}

impl Instruction {
    /// The opcode this instruction was decoded from
    pub const fn opcode(&self) -> OpCode {
        match self {
            Instruction::Add(..) => OpCode::Add,
            Instruction::Multiply(..) => OpCode::Mul,
            Instruction::Input(_) => OpCode::In,
            Instruction::Output(_) => OpCode::Out,
            Instruction::JumpIfTrue(..) => OpCode::Jnz,
            Instruction::JumpIfFalse(..) => OpCode::Jz,
            Instruction::LessThan(..) => OpCode::Lt,
            Instruction::Equals(..) => OpCode::Eq,
            Instruction::SetRelativeBase(_) => OpCode::Rbo,
            Instruction::Halt => OpCode::Halt,
        }
    }

    /// Size of the instruction in memory
    pub const fn size(&self) -> u64 {
        self.opcode().size()
    }

    /// The instruction's operands, in order
    pub fn operands(&self) -> Vec<Operand> {
        match *self {
            Instruction::Add(a, b, c)
            | Instruction::Multiply(a, b, c)
            | Instruction::LessThan(a, b, c)
            | Instruction::Equals(a, b, c) => vec![a, b, c],
            Instruction::JumpIfTrue(a, b) | Instruction::JumpIfFalse(a, b) => vec![a, b],
            Instruction::Input(a) | Instruction::Output(a) | Instruction::SetRelativeBase(a) => {
                vec![a]
            }
            Instruction::Halt => vec![],
        }
    }

    /// Execute the instruction located at `pc`, returning where execution continues
    pub fn execute(&self, res: &mut Resources<'_>, pc: u64) -> Result<Flow, Fault> {
        match *self {
            Instruction::Add(a, b, c) => {
                let (a, b) = (a.read(res)?, b.read(res)?);
                let out = a.wrapping_add(b);
                trace!("add exec: {a} + {b} (={out}) => {c}");
                c.write(res, out)?;
            }
            Instruction::Multiply(a, b, c) => {
                let (a, b) = (a.read(res)?, b.read(res)?);
                let out = a.wrapping_mul(b);
                trace!("mul exec: {a} * {b} (={out}) => {c}");
                c.write(res, out)?;
            }
            Instruction::Input(a) => {
                let val = res.input()?;
                trace!("in exec: {val} => {a}");
                a.write(res, val)?;
            }
            Instruction::Output(a) => {
                let val = a.read(res)?;
                trace!("out exec: write {val}");
                res.output(val)?;
            }
            Instruction::JumpIfTrue(a, b) => {
                let (cond, target) = (a.read(res)?, b.read(res)?);
                trace!("jit exec: {cond} ? goto {target}");
                if cond != 0 {
                    return jump_to(target);
                }
            }
            Instruction::JumpIfFalse(a, b) => {
                let (cond, target) = (a.read(res)?, b.read(res)?);
                trace!("jif exec: {cond} =0? goto {target}");
                if cond == 0 {
                    return jump_to(target);
                }
            }
            Instruction::LessThan(a, b, c) => {
                let (a, b) = (a.read(res)?, b.read(res)?);
                let out = i64::from(a < b);
                trace!("lt exec: {a}<{b}? {out} => {c}");
                c.write(res, out)?;
            }
            Instruction::Equals(a, b, c) => {
                let (a, b) = (a.read(res)?, b.read(res)?);
                let out = i64::from(a == b);
                trace!("eq exec: {a}=={b}? {out} => {c}");
                c.write(res, out)?;
            }
            Instruction::SetRelativeBase(a) => {
                let delta = a.read(res)?;
                trace!("setrelbase exec: old {} + {delta}", res.rel_base());
                res.adjust_rel_base(delta);
            }
            Instruction::Halt => return Ok(Flow::Halt),
        }
        Ok(Flow::Continue(pc.wrapping_add(self.size())))
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().mnemonic();
        match self {
            Instruction::Add(a, b, c) | Instruction::Multiply(a, b, c) => {
                write!(f, "{name} {a}, {b} => {c}")
            }
            Instruction::Input(a) => write!(f, "{name} => {a}"),
            Instruction::Output(a) | Instruction::SetRelativeBase(a) => write!(f, "{name} {a}"),
            Instruction::JumpIfTrue(a, b) => write!(f, "{name} {a}? to {b}"),
            Instruction::JumpIfFalse(a, b) => write!(f, "{name} {a}=0? to {b}"),
            Instruction::LessThan(a, b, c) => write!(f, "{name} {a}<{b} => {c}"),
            Instruction::Equals(a, b, c) => write!(f, "{name} {a}=={b} => {c}"),
            Instruction::Halt => write!(f, "{name}"),
        }
    }
}
