// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing an Intcode virtual machine with pluggable I/O
//!
//! The machine supports all of the [Opcodes] and [Parameter Modes] defined in the completed
//! Intcode computer for [Day 9].
//!
//! # Example
//!
//! ```rust
//! use intcode_vm::prelude::*;
//! let mut ram = Ram::new([3, 9, 1001, 9, 1, 9, 4, 9, 99, 0]);
//! let mut io = BufferedIo::new([15]);
//!
//! run(&mut ram, &mut io, 0).unwrap();
//! assert_eq!(io.written(), &[16]);
//! ```
//!
//! Machines can also run on their own threads, talking to the rest of the program over channels.
//! Closing of the output channel is the signal that the machine has stopped:
//!
//! ```rust
//! use intcode_vm::prelude::*;
//! let echo = Ram::new([3, 7, 4, 7, 99]);
//! let vm = run_async("echo", echo);
//! vm.send(42).unwrap();
//! assert_eq!(vm.recv(), Some(Message::Value(42)));
//! assert_eq!(vm.recv(), None);
//! ```
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 9]: https://adventofcode.com/2019/day/9

mod chan;
pub mod disasm;
mod instr;
mod io;
mod machine;
mod operand;
mod ram;

use std::error::Error;
use std::fmt::{self, Display};

pub use chan::{AsyncConfig, AsyncVm, ChannelIo, Message, run_async, run_async_with, spawn};
pub use instr::{Instruction, OpCode, decode};
pub use io::{BufferedIo, Io};
pub use machine::{Flow, Resources, run};
pub use operand::{Operand, ParamMode};
pub use ram::{LoadError, ParseRamError, Ram, RamIter};

/// A small module that re-exports items needed when working with the Intcode machine
pub mod prelude {
    pub use crate::{BufferedIo, Io, Message, Ram, RunError, run, run_async};
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The instruction word at an address could not be decoded
pub enum DecodeError {
    /// The low two digits of the word are not a known opcode
    UnknownOpcode {
        /// The unrecognized opcode
        opcode: i64,
        /// Address of the instruction word
        addr: u64,
    },
    /// One of the parameter mode digits is not a known mode
    UnknownMode {
        /// The unrecognized mode digit
        mode: i64,
        /// Address of the instruction word
        addr: u64,
    },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownOpcode { opcode, addr } => write!(f, "bad opcode {opcode} at {addr}"),
            DecodeError::UnknownMode { mode, addr } => write!(f, "unknown mode {mode} at {addr}"),
        }
    }
}

impl Error for DecodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A program or its caller broke the machine's contract while an instruction was executing.
///
/// Unlike a [DecodeError], these always mean the program is malformed or the code driving it is
/// buggy, so there is nothing to retry.
pub enum Fault {
    /// An instruction tried to store into an immediate operand
    WriteToImmediate(i64),
    /// An operand resolved to a negative address
    NegativeAddress(i64),
    /// A jump targeted a negative address
    JumpToNegative(i64),
    /// Adding a relative operand's offset to the relative base overflowed
    AddressOverflow {
        /// The relative base at the time
        rel_base: i64,
        /// The operand's offset
        offset: i64,
    },
    /// A [BufferedIo] ran out of preloaded input
    OutOfInput,
    /// The inbound channel closed while the machine was waiting for input
    SenderClosed,
    /// Nobody is listening on the outbound channel anymore
    ReceiverClosed,
    /// The machine feeding the inbound channel failed
    UpstreamFailed(Box<RunError>),
}

impl Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::WriteToImmediate(i) => write!(f, "attempt to write immediate {i}"),
            Fault::NegativeAddress(addr) => write!(f, "attempt to access negative address {addr}"),
            Fault::JumpToNegative(addr) => write!(f, "attempt to jump to negative address {addr}"),
            Fault::AddressOverflow { rel_base, offset } => {
                write!(f, "relative address {rel_base} + {offset} overflows")
            }
            Fault::OutOfInput => write!(f, "out of input"),
            Fault::SenderClosed => write!(f, "sender closed unexpectedly"),
            Fault::ReceiverClosed => write!(f, "receiver closed unexpectedly"),
            Fault::UpstreamFailed(e) => write!(f, "upstream machine failed: {e}"),
        }
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Fault::UpstreamFailed(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a run stopped without halting
pub enum RunError {
    /// An instruction could not be decoded
    Decode(DecodeError),
    /// An instruction violated the machine's contract
    Fault {
        /// What went wrong
        fault: Fault,
        /// Address of the faulting instruction
        pc: u64,
    },
}

impl RunError {
    /// Whether this is a [DecodeError]
    pub fn is_decode(&self) -> bool {
        matches!(self, RunError::Decode(_))
    }

    /// Whether this is a [Fault]
    pub fn is_fault(&self) -> bool {
        matches!(self, RunError::Fault { .. })
    }

    /// Address of the instruction that failed
    pub fn pc(&self) -> u64 {
        match self {
            RunError::Decode(DecodeError::UnknownOpcode { addr, .. })
            | RunError::Decode(DecodeError::UnknownMode { addr, .. }) => *addr,
            RunError::Fault { pc, .. } => *pc,
        }
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Decode(e) => Display::fmt(e, f),
            RunError::Fault { fault, pc } => write!(f, "{fault} (instruction at {pc})"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunError::Decode(e) => Some(e),
            RunError::Fault { fault, .. } => Some(fault),
        }
    }
}

impl From<DecodeError> for RunError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}
