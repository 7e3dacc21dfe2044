// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Disassembler-related functionality
//!
//! See [disassemble] for documentation

use itertools::Itertools;

use crate::{Instruction, Ram, decode};

/// Decode the word at `addr` only if it's exactly how an instruction with its opcode and modes
/// would be encoded, with no ignored mode digits
fn decode_strict(ram: &Ram, addr: u64) -> Option<Instruction> {
    let word = ram.read(addr);
    let instr = decode(ram, addr).ok()?;
    let rebuilt = instr
        .operands()
        .iter()
        .zip([100, 1000, 10000])
        .fold(instr.opcode() as i64, |acc, (op, scale)| {
            acc + op.mode() as i64 * scale
        });
    let fits = addr.checked_add(instr.size()).is_some_and(|end| end <= ram.extent());
    (rebuilt == word && fits).then_some(instr)
}

/// Create a listing of the memory, from address 0 up to its [extent](Ram::extent)
///
/// # Example
///
/// ```
/// use intcode_vm::{Ram, disasm::disassemble};
/// let ram = Ram::new([109, 7, 204, -2, 99, 42, 43]);
///
/// const EXPECTED: &str = r#"
/// 0000: setrelbase 7
/// 0002: out *R-2
/// 0004: hlt
/// 0005: data 42, 43
/// "#;
/// assert_eq!(disassemble(&ram), EXPECTED.trim_start());
/// ```
///
/// # Caveats
///
/// Due to the ability to jump to any address, it's ambiguous where an instruction begins, and
/// data can look just like valid instructions. This function starts at address 0 and treats the
/// first valid instruction it finds as the start of an instruction, falling back to `data` lines
/// for anything that can't be matched. Words with nonzero [mode](crate::ParamMode) digits that the
/// opcode doesn't use are also treated as data, even though they would execute without issue.
///
/// Because programs can modify themselves, the listing only reflects memory at the time it was
/// taken.
pub fn disassemble(ram: &Ram) -> String {
    let mut lines = Vec::new();
    let mut addr = 0;

    while addr < ram.extent() {
        if let Some(instr) = decode_strict(ram, addr) {
            lines.push(format!("{addr:04}: {instr}"));
            addr += instr.size();
        } else {
            let start = addr;
            let mut data = vec![ram.read(addr)];
            addr += 1;
            while addr < ram.extent() && decode_strict(ram, addr).is_none() {
                data.push(ram.read(addr));
                addr += 1;
            }
            lines.push(format!("{start:04}: data {}", data.into_iter().format(", ")));
        }
    }

    lines.into_iter().map(|line| format!("{line}\n")).collect()
}
