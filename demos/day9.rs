// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 9 built using the `intcode_vm` library.

use intcode_vm::prelude::*;

fn boost(mut ram: Ram, mode: i64) -> i64 {
    let mut io = BufferedIo::new([mode]);
    run(&mut ram, &mut io, 0).unwrap();
    let output = io.into_written();
    assert_eq!(output.len(), 1, "{output:?}");
    output[0]
}

fn main() {
    use std::env::args_os;
    let ram = Ram::load(args_os().nth(1).expect("missing file name")).unwrap();
    println!("part 1: {}", boost(ram.clone(), 1));
    println!("part 2: {}", boost(ram, 2));
}
