// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 2 built using the `intcode_vm` library.

use intcode_vm::prelude::*;

fn run_with(base: &Ram, noun: i64, verb: i64) -> i64 {
    let mut ram = base.clone();
    ram[1] = noun;
    ram[2] = verb;
    let mut io = BufferedIo::default();
    run(&mut ram, &mut io, 0).unwrap();
    assert!(io.written().is_empty(), "intcode had unexpected output");
    ram[0]
}

fn part1(base: &Ram) -> i64 {
    run_with(base, 12, 2)
}

fn part2(base: &Ram) -> i64 {
    for noun in 0..=99 {
        for verb in 0..=99 {
            #[allow(clippy::unreadable_literal, reason = "from Advent of Code")]
            if run_with(base, noun, verb) == 19690720 {
                return 100 * noun + verb;
            }
        }
    }
    panic!("no answer found for part 2");
}

fn main() {
    use std::env::args_os;
    let ram = Ram::load(args_os().nth(1).expect("missing file name")).unwrap();
    println!("part 1: {}", part1(&ram));
    println!("part 2: {}", part2(&ram));
}
