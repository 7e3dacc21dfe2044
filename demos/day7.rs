// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 7 built using the `intcode_vm` library.
//!
//! Part 1 chains the amplifiers synchronously, part 2 wires them into a feedback loop with each
//! amplifier running on its own thread.

use intcode_vm::prelude::*;
use intcode_vm::{ChannelIo, spawn};
use itertools::Itertools;
use std::sync::mpsc;

fn chain(base: &Ram, phases: &[i64]) -> i64 {
    phases.iter().fold(0, |signal, &phase| {
        let mut io = BufferedIo::new([phase, signal]);
        run(&mut base.clone(), &mut io, 0).unwrap();
        *io.written().last().expect("amplifier had no output")
    })
}

fn feedback_loop(base: &Ram, phases: &[i64]) -> i64 {
    let (senders, receivers): (Vec<_>, Vec<_>) = phases.iter().map(|_| mpsc::channel()).unzip();
    for (tx, &phase) in senders.iter().zip(phases) {
        tx.send(Message::Value(phase)).unwrap();
    }
    senders[0].send(Message::Value(0)).unwrap();

    // amplifier n writes to amplifier n + 1, and the last one writes back to the main thread
    let (last_tx, last_rx) = mpsc::channel();
    let outbound = senders.iter().skip(1).cloned().chain([last_tx]);
    let handles = receivers
        .into_iter()
        .zip(outbound)
        .enumerate()
        .map(|(n, (rx, tx))| spawn(format!("amp{n}"), base.clone(), ChannelIo::new(rx, tx)))
        .collect_vec();
    let first = senders.into_iter().next().expect("no amplifiers");

    let mut signal = None;
    for msg in last_rx {
        let val = msg.value().expect("amplifier failed");
        signal = Some(val);
        // once the first amplifier halts, there's nowhere for the signal to go
        let _ = first.send(Message::Value(val));
    }
    for handle in handles {
        handle.join().unwrap().1.unwrap();
    }
    signal.expect("no signal reached the thrusters")
}

fn best(base: &Ram, phases: std::ops::Range<i64>, f: fn(&Ram, &[i64]) -> i64) -> i64 {
    phases
        .permutations(5)
        .map(|p| f(base, &p))
        .max()
        .expect("no permutations")
}

fn main() {
    use std::env::args_os;
    let ram = Ram::load(args_os().nth(1).expect("missing file name")).unwrap();
    println!("part 1: {}", best(&ram, 0..5, chain));
    println!("part 2: {}", best(&ram, 5..10, feedback_loop));
}
