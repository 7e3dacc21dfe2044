//! Test that examples from Advent of Code problem descriptions behave as described.
// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use intcode_vm::prelude::*;
use intcode_vm::{Flow, Instruction, OpCode, Operand, Resources, decode};
use itertools::Itertools;

// first, some groundwork for common elements of different tests

/// Construct new memory with the given starting code
macro_rules! ram {
    [$($i:expr),* $(,)?] => {{
        Ram::new([$($i),*])
    }}
}

/// Run a program to the end, returning its output.
/// Borrows the memory in case its final state is useful
fn run_to_end(ram: &mut Ram, inputs: impl IntoIterator<Item = i64>) -> Result<Vec<i64>, RunError> {
    let mut io = BufferedIo::new(inputs);
    run(ram, &mut io, 0)?;
    Ok(io.into_written())
}

/// Step through a program, collecting the address and opcode of each instruction executed
fn trace(ram: &mut Ram, inputs: impl IntoIterator<Item = i64>) -> Vec<(u64, OpCode)> {
    let mut io = BufferedIo::new(inputs);
    let mut res = Resources::new(ram, &mut io);
    let mut pc = 0;
    let mut seen = Vec::new();
    loop {
        let instr = decode(res.ram(), pc).unwrap();
        seen.push((pc, instr.opcode()));
        match res.step(pc).unwrap() {
            Flow::Continue(next) => pc = next,
            Flow::Halt => return seen,
        }
    }
}

fn validate_trace(expected: impl IntoIterator<Item = (u64, OpCode)>, traced: Vec<(u64, OpCode)>) {
    expected
        .into_iter()
        .zip_eq(traced)
        .for_each(|(expected, actual)| assert_eq!(expected, actual));
}

mod day2_examples {
    mod part1 {
        use crate::*;

        /// the extended example used to help illustrate the basics
        #[test]
        fn extended_example() {
            let mut ram = ram![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50];
            let traced = trace(&mut ram, []);
            validate_trace(
                [(0, OpCode::Add), (4, OpCode::Mul), (8, OpCode::Halt)],
                traced,
            );
            assert_eq!(ram.read(3), 70);
            assert_eq!(ram.read(0), 3500);
            assert_eq!(
                ram.into_iter().collect_vec(),
                vec![3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50]
            );
        }

        /// the extra, smaller examples that are listed after the extended example
        #[test]
        fn small_examples() {
            macro_rules! example {
                ($($code: literal),+ becomes $($output: literal),+) => {{
                    let mut ram = ram![$($code),*];
                    assert!(run_to_end(&mut ram, []).unwrap().is_empty());
                    for (i, val) in [$($output),+].into_iter().enumerate() {
                        assert_eq!(ram[i as u64], val);
                    }
                }}
            }
            example!(1,0,0,0,99 becomes 2,0,0,0,99);
            example!(2,3,0,3,99 becomes 2,3,0,6,99);
            example!(2,4,4,5,99,0 becomes 2,4,4,5,99,9801);
            example!(1,1,1,4,99,5,6,0,99 becomes 30,1,1,4,2,5,6,0,99);
        }
    }
}

mod day5_examples {
    mod part1 {
        use crate::*;

        #[test]
        fn echo_input() {
            let template = ram![3, 0, 4, 0, 99];
            for i in -128..128 {
                assert_eq!(run_to_end(&mut template.clone(), [i]).unwrap(), vec![i]);
            }
        }

        #[test]
        fn immediate_mode_example() {
            let mut ram = ram![1002, 4, 3, 4, 33];
            let Instruction::Multiply(a, b, dest) = decode(&ram, 0).unwrap() else {
                panic!("1002 should decode to a multiply");
            };
            assert_eq!(
                [a, b, dest],
                [Operand::Position(4), Operand::Immediate(3), Operand::Position(4)]
            );
            validate_trace([(0, OpCode::Mul), (4, OpCode::Halt)], trace(&mut ram, []));
            assert_eq!(ram.read(4), 99);
        }

        #[test]
        fn negative_values() {
            let mut ram = ram![1101, 100, -1, 4, 0];
            assert!(run_to_end(&mut ram, []).unwrap().is_empty());
            assert_eq!(ram.read(4), 99);
        }

        #[test]
        fn add_one() {
            let mut ram = ram![3, 9, 101, 1, 9, 9, 4, 9, 99, 0];
            assert_eq!(run_to_end(&mut ram, [15]).unwrap(), vec![16]);
        }
    }

    mod part2 {
        use crate::*;

        #[test]
        fn comparison_examples() {
            let templates = [
                (ram![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8], OpCode::Eq),
                (ram![3, 9, 7, 9, 10, 9, 4, 9, 99, -1, 8], OpCode::Lt),
                (ram![3, 3, 1108, -1, 8, 3, 4, 3, 99], OpCode::Eq),
                (ram![3, 3, 1107, -1, 8, 3, 4, 3, 99], OpCode::Lt),
            ];

            for input in [7, 8, 9] {
                for (template, cmp_op) in &templates {
                    let expected = if *cmp_op == OpCode::Lt {
                        input < 8
                    } else {
                        input == 8
                    } as i64;
                    let mut ram = template.clone();
                    validate_trace(
                        [
                            (0, OpCode::In),
                            (2, *cmp_op),
                            (6, OpCode::Out),
                            (8, OpCode::Halt),
                        ],
                        trace(&mut ram.clone(), [input]),
                    );
                    assert_eq!(run_to_end(&mut ram, [input]).unwrap(), vec![expected]);
                }
            }
        }

        #[test]
        fn jump_examples() {
            let templates = [
                ram![3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9],
                ram![3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1],
            ];
            for i in [0, 1, -3] {
                for template in &templates {
                    let output = run_to_end(&mut template.clone(), [i]).unwrap();
                    assert_eq!(output, vec![(i != 0) as i64]);
                }
            }
        }

        /// the larger example, which outputs 999, 1000, or 1001 based on how the input compares
        /// with 8
        #[test]
        fn larger_example() {
            let template = ram![
                3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0, 36,
                98, 0, 0, 1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46, 1101, 1000,
                1, 20, 4, 20, 1105, 1, 46, 98, 99,
            ];
            for (input, expected) in [(-5, 999), (7, 999), (8, 1000), (9, 1001), (100, 1001)] {
                assert_eq!(
                    run_to_end(&mut template.clone(), [input]).unwrap(),
                    vec![expected]
                );
            }
        }

        #[test]
        fn branching() {
            let mut ram = ram![11105, 1, 4, 99, 11106, 0, 8, 99, 11104, 1, 99];
            assert_eq!(run_to_end(&mut ram, []).unwrap(), vec![1]);
        }

        #[test]
        fn compare_immediates() {
            // lt 1, 2 => *13, eq 1, 2 => *14, out *13, out *14, hlt
            let mut ram = ram![1107, 1, 2, 13, 1108, 1, 2, 14, 4, 13, 4, 14, 99, 0, 0];
            assert_eq!(run_to_end(&mut ram, []).unwrap(), vec![1, 0]);
        }
    }
}

mod day9_examples {
    mod part1 {
        use crate::*;

        /// > takes no input and produces a copy of itself as output.
        #[test]
        fn quine() {
            let quine_code = [
                109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
            ];
            let mut ram = Ram::new(quine_code);
            let output = run_to_end(&mut ram, []).unwrap();
            assert_eq!(output.as_slice(), quine_code.as_slice());
        }

        /// > should output a 16-digit number
        #[test]
        fn output_sixteen_digit() {
            let mut ram = ram![1102, 34915192, 34915192, 7, 4, 7, 99, 0];
            let output = run_to_end(&mut ram, []).unwrap();
            assert_eq!(output.len(), 1, "{output:?}");
            assert_eq!(output[0].to_string().len(), 16, "{output:?}");
        }

        /// > should output the large number in the middle
        #[test]
        fn large_number() {
            let mut ram = ram![104, 1125899906842624, 99];
            let output = run_to_end(&mut ram, []).unwrap();
            assert_eq!(output, vec![1125899906842624]);
        }

        #[test]
        fn relative_output() {
            let mut ram = ram![109, 7, 204, -2, 99, 42];
            assert_eq!(run_to_end(&mut ram, []).unwrap(), vec![42]);
        }
    }
}

mod failures {
    use crate::*;
    use intcode_vm::{DecodeError, Fault};

    #[test]
    fn bad_opcode() {
        let err = run_to_end(&mut ram![1101, 1, 1, 0, 42], []).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.pc(), 4);
        assert_eq!(
            err,
            RunError::Decode(DecodeError::UnknownOpcode { opcode: 42, addr: 4 })
        );
    }

    #[test]
    fn bad_mode() {
        let err = run_to_end(&mut ram![301, 0, 0, 0, 99], []).unwrap_err();
        assert_eq!(
            err,
            RunError::Decode(DecodeError::UnknownMode { mode: 3, addr: 0 })
        );
    }

    #[test]
    fn negative_address() {
        let err = run_to_end(&mut ram![4, -1, 99], []).unwrap_err();
        assert!(err.is_fault());
        assert_eq!(
            err,
            RunError::Fault {
                fault: Fault::NegativeAddress(-1),
                pc: 0
            }
        );
    }

    #[test]
    fn negative_jump() {
        let err = run_to_end(&mut ram![1105, 1, -4], []).unwrap_err();
        assert_eq!(
            err,
            RunError::Fault {
                fault: Fault::JumpToNegative(-4),
                pc: 0
            }
        );
    }
}

mod properties {
    use crate::*;
    use proptest::prelude::*;

    /// Published example programs, each paired with how many input values it reads
    fn programs() -> impl Strategy<Value = (Ram, usize)> {
        prop_oneof![
            Just((ram![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50], 0)),
            Just((ram![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8], 1)),
            Just((ram![3, 3, 1107, -1, 8, 3, 4, 3, 99], 1)),
            Just((ram![3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9], 1)),
            Just((
                ram![
                    3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0,
                    36, 98, 0, 0, 1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46,
                    1101, 1000, 1, 20, 4, 20, 1105, 1, 46, 98, 99,
                ],
                1
            )),
            Just((
                ram![109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99],
                0
            )),
            Just((ram![1102, 34915192, 34915192, 7, 4, 7, 99, 0], 0)),
        ]
    }

    proptest! {
        /// Running the same program on the same input twice gives the same output and memory
        #[test]
        fn deterministic(
            (template, reads) in programs(),
            inputs in proptest::collection::vec(-20i64..20, 1),
        ) {
            let inputs = &inputs[..reads];
            let (mut a, mut b) = (template.clone(), template);
            let first = run_to_end(&mut a, inputs.iter().copied());
            prop_assert!(first.is_ok(), "{first:?}");
            prop_assert_eq!(first, run_to_end(&mut b, inputs.iter().copied()));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn echo(input in any::<i64>()) {
            prop_assert_eq!(run_to_end(&mut ram![3, 0, 4, 0, 99], [input]).unwrap(), vec![input]);
        }
    }
}
