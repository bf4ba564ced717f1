//! A tiny interpreter for the assembly subset the code generator emits, so
//! tests can check exit statuses without nasm and ld.

#![allow(dead_code)]

use std::collections::HashMap;

use hydroc::compile;

const STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Default)]
struct Machine {
    regs: HashMap<String, i64>,
    stack: Vec<i64>,
    zero_flag: bool,
}

impl Machine {
    fn reg(&self, name: &str) -> i64 {
        *self.regs.get(name).unwrap_or(&0)
    }

    fn set(&mut self, name: &str, value: i64) {
        self.regs.insert(name.to_string(), value);
    }

    /// `[rsp + n]` or `QWORD [rsp + n]` to an index into `stack`.
    fn slot(&self, operand: &str) -> usize {
        let inner = operand
            .trim_start_matches("QWORD")
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');
        let offset: usize = inner
            .trim_start_matches("rsp")
            .trim()
            .trim_start_matches('+')
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("bad memory operand {operand}"));
        assert_eq!(offset % 8, 0, "misaligned slot {operand}");
        self.stack.len() - 1 - offset / 8
    }

    fn value(&self, operand: &str) -> i64 {
        if operand.contains('[') {
            self.stack[self.slot(operand)]
        } else if let Ok(imm) = operand.parse::<i64>() {
            imm
        } else {
            self.reg(operand)
        }
    }
}

/// Runs generated assembly and returns the status passed to `exit`.
pub fn simulate(asm: &str) -> u8 {
    let lines: Vec<&str> = asm
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(";;") && !l.starts_with("global"))
        .collect();

    let labels: HashMap<&str, usize> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.strip_suffix(':').map(|name| (name, i)))
        .collect();

    let mut m = Machine::default();
    let mut pc = 0;

    for _ in 0..STEP_LIMIT {
        let Some(&line) = lines.get(pc) else {
            panic!("fell off the end of the program");
        };
        pc += 1;

        if line.ends_with(':') {
            continue;
        }

        let (op, rest) = line.split_once(' ').unwrap_or((line, ""));
        let operands: Vec<&str> = rest.split(", ").map(str::trim).collect();

        match op {
            "push" => {
                let v = m.value(operands[0]);
                m.stack.push(v);
            }
            "pop" => {
                let v = m.stack.pop().expect("pop on empty stack");
                m.set(operands[0], v);
            }
            "mov" if operands[0].starts_with('[') => {
                let slot = m.slot(operands[0]);
                let v = m.value(operands[1]);
                m.stack[slot] = v;
            }
            "mov" => {
                let v = m.value(operands[1]);
                m.set(operands[0], v);
            }
            "add" if operands[0] == "rsp" => {
                let bytes: usize = operands[1].parse().unwrap();
                let len = m.stack.len() - bytes / 8;
                m.stack.truncate(len);
            }
            "add" => {
                let v = m.reg(operands[0]).wrapping_add(m.value(operands[1]));
                m.set(operands[0], v);
            }
            "sub" => {
                let v = m.reg(operands[0]).wrapping_sub(m.value(operands[1]));
                m.set(operands[0], v);
            }
            "imul" => {
                let v = m.reg(operands[0]).wrapping_mul(m.value(operands[1]));
                m.set(operands[0], v);
            }
            "cqo" => {
                let rdx = if m.reg("rax") < 0 { -1 } else { 0 };
                m.set("rdx", rdx);
            }
            "idiv" => {
                let divisor = m.value(operands[0]);
                assert_ne!(divisor, 0, "division by zero");
                let rax = m.reg("rax");
                m.set("rax", rax.wrapping_div(divisor));
                m.set("rdx", rax.wrapping_rem(divisor));
            }
            "test" => {
                m.zero_flag = (m.value(operands[0]) & m.value(operands[1])) == 0;
            }
            "jz" => {
                if m.zero_flag {
                    pc = labels[operands[0]];
                }
            }
            "jmp" => pc = labels[operands[0]],
            "syscall" => {
                assert_eq!(m.reg("rax"), 60, "only exit is supported");
                return m.reg("rdi") as u8;
            }
            other => panic!("unsupported instruction `{other}` in `{line}`"),
        }
    }

    panic!("step limit exceeded");
}

/// Compiles `source` and runs it, returning the exit status.
pub fn run(source: &str) -> u8 {
    let asm = compile(source).unwrap_or_else(|e| panic!("compile failed: {e}\n{source}"));
    simulate(&asm)
}
