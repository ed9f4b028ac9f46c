//! Integration tests using Tom Harte's `SingleStepTests` for the Z80.
//!
//! Each JSON file covers one opcode (or prefixed opcode) with 1,000 random
//! initial states and their expected post-instruction state. Test data is
//! not vendored into this repository; point `Z80_SINGLE_STEP_TESTS` at a
//! checkout of <https://github.com/SingleStepTests/z80> to run this.

use std::collections::HashMap;
use std::fs;
use std::panic;
use std::path::PathBuf;

use retro_core::{Config, CpuContext, MemoryBus, Model, PortBus};
use serde::Deserialize;

#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    #[serde(default)]
    ports: Vec<(u16, u8, String)>,
}

#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    sp: u16,
    a: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    f: u8,
    h: u8,
    l: u8,
    i: u8,
    r: u8,
    ix: u16,
    iy: u16,
    #[serde(default)]
    wz: u16,
    #[serde(rename = "af_")]
    af_alt: u16,
    #[serde(rename = "bc_")]
    bc_alt: u16,
    #[serde(rename = "de_")]
    de_alt: u16,
    #[serde(rename = "hl_")]
    hl_alt: u16,
    iff1: u8,
    iff2: u8,
    im: u8,
    ram: Vec<(u16, u8)>,
}

fn setup(ctx: &mut CpuContext, mem: &mut MemoryBus, io: &mut PortBus, state: &CpuState, ports: &[(u16, u8, String)]) {
    for &(addr, value) in &state.ram {
        mem.load(addr, &[value]);
    }

    ctx.regs.a = state.a;
    ctx.regs.f = state.f;
    ctx.regs.b = state.b;
    ctx.regs.c = state.c;
    ctx.regs.d = state.d;
    ctx.regs.e = state.e;
    ctx.regs.h = state.h;
    ctx.regs.l = state.l;
    ctx.regs.a_alt = (state.af_alt >> 8) as u8;
    ctx.regs.f_alt = state.af_alt as u8;
    ctx.regs.b_alt = (state.bc_alt >> 8) as u8;
    ctx.regs.c_alt = state.bc_alt as u8;
    ctx.regs.d_alt = (state.de_alt >> 8) as u8;
    ctx.regs.e_alt = state.de_alt as u8;
    ctx.regs.h_alt = (state.hl_alt >> 8) as u8;
    ctx.regs.l_alt = state.hl_alt as u8;
    ctx.regs.ix = state.ix;
    ctx.regs.iy = state.iy;
    ctx.regs.sp = state.sp;
    ctx.regs.pc = state.pc;
    ctx.regs.i = state.i;
    ctx.regs.set_r_full(state.r);
    ctx.regs.wz = state.wz;
    ctx.regs.iff1 = state.iff1 != 0;
    ctx.regs.iff2 = state.iff2 != 0;
    ctx.regs.im = state.im;

    let reads: HashMap<u8, u8> = ports
        .iter()
        .filter(|(_, _, dir)| dir == "r")
        .map(|&(port, value, _)| (port as u8, value))
        .collect();
    for (port, value) in reads {
        io.connect_input(port, move |_| value);
    }
}

fn check_u8(errors: &mut Vec<String>, name: &str, actual: u8, expected: u8) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:02X}, want ${expected:02X}"));
    }
}

fn compare(ctx: &CpuContext, mem: &MemoryBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();
    check_u8(&mut errors, "A", ctx.regs.a, expected.a);
    check_u8(&mut errors, "F", ctx.regs.f, expected.f);
    check_u8(&mut errors, "B", ctx.regs.b, expected.b);
    check_u8(&mut errors, "C", ctx.regs.c, expected.c);
    check_u8(&mut errors, "D", ctx.regs.d, expected.d);
    check_u8(&mut errors, "E", ctx.regs.e, expected.e);
    check_u8(&mut errors, "H", ctx.regs.h, expected.h);
    check_u8(&mut errors, "L", ctx.regs.l, expected.l);
    check_u8(&mut errors, "I", ctx.regs.i, expected.i);
    check_u8(&mut errors, "R", ctx.regs.r_full(), expected.r);

    if ctx.regs.sp != expected.sp {
        errors.push(format!("SP: got ${:04X}, want ${:04X}", ctx.regs.sp, expected.sp));
    }
    if ctx.regs.pc != expected.pc {
        errors.push(format!("PC: got ${:04X}, want ${:04X}", ctx.regs.pc, expected.pc));
    }
    for &(addr, expected_val) in &expected.ram {
        let actual = mem.read(addr);
        if actual != expected_val {
            errors.push(format!("RAM[${addr:04X}]: got ${actual:02X}, want ${expected_val:02X}"));
        }
    }
    errors
}

fn test_data_dir() -> Option<PathBuf> {
    let dir = std::env::var("Z80_SINGLE_STEP_TESTS").ok()?;
    let path = PathBuf::from(dir);
    path.exists().then_some(path)
}

#[test]
#[ignore = "requires Z80_SINGLE_STEP_TESTS pointing at a SingleStepTests/z80 checkout"]
fn run_all() {
    let Some(test_dir) = test_data_dir() else {
        eprintln!("Z80_SINGLE_STEP_TESTS not set or missing; skipping.");
        return;
    };

    let mut filenames = Vec::new();
    for opcode in 0..=0xFFu8 {
        if !matches!(opcode, 0xCB | 0xDD | 0xED | 0xFD) {
            filenames.push(format!("{opcode:02x}.json"));
        }
    }
    for prefix in ["cb", "dd", "ed", "fd"] {
        for opcode in 0..=0xFFu8 {
            filenames.push(format!("{prefix} {opcode:02x}.json"));
        }
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;

    for filename in &filenames {
        let path = test_dir.join(filename);
        if !path.exists() {
            continue;
        }
        let data = fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {filename}: {e}"));
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| panic!("parsing {filename}: {e}"));

        for test in &tests {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                let mut ctx = CpuContext::new(Config { model: Model::Z80, ..Config::default() });
                let mut mem = MemoryBus::new();
                let mut io = PortBus::new();
                setup(&mut ctx, &mut mem, &mut io, &test.initial, &test.ports);
                retro_z80::step(&mut ctx, &mut mem, &mut io);
                compare(&ctx, &mem, &test.final_state)
            }));
            match result {
                Ok(errors) if errors.is_empty() => total_pass += 1,
                Ok(errors) => {
                    total_fail += 1;
                    eprintln!("FAIL [{}]: {}", test.name, errors.join(", "));
                }
                Err(_) => {
                    total_fail += 1;
                    eprintln!("PANIC [{}]", test.name);
                }
            }
        }
    }

    println!("Z80 SingleStepTests: {total_pass}/{} passed", total_pass + total_fail);
    assert_eq!(total_fail, 0, "{total_fail} SingleStepTests failed");
}
