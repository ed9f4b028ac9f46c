//! Per-opcode base T-state costs, table-driven the same way as
//! `retro-z80`'s `timing.rs`. Conditional `RET`/`CALL` need a small
//! data-dependent adjustment applied inline by the caller, since the
//! datasheet gives a different cycle count depending on whether the branch
//! is taken.

const fn build_base() -> [u8; 256] {
    let mut table = [4u8; 256];

    // z=1: LXI (q=0) / DAD (q=1).
    let mut p = 0u8;
    while p < 4 {
        table[(p << 4 | 0x01) as usize] = 10; // LXI rp,nn
        table[(p << 4 | 0x09) as usize] = 10; // DAD rp
        p += 1;
    }

    // z=2: STAX/LDAX (rp B/D only) = 7; SHLD/LHLD/STA/LDA (rp H/SP rows) = 13 or 16.
    table[0x02] = 7; // STAX B
    table[0x12] = 7; // STAX D
    table[0x0A] = 7; // LDAX B
    table[0x1A] = 7; // LDAX D
    table[0x22] = 16; // SHLD nn
    table[0x2A] = 16; // LHLD nn
    table[0x32] = 13; // STA nn
    table[0x3A] = 13; // LDA nn

    // z=3: INX/DCX = 5.
    p = 0;
    while p < 4 {
        table[(p << 4 | 0x03) as usize] = 5;
        table[(p << 4 | 0x0B) as usize] = 5;
        p += 1;
    }

    // z=4/5: INR/DCR r = 5, except (HL) = 10.
    let mut y = 0u8;
    while y < 8 {
        let base = y << 3;
        table[(base | 0x04) as usize] = if y == 6 { 10 } else { 5 };
        table[(base | 0x05) as usize] = if y == 6 { 10 } else { 5 };
        table[(base | 0x06) as usize] = if y == 6 { 10 } else { 7 }; // MVI r,n
        y += 1;
    }

    // x=1: MOV grid, 5 for reg-reg, 7 for either operand through (HL), HLT = 7.
    let mut opcode: usize = 0x40;
    while opcode <= 0x7F {
        let dst = (opcode >> 3) & 7;
        let src = opcode & 7;
        table[opcode] = if dst == 6 || src == 6 { 7 } else { 5 };
        opcode += 1;
    }
    table[0x76] = 7; // HLT

    // x=2: ALU against register = 4, against (HL) = 7.
    opcode = 0x80;
    while opcode <= 0xBF {
        table[opcode] = if opcode & 7 == 6 { 7 } else { 4 };
        opcode += 1;
    }

    // Base cost for conditional RET; CALL adjusts upward when taken.
    y = 0;
    while y < 8 {
        table[(0xC0 | y << 3) as usize] = 5; // RET cc (not taken)
        table[(0xC2 | y << 3) as usize] = 10; // JMP cc,nn
        table[(0xC4 | y << 3) as usize] = 11; // CALL cc,nn (not taken)
        y += 1;
    }

    table[0xC9] = 10; // RET
    table[0xD9] = 10; // dup RET
    table[0xC3] = 10; // JMP
    table[0xCB] = 10; // dup JMP
    table[0xCD] = 17; // CALL
    table[0xDD] = 17; // dup CALL
    table[0xED] = 17; // dup CALL
    table[0xFD] = 17; // dup CALL
    table[0xC6] = 7; // ADI
    table[0xCE] = 7; // ACI
    table[0xD6] = 7; // SUI
    table[0xDE] = 7; // SBI
    table[0xE6] = 7; // ANI
    table[0xEE] = 7; // XRI
    table[0xF6] = 7; // ORI
    table[0xFE] = 7; // CPI
    table[0xD3] = 10; // OUT n
    table[0xDB] = 10; // IN n
    table[0xE3] = 18; // XTHL
    table[0xEB] = 4; // XCHG
    table[0xE9] = 5; // PCHL
    table[0xF9] = 5; // SPHL
    table[0xF3] = 4; // DI
    table[0xFB] = 4; // EI

    p = 0;
    while p < 4 {
        table[(0xC1 | p << 4) as usize] = 10; // POP rp2[p]
        table[(0xC5 | p << 4) as usize] = 11; // PUSH rp2[p]
        p += 1;
    }

    y = 0;
    while y < 8 {
        table[(0xC7 | y << 3) as usize] = 11; // RST y
        y += 1;
    }

    table
}

pub static BASE_TSTATES: [u8; 256] = build_base();

/// Extra T-states when a conditional `RET` is actually taken (5 -> 11).
pub const RET_TAKEN_EXTRA: u64 = 6;
/// Extra T-states when a conditional `CALL` is actually taken (11 -> 17).
pub const CALL_TAKEN_EXTRA: u64 = 6;
