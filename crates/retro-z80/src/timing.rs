//! Base T-state tables for the unprefixed and CB opcode planes.
//!
//! These cover the common case; decode functions add the few
//! data-dependent adjustments themselves (conditional jump/call/return
//! taken vs. not taken, DJNZ looping, block-instruction repeats, and the
//! extra 5 T-states `(IX+d)`/`(IY+d)` addressing costs over plain `(HL)`).

#[rustfmt::skip]
pub const BASE_TSTATES: [u8; 256] = [
    4,  10, 7,  6,  4,  4,  7,  4,  4,  11, 7,  6,  4,  4,  7,  4,
    8,  10, 7,  6,  4,  4,  7,  4,  12, 11, 7,  6,  4,  4,  7,  4,
    7,  10, 16, 6,  4,  4,  7,  4,  7,  11, 16, 6,  4,  4,  7,  4,
    7,  10, 13, 6,  11, 11, 10, 4,  7,  11, 13, 6,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
    5,  10, 10, 10, 10, 11, 7,  11, 5,  10, 10, 0,  10, 17, 7,  11,
    5,  10, 10, 11, 10, 11, 7,  11, 5,  4,  10, 11, 10, 0,  7,  11,
    5,  10, 10, 19, 10, 11, 7,  11, 5,  4,  10, 4,  10, 0,  7,  11,
    5,  10, 10, 4,  10, 11, 7,  11, 5,  6,  10, 4,  10, 0,  7,  11,
];

const fn build_cb_tstates() -> [u8; 256] {
    let mut t = [8u8; 256];
    let mut i = 0;
    while i < 256 {
        if i & 7 == 6 {
            // (HL): rotate/shift/RES/SET cost 15, BIT costs 12.
            t[i] = if (i >> 6) == 1 { 12 } else { 15 };
        }
        i += 1;
    }
    t
}

/// `(HL)`-form T-states for the CB plane: register ops are 8, `(HL)` rotate
/// and shift and RES/SET ops are 15, `BIT` on `(HL)` is 12.
pub const CB_TSTATES: [u8; 256] = build_cb_tstates();

/// Extra T-states a DDCB/FDCB form costs over `prefix(4) + CB_TSTATES`'s
/// `(HL)` row: 23 total for rotate/shift/RES/SET, 20 total for BIT, in both
/// cases 4 more than the outer DD/FD prefix plus the base `(HL)` entry.
pub const DDFD_CB_EXTRA: u64 = 4;
