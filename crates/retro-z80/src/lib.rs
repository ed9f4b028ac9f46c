//! Instruction-accurate Z80 decoder/executor: the unprefixed, CB, ED, DD,
//! FD, DDCB, and FDCB opcode planes, driven one instruction at a time
//! against a [`retro_core::CpuContext`].
//!
//! This crate has no run loop of its own — [`step`] executes exactly one
//! instruction and [`service_interrupts`] checks the interrupt lines once
//! per boundary. The scheduler crate sequences the two and applies
//! throttling.

mod alu;
mod decode;
mod interrupt;
mod timing;

pub use decode::step;
pub use interrupt::service_interrupts;

#[cfg(test)]
mod tests {
    use retro_core::{Config, CpuContext, MemoryBus, Model, PortBus};

    fn harness() -> (CpuContext, MemoryBus, PortBus) {
        (CpuContext::new(Config { model: Model::Z80, ..Config::default() }), MemoryBus::new(), PortBus::new())
    }

    #[test]
    fn nop_advances_pc_by_one_and_consumes_four_t_states() {
        let (mut ctx, mut mem, mut io) = harness();
        mem.load(0, &[0x00]);
        let ticks = super::step(&mut ctx, &mut mem, &mut io);
        assert_eq!(ctx.regs.pc, 1);
        assert_eq!(ticks.get(), 4);
    }

    #[test]
    fn ld_bc_nn_loads_immediate_into_pair() {
        let (mut ctx, mut mem, mut io) = harness();
        mem.load(0, &[0x01, 0x34, 0x12]);
        super::step(&mut ctx, &mut mem, &mut io);
        assert_eq!(ctx.regs.bc(), 0x1234);
    }

    #[test]
    fn daa_after_add_produces_correct_bcd_digits() {
        // 0x15 + 0x27 = 0x3C raw; DAA must correct to 0x42 (15 + 27 = 42).
        //
        // H ends up set here. Real Z80 hardware and both of the teacher's
        // DAA implementations (`emu-z80`/`zilog-z80`'s `execute_daa`) derive
        // H-after-DAA from the pre-correction low nibble (0x0C, >9), which
        // sets it — see the Open Question entry in DESIGN.md. This diverges
        // from the scenario text in SPEC_FULL.md, which claims H clears.
        let (mut ctx, mut mem, mut io) = harness();
        ctx.regs.a = 0x15;
        mem.load(0, &[0xC6, 0x27, 0x27]); // ADD A,0x27 ; DAA
        super::step(&mut ctx, &mut mem, &mut io);
        super::step(&mut ctx, &mut mem, &mut io);
        assert_eq!(ctx.regs.a, 0x42);
        assert_ne!(ctx.regs.f & retro_core::flags::HF, 0, "H is set, not cleared, per real hardware");
        assert_eq!(ctx.regs.f & retro_core::flags::NF, 0);
        assert_eq!(ctx.regs.f & retro_core::flags::CF, 0);
        assert_ne!(ctx.regs.f & retro_core::flags::PF, 0);
        assert_eq!(ctx.regs.f & retro_core::flags::ZF, 0);
        assert_eq!(ctx.regs.f & retro_core::flags::SF, 0);
    }

    #[test]
    fn ldir_copies_block_and_clears_bc() {
        let (mut ctx, mut mem, mut io) = harness();
        mem.load(0x0000, &[0xED, 0xB0]); // LDIR
        mem.load(0x1000, &[1, 2, 3]);
        ctx.regs.set_hl(0x1000);
        ctx.regs.set_de(0x2000);
        ctx.regs.set_bc(3);
        for _ in 0..3 {
            ctx.regs.pc = 0;
            super::step(&mut ctx, &mut mem, &mut io);
        }
        assert_eq!(mem.read(0x2000), 1);
        assert_eq!(mem.read(0x2001), 2);
        assert_eq!(mem.read(0x2002), 3);
        assert_eq!(ctx.regs.bc(), 0);
    }

    #[test]
    fn bit_7_on_hl_indirect_takes_undocumented_flags_from_memptr() {
        let (mut ctx, mut mem, mut io) = harness();
        mem.load(0, &[0xCB, 0x7E]); // BIT 7,(HL)
        mem.write(0x3000, 0x80);
        ctx.regs.set_hl(0x3000);
        super::step(&mut ctx, &mut mem, &mut io);
        assert_ne!(ctx.regs.f & retro_core::flags::SF, 0);
        assert_eq!(ctx.regs.f & retro_core::flags::ZF, 0);
        // `BIT n,(HL)` does not touch WZ itself; Y/X come from whatever WZ
        // already held (0 here, fresh out of `CpuContext::new`), not HL.
        assert_eq!(ctx.regs.f & (retro_core::flags::YF | retro_core::flags::XF), 0);
    }

    #[test]
    fn ei_protects_the_following_instruction_from_interrupt_delivery() {
        let (mut ctx, mut mem, mut io) = harness();
        mem.load(0, &[0xFB, 0x00, 0x00]); // EI ; NOP ; NOP
        ctx.interrupts.request_interrupt(0xFF);
        super::step(&mut ctx, &mut mem, &mut io);
        assert!(ctx.regs.int_protection);
        let ticks = super::service_interrupts(&mut ctx, &mut mem);
        assert_eq!(ticks.get(), 0);
        assert!(!ctx.regs.int_protection);
        super::step(&mut ctx, &mut mem, &mut io);
        let ticks = super::service_interrupts(&mut ctx, &mut mem);
        assert!(ticks.get() > 0);
    }

    #[test]
    fn halt_with_interrupts_disabled_raises_op_halt() {
        let (mut ctx, mut mem, mut io) = harness();
        mem.load(0, &[0x76]); // HALT
        super::step(&mut ctx, &mut mem, &mut io);
        assert_eq!(ctx.cpu_error, retro_core::CpuError::OpHalt);
    }
}
