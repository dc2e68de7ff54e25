//! Property tests over the packed micro-op encodings.

#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use uarch_isa::{ArchReg, Opcode};
use uarch_uops::{MaskControl, OpSize, TransOp};

proptest! {
    #[test]
    fn mask_control_round_trips(ms in 0u8..64, mc in 0u8..64, ds in 0u8..64) {
        let packed = MaskControl::new(ms, mc, ds).pack();
        let back = MaskControl::unpack(packed);
        prop_assert_eq!(back, MaskControl { ms, mc, ds });
    }

    #[test]
    fn mask_control_ignores_high_bits(ms in 0u8..64, mc in 0u8..64, ds in 0u8..64, junk in any::<i64>()) {
        let packed = MaskControl::new(ms, mc, ds).pack() | (junk << 18);
        let back = MaskControl::unpack(packed);
        prop_assert_eq!(back.ms, ms);
        prop_assert_eq!(back.mc, mc);
        prop_assert_eq!(back.ds, ds);
    }

    #[test]
    fn rendering_never_panics_for_arbitrary_field_encodings(
        opcode_idx in 0u8..Opcode::COUNT as u8,
        rd in any::<u8>(),
        ra in any::<u8>(),
        rb in any::<u8>(),
        rc in any::<u8>(),
        size_idx in 0u8..4,
        cond in any::<u8>(),
        rbimm in any::<i64>(),
        rcimm in any::<i64>(),
    ) {
        // Out-of-range register ids and selector values must render as
        // placeholders, never abort the dump.
        let opcode = Opcode::from_index(opcode_idx).unwrap();
        let mut uop = TransOp::new(
            opcode,
            ArchReg(rd),
            ArchReg(ra),
            ArchReg(rb),
            ArchReg(rc),
            rbimm,
            rcimm,
        );
        uop.size = OpSize::from_index(size_idx).unwrap();
        uop.cond = cond;
        let text = uop.to_string();
        prop_assert!(!text.is_empty());
    }
}
