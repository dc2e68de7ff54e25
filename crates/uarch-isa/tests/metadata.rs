//! Cross-table consistency checks over the public metadata API.

use uarch_isa::{CondCode, FuncUnit, OpClass, Opcode, UnitMask};

#[test]
fn unit_masks_only_reference_real_ports() {
    let valid = UnitMask::ANY_INT | UnitMask::ANY_FPU;
    for op in Opcode::ALL {
        assert!(valid.contains(op.info().units), "{op} references unknown units");
    }
}

#[test]
fn loads_and_stores_are_port_restricted() {
    for op in Opcode::ALL {
        let info = op.info();
        if op.is_load() {
            assert_eq!(info.units & !UnitMask::ANY_LDU, UnitMask::empty(), "{op}");
        }
        if op.is_store() {
            assert_eq!(info.units & !UnitMask::ANY_STU, UnitMask::empty(), "{op}");
        }
    }
}

#[test]
fn fp_classes_execute_on_fp_ports_only() {
    for op in Opcode::ALL {
        if op.in_class(OpClass::FP) {
            assert_eq!(
                op.info().units & !UnitMask::ANY_FPU,
                UnitMask::empty(),
                "{op} is FP but eligible on integer ports"
            );
        }
    }
}

#[test]
fn barrier_ops_never_issue_to_store_ports() {
    // Internal control-flow ops go down the ALU or load pipes.
    for op in Opcode::ALL {
        if op.is_barrier() {
            assert!(op.is_branch(), "{op}: barrier modifier on a non-branch");
            assert!(!op.info().units.intersects(UnitMask::ANY_STU), "{op}");
        }
    }
}

#[test]
fn every_eligible_unit_is_enumerable() {
    for op in Opcode::ALL {
        let units: Vec<FuncUnit> = op.info().units.units().collect();
        assert!(!units.is_empty(), "{op}");
        for unit in units {
            assert!(op.info().units.allows(unit));
        }
    }
}

#[test]
fn cond_code_table_is_total_over_the_encoding() {
    for idx in 0u8..16 {
        let cond = CondCode::from_index(idx).unwrap();
        assert_eq!(cond as u8, idx);
        let regs = cond.flag_regs();
        // Either a single-register bit test or an explicit combine.
        if regs.combine {
            assert_ne!(regs.reg0, regs.reg1);
        }
    }
    assert!(CondCode::from_index(16).is_none());
}
