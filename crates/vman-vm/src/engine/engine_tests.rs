//! VM execution tests over images produced by `ImageBuilder`.

use vman_bytecode::{BinaryOp, DecodeError, ImageBuilder, MAGIC, Opcode, Program};

use super::{
    BranchOperand, Compat, REGISTER_COUNT, Registers, RunReport, RuntimeError, State,
    UnknownOpcodePolicy, VM,
};

fn run(program: &Program) -> RunReport {
    VM::builder(program).build().run()
}

fn registers(values: &[(usize, i32)]) -> Registers {
    let mut all = [0; REGISTER_COUNT];
    for &(i, v) in values {
        all[i] = v;
    }
    Registers::from_array(all)
}

#[test]
fn end_to_end_mov_then_halt() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x18u64.to_le_bytes());
    bytes.extend_from_slice(&MAGIC.to_le_bytes());
    bytes.extend_from_slice(&[0; 8]);
    bytes.extend_from_slice(&[0x25, 0x00, 0x00, 0x00, 0x00, 0x05]);
    let program = Program::from_bytes(bytes).unwrap();

    let report = run(&program);

    assert_eq!(report.state, State::Halted(0));
    assert_eq!(report.registers, registers(&[(0, 5)]));
    assert_eq!(report.pc, 0x1e);
    assert_eq!(report.steps, 1);
}

#[test]
fn bad_magic_never_reaches_vm() {
    let mut b = ImageBuilder::new().magic(0);
    b.mov(0, 5);
    assert!(b.build_program().is_err());
}

#[test]
fn empty_code_halts_without_steps() {
    let program = ImageBuilder::new().build_program().unwrap();
    let report = run(&program);
    assert_eq!(report.state, State::Halted(0));
    assert_eq!(report.steps, 0);
    assert_eq!(report.registers, Registers::new());
}

#[test]
fn entry_point_past_end_halts() {
    let mut b = ImageBuilder::new().entry_point(0x100);
    b.mov(0, 1);
    let program = b.build_program().unwrap();

    let report = run(&program);
    assert_eq!(report.state, State::Halted(0));
    assert_eq!(report.registers, Registers::new());
}

#[test]
fn binary_ops_write_only_destination() {
    let cases = [
        (BinaryOp::Add, 7, -3, 4),
        (BinaryOp::Sub, 7, -3, 10),
        (BinaryOp::Mul, 7, -3, -21),
        (BinaryOp::Div, 7, -3, -2),
        (BinaryOp::Mod, 7, -3, 1),
        (BinaryOp::Mod, -7, 3, -1),
        (BinaryOp::Lsh, 1, 4, 16),
        (BinaryOp::Rsh, -16, 2, -4),
        (BinaryOp::And, 0b1100, 0b1010, 0b1000),
        (BinaryOp::Or, 0b1100, 0b1010, 0b1110),
        (BinaryOp::Xor, 0b1100, 0b1010, 0b0110),
    ];

    for (op, a, b, expected) in cases {
        let mut builder = ImageBuilder::new();
        builder.mov(4, a).mov(5, b).binary(op, 9, 4, 5);
        let program = builder.build_program().unwrap();

        let report = run(&program);

        assert_eq!(report.state, State::Halted(0), "{op:?}");
        assert_eq!(
            report.registers,
            registers(&[(4, a), (5, b), (9, expected)]),
            "{op:?} {a} {b}"
        );
    }
}

#[test]
fn arithmetic_wraps() {
    let mut b = ImageBuilder::new();
    b.mov(1, 1)
        .mov(2, 31)
        .binary(BinaryOp::Lsh, 3, 1, 2) // i32::MIN
        .mov(4, -1)
        .binary(BinaryOp::Div, 5, 3, 4)
        .binary(BinaryOp::Mod, 6, 3, 4)
        .binary(BinaryOp::Sub, 7, 3, 1)
        .binary(BinaryOp::Add, 8, 7, 1)
        .binary(BinaryOp::Mul, 9, 3, 4);
    let program = b.build_program().unwrap();

    let r = run(&program).registers;

    assert_eq!(r.get(3), Some(i32::MIN));
    assert_eq!(r.get(5), Some(i32::MIN));
    assert_eq!(r.get(6), Some(0));
    assert_eq!(r.get(7), Some(i32::MAX));
    assert_eq!(r.get(8), Some(i32::MIN));
    assert_eq!(r.get(9), Some(i32::MIN));
}

#[test]
fn shift_amount_is_masked() {
    let mut b = ImageBuilder::new();
    b.mov(1, 1)
        .mov(2, 33)
        .binary(BinaryOp::Lsh, 0, 1, 2)
        .mov(3, -1)
        .binary(BinaryOp::Rsh, 4, 3, 2);
    let program = b.build_program().unwrap();

    let r = run(&program).registers;
    assert_eq!(r.get(0), Some(2));
    assert_eq!(r.get(4), Some(-1));
}

#[test]
fn not_writes_only_destination() {
    let mut b = ImageBuilder::new();
    b.mov(1, 5).not(0, 1);
    let program = b.build_program().unwrap();

    assert_eq!(run(&program).registers, registers(&[(0, -6), (1, 5)]));
}

#[test]
fn division_by_zero_faults_without_writes() {
    for op in [BinaryOp::Div, BinaryOp::Mod] {
        let mut b = ImageBuilder::new();
        b.mov(1, 10);
        let fault_pc = b.here();
        b.binary(op, 0, 1, 2).mov(3, 1);
        let program = b.build_program().unwrap();

        let report = run(&program);

        let State::Faulted(err) = &report.state else {
            panic!("expected fault, got {:?}", report.state);
        };
        assert_eq!(
            *err,
            RuntimeError::DivisionByZero {
                register: 2,
                value: 10,
                pc: fault_pc,
            }
        );
        assert!(err.is_arithmetic());
        assert_eq!(err.pc(), Some(fault_pc));
        assert_eq!(report.registers, registers(&[(1, 10)]));
        assert_eq!(report.pc, fault_pc);
    }
}

#[test]
fn faulted_vm_does_not_resume() {
    let mut b = ImageBuilder::new();
    b.binary(BinaryOp::Div, 0, 1, 2).mov(3, 1);
    let program = b.build_program().unwrap();
    let mut vm = VM::builder(&program).build();

    assert!(matches!(vm.step(), State::Faulted(_)));
    assert!(matches!(vm.step(), State::Faulted(_)));
    assert_eq!(vm.registers(), &Registers::new());
    assert_eq!(vm.steps(), 1);
}

/// `mov r0, 1; mov r1, rhs; mov r2, target; <branch> r0, r1, r2; mov r5, 99; mov r6, 7`
fn branch_program(jie: bool, rhs: i32) -> (Program, u64, u64) {
    let mut b = ImageBuilder::new();
    let branch_at = b.code_start() + 18;
    let skip_to = branch_at + 4 + 6;
    b.mov(0, 1).mov(1, rhs).mov(2, (skip_to - 3) as i32);
    if jie {
        b.jie(0, 1, 2);
    } else {
        b.jne(0, 1, 2);
    }
    b.mov(5, 99).mov(6, 7);
    (b.build_program().unwrap(), branch_at, skip_to)
}

#[test]
fn jie_taken_lands_three_past_target() {
    let (program, branch_at, skip_to) = branch_program(true, 1);
    let mut vm = VM::builder(&program).build();
    for _ in 0..3 {
        vm.step();
    }
    assert_eq!(vm.pc(), branch_at);

    vm.step();
    assert_eq!(vm.pc(), skip_to);

    let report = vm.run();
    assert_eq!(report.registers.get(5), Some(0));
    assert_eq!(report.registers.get(6), Some(7));
}

#[test]
fn jie_not_taken_falls_through() {
    let (program, branch_at, _) = branch_program(true, 2);
    let mut vm = VM::builder(&program).build();
    for _ in 0..4 {
        vm.step();
    }
    assert_eq!(vm.pc(), branch_at + 4);

    let report = vm.run();
    assert_eq!(report.registers.get(5), Some(99));
    assert_eq!(report.registers.get(6), Some(7));
}

#[test]
fn jne_taken_and_not_taken() {
    let (program, _, _) = branch_program(false, 2);
    let report = run(&program);
    assert_eq!(report.registers.get(5), Some(0));
    assert_eq!(report.registers.get(6), Some(7));

    let (program, _, _) = branch_program(false, 1);
    let report = run(&program);
    assert_eq!(report.registers.get(5), Some(99));
}

#[test]
fn jmp_sets_pc_exactly() {
    let mut b = ImageBuilder::new();
    let target = b.code_start() + 6 + 2 + 6;
    b.mov(0, target as i32).jmp(0).mov(1, 1).mov(2, 2);
    let program = b.build_program().unwrap();

    let mut vm = VM::builder(&program).build();
    vm.step();
    vm.step();
    assert_eq!(vm.pc(), target);

    let report = vm.run();
    assert_eq!(report.registers, registers(&[(0, target as i32), (2, 2)]));
}

#[test]
fn negative_jump_target_faults() {
    let mut b = ImageBuilder::new();
    b.mov(0, -1);
    let jmp_at = b.here();
    b.jmp(0);
    let program = b.build_program().unwrap();

    assert_eq!(
        run(&program).state,
        State::Faulted(RuntimeError::InvalidJumpTarget {
            target: -1,
            pc: jmp_at
        })
    );
}

#[test]
fn register_index_out_of_range_faults() {
    let mut b = ImageBuilder::new();
    b.mov(12, 1);
    let program = b.build_program().unwrap();

    assert_eq!(
        run(&program).state,
        State::Faulted(RuntimeError::RegisterOutOfRange {
            index: 12,
            pc: 0x10
        })
    );
}

#[test]
fn unknown_opcode_is_skipped_by_default() {
    let mut b = ImageBuilder::new();
    b.raw(&[0x99]).mov(0, 1);
    let program = b.build_program().unwrap();

    let report = run(&program);
    assert_eq!(report.state, State::Halted(0));
    assert_eq!(report.registers.get(0), Some(1));
    assert_eq!(report.steps, 2);
}

#[test]
fn unknown_opcode_faults_when_configured() {
    let mut b = ImageBuilder::new();
    b.raw(&[0x99]).mov(0, 1);
    let program = b.build_program().unwrap();

    let report = VM::builder(&program)
        .unknown_opcode(UnknownOpcodePolicy::Fault)
        .build()
        .run();

    assert_eq!(
        report.state,
        State::Faulted(RuntimeError::UnknownOpcode {
            opcode: 0x99,
            pc: 0x10
        })
    );
    assert_eq!(report.registers, Registers::new());
}

#[test]
fn truncated_instruction_faults() {
    let mut b = ImageBuilder::new();
    b.raw(&[0x25, 0x00]);
    let program = b.build_program().unwrap();

    assert_eq!(
        run(&program).state,
        State::Faulted(RuntimeError::Decode(DecodeError::Truncated {
            pc: 0x10,
            opcode: Opcode::Mov,
            needed: 6,
            available: 2,
        }))
    );
}

#[test]
fn fuel_stops_infinite_loop() {
    let mut b = ImageBuilder::new();
    let loop_at = b.code_start() + 6;
    b.mov(0, loop_at as i32).jmp(0);
    let program = b.build_program().unwrap();

    let report = VM::builder(&program).fuel(10).build().run();

    assert_eq!(report.state, State::Faulted(RuntimeError::FuelExhausted(10)));
    assert_eq!(report.steps, 10);
    assert_eq!(report.pc, loop_at);
}

#[test]
fn fuel_equal_to_program_length_halts() {
    let mut b = ImageBuilder::new();
    b.mov(0, 1).mov(1, 2);
    let program = b.build_program().unwrap();

    let report = VM::builder(&program).fuel(2).build().run();
    assert_eq!(report.state, State::Halted(0));
}

#[test]
fn legacy_branch_reads_register_at_pc_plus_two() {
    let mut b = ImageBuilder::new();
    b.jie(0, 1, 2);
    let program = b.build_program().unwrap();

    let report = VM::builder(&program)
        .compat(Compat::fixed().branch_operand(BranchOperand::ProgramCounter))
        .build()
        .run();

    assert_eq!(
        report.state,
        State::Faulted(RuntimeError::RegisterOutOfRange {
            index: 0x12,
            pc: 0x10
        })
    );
}

#[test]
fn legacy_profile() {
    let legacy = Compat::legacy();
    assert_eq!(legacy.branch_operand, BranchOperand::ProgramCounter);
    assert!(legacy.nfc_pad_byte);
    assert_eq!(legacy.unknown_opcode, UnknownOpcodePolicy::Nop);
    assert_eq!(Compat::fixed(), Compat::default());
}
