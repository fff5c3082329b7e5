use vman_bytecode::{BinaryOp, Colors, ImageBuilder, Program};
use vman_vm::{RunReport, VM};

use super::exec::{render_json, render_text};

fn run(program: &Program) -> RunReport {
    VM::builder(program).build().run()
}

fn division_by_zero() -> Program {
    let mut b = ImageBuilder::new();
    b.mov(0, 7).mov(1, 0).binary(BinaryOp::Div, 2, 0, 1);
    b.build_program().unwrap()
}

#[test]
fn text_report_after_halt() {
    let mut b = ImageBuilder::new();
    b.mov(0, 5).mov(1, -1);
    let program = b.build_program().unwrap();

    insta::assert_snapshot!(render_text(&run(&program), Colors::OFF), @r"
    halted (0) after 2 steps at 0x001c
    r0  = 5 (0x00000005)
    r1  = -1 (0xffffffff)
    r2  = 0 (0x00000000)
    r3  = 0 (0x00000000)
    r4  = 0 (0x00000000)
    r5  = 0 (0x00000000)
    r6  = 0 (0x00000000)
    r7  = 0 (0x00000000)
    r8  = 0 (0x00000000)
    r9  = 0 (0x00000000)
    r10 = 0 (0x00000000)
    r11 = 0 (0x00000000)
    ");
}

#[test]
fn text_report_after_fault() {
    let report = run(&division_by_zero());
    let text = render_text(&report, Colors::OFF);

    assert!(text.starts_with("faulted after 3 steps at 0x001c\n"));
    assert!(text.contains("r2  = 0 (0x00000000)"));
}

#[test]
fn json_report_after_fault() {
    let report = run(&division_by_zero());

    insta::assert_snapshot!(render_json(&report, false).unwrap(), @r#"{"state":"faulted","halt_code":null,"error":"division by zero at 0x1c: divisor r1 is 0 (dividend 7)","arithmetic":true,"pc":28,"steps":3,"registers":[7,0,0,0,0,0,0,0,0,0,0,0]}"#);
}

#[test]
fn json_report_after_halt_is_parseable() {
    let mut b = ImageBuilder::new();
    b.mov(3, 42);
    let program = b.build_program().unwrap();

    let json = render_json(&run(&program), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["state"], "halted");
    assert_eq!(value["halt_code"], 0);
    assert!(value["error"].is_null());
    assert_eq!(value["registers"][3], 42);
    assert_eq!(value["registers"].as_array().unwrap().len(), 12);
    assert!(json.contains('\n'));
}

#[test]
fn colored_text_report_marks_registers() {
    let mut b = ImageBuilder::new();
    b.mov(0, 1);
    let program = b.build_program().unwrap();

    let text = render_text(&run(&program), Colors::ON);
    assert!(text.contains("\x1b[1;33mr0 \x1b[0m = 1"));
}
