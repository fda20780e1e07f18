use crate::util::run_prog;
use common::isa::Reg;
use common::status::ExitStatus;

#[test]
fn load_then_halt() {
    // Two instructions with a period of 5: done before the timer can
    // ever fire.
    let (status, machine, _) = run_prog("1\n7\n50\n", 5);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::AC), 7);
    assert_eq!(machine.instructions_executed(), 2);
}

#[test]
fn undefined_opcode_is_fatal() {
    let (status, machine, _) = run_prog("99\n", 0);
    assert_eq!(status, ExitStatus::InvalidOpcode);
    assert_eq!(machine.reg(Reg::IR), 99);
}

#[test]
fn counting_loop_prints_digits() {
    // Y holds the limit; X counts up and each value is printed until
    // X - Y reaches zero.
    let src = "1\n5\n16\n25\n15\n9\n1\n15\n13\n22\n3\n50\n";
    let (status, machine, console) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(console.take_output(), "12345");
    assert_eq!(machine.reg(Reg::X), 5);
}

#[test]
fn load_direct_and_indirect() {
    // Store 77 at 99 and the pointer 99 at 98, then load through the
    // pointer.
    let src = "1\n77\n7\n99\n1\n99\n7\n98\n3\n98\n50\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::AC), 77);
}

#[test]
fn load_indexed_by_x_and_y() {
    // Data table at 50; X = 2 picks the third entry, Y = 1 the second.
    let src = "1\n2\n14\n4\n50\n50\n.50\n5\n6\n7\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::AC), 7);

    let src = "1\n1\n16\n5\n50\n50\n.50\n5\n6\n7\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::AC), 6);
}

#[test]
fn arithmetic_on_index_registers() {
    // X = 10, AC = 3 + X; then Y = 4, AC -= Y.
    let src = "1\n10\n14\n1\n4\n16\n1\n3\n10\n13\n50\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::AC), 9);
    assert_eq!(machine.reg(Reg::X), 10);
    assert_eq!(machine.reg(Reg::Y), 4);
}

#[test]
fn conditional_jumps() {
    // Both jumps are taken, each skipping over an invalid opcode that
    // would otherwise kill the run.
    let src = "1\n0\n21\n5\n99\n1\n1\n22\n10\n99\n50\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::AC), 1);
}

#[test]
fn inc_dec_x() {
    let src = "25\n25\n25\n26\n50\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(machine.reg(Reg::X), 2);
}

#[test]
fn get_yields_value_in_range() {
    let (status, machine, _) = run_prog("8\n50\n", 0);
    assert_eq!(status, ExitStatus::Success);
    let ac = machine.reg(Reg::AC);
    assert!((1..=100).contains(&ac), "AC {ac}");
}
