use crate::util::run_prog;
use common::constants::USER_STACK_TOP;
use common::isa::Reg;
use common::status::ExitStatus;

#[test]
fn software_trap_round_trip() {
    // load 42; trap; halt — handler returns immediately. Observed
    // from outside, the trap is invisible: user mode, all registers
    // numerically unchanged, user SP back where it was.
    let src = "1\n42\n29\n50\n.1500\n30\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert!(machine.mode().is_user());
    assert!(machine.interrupts_enabled());
    assert_eq!(machine.reg(Reg::AC), 42);
    assert_eq!(machine.reg(Reg::X), 0);
    assert_eq!(machine.reg(Reg::Y), 0);
    assert_eq!(machine.reg(Reg::SP), USER_STACK_TOP);
}

#[test]
fn timer_trap_enters_handler() {
    // User: load 7; load 8; halt. Timer handler at 1000 prints 'A'
    // and returns. With a period of 2 the trap fires between the
    // second load and the halt.
    let src = "1\n7\n1\n8\n50\n.1000\n1\n65\n9\n2\n30\n";
    let (status, machine, console) = run_prog(src, 2);
    assert_eq!(status, ExitStatus::Success);
    assert_eq!(console.take_output(), "A");
    // The handler's own loads were undone by the register restore.
    assert_eq!(machine.reg(Reg::AC), 8);
    assert!(machine.mode().is_user());
}

#[test]
fn timer_trap_dropped_while_handling() {
    // The software-trap handler runs long enough that a timer trap
    // falls due mid-handler. Interrupts are disabled there, so it is
    // dropped outright; were it taken, control would land on the zero
    // cell at 1000 and die with an invalid opcode.
    let src = "29\n50\n.1500\n1\n9\n30\n";
    let (status, machine, _) = run_prog(src, 2);
    assert_eq!(status, ExitStatus::Success);
    assert!(machine.mode().is_user());
    assert!(machine.interrupts_enabled());
    assert_eq!(machine.reg(Reg::AC), 0);
    assert_eq!(machine.reg(Reg::SP), USER_STACK_TOP);
}

#[test]
fn zero_period_never_fires() {
    let src = "1\n1\n1\n2\n1\n3\n50\n";
    let (status, machine, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::Success);
    assert!(machine.mode().is_user());
    assert_eq!(machine.reg(Reg::AC), 3);
    assert_eq!(machine.instructions_executed(), 4);
}

#[test]
fn trap_fires_every_period() {
    // Each visit to the handler prints one character; the run passes
    // two firing points before the halt (the handler's own three
    // instructions also advance the counter).
    let src = "1\n1\n1\n2\n1\n3\n1\n4\n1\n5\n50\n.1000\n1\n66\n9\n2\n30\n";
    let (status, _, console) = run_prog(src, 4);
    assert_eq!(status, ExitStatus::Success);
    let out = console.take_output();
    assert!(!out.is_empty());
    assert!(out.chars().all(|c| c == 'B'), "output {out:?}");
}
