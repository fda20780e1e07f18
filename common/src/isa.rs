use std::fmt;

use derive_more::IsVariant;
use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Reg {
    PC = 0,
    IR,
    AC,
    X,
    Y,
    SP,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

pub const NUM_REGS: usize = 6;

// Register-block save order for trap entry. SP is never saved; it is
// parked separately by the mode switch.
pub const SAVED_REGS: [Reg; NUM_REGS - 1] = [Reg::PC, Reg::IR, Reg::AC, Reg::X, Reg::Y];

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Mode {
    User,
    Kernel,
}

/// The instruction set. The IR holds a raw cell value; anything that
/// doesn't map to a variant here is an invalid opcode.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Opcode {
    LoadValue = 1,
    LoadAddr,
    LoadIndAddr,
    LoadIdxX,
    LoadIdxY,
    LoadSpX,
    Store,
    Get,
    Put,
    AddX,
    AddY,
    SubX,
    SubY,
    CopyToX,
    CopyFromX,
    CopyToY,
    CopyFromY,
    CopyToSp,
    CopyFromSp,
    Jump,
    JumpIfZero,
    JumpIfNotZero,
    Call,
    Ret,
    IncX,
    DecX,
    Push,
    Pop,
    Trap,
    TrapReturn,
    Halt = 50,
}
