use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};

/// Every way the system can terminate, successful or not. The integer
/// values and labels are a contract with callers and scripts; the
/// ordering is load-bearing and must not change.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    CliFailure,
    SpawnFailure,
    ChannelFailure,
    FileParseFailure,
    InvalidOpcode,
    UnreachablePath,
    ReadFailure,
    WriteFailure,
    InvalidMemAction,
    OutOfBounds,
    KernelMemAccessDenied,
    UserMemAccessDenied,
    InvalidPortCall,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        use ExitStatus::*;
        match self {
            Success => "SUCCESS",
            CliFailure => "CLI FAILURE",
            SpawnFailure => "SPAWN FAILURE",
            ChannelFailure => "CHANNEL FAILURE",
            FileParseFailure => "FILE PARSE FAILURE",
            InvalidOpcode => "INVALID OPCODE",
            UnreachablePath => "UNREACHABLE PATH",
            ReadFailure => "READ FAILURE",
            WriteFailure => "WRITE FAILURE",
            InvalidMemAction => "INVALID MEM ACTION",
            OutOfBounds => "MEMORY OUT OF BOUNDS",
            KernelMemAccessDenied => "KERNEL MEM ACCESS DENIED",
            UserMemAccessDenied => "USER MEM ACCESS DENIED",
            InvalidPortCall => "INVALID PORT CALL",
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}
