pub mod cpu;
pub mod io;
pub mod machine;
pub mod memory;
pub mod transport;

pub use cpu::{Cpu, ExecRet, Fault};
pub use io::{Console, PipeConsole, StdConsole};
pub use machine::{BootError, Machine};
pub use memory::MemoryService;
