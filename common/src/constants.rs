
// Memory cells are signed integers; addresses are cell indices.
pub type Cell = i64;

pub const MEMORY_SIZE: usize = 2000;

pub const USER_BASE: usize = 0;
pub const USER_END: usize = SYS_BASE; // Exclusive
pub const SYS_BASE: usize = 1000;
pub const INT_BASE: usize = 1500;

// Fixed trap entry points. The timer trap and the software trap vector
// to different handlers.
pub const TIMER_HANDLER: Cell = SYS_BASE as Cell;
pub const TRAP_HANDLER: Cell = INT_BASE as Cell;

// The kernel stack grows down from the end of memory, the user stack
// down from the top of the user region.
pub const KERNEL_STACK_TOP: Cell = MEMORY_SIZE as Cell;
pub const USER_STACK_TOP: Cell = SYS_BASE as Cell;
