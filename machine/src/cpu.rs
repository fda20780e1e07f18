//! The processor engine: fetch-decode-execute loop, access control,
//! the interrupt/mode-switch state machine, and the dual stacks. Every
//! touch of the address space is a blocking call through the transport
//! to the memory service; the access check always runs before the
//! request is sent.

use common::constants::*;
use common::isa::{Mode, NUM_REGS, Opcode, Reg, SAVED_REGS};
use common::status::ExitStatus;

use crate::io::Console;
use crate::transport::{CallerPort, Request, Response, TransportError};

use std::sync::Arc;

use log::{debug, error};
use num_traits::{FromPrimitive, ToPrimitive};
use rand::Rng;
use thiserror::Error;

/// Terminal conditions of instruction execution. Each maps onto the
/// exit status the whole system terminates with.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("invalid opcode {0}")]
    InvalidOpcode(Cell),

    #[error("address {0} out of bounds")]
    OutOfBounds(Cell),

    #[error("user mode denied access to kernel address {0}")]
    KernelAccessDenied(Cell),

    #[error("kernel mode denied access to user address {0}")]
    UserAccessDenied(Cell),

    #[error("invalid port {0}")]
    InvalidPort(Cell),

    #[error("memory service reported {0}")]
    Service(ExitStatus),

    #[error("transport disconnected")]
    Disconnected,
}

impl Fault {
    pub fn exit_status(self) -> ExitStatus {
        match self {
            Fault::InvalidOpcode(_) => ExitStatus::InvalidOpcode,
            Fault::OutOfBounds(_) => ExitStatus::OutOfBounds,
            Fault::KernelAccessDenied(_) => ExitStatus::KernelMemAccessDenied,
            Fault::UserAccessDenied(_) => ExitStatus::UserMemAccessDenied,
            Fault::InvalidPort(_) => ExitStatus::InvalidPortCall,
            Fault::Service(status) => status,
            Fault::Disconnected => ExitStatus::ChannelFailure,
        }
    }
}

impl From<TransportError> for Fault {
    fn from(_: TransportError) -> Fault {
        Fault::Disconnected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRet {
    Ok,
    Halt,
}

pub struct Cpu {
    regs: [Cell; NUM_REGS],
    mode: Mode,
    interrupts_enabled: bool,
    ins_count: u64,
    timer_period: u64,
    parked_kernel_sp: Cell,
    parked_user_sp: Cell,
    port: CallerPort,
    console: Arc<dyn Console>,
}

impl Cpu {
    pub fn new(port: CallerPort, timer_period: u64, console: Arc<dyn Console>) -> Cpu {
        let mut cpu = Cpu {
            regs: [0; NUM_REGS],
            mode: Mode::User,
            interrupts_enabled: true,
            ins_count: 0,
            timer_period,
            parked_kernel_sp: KERNEL_STACK_TOP,
            parked_user_sp: USER_STACK_TOP,
            port,
            console,
        };
        cpu.set_reg(Reg::SP, USER_STACK_TOP);
        cpu
    }

    pub fn reg(&self, reg: Reg) -> Cell {
        self.regs[reg.to_usize().unwrap()]
    }

    pub(crate) fn set_reg(&mut self, reg: Reg, val: Cell) {
        self.regs[reg.to_usize().unwrap()] = val;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    pub fn instructions_executed(&self) -> u64 {
        self.ins_count
    }

    /// Run until halt or a fatal condition.
    pub fn run(&mut self) -> ExitStatus {
        loop {
            match self.step() {
                Ok(ExecRet::Ok) => {}
                Ok(ExecRet::Halt) => return ExitStatus::Success,
                Err(fault) => {
                    error!("fatal at pc {}: {fault}", self.reg(Reg::PC));
                    return fault.exit_status();
                }
            }
        }
    }

    /// One trip around the loop: fetch into IR, advance PC, execute,
    /// count the instruction, then see whether a timer trap is due.
    pub fn step(&mut self) -> Result<ExecRet, Fault> {
        let pc = self.reg(Reg::PC);
        let ir = self.read_mem(pc)?;
        self.set_reg(Reg::IR, ir);
        self.set_reg(Reg::PC, pc.wrapping_add(1));

        let ret = self.exec()?;
        self.ins_count += 1;
        if ret == ExecRet::Halt {
            return Ok(ExecRet::Halt);
        }

        self.check_timer()?;
        Ok(ExecRet::Ok)
    }

    // The counter is never reset, so the trap fires every period
    // instructions for the life of the run. A period of zero never
    // fires.
    fn check_timer(&mut self) -> Result<(), Fault> {
        if self.timer_period != 0 && self.ins_count % self.timer_period == 0 {
            self.enter_trap(TIMER_HANDLER)?;
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////
    // Protected memory access
    ///////////////////////////////////////////////////////////////////////////

    // The complete access-control policy. Checked before any request
    // goes out; the memory service only re-checks bounds.
    fn verify_access(&self, addr: Cell) -> Result<(), Fault> {
        if !(0..MEMORY_SIZE as Cell).contains(&addr) {
            return Err(Fault::OutOfBounds(addr));
        }
        if addr >= SYS_BASE as Cell && self.mode.is_user() {
            return Err(Fault::KernelAccessDenied(addr));
        }
        if addr < SYS_BASE as Cell && self.mode.is_kernel() {
            return Err(Fault::UserAccessDenied(addr));
        }
        Ok(())
    }

    pub(crate) fn read_mem(&mut self, addr: Cell) -> Result<Cell, Fault> {
        self.verify_access(addr)?;
        match self.port.call(Request::Read { addr })? {
            Response::Value(val) => Ok(val),
            Response::Ack => Ok(0),
            Response::Failed(status) => Err(Fault::Service(status)),
        }
    }

    pub(crate) fn write_mem(&mut self, addr: Cell, value: Cell) -> Result<(), Fault> {
        self.verify_access(addr)?;
        match self.port.call(Request::Write { addr, value })? {
            Response::Value(_) | Response::Ack => Ok(()),
            Response::Failed(status) => Err(Fault::Service(status)),
        }
    }

    // Read the cell at PC and advance past it.
    fn next_operand(&mut self) -> Result<Cell, Fault> {
        let pc = self.reg(Reg::PC);
        let val = self.read_mem(pc)?;
        self.set_reg(Reg::PC, pc.wrapping_add(1));
        Ok(val)
    }

    ///////////////////////////////////////////////////////////////////////////
    // Stacks
    ///////////////////////////////////////////////////////////////////////////

    fn push(&mut self, value: Cell) -> Result<(), Fault> {
        let sp = self.reg(Reg::SP).wrapping_sub(1);
        self.set_reg(Reg::SP, sp);
        self.write_mem(sp, value)
    }

    fn pop(&mut self) -> Result<Cell, Fault> {
        let sp = self.reg(Reg::SP);
        let val = self.read_mem(sp)?;
        self.set_reg(Reg::SP, sp.wrapping_add(1));
        Ok(val)
    }

    // Save the non-SP registers as one contiguous block below SP, in
    // the fixed order, adjusting SP once at the end.
    pub(crate) fn save_registers(&mut self) -> Result<(), Fault> {
        let sp = self.reg(Reg::SP);
        for (i, reg) in SAVED_REGS.iter().enumerate() {
            self.write_mem(sp - 1 - i as Cell, self.reg(*reg))?;
        }
        self.set_reg(Reg::SP, sp - SAVED_REGS.len() as Cell);
        Ok(())
    }

    // Exact mirror of `save_registers`.
    pub(crate) fn restore_registers(&mut self) -> Result<(), Fault> {
        let sp = self.reg(Reg::SP);
        for (i, reg) in SAVED_REGS.iter().enumerate() {
            let val = self.read_mem(sp + (SAVED_REGS.len() - 1 - i) as Cell)?;
            self.set_reg(*reg, val);
        }
        self.set_reg(Reg::SP, sp + SAVED_REGS.len() as Cell);
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////
    // Interrupts and mode switching
    ///////////////////////////////////////////////////////////////////////////

    // A trap that arrives while interrupts are disabled is dropped,
    // not queued; nested traps are unimplemented by design.
    fn enter_trap(&mut self, handler: Cell) -> Result<(), Fault> {
        if !self.interrupts_enabled || self.mode.is_kernel() {
            debug!("trap to {handler} dropped");
            return Ok(());
        }

        debug!("trap: entering handler at {handler}");
        self.mode = Mode::Kernel;
        self.interrupts_enabled = false;
        self.parked_user_sp = self.reg(Reg::SP);
        self.set_reg(Reg::SP, self.parked_kernel_sp);
        self.save_registers()?;
        self.set_reg(Reg::PC, handler);
        Ok(())
    }

    fn trap_return(&mut self) -> Result<(), Fault> {
        debug!("trap return");
        self.restore_registers()?;
        self.parked_kernel_sp = self.reg(Reg::SP);
        self.set_reg(Reg::SP, self.parked_user_sp);
        self.interrupts_enabled = true;
        self.mode = Mode::User;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    fn exec(&mut self) -> Result<ExecRet, Fault> {
        let ir = self.reg(Reg::IR);
        let Some(op) = Opcode::from_i64(ir) else {
            return Err(Fault::InvalidOpcode(ir));
        };
        debug!("pc {}: {op:?}", self.reg(Reg::PC).wrapping_sub(1));

        use Opcode::*;
        match op {
            LoadValue => {
                let val = self.next_operand()?;
                self.set_reg(Reg::AC, val);
            }
            LoadAddr => {
                let addr = self.next_operand()?;
                let val = self.read_mem(addr)?;
                self.set_reg(Reg::AC, val);
            }
            LoadIndAddr => {
                let addr = self.next_operand()?;
                let addr = self.read_mem(addr)?;
                let val = self.read_mem(addr)?;
                self.set_reg(Reg::AC, val);
            }
            LoadIdxX => {
                let base = self.next_operand()?;
                let val = self.read_mem(base.wrapping_add(self.reg(Reg::X)))?;
                self.set_reg(Reg::AC, val);
            }
            LoadIdxY => {
                let base = self.next_operand()?;
                let val = self.read_mem(base.wrapping_add(self.reg(Reg::Y)))?;
                self.set_reg(Reg::AC, val);
            }
            LoadSpX => {
                let addr = self.reg(Reg::SP).wrapping_add(self.reg(Reg::X));
                let val = self.read_mem(addr)?;
                self.set_reg(Reg::AC, val);
            }
            Store => {
                let addr = self.next_operand()?;
                self.write_mem(addr, self.reg(Reg::AC))?;
            }
            Get => {
                let val = rand::thread_rng().gen_range(1..=100);
                self.set_reg(Reg::AC, val);
            }
            Put => {
                let port = self.next_operand()?;
                match port {
                    1 => self.console.put_number(self.reg(Reg::AC)),
                    2 => self.console.put_char(self.reg(Reg::AC)),
                    _ => return Err(Fault::InvalidPort(port)),
                }
            }
            AddX => {
                let val = self.reg(Reg::AC).wrapping_add(self.reg(Reg::X));
                self.set_reg(Reg::AC, val);
            }
            AddY => {
                let val = self.reg(Reg::AC).wrapping_add(self.reg(Reg::Y));
                self.set_reg(Reg::AC, val);
            }
            SubX => {
                let val = self.reg(Reg::AC).wrapping_sub(self.reg(Reg::X));
                self.set_reg(Reg::AC, val);
            }
            SubY => {
                let val = self.reg(Reg::AC).wrapping_sub(self.reg(Reg::Y));
                self.set_reg(Reg::AC, val);
            }
            CopyToX => self.set_reg(Reg::X, self.reg(Reg::AC)),
            CopyFromX => self.set_reg(Reg::AC, self.reg(Reg::X)),
            CopyToY => self.set_reg(Reg::Y, self.reg(Reg::AC)),
            CopyFromY => self.set_reg(Reg::AC, self.reg(Reg::Y)),
            CopyToSp => self.set_reg(Reg::SP, self.reg(Reg::AC)),
            CopyFromSp => self.set_reg(Reg::AC, self.reg(Reg::SP)),
            Jump => {
                let target = self.read_mem(self.reg(Reg::PC))?;
                self.set_reg(Reg::PC, target);
            }
            JumpIfZero => {
                let target = self.next_operand()?;
                if self.reg(Reg::AC) == 0 {
                    self.set_reg(Reg::PC, target);
                }
            }
            JumpIfNotZero => {
                let target = self.next_operand()?;
                if self.reg(Reg::AC) != 0 {
                    self.set_reg(Reg::PC, target);
                }
            }
            Call => {
                let pc = self.reg(Reg::PC);
                self.push(pc.wrapping_add(1))?;
                let target = self.read_mem(pc)?;
                self.set_reg(Reg::PC, target);
            }
            Ret => {
                let target = self.pop()?;
                self.set_reg(Reg::PC, target);
            }
            IncX => self.set_reg(Reg::X, self.reg(Reg::X).wrapping_add(1)),
            DecX => self.set_reg(Reg::X, self.reg(Reg::X).wrapping_sub(1)),
            Push => self.push(self.reg(Reg::AC))?,
            Pop => {
                let val = self.pop()?;
                self.set_reg(Reg::AC, val);
            }
            Trap => self.enter_trap(TRAP_HANDLER)?,
            TrapReturn => self.trap_return()?,
            Halt => return Ok(ExecRet::Halt),
        }

        Ok(ExecRet::Ok)
    }
}
