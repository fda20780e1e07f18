//! Wires the two execution contexts together: the memory service runs
//! on its own thread, parked on the transport; the processor runs on
//! the caller's thread and is the only side that initiates work or
//! shutdown.

use common::constants::{Cell, KERNEL_STACK_TOP, MEMORY_SIZE};
use common::isa::{Mode, Reg};
use common::status::ExitStatus;
use loader::MemoryImage;

use crate::cpu::{Cpu, Fault};
use crate::io::{Console, StdConsole};
use crate::memory::MemoryService;
use crate::transport::transport;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use delegate::delegate;
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootError {
    #[error("failed to spawn the memory service: {0}")]
    Spawn(#[from] std::io::Error),
}

impl BootError {
    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::SpawnFailure
    }
}

pub struct Machine {
    cpu: Cpu,
    mem_thread: Option<JoinHandle<()>>,
}

impl Machine {
    pub fn boot(image: MemoryImage, timer_period: u64) -> Result<Machine, BootError> {
        Self::boot_with_console(image, timer_period, Arc::new(StdConsole))
    }

    pub fn boot_with_console(
        image: MemoryImage,
        timer_period: u64,
        console: Arc<dyn Console>,
    ) -> Result<Machine, BootError> {
        let (caller, service) = transport();
        let service = MemoryService::new(image, service);
        let handle = thread::Builder::new()
            .name("memory".into())
            .spawn(move || service.serve())?;

        Ok(Machine {
            cpu: Cpu::new(caller, timer_period, console),
            mem_thread: Some(handle),
        })
    }

    /// Drive the processor to its exit status. The machine stays
    /// alive afterward so callers can inspect the register file.
    pub fn run(&mut self) -> ExitStatus {
        self.cpu.run()
    }

    /// Tear down the transport and wait for the memory service to
    /// exit. Dropping the machine without calling this detaches the
    /// service thread; it still exits once its channel closes.
    pub fn shutdown(self) {
        let Machine { cpu, mem_thread } = self;
        drop(cpu);
        if let Some(handle) = mem_thread {
            let _ = handle.join();
        }
    }

    delegate! {
        to self.cpu {
            pub fn reg(&self, reg: Reg) -> Cell;
            pub fn mode(&self) -> Mode;
            pub fn interrupts_enabled(&self) -> bool;
            pub fn instructions_executed(&self) -> u64;
        }
    }

    /// The `--debug` path: exercise a memory round trip and the
    /// register-block save/restore against synthetic values, printing
    /// the register file and the top of the kernel stack at each
    /// step. Replaces the normal execution loop.
    pub fn run_selftest(&mut self) -> ExitStatus {
        match self.selftest() {
            Ok(()) => ExitStatus::Success,
            Err(fault) => {
                error!("self-test failed: {fault}");
                fault.exit_status()
            }
        }
    }

    fn selftest(&mut self) -> Result<(), Fault> {
        println!("TESTING MEMORY READ/WRITE");
        println!("read [10]: {}", self.cpu.read_mem(10)?);
        println!("write [10] <- 1337");
        self.cpu.write_mem(10, 1337)?;
        println!("read [10]: {}", self.cpu.read_mem(10)?);
        println!();

        println!("TESTING REGISTER SAVE/RESTORE");
        self.cpu.set_mode(Mode::Kernel);
        self.cpu.set_reg(Reg::SP, KERNEL_STACK_TOP);
        self.cpu.set_reg(Reg::IR, 10);
        self.cpu.set_reg(Reg::AC, 20);
        self.cpu.set_reg(Reg::X, 30);
        self.cpu.set_reg(Reg::Y, 40);
        self.print_registers_and_stack()?;

        println!("saving registers...");
        self.cpu.save_registers()?;
        self.print_registers_and_stack()?;

        println!("overwriting registers...");
        self.cpu.set_reg(Reg::IR, 99);
        self.cpu.set_reg(Reg::AC, 88);
        self.cpu.set_reg(Reg::X, 77);
        self.cpu.set_reg(Reg::Y, 66);
        self.print_registers_and_stack()?;

        println!("restoring registers...");
        self.cpu.restore_registers()?;
        self.print_registers_and_stack()?;

        println!("END OF SELF-TEST");
        Ok(())
    }

    fn print_registers_and_stack(&mut self) -> Result<(), Fault> {
        println!("registers:");
        for reg in [Reg::PC, Reg::SP, Reg::IR, Reg::AC, Reg::X, Reg::Y] {
            println!("  {reg}: {}", self.cpu.reg(reg));
        }
        for i in 0..10 {
            let addr = (MEMORY_SIZE - 1 - i) as Cell;
            println!("  [{addr}]: {}", self.cpu.read_mem(addr)?);
        }
        println!();
        Ok(())
    }
}
