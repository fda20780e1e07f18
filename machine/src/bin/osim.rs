use common::status::ExitStatus;
use machine::Machine;

use std::process::ExitCode;

use clap::Parser;
use log::error;

/// Von Neumann machine simulator: a processor and a memory service in
/// separate execution contexts, joined by a request/response channel.
#[derive(Parser)]
#[command(name = "osim")]
struct Args {
    /// Program file to load into memory
    program: String,

    /// Instructions between timer interrupts (0 disables the timer)
    timer_period: u64,

    /// Run the memory/stack self-test instead of the program
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let status = run();
    println!("EXIT CODE: {status}");
    ExitCode::from(status.code() as u8)
}

fn run() -> ExitStatus {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitStatus::CliFailure;
        }
    };

    let source = match std::fs::read_to_string(&args.program) {
        Ok(source) => source,
        Err(err) => {
            error!("can't read {}: {err}", args.program);
            return ExitStatus::CliFailure;
        }
    };

    let image = match loader::parse_program(&source) {
        Ok(image) => image,
        Err(err) => {
            error!("{}: {err}", args.program);
            return ExitStatus::FileParseFailure;
        }
    };

    let mut machine = match Machine::boot(image, args.timer_period) {
        Ok(machine) => machine,
        Err(err) => {
            error!("{err}");
            return err.exit_status();
        }
    };

    let status = if args.debug {
        machine.run_selftest()
    } else {
        machine.run()
    };
    machine.shutdown();
    status
}
