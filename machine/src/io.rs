//! Output side of the `put` instruction. Port 1 prints the value as a
//! number, port 2 as a character; the trait lets tests capture the
//! stream instead of writing to stdout.

use common::constants::Cell;

use std::io::{Write, stdout};
use std::sync::Mutex;

pub trait Console: Send + Sync {
    fn put_number(&self, val: Cell);
    fn put_char(&self, val: Cell);
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn put_number(&self, val: Cell) {
        let mut out = stdout().lock();
        let _ = write!(out, "{val}");
        let _ = out.flush();
    }

    fn put_char(&self, val: Cell) {
        let mut out = stdout().lock();
        let _ = out.write_all(&[val as u8]);
        let _ = out.flush();
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
pub struct PipeConsole {
    buf: Mutex<String>,
}

impl PipeConsole {
    pub fn take_output(&self) -> String {
        std::mem::take(&mut self.buf.lock().unwrap())
    }
}

impl Console for PipeConsole {
    fn put_number(&self, val: Cell) {
        use std::fmt::Write;
        let _ = write!(self.buf.lock().unwrap(), "{val}");
    }

    fn put_char(&self, val: Cell) {
        self.buf.lock().unwrap().push((val as u8) as char);
    }
}
