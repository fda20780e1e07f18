//! The memory service owns the address space. It is otherwise idle:
//! it parks on the transport, handles exactly one request to
//! completion, replies, and parks again. It performs its own bounds
//! check as a second line of defense against malformed requests, but
//! no privilege check; the privilege boundary lives entirely in the
//! processor's access check.

use common::constants::{Cell, MEMORY_SIZE};
use common::status::ExitStatus;
use loader::MemoryImage;

use crate::transport::{Frame, Request, Response, ServicePort};

use log::{debug, trace};

pub struct MemoryService {
    cells: MemoryImage,
    port: ServicePort,
}

impl MemoryService {
    pub fn new(image: MemoryImage, port: ServicePort) -> MemoryService {
        MemoryService { cells: image, port }
    }

    /// Serve until the processor disconnects.
    pub fn serve(mut self) {
        while let Some(frame) = self.port.park() {
            let resp = self.handle(frame);
            if self.port.reply(resp).is_err() {
                break;
            }
        }
        debug!("memory service: processor disconnected, shutting down");
    }

    fn handle(&mut self, frame: Frame) -> Response {
        let Some(req) = Request::decode(frame) else {
            debug!("memory service: unknown action {}", frame[0]);
            return Response::Failed(ExitStatus::InvalidMemAction);
        };

        match req {
            Request::Read { addr } => {
                let Some(cell) = self.cell_index(addr) else {
                    return Response::Failed(ExitStatus::ReadFailure);
                };
                trace!("memory service: read [{addr}] -> {}", self.cells[cell]);
                Response::Value(self.cells[cell])
            }
            Request::Write { addr, value } => {
                let Some(cell) = self.cell_index(addr) else {
                    return Response::Failed(ExitStatus::WriteFailure);
                };
                trace!("memory service: write [{addr}] <- {value}");
                self.cells[cell] = value;
                Response::Ack
            }
        }
    }

    fn cell_index(&self, addr: Cell) -> Option<usize> {
        if (0..MEMORY_SIZE as Cell).contains(&addr) {
            Some(addr as usize)
        } else {
            None
        }
    }
}
