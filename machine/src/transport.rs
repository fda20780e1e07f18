//! The point-to-point channel between the processor and the memory
//! service. Messages travel as fixed-shape frames; the protocol is a
//! single in-flight request followed by exactly one response. The
//! service side parks on its receiver; the arrival of a frame is the
//! attention notification that wakes it.

use common::constants::Cell;
use common::status::ExitStatus;

use std::sync::mpsc::{self, Receiver, Sender};

use num_traits::{FromPrimitive, ToPrimitive};
use thiserror::Error;

pub const FRAME_LEN: usize = 3;
pub type Frame = [Cell; FRAME_LEN];

pub const ACTION_READ: Cell = 0;
pub const ACTION_WRITE: Cell = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Read { addr: Cell },
    Write { addr: Cell, value: Cell },
}

impl Request {
    pub fn encode(self) -> Frame {
        match self {
            Request::Read { addr } => [ACTION_READ, addr, 0],
            Request::Write { addr, value } => [ACTION_WRITE, addr, value],
        }
    }

    // None for an action the service doesn't know; the service answers
    // that with an invalid-mem-action status rather than failing hard.
    pub fn decode(frame: Frame) -> Option<Request> {
        match frame[0] {
            ACTION_READ => Some(Request::Read { addr: frame[1] }),
            ACTION_WRITE => Some(Request::Write {
                addr: frame[1],
                value: frame[2],
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Value(Cell),
    Ack,
    Failed(ExitStatus),
}

impl Response {
    pub fn encode(self) -> Frame {
        let ok = ExitStatus::Success.to_i64().unwrap();
        match self {
            Response::Value(value) => [ok, value, 0],
            Response::Ack => [ok, 0, 0],
            Response::Failed(status) => [status.to_i64().unwrap(), 0, 0],
        }
    }

    pub fn decode(frame: Frame) -> Response {
        match ExitStatus::from_i64(frame[0]) {
            Some(ExitStatus::Success) => Response::Value(frame[1]),
            Some(status) => Response::Failed(status),
            // A garbled status is indistinguishable from a dead channel.
            None => Response::Failed(ExitStatus::ChannelFailure),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("memory service disconnected")]
    Disconnected,
}

/// The processor's end. `call` is the only operation: it blocks until
/// the matching response arrives, so a second request can never be
/// issued while one is outstanding.
pub struct CallerPort {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
}

impl CallerPort {
    pub fn call(&self, req: Request) -> Result<Response, TransportError> {
        self.tx
            .send(req.encode())
            .map_err(|_| TransportError::Disconnected)?;
        let frame = self.rx.recv().map_err(|_| TransportError::Disconnected)?;
        Ok(Response::decode(frame))
    }
}

/// The memory service's end. `park` blocks until work arrives and
/// returns None once the caller has hung up, which is the only
/// shutdown signal the service ever gets.
pub struct ServicePort {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
}

impl ServicePort {
    pub fn park(&self) -> Option<Frame> {
        self.rx.recv().ok()
    }

    pub fn reply(&self, resp: Response) -> Result<(), TransportError> {
        self.tx
            .send(resp.encode())
            .map_err(|_| TransportError::Disconnected)
    }
}

pub fn transport() -> (CallerPort, ServicePort) {
    let (req_tx, req_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    (
        CallerPort {
            tx: req_tx,
            rx: resp_rx,
        },
        ServicePort {
            tx: resp_tx,
            rx: req_rx,
        },
    )
}
