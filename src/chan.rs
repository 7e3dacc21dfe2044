// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Running machines on their own threads, connected by channels

use log::{debug, error};
use std::sync::mpsc::{self, Receiver, SendError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::{Fault, Io, Ram, RunError, run};

/// What travels over the channels connecting machines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// An input or output value
    Value(i64),
    /// The sending machine failed. Always the last message before its outbound channel closes.
    Error(RunError),
}

impl Message {
    /// The contained value, if this isn't an error
    pub fn value(&self) -> Option<i64> {
        match self {
            Message::Value(v) => Some(*v),
            Message::Error(_) => None,
        }
    }
}

impl From<i64> for Message {
    fn from(val: i64) -> Self {
        Self::Value(val)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a [ChannelIo] behaves when there's no input waiting
pub struct AsyncConfig {
    /// If set, reading from an empty inbound channel returns this value instead of blocking
    pub idle_input: Option<i64>,
    /// How long to sleep before returning [idle_input](Self::idle_input), giving other machines a
    /// chance to run
    pub idle_delay: Duration,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            idle_input: None,
            idle_delay: Duration::from_millis(1),
        }
    }
}

impl AsyncConfig {
    /// Non-blocking reads that return `idle_input` when nothing is queued
    pub fn polling(idle_input: i64) -> Self {
        Self {
            idle_input: Some(idle_input),
            ..Self::default()
        }
    }

    /// Replace the idle delay
    pub fn with_idle_delay(self, idle_delay: Duration) -> Self {
        Self { idle_delay, ..self }
    }
}

/// Channel-based I/O: reads block on an inbound channel, writes go to an outbound channel.
///
/// Closing the inbound channel while the machine is waiting on it is a [Fault::SenderClosed], so
/// only close it once the conversation is over.
#[derive(Debug)]
pub struct ChannelIo {
    inbound: Receiver<Message>,
    outbound: Sender<Message>,
    config: AsyncConfig,
}

impl ChannelIo {
    /// Blocking I/O over the given channel ends
    pub fn new(inbound: Receiver<Message>, outbound: Sender<Message>) -> Self {
        Self::with_config(inbound, outbound, AsyncConfig::default())
    }

    /// I/O over the given channel ends, reading as `config` says
    pub fn with_config(
        inbound: Receiver<Message>,
        outbound: Sender<Message>,
        config: AsyncConfig,
    ) -> Self {
        Self {
            inbound,
            outbound,
            config,
        }
    }

    fn report(&self, err: RunError) {
        // if the receiver is gone, there's nobody left to tell
        let _ = self.outbound.send(Message::Error(err));
    }
}

impl Io for ChannelIo {
    fn read(&mut self) -> Result<i64, Fault> {
        let msg = match self.config.idle_input {
            None => self.inbound.recv().map_err(|_| Fault::SenderClosed)?,
            Some(idle) => match self.inbound.try_recv() {
                Ok(msg) => msg,
                Err(TryRecvError::Empty) => {
                    thread::sleep(self.config.idle_delay);
                    return Ok(idle);
                }
                Err(TryRecvError::Disconnected) => return Err(Fault::SenderClosed),
            },
        };
        match msg {
            Message::Value(v) => Ok(v),
            Message::Error(e) => Err(Fault::UpstreamFailed(Box::new(e))),
        }
    }

    fn write(&mut self, val: i64) -> Result<(), Fault> {
        self.outbound
            .send(Message::Value(val))
            .map_err(|_| Fault::ReceiverClosed)
    }
}

/// Run `ram` on a new thread, using `io` for I/O.
///
/// If the run fails, the error is sent as one final [Message::Error] before the outbound channel
/// closes. The thread's result is the final memory along with how the run ended.
pub fn spawn(
    id: impl Into<String>,
    mut ram: Ram,
    mut io: ChannelIo,
) -> JoinHandle<(Ram, Result<(), RunError>)> {
    let id = id.into();
    thread::spawn(move || {
        debug!("vm {id}: starting");
        let result = run(&mut ram, &mut io, 0);
        match &result {
            Ok(()) => debug!("vm {id}: halted"),
            Err(e) => {
                error!("vm {id}: {e}");
                io.report(e.clone());
            }
        }
        drop(io);
        (ram, result)
    })
}

/// Handle to a machine started with [run_async]
#[derive(Debug)]
pub struct AsyncVm {
    id: String,
    input: Option<Sender<Message>>,
    output: Receiver<Message>,
    handle: JoinHandle<(Ram, Result<(), RunError>)>,
}

/// Start running `ram` on its own thread with blocking channel I/O
///
/// ```
/// use intcode_vm::prelude::*;
/// // in => *9, add 1, *9 => *9, out *9, hlt
/// let vm = run_async("adder", Ram::new([3, 9, 101, 1, 9, 9, 4, 9, 99]));
/// vm.send(41).unwrap();
/// assert_eq!(vm.recv(), Some(Message::Value(42)));
/// assert_eq!(vm.recv(), None);
/// assert_eq!(vm.join().unwrap().read(9), 42);
/// ```
pub fn run_async(id: impl Into<String>, ram: Ram) -> AsyncVm {
    run_async_with(id, ram, AsyncConfig::default())
}

/// Like [run_async], with the given [AsyncConfig]
pub fn run_async_with(id: impl Into<String>, ram: Ram, config: AsyncConfig) -> AsyncVm {
    let id = id.into();
    let (input, inbound) = mpsc::channel();
    let (outbound, output) = mpsc::channel();
    let handle = spawn(
        id.clone(),
        ram,
        ChannelIo::with_config(inbound, outbound, config),
    );
    AsyncVm {
        id,
        input: Some(input),
        output,
        handle,
    }
}

impl AsyncVm {
    /// The id the machine was started with
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue a value for the machine to read. Fails if the input was closed, or if the machine
    /// has already stopped.
    pub fn send(&self, val: i64) -> Result<(), SendError<Message>> {
        match self.input.as_ref() {
            Some(input) => input.send(Message::Value(val)),
            None => Err(SendError(Message::Value(val))),
        }
    }

    /// The sending end of the machine's inbound channel, for wiring it to other producers
    pub fn input(&self) -> Option<&Sender<Message>> {
        self.input.as_ref()
    }

    /// The receiving end of the machine's outbound channel
    pub fn output(&self) -> &Receiver<Message> {
        &self.output
    }

    /// Wait for the machine's next message. Returns [None] once its outbound channel is closed.
    pub fn recv(&self) -> Option<Message> {
        self.output.recv().ok()
    }

    /// Close the inbound channel. Once queued input runs out, further reads will fault.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Close the input and wait for the machine to stop, returning its final memory
    pub fn join(self) -> Result<Ram, RunError> {
        let AsyncVm {
            id, input, handle, ..
        } = self;
        drop(input);
        match handle.join() {
            Ok((ram, result)) => result.map(|()| ram),
            Err(payload) => {
                error!("vm {id}: thread panicked");
                std::panic::resume_unwind(payload)
            }
        }
    }
}
