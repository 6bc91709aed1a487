//! The stack machine and its dispatch loop.

use crate::builtins::Builtin;
use crate::error::InterpretError;
use crate::quote::Quotation;
use crate::registry::Registry;
use crate::snapshot::Snapshot;
use crate::tokenizer::tokenize;
use crate::value::Value;
use std::rc::Rc;
use tracing::{debug, trace};

/// One level of the execution frame stack: a quotation plus the cursor
/// marking the next token to execute.
///
/// The top frame is the running quotation; frames beneath it are suspended
/// callers, each holding its own resume position. Invocation pushes a frame
/// and exhaustion pops one; there is no separate return stack to keep in
/// step.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) quote: Rc<Quotation>,
    pub(crate) pos: usize,
}

impl Frame {
    fn new(quote: Rc<Quotation>) -> Self {
        Frame { quote, pos: 0 }
    }
}

/// Machine status. `Faulted` carries the error that stopped the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    /// The root quotation ran to exhaustion
    Completed,
    /// A word failed; the data stack is left exactly as it was
    Faulted(InterpretError),
}

/// The LForth virtual machine: data stack, execution frames, word registry.
///
/// Built over one program text with [`Machine::load`] and driven to
/// completion with [`Machine::run`]. All state is owned by the machine;
/// concurrent programs each build their own and share nothing.
#[derive(Debug)]
pub struct Machine {
    pub(crate) data: Vec<Value>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) defs: Registry,
    status: Status,
}

impl Machine {
    /// Tokenize `source` and stage it as the root quotation.
    pub fn load(source: &str) -> Result<Self, InterpretError> {
        let tokens = tokenize(source)?;
        let root = Rc::new(Quotation::new(tokens));
        debug!(tokens = root.len(), "program loaded");
        Ok(Machine {
            data: Vec::new(),
            frames: vec![Frame::new(root)],
            defs: Registry::new(),
            status: Status::Running,
        })
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The error that faulted the run, if any.
    pub fn error(&self) -> Option<&InterpretError> {
        match &self.status {
            Status::Faulted(e) => Some(e),
            _ => None,
        }
    }

    /// Data stack, bottom first.
    pub fn data(&self) -> &[Value] {
        &self.data
    }

    /// Frames currently live: the running quotation plus suspended callers.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn definitions(&self) -> &Registry {
        &self.defs
    }

    /// Drive the machine until it halts, then report the final status.
    pub fn run(&mut self) -> &Status {
        while matches!(self.status, Status::Running) {
            self.step();
        }
        match &self.status {
            Status::Completed => debug!("run completed"),
            Status::Faulted(e) => debug!(kind = e.kind(), error = %e, "run faulted"),
            Status::Running => {}
        }
        &self.status
    }

    /// Execute one dispatch step.
    pub fn step(&mut self) {
        let Some(frame) = self.frames.last_mut() else {
            // Unreachable while Running: popping the root frame completes
            // the run before the frame stack can empty mid-flight.
            self.status = Status::Faulted(InterpretError::StackUnderflow(
                "no executing quotation".to_string(),
            ));
            return;
        };
        let Some(token) = frame.quote.token(frame.pos).map(str::to_owned) else {
            // Quotation exhausted: return to the caller beneath it.
            self.frames.pop();
            if self.frames.is_empty() {
                self.status = Status::Completed;
            }
            return;
        };
        frame.pos += 1;
        self.dispatch(&token);
    }

    /// Reserved word first, then defined words, then the literal parse.
    fn dispatch(&mut self, token: &str) {
        if let Some(word) = Builtin::lookup(token) {
            trace!(token, "dispatch builtin");
            if let Err(e) = word.execute(self) {
                self.status = Status::Faulted(e);
            }
            return;
        }
        if let Some(body) = self.defs.lookup(token) {
            trace!(token, "dispatch defined word");
            let body = Rc::clone(body);
            self.invoke(body);
            return;
        }
        let item = Value::parse_token(token);
        trace!(token, item = %item, "dispatch literal");
        self.data.push(item);
    }

    /// Begin executing `body` as a nested frame. The current frame keeps its
    /// cursor and resumes when the body exhausts.
    pub(crate) fn invoke(&mut self, body: Rc<Quotation>) {
        trace!(tokens = body.len(), depth = self.frames.len(), "invoke");
        self.frames.push(Frame::new(body));
    }

    /// Capture the externally visible result: the outcome plus the rendered
    /// data stack, top of stack first.
    ///
    /// Only a completed run reports success. A machine that has not been
    /// driven to a halt yet reports failure with the in-progress cause.
    pub fn snapshot(&self) -> Snapshot {
        let stack: Vec<String> = self.data.iter().rev().map(Value::to_string).collect();
        match &self.status {
            Status::Completed => Snapshot {
                success: true,
                error: None,
                stack,
            },
            Status::Faulted(e) => Snapshot {
                success: false,
                error: Some(e.to_string()),
                stack,
            },
            Status::Running => Snapshot {
                success: false,
                error: Some("run still in progress".to_string()),
                stack,
            },
        }
    }
}
