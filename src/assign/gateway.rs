//! Human decision gateway.
//!
//! When the arbiter cannot separate candidates by score it asks a
//! [`DecisionGateway`] to pick. The gateway may answer with one of the
//! offered options, a free-text custom agent id, or a skip. Any gateway
//! failure is treated the same as a skip by the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Raw token a gateway uses for "custom answer follows".
pub const CUSTOM_TOKEN: &str = "custom";

/// Raw token a gateway uses for "skip".
pub const SKIP_TOKEN: &str = "skip";

/// One choice offered to the human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: String,
    pub description: String,
    /// Agent id returned when this option is selected.
    pub value: String,
    #[serde(default)]
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub title: String,
    pub context: String,
    pub options: Vec<DecisionOption>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DecisionRequest {
    pub fn recommended(&self) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.is_recommended)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionResponse {
    /// The `value` of one of the offered options.
    Selected(String),
    /// A free-text agent id typed by the human.
    Custom(String),
    Skip,
}

impl DecisionResponse {
    /// Build a response from the raw token form some gateways speak: a
    /// selected value, where [`CUSTOM_TOKEN`] means "see `custom_input`".
    pub fn from_raw(value: Option<&str>, custom_input: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(SKIP_TOKEN) => Self::Skip,
            Some(CUSTOM_TOKEN) => match custom_input.map(str::trim) {
                Some(id) if !id.is_empty() => Self::Custom(id.to_string()),
                _ => Self::Skip,
            },
            Some(v) => Self::Selected(v.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("decision gateway unavailable: {0}")]
    Unavailable(String),

    #[error("decision gateway timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("decision gateway I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can put a decision in front of a human.
pub trait DecisionGateway: Send + Sync {
    fn request_decision(&self, request: &DecisionRequest)
    -> Result<DecisionResponse, GatewayError>;
}

impl<G: DecisionGateway + ?Sized> DecisionGateway for Arc<G> {
    fn request_decision(
        &self,
        request: &DecisionRequest,
    ) -> Result<DecisionResponse, GatewayError> {
        (**self).request_decision(request)
    }
}

/// Gateway for non-interactive runs: always unavailable, so every
/// escalation falls through to automatic selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGateway;

impl DecisionGateway for NoGateway {
    fn request_decision(&self, _: &DecisionRequest) -> Result<DecisionResponse, GatewayError> {
        Err(GatewayError::Unavailable(
            "interactive decisions are disabled".to_string(),
        ))
    }
}

/// Bounds how long an inner gateway may take.
///
/// The inner call runs on its own thread. On timeout the caller gets
/// `TimedOut` and moves on; the abandoned call is not interrupted and its
/// answer is discarded whenever it arrives. Use it for gateways that cannot
/// bound their own wait. [`TerminalGateway`] takes its own timeout instead,
/// since an abandoned terminal read would hold stdin.
pub struct TimeoutGateway<G> {
    inner: Arc<G>,
    timeout: Duration,
}

impl<G: DecisionGateway + 'static> TimeoutGateway<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<G: DecisionGateway + 'static> DecisionGateway for TimeoutGateway<G> {
    fn request_decision(
        &self,
        request: &DecisionRequest,
    ) -> Result<DecisionResponse, GatewayError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("allot-decision".to_string())
            .spawn(move || {
                let _ = tx.send(inner.request_decision(&request));
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(GatewayError::TimedOut(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(GatewayError::Unavailable(
                "decision thread exited without an answer".to_string(),
            )),
        }
    }
}

/// Line-oriented prompt: writes the options to `output` and reads the
/// answer from `input`.
///
/// Accepted answers: an option number, `c`/`custom` followed by an agent id
/// on the next line, or `s`/`skip`/empty line. End of input is a skip.
///
/// Input is read on one long-lived thread that forwards lines over a channel,
/// so a request that times out never leaves a read pending on the next one.
/// Lines that arrive after a timeout answered the abandoned prompt; they are
/// discarded before the next prompt is shown.
pub struct TerminalGateway<W> {
    lines: Mutex<Receiver<io::Result<String>>>,
    output: Mutex<W>,
    timeout: Option<Duration>,
    stale: AtomicBool,
}

const MAX_PROMPT_ATTEMPTS: usize = 3;

impl<W: Write + Send> TerminalGateway<W> {
    pub fn new<R: BufRead + Send + 'static>(input: R, output: W) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in input.lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self {
            lines: Mutex::new(rx),
            output: Mutex::new(output),
            timeout: None,
            stale: AtomicBool::new(false),
        }
    }

    /// Give up on a request that has not been answered within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn render(&self, out: &mut W, request: &DecisionRequest) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", request.title)?;
        writeln!(out, "{}", request.context)?;
        writeln!(out)?;
        for (i, option) in request.options.iter().enumerate() {
            let marker = if option.is_recommended {
                " (recommended)"
            } else {
                ""
            };
            writeln!(out, "  {}) {}{}", i + 1, option.label, marker)?;
            writeln!(out, "     {}", option.description)?;
        }
        writeln!(out, "  c) enter a custom agent id")?;
        writeln!(out, "  s) skip, let the engine decide")?;
        Ok(())
    }

    /// Next trimmed line; `None` at end of input.
    fn read_answer(
        &self,
        lines: &Receiver<io::Result<String>>,
        deadline: Option<Instant>,
    ) -> Result<Option<String>, GatewayError> {
        let received = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                lines.recv_timeout(remaining)
            }
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => Ok(Some(line?.trim().to_string())),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => {
                self.stale.store(true, Ordering::SeqCst);
                Err(GatewayError::TimedOut(self.timeout.unwrap_or_default()))
            }
        }
    }
}

impl<W: Write + Send> DecisionGateway for TerminalGateway<W> {
    fn request_decision(
        &self,
        request: &DecisionRequest,
    ) -> Result<DecisionResponse, GatewayError> {
        let lines = self
            .lines
            .lock()
            .map_err(|_| GatewayError::Unavailable("terminal input lock poisoned".to_string()))?;
        let mut output = self
            .output
            .lock()
            .map_err(|_| GatewayError::Unavailable("terminal output lock poisoned".to_string()))?;

        if self.stale.swap(false, Ordering::SeqCst) {
            let dropped = lines.try_iter().count();
            if dropped > 0 {
                debug!(lines = dropped, "discarded answers to a timed-out prompt");
            }
        }

        let deadline = self.timeout.map(|t| Instant::now() + t);
        self.render(&mut output, request)?;

        for _ in 0..MAX_PROMPT_ATTEMPTS {
            write!(output, "Choice [1-{}/c/s]: ", request.options.len())?;
            output.flush()?;

            let Some(answer) = self.read_answer(&lines, deadline)? else {
                return Ok(DecisionResponse::Skip);
            };

            match answer.to_ascii_lowercase().as_str() {
                "" | "s" | SKIP_TOKEN => return Ok(DecisionResponse::Skip),
                "c" | CUSTOM_TOKEN => {
                    write!(output, "Agent id: ")?;
                    output.flush()?;
                    let id = self.read_answer(&lines, deadline)?;
                    return Ok(DecisionResponse::from_raw(Some(CUSTOM_TOKEN), id.as_deref()));
                }
                other => {
                    let picked = other
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| request.options.get(i));
                    if let Some(option) = picked {
                        return Ok(DecisionResponse::Selected(option.value.clone()));
                    }
                    writeln!(output, "Unrecognized choice '{}'", answer)?;
                }
            }
        }

        Ok(DecisionResponse::Skip)
    }
}
