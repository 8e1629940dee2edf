//! Centralised error hierarchy for the **glox** interpreter.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here, enabling a
//! uniform `Result<T>` alias throughout the crate and ergonomic
//! inter-operation with `anyhow` in the binary, while preserving diagnostic
//! detail.
//!
//! Reporting is separated from the error values: the [`ErrorReporter`]
//! forwards `(line, location, message)` triples to a pluggable sink and
//! tracks the four error categories independently so the driver can decide
//! whether to abort (file mode) or carry on (REPL).

use std::io;

use log::{debug, info};
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GloxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Scan {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        location: String,
    },

    /// Static-analysis (resolution) failure.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error.
    #[error("[line {line}] Error{location}: {message}")]
    Runtime {
        message: String,
        line: usize,
        location: String,
    },

    /// Wrapper around `std::io::Error`. Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF-8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The `where` part of a report: `" at end"` for the EOF token, otherwise
/// `" at '<lexeme>'"`.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl GloxError {
    /// Helper constructor for the **scanner**.
    pub fn scan<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Scan error: line={}, msg={}", line, message);

        GloxError::Scan { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", token.line, message);

        GloxError::Parse {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Resolve error: line={}, msg={}", token.line, message);

        GloxError::Resolve {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for **native functions**, which have no token to
    /// anchor at. The call site re-anchors the error at the closing paren.
    pub fn native<S: Into<String>>(msg: S) -> Self {
        GloxError::Runtime {
            message: msg.into(),
            line: 0,
            location: String::new(),
        }
    }

    /// Helper constructor for the **evaluator**, anchored at a token.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", token.line, message);

        GloxError::Runtime {
            message,
            line: token.line,
            location: location_of(token),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GloxError>;

/// Destination for rendered diagnostics. The interpreter core never prints
/// on its own; everything goes through a sink.
pub trait ErrorSink {
    fn report(&mut self, line: usize, location: &str, message: &str);
}

/// Default sink: renders to stderr.
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {}] Error{}: {}", line, location, message);
    }
}

/// Routes errors to the sink and remembers, per category, whether any
/// occurred. The driver consults the flags to pick abort points and exit
/// codes; the REPL calls [`ErrorReporter::reset`] between inputs.
pub struct ErrorReporter {
    sink: Box<dyn ErrorSink>,
    had_scan_error: bool,
    had_parse_error: bool,
    had_resolution_error: bool,
    had_runtime_error: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::with_sink(Box::new(ConsoleSink))
    }

    pub fn with_sink(sink: Box<dyn ErrorSink>) -> Self {
        info!("ErrorReporter instantiated");

        Self {
            sink,
            had_scan_error: false,
            had_parse_error: false,
            had_resolution_error: false,
            had_runtime_error: false,
        }
    }

    pub fn report(&mut self, error: &GloxError) {
        match error {
            GloxError::Scan { message, line } => {
                self.had_scan_error = true;
                self.sink.report(*line, "", message);
            }

            GloxError::Parse {
                message,
                line,
                location,
            } => {
                self.had_parse_error = true;
                self.sink.report(*line, location, message);
            }

            GloxError::Resolve {
                message,
                line,
                location,
            } => {
                self.had_resolution_error = true;
                self.sink.report(*line, location, message);
            }

            GloxError::Runtime {
                message,
                line,
                location,
            } => {
                self.had_runtime_error = true;
                self.sink.report(*line, location, message);
            }

            GloxError::Io(e) => {
                self.sink.report(0, "", &e.to_string());
            }

            GloxError::Utf8(e) => {
                self.sink.report(0, "", &e.to_string());
            }
        }
    }

    pub fn had_scan_error(&self) -> bool {
        self.had_scan_error
    }

    pub fn had_parse_error(&self) -> bool {
        self.had_parse_error
    }

    pub fn had_resolution_error(&self) -> bool {
        self.had_resolution_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// True if scanning, parsing or resolution failed; interpretation must
    /// not run.
    pub fn had_static_error(&self) -> bool {
        self.had_scan_error || self.had_parse_error || self.had_resolution_error
    }

    pub fn reset(&mut self) {
        self.had_scan_error = false;
        self.had_parse_error = false;
        self.had_resolution_error = false;
        self.had_runtime_error = false;
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
