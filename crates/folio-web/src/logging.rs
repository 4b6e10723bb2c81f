//! `tracing` output routed to the browser console.

use folio::{FolioError, FolioResult};
use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Console method an event is written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    /// `console.error`
    Error,
    /// `console.warn`
    Warn,
    /// `console.info`
    Info,
    /// `console.debug`
    Debug,
}

impl From<&Level> for ConsoleLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Buffers one formatted event and writes it to the console on drop
#[derive(Debug)]
pub struct ConsoleWriter {
    level: ConsoleLevel,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        let message = line.into();
        match self.level {
            ConsoleLevel::Error => web_sys::console::error_1(&message),
            ConsoleLevel::Warn => web_sys::console::warn_1(&message),
            ConsoleLevel::Info => web_sys::console::info_1(&message),
            ConsoleLevel::Debug => web_sys::console::debug_1(&message),
        }
    }
}

/// Hands out a [`ConsoleWriter`] per event
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: ConsoleLevel::Info,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: meta.level().into(),
            buffer: Vec::new(),
        }
    }
}

/// Parse a filter directive such as `info` or `folio=debug,warn`
pub fn parse_filter(directive: &str) -> FolioResult<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| FolioError::config(format!("invalid log level `{directive}`: {e}")))
}

/// Install the console subscriber.
///
/// Timestamps are off: the console stamps messages itself and the system
/// clock is unavailable on `wasm32-unknown-unknown`.
pub fn init_logging(directive: &str) -> FolioResult<()> {
    let filter = parse_filter(directive)?;
    tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_env_filter(filter)
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| FolioError::host(format!("logging already initialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level_mapping() {
        assert_eq!(ConsoleLevel::from(&Level::ERROR), ConsoleLevel::Error);
        assert_eq!(ConsoleLevel::from(&Level::WARN), ConsoleLevel::Warn);
        assert_eq!(ConsoleLevel::from(&Level::INFO), ConsoleLevel::Info);
        assert_eq!(ConsoleLevel::from(&Level::DEBUG), ConsoleLevel::Debug);
        assert_eq!(ConsoleLevel::from(&Level::TRACE), ConsoleLevel::Debug);
    }

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("folio=debug,warn").is_ok());
        assert!(parse_filter("folio=loud").is_err());
    }
}
