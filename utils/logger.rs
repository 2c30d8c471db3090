//! `log` backend for the firmware console
//!
//! The platform hands over a `core::fmt::Write` sink (usually the UART
//! driver) once; every record is then formatted as
//! `LEVEL:   target: message` under a spinlock, so lines from different
//! cores never interleave.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};

use crate::sync::SpinLock;
use crate::{Error, Result};

type Sink = &'static mut (dyn Write + Send);

struct Logger {
    sink: SpinLock<Option<Sink>>,
}

static LOGGER: Logger = Logger {
    sink: SpinLock::new(None),
};

/// Get the log level selected by the build features
pub fn level() -> LevelFilter {
    if cfg!(feature = "verbose") {
        LevelFilter::Trace
    } else if cfg!(feature = "debug") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the console logger.
///
/// Must be called once, before the first log record is emitted. Fails
/// without touching the console if any logger is already installed.
pub fn init(sink: Sink) -> Result<()> {
    log::set_logger(&LOGGER).map_err(|_| Error::AlreadyInitialized)?;
    *LOGGER.sink.lock() = Some(sink);
    log::set_max_level(level());
    Ok(())
}

fn write_record(sink: &mut dyn Write, record: &Record<'_>) -> fmt::Result {
    writeln!(
        sink,
        "{:<7}{}: {}",
        record.level().as_str(),
        record.target(),
        record.args()
    )
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = self.sink.lock().as_mut() {
            // Console errors have nowhere to be reported.
            let _ = write_record(&mut **sink, record);
        }
    }

    fn flush(&self) {}
}
