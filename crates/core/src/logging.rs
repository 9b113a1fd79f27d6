//! Logging abstraction
//!
//! Unified logging macros for the core crate:
//! - `defmt` feature: forwarded to defmt
//! - Host tests: printed to stdout
//! - Otherwise: no-op (arguments are still type-checked)
//!
//! Operator-facing status text does not go through here; see
//! [`crate::arming::status`].

/// Maximum formatted log line forwarded to defmt
#[cfg(feature = "defmt")]
const LOG_MSG_SIZE: usize = 160;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    /// Tag printed in front of host log lines
    pub const fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "[INFO] ",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Error => "[ERROR]",
            LogLevel::Debug => "[DEBUG]",
        }
    }
}

/// Format and forward a log line to defmt
#[cfg(feature = "defmt")]
pub fn emit(level: LogLevel, args: core::fmt::Arguments<'_>) {
    let mut line = heapless::String::<LOG_MSG_SIZE>::new();
    // Overlong lines are cut off at capacity
    let _ = core::fmt::write(&mut line, args);
    match level {
        LogLevel::Info => defmt::info!("{=str}", line.as_str()),
        LogLevel::Warn => defmt::warn!("{=str}", line.as_str()),
        LogLevel::Error => defmt::error!("{=str}", line.as_str()),
        LogLevel::Debug => defmt::debug!("{=str}", line.as_str()),
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, $($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        $crate::logging::emit($level, format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), test))]
        ::std::println!("{} {}", $level.tag(), format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        {
            let _ = $level;
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::logging::LogLevel::Info, $($arg)*)
    };
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::logging::LogLevel::Warn, $($arg)*)
    };
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::logging::LogLevel::Error, $($arg)*)
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::__log_at!($crate::logging::LogLevel::Debug, $($arg)*)
    };
}
