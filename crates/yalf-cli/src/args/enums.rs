use clap::ValueEnum;
use std::fmt;
use yalf_engine::{EscapePolicy, EventPlacement, IndentStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlacementArg {
    Immediate,
    Nested,
}

impl From<PlacementArg> for EventPlacement {
    fn from(arg: PlacementArg) -> Self {
        match arg {
            PlacementArg::Immediate => EventPlacement::Immediate,
            PlacementArg::Nested => EventPlacement::Nested,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EscapeArg {
    Collapse,
    Flatten,
}

impl From<EscapeArg> for EscapePolicy {
    fn from(arg: EscapeArg) -> Self {
        match arg {
            EscapeArg::Collapse => EscapePolicy::Collapse,
            EscapeArg::Flatten => EscapePolicy::Flatten,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndentArg {
    Engine,
    NestedCallHint,
}

impl From<IndentArg> for IndentStrategy {
    fn from(arg: IndentArg) -> Self {
        match arg {
            IndentArg::Engine => IndentStrategy::Engine,
            IndentArg::NestedCallHint => IndentStrategy::NestedCallHint,
        }
    }
}
