#![doc = include_str!("../../../README.md")]

mod action;
mod convert;
mod error;
mod format;
mod io;
mod matcher;
mod namespace;
mod parser;
mod spec;
mod tokenizer;
pub mod tracer;
mod usage;
mod validate;
mod value;

pub use crate::{
    convert::{Choices, ConversionError, ValueType},
    error::{ConfigError, ErrorKind, ParseError, ParseOutcome},
    format::{HelpFormatter, PlainFormatter},
    io::{FileReader, FsFileReader, MemoryFileReader},
    namespace::Namespace,
    parser::{ConflictHandler, MAX_EXACT_NARGS, Parser, ParserConfig},
    spec::{Action, ArgumentSpec, DefaultValue, ExclusiveGroupId, GroupId, HelpText, InvalidNargs, Nargs},
    usage::{HelpEntry, HelpSection, UsageModel},
    value::Value,
};
