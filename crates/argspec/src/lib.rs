//! Schema-driven command line argument parsing.
//!
//! A [`Schema`] is compiled once from flag, option and positional specs. Each
//! registered entry gets a typed handle ([`Flag`], [`Opt`], [`Positional`])
//! that is the only way to read a value back out of a [`ResultSet`], so a
//! misspelled argument name fails at construction instead of at lookup.
//!
//! ```
//! use argspec::{FlagSpec, OptionSpec, ParseOutcome, PositionalSpec, Schema, SchemaConfig};
//!
//! let mut builder = Schema::builder(SchemaConfig::default());
//! let verbose = builder.flag(FlagSpec::new("verbose").shortcut('v'));
//! let output = builder.option(OptionSpec::new("output").shortcut('o').default("a.out"));
//! let input = builder.positional(PositionalSpec::new("input"));
//! let schema = builder.build()?;
//!
//! let argv = ["cc", "-v", "main.c"];
//! let ParseOutcome::Success(result) = schema.parse(&argv)? else {
//!     unreachable!("argv has no --help");
//! };
//! assert!(result.flag(verbose));
//! assert_eq!(result.option(output), Some("a.out"));
//! assert_eq!(result.positional(input), "main.c");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Everything is text: there is no type coercion, no repeated options and no
//! subcommands.

mod error;
pub mod help;
mod parser;
mod result;
mod schema;

pub use error::{Category, ErrorKind, ParseError, ParseResult, SchemaError};
pub use parser::{ParseOutcome, parse};
pub use result::{ResultSet, Value};
pub use schema::{
    Flag, FlagSpec, HELP_NAME, HELP_SHORTCUT, Opt, OptionSpec, Positional, PositionalSpec, Schema,
    SchemaBuilder, SchemaConfig,
};
