use std::borrow::Cow;
use std::fmt;

use crate::error::{ParseError, ParseResult};
use crate::schema::{Flag, Opt, Positional, Schema};

/// Values parsed from argv.
///
/// Text borrows from the argv storage passed to the parser; defaults are
/// owned copies taken from the schema. Use [`ResultSet::into_owned`] to
/// outlive the argv buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<'a> {
    flags: Vec<bool>,
    options: Vec<Option<Cow<'a, str>>>,
    positionals: Vec<Cow<'a, str>>,
}

impl<'a> ResultSet<'a> {
    /// Whether the flag was present.
    pub fn flag(&self, flag: Flag) -> bool {
        self.flags.get(flag.index()).copied().unwrap_or(false)
    }

    /// The option value, or its configured default.
    pub fn option(&self, opt: Opt) -> Option<&str> {
        self.options.get(opt.index()).and_then(|v| v.as_deref())
    }

    /// The positional value, or its configured default.
    pub fn positional(&self, positional: Positional) -> &str {
        self.positionals
            .get(positional.index())
            .map(|v| v.as_ref())
            .unwrap_or_default()
    }

    /// Detach every value from the argv storage.
    pub fn into_owned(self) -> ResultSet<'static> {
        ResultSet {
            flags: self.flags,
            options: self
                .options
                .into_iter()
                .map(|v| v.map(|s| Cow::Owned(s.into_owned())))
                .collect(),
            positionals: self
                .positionals
                .into_iter()
                .map(|s| Cow::Owned(s.into_owned()))
                .collect(),
        }
    }

    /// All values paired with their names, in schema order.
    ///
    /// The synthetic help flag is skipped; a successful parse never sets it.
    pub fn entries<'r>(&'r self, schema: &'r Schema) -> impl Iterator<Item = (&'r str, Value<'r>)> {
        let flags = schema
            .flags()
            .iter()
            .zip(&self.flags)
            .enumerate()
            .filter(move |(idx, _)| !schema.is_help(*idx))
            .map(|(_, (spec, set))| (spec.name.as_str(), Value::Flag(*set)));
        let options = schema
            .options()
            .iter()
            .zip(&self.options)
            .map(|(spec, v)| (spec.name.as_str(), Value::Option(v.as_deref())));
        let positionals = schema
            .positionals()
            .iter()
            .zip(&self.positionals)
            .map(|(spec, v)| (spec.name.as_str(), Value::Positional(v.as_ref())));
        flags.chain(options).chain(positionals)
    }
}

/// A single parsed value, as yielded by [`ResultSet::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'r> {
    Flag(bool),
    Option(Option<&'r str>),
    Positional(&'r str),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(set) => write!(f, "{set}"),
            Self::Option(Some(v)) | Self::Positional(v) => write!(f, "{v:?}"),
            Self::Option(None) => f.write_str("<none>"),
        }
    }
}

/// Result state while the scanner is still walking argv.
///
/// Positionals stay `None` until assigned; [`Pending::finish`] backfills
/// defaults and turns them into a [`ResultSet`].
#[derive(Debug, Clone)]
pub(crate) struct Pending<'a> {
    pub(crate) flags: Vec<bool>,
    pub(crate) options: Vec<Option<Cow<'a, str>>>,
    pub(crate) positionals: Vec<Option<Cow<'a, str>>>,
}

impl<'a> Pending<'a> {
    pub(crate) fn new(schema: &Schema) -> Self {
        Self {
            flags: vec![false; schema.flags().len()],
            options: schema
                .options()
                .iter()
                .map(|o| o.default.clone().map(Cow::Owned))
                .collect(),
            positionals: vec![None; schema.positionals().len()],
        }
    }

    pub(crate) fn set_flag(&mut self, index: usize) {
        self.flags[index] = true;
    }

    pub(crate) fn set_option(&mut self, index: usize, value: &'a str) {
        self.options[index] = Some(Cow::Borrowed(value));
    }

    pub(crate) fn set_positional(&mut self, index: usize, value: &'a str) {
        self.positionals[index] = Some(Cow::Borrowed(value));
    }

    pub(crate) fn finish(self, schema: &Schema) -> ParseResult<ResultSet<'a>> {
        let positionals = self
            .positionals
            .into_iter()
            .zip(schema.positionals())
            .map(|(value, spec)| match (value, &spec.default) {
                (Some(v), _) => Ok(v),
                (None, Some(default)) => Ok(Cow::Owned(default.clone())),
                (None, None) => Err(ParseError::MissingPositional(spec.name.clone())),
            })
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(ResultSet {
            flags: self.flags,
            options: self.options,
            positionals,
        })
    }
}
