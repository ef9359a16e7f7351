use crate::error::{ParseError, ParseResult};
use crate::result::{Pending, ResultSet};
use crate::schema::Schema;

/// What a successful call to [`parse`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<'a> {
    Success(ResultSet<'a>),
    /// `--help`/`-h` was seen; the caller should print help and stop.
    HelpRequested,
}

/// Parse `argv` against `schema`.
///
/// `argv[0]` is the program name and is skipped. The scan is strictly left to
/// right:
/// - tokens without a leading `-` fill positionals in declaration order
/// - `--name` sets a flag, `--name VALUE` sets an option (the value token is
///   taken verbatim, even when it starts with `-`)
/// - `-c` tries option shortcuts before flag shortcuts
/// - `-abc` sets each flag shortcut in turn
/// - the help flag stops the scan immediately, wherever it appears
///
/// Missing trailing positionals fall back to their defaults.
pub fn parse<'a, S: AsRef<str>>(schema: &Schema, argv: &'a [S]) -> ParseResult<ParseOutcome<'a>> {
    let mut scanner = Scanner::new(schema);
    let outcome = scanner.run(argv).and_then(|step| match step {
        Step::Help => Ok(ParseOutcome::HelpRequested),
        Step::Done => scanner.pending.finish(schema).map(ParseOutcome::Success),
    });

    match &outcome {
        Ok(ParseOutcome::Success(_)) => tracing::debug!("arguments parsed"),
        Ok(ParseOutcome::HelpRequested) => tracing::debug!("help requested"),
        Err(err) => tracing::debug!(error = %err, "argument parsing failed"),
    }
    outcome
}

impl Schema {
    /// Parse `argv` against this schema. See [`parse`].
    pub fn parse<'a, S: AsRef<str>>(&self, argv: &'a [S]) -> ParseResult<ParseOutcome<'a>> {
        parse(self, argv)
    }
}

fn arg<S: AsRef<str>>(argv: &[S], i: usize) -> Option<&str> {
    argv.get(i).map(AsRef::as_ref)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Done,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    By(usize),
    Help,
}

/// Walks argv and fills a [`Pending`] result in place.
///
/// Nothing is rolled back on failure or on help: whatever was set before the
/// stopping token stays set.
struct Scanner<'s, 'a> {
    schema: &'s Schema,
    pending: Pending<'a>,
    next_positional: usize,
}

impl<'s, 'a> Scanner<'s, 'a> {
    fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            pending: Pending::new(schema),
            next_positional: 0,
        }
    }

    fn run<S: AsRef<str>>(&mut self, argv: &'a [S]) -> ParseResult<Step> {
        let mut i = 1usize;
        while let Some(token) = arg(argv, i) {
            tracing::trace!(index = i, token, "scanning argument");
            let next = arg(argv, i + 1);

            let advance = if token.is_empty() {
                Advance::By(1)
            } else if let Some(name) = token.strip_prefix("--") {
                self.long(token, name, next)?
            } else if let Some(rest) = token.strip_prefix('-') {
                self.short(token, rest, next)?
            } else {
                self.positional(token)?;
                Advance::By(1)
            };

            match advance {
                Advance::By(n) => i += n,
                Advance::Help => return Ok(Step::Help),
            }
        }
        Ok(Step::Done)
    }

    fn long(&mut self, token: &str, name: &str, next: Option<&'a str>) -> ParseResult<Advance> {
        if name.is_empty() {
            return Err(ParseError::MalformedToken(token.to_string()));
        }
        if let Some(idx) = self.schema.flag_by_name(name) {
            return Ok(self.flag(idx));
        }
        if let Some(idx) = self.schema.option_by_name(name) {
            self.option(idx, token, next)?;
            return Ok(Advance::By(2));
        }
        Err(ParseError::UnknownName(name.to_string()))
    }

    fn short(&mut self, token: &str, rest: &str, next: Option<&'a str>) -> ParseResult<Advance> {
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return Err(ParseError::MalformedToken(token.to_string()));
        };

        // A lone shortcut is an option first, a flag second.
        if chars.next().is_none() {
            if let Some(idx) = self.schema.option_by_shortcut(first) {
                self.option(idx, token, next)?;
                return Ok(Advance::By(2));
            }
        }

        for c in rest.chars() {
            let Some(idx) = self.schema.flag_by_shortcut(c) else {
                return Err(ParseError::UnknownShortcut(c));
            };
            if let Advance::Help = self.flag(idx) {
                return Ok(Advance::Help);
            }
        }
        Ok(Advance::By(1))
    }

    fn flag(&mut self, idx: usize) -> Advance {
        if self.schema.is_help(idx) {
            return Advance::Help;
        }
        self.pending.set_flag(idx);
        Advance::By(1)
    }

    fn option(&mut self, idx: usize, token: &str, next: Option<&'a str>) -> ParseResult<()> {
        let value = next.ok_or_else(|| ParseError::MissingValue(token.to_string()))?;
        self.pending.set_option(idx, value);
        Ok(())
    }

    fn positional(&mut self, token: &'a str) -> ParseResult<()> {
        if self.next_positional >= self.schema.positionals().len() {
            return Err(ParseError::UnexpectedPositional(token.to_string()));
        }
        self.pending.set_positional(self.next_positional, token);
        self.next_positional += 1;
        Ok(())
    }
}
