use thiserror::Error;

/// Argument category a schema entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Flag,
    Option,
    Positional,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Flag => "flag",
            Self::Option => "option",
            Self::Positional => "positional",
        })
    }
}

/// Rejections raised while compiling a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("invalid {category} name '{name}'")]
    InvalidName { category: Category, name: String },

    #[error("invalid shortcut '{shortcut}' for {category} '{name}'")]
    InvalidShortcut {
        category: Category,
        name: String,
        shortcut: char,
    },

    #[error("duplicate {category} name '{name}'")]
    DuplicateName { category: Category, name: String },

    #[error("shortcut '-{shortcut}' maps to both {category}s '{first}' and '{second}'")]
    DuplicateShortcut {
        category: Category,
        shortcut: char,
        first: String,
        second: String,
    },

    #[error("shortcut '-{shortcut}' is used by flag '{flag}' and option '{option}'")]
    ShortcutCollision {
        shortcut: char,
        flag: String,
        option: String,
    },

    #[error("required positional '{name}' follows positional '{after}' which has a default")]
    RequiredAfterOptional { name: String, after: String },
}

/// The two failure classes every parse error falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unrecognised token, or an extra positional.
    InvalidArgument,
    /// A required value was never supplied.
    MissingArgument,
}

/// Errors produced while scanning argv.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("malformed argument: '{0}'")]
    MalformedToken(String),

    #[error("unknown argument: --{0}")]
    UnknownName(String),

    #[error("unknown flag: -{0}")]
    UnknownShortcut(char),

    #[error("unexpected positional argument: '{0}'")]
    UnexpectedPositional(String),

    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("missing required argument: <{0}>")]
    MissingPositional(String),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedToken(_)
            | Self::UnknownName(_)
            | Self::UnknownShortcut(_)
            | Self::UnexpectedPositional(_) => ErrorKind::InvalidArgument,
            Self::MissingValue(_) | Self::MissingPositional(_) => ErrorKind::MissingArgument,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
