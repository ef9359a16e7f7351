use indexmap::IndexMap;

use crate::error::{Category, SchemaError};

/// Long name of the synthetic help flag.
pub const HELP_NAME: &str = "help";
/// Shortcut of the synthetic help flag.
pub const HELP_SHORTCUT: char = 'h';
const HELP_FLAG_DESCRIPTION: &str = "Show this help message";

/// A boolean presence switch (`--verbose`, `-v`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub shortcut: Option<char>,
    pub description: Option<String>,
}

impl FlagSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: None,
            description: None,
        }
    }

    pub fn shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named argument taking exactly one value from the following token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub shortcut: Option<char>,
    /// Value reported when the option never appears in argv.
    pub default: Option<String>,
    pub description: Option<String>,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: None,
            default: None,
            description: None,
        }
    }

    pub fn shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An argument matched by position rather than by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalSpec {
    pub name: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

impl PositionalSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            description: None,
        }
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Prepend a `--help`/`-h` flag at flag index 0.
    pub add_help: bool,
    /// Program description shown in rendered help.
    pub help_description: Option<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            add_help: true,
            help_description: None,
        }
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Dense index of the entry within its category.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

handle!(
    /// Handle to a flag of a compiled schema.
    Flag
);
handle!(
    /// Handle to an option of a compiled schema.
    Opt
);
handle!(
    /// Handle to a positional of a compiled schema.
    Positional
);

/// Compiled, indexed argument definition for one program.
///
/// Indices are assigned once, in declaration order, and never change.
#[derive(Debug, Clone)]
pub struct Schema {
    flags: Vec<FlagSpec>,
    options: Vec<OptionSpec>,
    positionals: Vec<PositionalSpec>,
    config: SchemaConfig,
    flag_names: IndexMap<String, usize>,
    flag_shortcuts: IndexMap<char, usize>,
    option_names: IndexMap<String, usize>,
    option_shortcuts: IndexMap<char, usize>,
    positional_names: IndexMap<String, usize>,
}

impl Schema {
    /// Start a builder that hands out typed handles as entries are registered.
    pub fn builder(config: SchemaConfig) -> SchemaBuilder {
        SchemaBuilder::new(config)
    }

    /// Compile the three spec lists into a schema.
    ///
    /// When `config.add_help` is set the help flag is inserted at flag
    /// index 0, shifting user flags by one.
    pub fn compile(
        flags: Vec<FlagSpec>,
        options: Vec<OptionSpec>,
        positionals: Vec<PositionalSpec>,
        config: SchemaConfig,
    ) -> Result<Self, SchemaError> {
        let mut all_flags = Vec::with_capacity(flags.len() + usize::from(config.add_help));
        if config.add_help {
            all_flags.push(help_flag_spec());
        }
        all_flags.extend(flags);

        let (flag_names, flag_shortcuts) = index_named(
            Category::Flag,
            all_flags.iter().map(|f| (f.name.as_str(), f.shortcut)),
        )?;
        let (option_names, option_shortcuts) = index_named(
            Category::Option,
            options.iter().map(|o| (o.name.as_str(), o.shortcut)),
        )?;

        // `--name` is shared by flags and options.
        if let Some(name) = option_names.keys().find(|n| flag_names.contains_key(*n)) {
            return Err(SchemaError::DuplicateName {
                category: Category::Option,
                name: name.clone(),
            });
        }
        for (shortcut, &option_idx) in &option_shortcuts {
            if let Some(&flag_idx) = flag_shortcuts.get(shortcut) {
                return Err(SchemaError::ShortcutCollision {
                    shortcut: *shortcut,
                    flag: all_flags[flag_idx].name.clone(),
                    option: options[option_idx].name.clone(),
                });
            }
        }

        let positional_names = index_positionals(&positionals)?;

        tracing::debug!(
            flags = all_flags.len(),
            options = options.len(),
            positionals = positionals.len(),
            add_help = config.add_help,
            "compiled argument schema"
        );

        Ok(Self {
            flags: all_flags,
            options,
            positionals,
            config,
            flag_names,
            flag_shortcuts,
            option_names,
            option_shortcuts,
            positional_names,
        })
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn positionals(&self) -> &[PositionalSpec] {
        &self.positionals
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// The synthetic help flag, if the schema has one.
    pub fn help_flag(&self) -> Option<Flag> {
        self.config.add_help.then_some(Flag(0))
    }

    /// Look up a flag handle by long name.
    pub fn flag_handle(&self, name: &str) -> Option<Flag> {
        self.flag_names.get(name).copied().map(Flag)
    }

    /// Look up an option handle by long name.
    pub fn option_handle(&self, name: &str) -> Option<Opt> {
        self.option_names.get(name).copied().map(Opt)
    }

    /// Look up a positional handle by name.
    pub fn positional_handle(&self, name: &str) -> Option<Positional> {
        self.positional_names.get(name).copied().map(Positional)
    }

    pub(crate) fn flag_by_name(&self, name: &str) -> Option<usize> {
        self.flag_names.get(name).copied()
    }

    pub(crate) fn flag_by_shortcut(&self, shortcut: char) -> Option<usize> {
        self.flag_shortcuts.get(&shortcut).copied()
    }

    pub(crate) fn option_by_name(&self, name: &str) -> Option<usize> {
        self.option_names.get(name).copied()
    }

    pub(crate) fn option_by_shortcut(&self, shortcut: char) -> Option<usize> {
        self.option_shortcuts.get(&shortcut).copied()
    }

    pub(crate) fn is_help(&self, flag_index: usize) -> bool {
        self.config.add_help && flag_index == 0
    }
}

fn help_flag_spec() -> FlagSpec {
    FlagSpec::new(HELP_NAME)
        .shortcut(HELP_SHORTCUT)
        .description(HELP_FLAG_DESCRIPTION)
}

fn validate_name(category: Category, name: &str) -> Result<(), SchemaError> {
    if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Err(SchemaError::InvalidName {
            category,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn index_named<'s>(
    category: Category,
    entries: impl Iterator<Item = (&'s str, Option<char>)>,
) -> Result<(IndexMap<String, usize>, IndexMap<char, usize>), SchemaError> {
    let mut names: IndexMap<String, usize> = IndexMap::new();
    let mut shortcuts: IndexMap<char, usize> = IndexMap::new();

    for (idx, (name, shortcut)) in entries.enumerate() {
        validate_name(category, name)?;
        if names.insert(name.to_string(), idx).is_some() {
            return Err(SchemaError::DuplicateName {
                category,
                name: name.to_string(),
            });
        }

        let Some(shortcut) = shortcut else {
            continue;
        };
        if shortcut == '-' || shortcut.is_whitespace() || shortcut.is_control() {
            return Err(SchemaError::InvalidShortcut {
                category,
                name: name.to_string(),
                shortcut,
            });
        }
        if let Some(prev) = shortcuts.insert(shortcut, idx) {
            let first = names
                .get_index(prev)
                .map(|(n, _)| n.clone())
                .unwrap_or_default();
            return Err(SchemaError::DuplicateShortcut {
                category,
                shortcut,
                first,
                second: name.to_string(),
            });
        }
    }

    Ok((names, shortcuts))
}

fn index_positionals(positionals: &[PositionalSpec]) -> Result<IndexMap<String, usize>, SchemaError> {
    let mut names: IndexMap<String, usize> = IndexMap::new();
    let mut first_defaulted: Option<&str> = None;

    for (idx, spec) in positionals.iter().enumerate() {
        validate_name(Category::Positional, &spec.name)?;
        if names.insert(spec.name.clone(), idx).is_some() {
            return Err(SchemaError::DuplicateName {
                category: Category::Positional,
                name: spec.name.clone(),
            });
        }
        match (first_defaulted, spec.is_required()) {
            (Some(after), true) => {
                return Err(SchemaError::RequiredAfterOptional {
                    name: spec.name.clone(),
                    after: after.to_string(),
                });
            }
            (None, false) => first_defaulted = Some(spec.name.as_str()),
            _ => {}
        }
    }

    Ok(names)
}

/// Registers specs and hands out handles; `build` compiles them.
///
/// Handles returned before a failed `build` are useless, since no schema
/// exists to read them against.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    flags: Vec<FlagSpec>,
    options: Vec<OptionSpec>,
    positionals: Vec<PositionalSpec>,
    config: SchemaConfig,
}

impl SchemaBuilder {
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the program description shown in help output.
    pub fn help_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.config.help_description = Some(description.into());
        self
    }

    pub fn flag(&mut self, spec: FlagSpec) -> Flag {
        let index = self.flags.len() + usize::from(self.config.add_help);
        self.flags.push(spec);
        Flag(index)
    }

    pub fn option(&mut self, spec: OptionSpec) -> Opt {
        let index = self.options.len();
        self.options.push(spec);
        Opt(index)
    }

    pub fn positional(&mut self, spec: PositionalSpec) -> Positional {
        let index = self.positionals.len();
        self.positionals.push(spec);
        Positional(index)
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::compile(self.flags, self.options, self.positionals, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> (Vec<FlagSpec>, Vec<OptionSpec>, Vec<PositionalSpec>) {
        (
            vec![
                FlagSpec::new("verbose").shortcut('v'),
                FlagSpec::new("quiet").shortcut('q'),
            ],
            vec![OptionSpec::new("output").shortcut('o').default("a.out")],
            vec![PositionalSpec::new("input"), PositionalSpec::new("count").default("1")],
        )
    }

    #[test]
    fn help_flag_is_prepended_at_index_zero() {
        let (flags, options, positionals) = specs();
        let schema = Schema::compile(flags, options, positionals, SchemaConfig::default()).unwrap();

        assert_eq!(schema.flags()[0].name, HELP_NAME);
        assert_eq!(schema.flags()[0].shortcut, Some(HELP_SHORTCUT));
        assert_eq!(schema.help_flag(), Some(Flag(0)));
        assert_eq!(schema.flag_handle("verbose").map(Flag::index), Some(1));
        assert_eq!(schema.flag_by_shortcut('q'), Some(2));
        assert!(schema.is_help(0));
    }

    #[test]
    fn without_help_user_flags_start_at_zero() {
        let (flags, options, positionals) = specs();
        let config = SchemaConfig {
            add_help: false,
            ..Default::default()
        };
        let schema = Schema::compile(flags, options, positionals, config).unwrap();

        assert_eq!(schema.help_flag(), None);
        assert_eq!(schema.flag_handle("verbose").map(Flag::index), Some(0));
        assert_eq!(schema.flag_handle(HELP_NAME), None);
        assert!(!schema.is_help(0));
    }

    #[test]
    fn compiling_twice_assigns_identical_indices() {
        let (flags, options, positionals) = specs();
        let a = Schema::compile(
            flags.clone(),
            options.clone(),
            positionals.clone(),
            SchemaConfig::default(),
        )
        .unwrap();
        let b = Schema::compile(flags, options, positionals, SchemaConfig::default()).unwrap();

        for name in ["help", "verbose", "quiet"] {
            assert_eq!(a.flag_handle(name), b.flag_handle(name));
        }
        assert_eq!(a.option_handle("output"), b.option_handle("output"));
        assert_eq!(a.positional_handle("count"), b.positional_handle("count"));
        assert_eq!(a.flag_shortcuts, b.flag_shortcuts);
        assert_eq!(a.option_shortcuts, b.option_shortcuts);
    }

    #[test]
    fn builder_handles_match_compiled_indices() {
        let mut builder = Schema::builder(SchemaConfig::default());
        let verbose = builder.flag(FlagSpec::new("verbose").shortcut('v'));
        let output = builder.option(OptionSpec::new("output"));
        let input = builder.positional(PositionalSpec::new("input"));
        builder.help_description("Builds things");
        let schema = builder.build().unwrap();

        assert_eq!(schema.flag_handle("verbose"), Some(verbose));
        assert_eq!(schema.option_handle("output"), Some(output));
        assert_eq!(schema.positional_handle("input"), Some(input));
        assert_eq!(
            schema.config().help_description.as_deref(),
            Some("Builds things")
        );
    }

    #[test]
    fn rejects_duplicate_names_within_a_category() {
        let err = Schema::compile(
            vec![FlagSpec::new("all"), FlagSpec::new("all")],
            vec![],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateName {
                category: Category::Flag,
                name: "all".to_string()
            }
        );

        let err = Schema::compile(
            vec![],
            vec![],
            vec![PositionalSpec::new("file"), PositionalSpec::new("file")],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateName {
                category: Category::Positional,
                ..
            }
        ));
    }

    #[test]
    fn rejects_flag_and_option_sharing_a_long_name() {
        let err = Schema::compile(
            vec![FlagSpec::new("color")],
            vec![OptionSpec::new("color")],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { category: Category::Option, ref name } if name == "color"));
    }

    #[test]
    fn rejects_user_help_when_help_is_added() {
        let err = Schema::compile(
            vec![FlagSpec::new("help")],
            vec![],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { .. }));

        let err = Schema::compile(
            vec![],
            vec![OptionSpec::new("host").shortcut('h')],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::ShortcutCollision {
                shortcut: 'h',
                flag: "help".to_string(),
                option: "host".to_string(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_shortcuts() {
        let err = Schema::compile(
            vec![],
            vec![
                OptionSpec::new("output").shortcut('o'),
                OptionSpec::new("origin").shortcut('o'),
            ],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateShortcut {
                category: Category::Option,
                shortcut: 'o',
                first: "output".to_string(),
                second: "origin".to_string(),
            }
        );
    }

    #[test]
    fn rejects_shortcut_shared_by_flag_and_option() {
        let err = Schema::compile(
            vec![FlagSpec::new("force").shortcut('f')],
            vec![OptionSpec::new("file").shortcut('f')],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::ShortcutCollision { shortcut: 'f', .. }));
    }

    #[test]
    fn rejects_required_positional_after_defaulted_one() {
        let err = Schema::compile(
            vec![],
            vec![],
            vec![
                PositionalSpec::new("src"),
                PositionalSpec::new("mode").default("fast"),
                PositionalSpec::new("dest"),
            ],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RequiredAfterOptional {
                name: "dest".to_string(),
                after: "mode".to_string(),
            }
        );
    }

    #[test]
    fn rejects_malformed_names_and_shortcuts() {
        for bad in ["", "-v", "two words"] {
            let err = Schema::compile(
                vec![FlagSpec::new(bad)],
                vec![],
                vec![],
                SchemaConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SchemaError::InvalidName { .. }), "{bad:?}");
        }

        let err = Schema::compile(
            vec![FlagSpec::new("dash").shortcut('-')],
            vec![],
            vec![],
            SchemaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidShortcut { shortcut: '-', .. }));
    }
}
