use anyhow::{Context, Result, bail};
use argspec::{FlagSpec, OptionSpec, PositionalSpec, Schema, SchemaConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA_NAME: &str = "argspec.json";
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk argument schema (`argspec.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Program description shown in help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_add_help")]
    pub add_help: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<PositionalEntry>,
}

impl Default for SchemaFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            description: None,
            add_help: true,
            flags: Vec::new(),
            options: Vec::new(),
            positionals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagEntry {
    pub name: String,
    /// Single character, e.g. `"v"` for `-v`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_add_help() -> bool {
    true
}

impl SchemaFile {
    /// Compile into a parser schema, rejecting unknown format versions.
    pub fn compile(&self) -> Result<Schema> {
        if self.schema_version != SCHEMA_VERSION {
            bail!(
                "unsupported schemaVersion {} (expected {SCHEMA_VERSION})",
                self.schema_version
            );
        }

        let flags = self
            .flags
            .iter()
            .map(|f| FlagSpec {
                name: f.name.clone(),
                shortcut: f.shortcut,
                description: f.description.clone(),
            })
            .collect();
        let options = self
            .options
            .iter()
            .map(|o| OptionSpec {
                name: o.name.clone(),
                shortcut: o.shortcut,
                default: o.default.clone(),
                description: o.description.clone(),
            })
            .collect();
        let positionals = self
            .positionals
            .iter()
            .map(|p| PositionalSpec {
                name: p.name.clone(),
                default: p.default.clone(),
                description: p.description.clone(),
            })
            .collect();
        let config = SchemaConfig {
            add_help: self.add_help,
            help_description: self.description.clone(),
        };

        Schema::compile(flags, options, positionals, config).context("invalid argument schema")
    }
}

pub fn load_schema_file(path: &Path) -> Result<SchemaFile> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = resolve_against(&cwd, path);
    if !path.exists() {
        bail!("schema file not found: {}", path.display());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read schema file: {}", path.display()))?;
    let schema: SchemaFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded schema file");
    Ok(schema)
}

/// Write a starter schema into `dir`, leaving an existing file alone unless
/// `overwrite` is set.
pub fn write_default_schema(dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = dir.join(DEFAULT_SCHEMA_NAME);
    if dest.exists() && !overwrite {
        bail!(
            "{} already exists (use --force to overwrite)",
            dest.display()
        );
    }

    let bytes = serde_json::to_vec_pretty(&starter_schema()).context("failed to serialize schema")?;
    let mut out = String::from_utf8(bytes).context("schema is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn starter_schema() -> SchemaFile {
    SchemaFile {
        description: Some("Copies INPUT to OUTPUT COUNT times.".to_string()),
        flags: vec![FlagEntry {
            name: "verbose".to_string(),
            shortcut: Some('v'),
            description: Some("Print progress".to_string()),
        }],
        options: vec![OptionEntry {
            name: "output".to_string(),
            shortcut: Some('o'),
            default: Some("out.txt".to_string()),
            description: Some("Where to write".to_string()),
        }],
        positionals: vec![
            PositionalEntry {
                name: "input".to_string(),
                default: None,
                description: Some("File to read".to_string()),
            },
            PositionalEntry {
                name: "count".to_string(),
                default: Some("1".to_string()),
                description: Some("Number of copies".to_string()),
            },
        ],
        ..Default::default()
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("argspec-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn schema_file_deserializes_camel_case() {
        let json = r#"{
  "schemaVersion": 1,
  "description": "Greets people",
  "addHelp": false,
  "flags": [{ "name": "loud", "shortcut": "l" }],
  "options": [{ "name": "greeting", "shortcut": "g", "default": "hello" }],
  "positionals": [{ "name": "who" }]
}"#;
        let file: SchemaFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.schema_version, 1);
        assert!(!file.add_help);
        assert_eq!(file.flags[0].shortcut, Some('l'));
        assert_eq!(file.options[0].default.as_deref(), Some("hello"));

        let schema = file.compile().unwrap();
        assert_eq!(schema.help_flag(), None);
        assert_eq!(schema.flag_handle("loud").map(|f| f.index()), Some(0));
        assert_eq!(schema.config().help_description.as_deref(), Some("Greets people"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let file: SchemaFile = serde_json::from_str("{}").unwrap();
        assert_eq!(file.schema_version, SCHEMA_VERSION);
        assert!(file.add_help);
        let schema = file.compile().unwrap();
        assert!(schema.help_flag().is_some());
    }

    #[test]
    fn multi_char_shortcut_is_rejected() {
        let json = r#"{ "flags": [{ "name": "loud", "shortcut": "lo" }] }"#;
        assert!(serde_json::from_str::<SchemaFile>(json).is_err());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let file: SchemaFile = serde_json::from_str(r#"{ "schemaVersion": 2 }"#).unwrap();
        let err = file.compile().unwrap_err();
        assert!(err.to_string().contains("unsupported schemaVersion 2"));
    }

    #[test]
    fn schema_errors_are_reported_with_context() {
        let json = r#"{ "positionals": [{ "name": "a", "default": "x" }, { "name": "b" }] }"#;
        let file: SchemaFile = serde_json::from_str(json).unwrap();
        let err = file.compile().unwrap_err();
        assert_eq!(err.to_string(), "invalid argument schema");
        assert!(format!("{err:#}").contains("required positional 'b'"));
    }

    #[test]
    fn write_default_schema_round_trips_and_refuses_overwrite() {
        let dir = make_temp_dir("schema-defaults");
        let dest = write_default_schema(&dir, false).unwrap();
        assert_eq!(dest, dir.join(DEFAULT_SCHEMA_NAME));

        let file = load_schema_file(&dest).unwrap();
        let schema = file.compile().unwrap();
        assert!(schema.flag_handle("verbose").is_some());
        assert!(schema.option_handle("output").is_some());
        assert!(schema.positional_handle("count").is_some());

        assert!(write_default_schema(&dir, false).is_err());
        assert!(write_default_schema(&dir, true).is_ok());

        let _ = fs::remove_dir_all(&dir);
    }
}
