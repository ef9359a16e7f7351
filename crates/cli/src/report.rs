use argspec::{ResultSet, Schema, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// JSON view of a successful parse, keyed by argument name in schema order.
#[derive(Debug, Default, Serialize)]
pub struct ParseReport {
    pub program: String,
    pub flags: IndexMap<String, bool>,
    pub options: IndexMap<String, Option<String>>,
    pub positionals: IndexMap<String, String>,
}

impl ParseReport {
    pub fn new(schema: &Schema, program: &str, result: &ResultSet<'_>) -> Self {
        let mut report = Self {
            program: program.to_string(),
            ..Default::default()
        };
        for (name, value) in result.entries(schema) {
            let name = name.to_string();
            match value {
                Value::Flag(set) => {
                    report.flags.insert(name, set);
                }
                Value::Option(v) => {
                    report.options.insert(name, v.map(str::to_string));
                }
                Value::Positional(v) => {
                    report.positionals.insert(name, v.to_string());
                }
            }
        }
        report
    }

    /// One `name = value` line per entry.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (name, set) in &self.flags {
            out.push_str(&format!("{name} = {}\n", Value::Flag(*set)));
        }
        for (name, v) in &self.options {
            out.push_str(&format!("{name} = {}\n", Value::Option(v.as_deref())));
        }
        for (name, v) in &self.positionals {
            out.push_str(&format!("{name} = {}\n", Value::Positional(v)));
        }
        out
    }
}
