//! Rendering of a resolution for the terminal or other tools

use crate::error::{HydraError, HydraResult};
use crate::resolve::Resolution;
use clap::ValueEnum;
use console::style;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON object keyed by input name
    Json,
    /// Tab-separated rows
    Plain,
}

/// One attribute of one resolved input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub name: String,
    pub attribute: &'static str,
    pub value: String,
}

impl Resolution {
    /// Flatten into rows ordered by input name, then attribute order
    pub fn rows(&self) -> Vec<InputRow> {
        self.inputs
            .iter()
            .flat_map(|(name, value)| {
                value
                    .attributes()
                    .into_iter()
                    .map(move |(attribute, value)| InputRow {
                        name: name.clone(),
                        attribute,
                        value,
                    })
            })
            .collect()
    }
}

/// Write `resolution` to `out` in the given format
pub fn render<W: Write>(format: OutputFormat, resolution: &Resolution, out: &mut W) -> HydraResult<()> {
    match format {
        OutputFormat::Table => render_table(resolution, out),
        OutputFormat::Json => render_json(resolution, out),
        OutputFormat::Plain => render_plain(resolution, out),
    }
    .map_err(|e| HydraError::io("writing report", e))
}

fn render_table<W: Write>(resolution: &Resolution, out: &mut W) -> std::io::Result<()> {
    let rows = resolution.rows();
    let name_width = column_width("NAME", rows.iter().map(|r| r.name.as_str()));
    let attr_width = column_width("ATTRIBUTE", rows.iter().map(|r| r.attribute));

    writeln!(
        out,
        "{} {} {}",
        style(format!("{:<name_width$}", "NAME")).bold(),
        style(format!("{:<attr_width$}", "ATTRIBUTE")).bold(),
        style("VALUE").bold()
    )?;
    writeln!(out, "{}", "-".repeat(name_width + attr_width + 2 + 5))?;

    let mut previous: Option<&str> = None;
    for row in &rows {
        let name = if previous == Some(row.name.as_str()) {
            ""
        } else {
            row.name.as_str()
        };
        previous = Some(row.name.as_str());
        writeln!(
            out,
            "{:<name_width$} {:<attr_width$} {}",
            name, row.attribute, row.value
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} input(s) of evaluation {}",
        resolution.inputs.len(),
        resolution.evaluation
    )
}

fn render_json<W: Write>(resolution: &Resolution, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &resolution.inputs)?;
    writeln!(out)
}

fn render_plain<W: Write>(resolution: &Resolution, out: &mut W) -> std::io::Result<()> {
    for row in resolution.rows() {
        writeln!(out, "{}\t{}\t{}", row.name, row.attribute, row.value)?;
    }
    Ok(())
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(str::len).chain([header.len()]).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EvalId;
    use crate::resolve::InputValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn resolution() -> Resolution {
        let mut inputs = BTreeMap::new();
        inputs.insert(
            "src".to_string(),
            InputValue::Git {
                uri: "https://x".to_string(),
                rev: "abc".to_string(),
            },
        );
        inputs.insert(
            "debug".to_string(),
            InputValue::Boolean { value: true },
        );
        Resolution {
            evaluation: EvalId(7),
            inputs,
        }
    }

    fn rendered(format: OutputFormat) -> String {
        let mut out = Vec::new();
        render(format, &resolution(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn rows_are_ordered_by_name_then_attribute() {
        let rows = resolution().rows();
        let flat: Vec<_> = rows
            .iter()
            .map(|r| (r.name.as_str(), r.attribute, r.value.as_str()))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("debug", "is", "bool"),
                ("debug", "value", "true"),
                ("src", "is", "git"),
                ("src", "uri", "https://x"),
                ("src", "rev", "abc"),
            ]
        );
    }

    #[test]
    fn plain_is_tab_separated() {
        let text = rendered(OutputFormat::Plain);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "debug\tis\tbool");
        assert_eq!(lines[4], "src\trev\tabc");
    }

    #[test]
    fn json_maps_names_to_tagged_values() {
        let value: serde_json::Value = serde_json::from_str(&rendered(OutputFormat::Json)).unwrap();
        assert_eq!(
            value,
            json!({
                "debug": { "is": "bool", "value": true },
                "src": { "is": "git", "uri": "https://x", "rev": "abc" }
            })
        );
    }

    #[test]
    fn table_shows_each_name_once() {
        let text = rendered(OutputFormat::Table);
        assert!(text.contains("NAME"));
        assert!(text.contains("ATTRIBUTE"));
        assert_eq!(text.matches("src").count(), 1);
        assert_eq!(text.matches("debug").count(), 1);
        assert!(text.contains("2 input(s) of evaluation 7"));
    }

    #[test]
    fn format_parses_from_config_text() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"plain\"").unwrap();
        assert_eq!(parsed.format, OutputFormat::Plain);
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
