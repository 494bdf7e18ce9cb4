// Output formatting for CLI

use crate::cli::{CliResult, OutputFormat};
use mp3_tagger::TagMap;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FileTags<'a> {
    file: &'a str,
    tags: &'a TagMap,
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output the tags of one file
    pub fn output_tags(&self, file: &str, tags: &TagMap, writer: &mut dyn Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => {
                let value = FileTags { file, tags };
                writeln!(writer, "{}", serde_json::to_string_pretty(&value)?)?;
            }
            OutputFormat::Json => {
                let value = FileTags { file, tags };
                writeln!(writer, "{}", serde_json::to_string(&value)?)?;
            }
            OutputFormat::KeyValue => {
                writeln!(writer, "file: {}", file)?;
                for (key, value) in Self::rows(tags) {
                    writeln!(writer, "{}: {}", key, value)?;
                }
            }
            OutputFormat::Table => {
                let rows = Self::rows(tags);
                let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

                writeln!(writer, "{}", file)?;
                writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
                for (key, value) in &rows {
                    writeln!(writer, "{:<width$} {}", format!("{}:", key), value, width = max_key_len + 1)?;
                }
                writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
            }
        }
        Ok(())
    }

    /// One `layout.field` row per tag, in layout then field order
    fn rows(tags: &TagMap) -> Vec<(String, String)> {
        tags.iter()
            .flat_map(|(layout, fields)| {
                fields.iter().map(move |(field, value)| {
                    let shown = value
                        .as_ref()
                        .map_or_else(|| "(none)".to_string(), |value| value.to_string());
                    (format!("{}.{}", layout, field), shown)
                })
            })
            .collect()
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}
