use console::style;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        }
    }

    /// Human-mode status line. JSON mode reports through `result` only.
    pub fn success(&self, message: impl Display) {
        if self.format == OutputFormat::Human {
            println!("{} {}", style("✓").green().bold(), message);
        }
    }

    /// Warnings go to stderr in both modes
    pub fn warning(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("⚠").yellow().bold(), message);
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "warning",
                    "message": message.to_string(),
                });
                eprintln!("{}", output);
            }
        }
    }

    pub fn table<T: Tabled>(&self, data: Vec<T>) {
        if self.format == OutputFormat::Json {
            return;
        }

        if data.is_empty() {
            println!("{}", style("(no data)").dim());
        } else {
            let mut table = Table::new(data);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }

    /// Emit the command's result. JSON mode wraps it in a status envelope.
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", envelope(&data)?);
        }
        Ok(())
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if self.format == OutputFormat::Human {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn section(&self, title: impl Display) {
        if self.format == OutputFormat::Human {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

fn envelope<T: Serialize>(data: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "data": data,
    }))
}
