use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as CellColor, Table, presets};
use serde::Serialize;

use crate::theme::{GLYPHS, PALETTE};

#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    #[default]
    Table,
    /// Machine-readable JSON on stdout
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

/// Command results that render as a table in table mode and serialize in JSON mode.
pub trait TableDisplay {
    fn to_table(&self, console: &Console) -> Table;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    Caution,
    Note,
}

impl Status {
    fn glyph_and_color(self) -> (&'static str, Color) {
        match self {
            Status::Ok => (GLYPHS.ok, PALETTE.ok),
            Status::Caution => (GLYPHS.caution, PALETTE.caution),
            Status::Note => (GLYPHS.note, PALETTE.note),
        }
    }
}

/// Writes command output honoring `--output`, `--quiet` and `--no-color`.
pub struct Console {
    options: GlobalOptions,
}

impl Console {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    pub fn is_plain(&self) -> bool {
        self.options.no_color
    }

    pub fn render<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(data)?);
        } else {
            println!("{}", data.to_table(self));
        }
        Ok(())
    }

    /// Status lines are table-mode decoration; JSON output stays parseable.
    pub fn status(&self, status: Status, message: &str) {
        if self.is_silent() {
            return;
        }
        let (glyph, color) = status.glyph_and_color();
        println!("{} {}", self.paint(glyph, color), self.paint(message, color));
    }

    /// Always printed, to stderr, regardless of `--quiet`.
    pub fn failure(&self, message: &str) {
        eprintln!(
            "{} {}",
            self.paint(GLYPHS.failure, PALETTE.failure),
            self.paint(message, PALETTE.failure)
        );
    }

    pub fn title(&self, text: &str) {
        if self.is_silent() {
            return;
        }
        if self.is_plain() {
            println!("{text}\n{}", "-".repeat(text.chars().count()));
        } else {
            println!("{}", text.color(PALETTE.title).bold());
        }
    }

    pub fn field(&self, label: &str, value: &str) {
        if self.is_silent() {
            return;
        }
        println!("{}: {}", self.paint(label, PALETTE.label), self.paint(value, PALETTE.text));
    }

    /// Empty table with a bold header row.
    pub fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(if self.is_plain() {
            presets::ASCII_FULL
        } else {
            presets::UTF8_FULL_CONDENSED
        });
        table.set_header(headers.iter().map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if self.is_plain() { cell } else { cell.fg(CellColor::Cyan) }
        }));
        table
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.is_plain() {
            text.to_string()
        } else {
            text.color(color).to_string()
        }
    }

    fn is_silent(&self) -> bool {
        self.options.quiet || self.is_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        field: &'static str,
        code: i32,
    }

    impl TableDisplay for Row {
        fn to_table(&self, console: &Console) -> Table {
            let mut table = console.table(&["Field", "Code"]);
            table.add_row(vec![Cell::new(self.field), Cell::new(self.code)]);
            table
        }
    }

    fn console(options: GlobalOptions) -> Console {
        Console::new(options)
    }

    #[test]
    fn json_mode_serializes() {
        let console = console(GlobalOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        });
        assert!(console.is_json());
        assert!(console.render(&Row { field: "prioritycode", code: 1 }).is_ok());
    }

    #[test]
    fn quiet_mode_renders_nothing() {
        let console = console(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(console.is_silent());
        assert!(console.render(&Row { field: "prioritycode", code: 1 }).is_ok());
    }

    #[test]
    fn plain_tables_have_header_and_rows() {
        let console = console(GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        let rendered = Row { field: "prioritycode", code: 3 }.to_table(&console).to_string();
        assert!(rendered.contains("Field"));
        assert!(rendered.contains("prioritycode"));
        assert_eq!(console.paint("High", PALETTE.ok), "High");
    }
}
