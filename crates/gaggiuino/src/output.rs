//! Rendering for `--output`.
//!
//! Tables go through `tabled`; JSON and YAML serialize the model itself so
//! scripts see every field. Plain prints one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Whether stdout gets ANSI colors for this `--color` mode.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// `"on"`/`"off"`, green/dimmed when colored.
pub fn on_off(value: Option<bool>, color: bool) -> String {
    match (value, color) {
        (None, _) => "-".into(),
        (Some(true), true) => "on".green().to_string(),
        (Some(false), true) => "off".dimmed().to_string(),
        (Some(true), false) => "on".into(),
        (Some(false), false) => "off".into(),
    }
}

/// Render an optional value, `-` when unknown.
pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

// ── Rendering ────────────────────────────────────────────────────────

/// Render a collection. `to_row` builds the table row for an item and
/// `id_fn` its plain-text line.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one item; `detail_fn` supplies the table view.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Two-column key/value table used by detail views.
pub fn render_detail(rows: &[(&str, String)]) -> String {
    let mut builder = tabled::builder::Builder::default();
    for (key, value) in rows {
        builder.push_record([(*key).to_owned(), value.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Write to stdout unless `--quiet` or there is nothing to show.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Serializers ──────────────────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![Row { id: 1, name: "Default" }, Row { id: 2, name: "Lungo" }]
    }

    #[test]
    fn plain_emits_one_value_per_line() {
        let out = render_list(&OutputFormat::Plain, &rows(), |_| Row { id: 0, name: "" }, |r| {
            r.id.to_string()
        })
        .unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &rows(),
            |r| Row { id: r.id, name: r.name },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"Default"},{"id":2,"name":"Lungo"}]"#);
    }

    #[test]
    fn table_lists_every_row() {
        let out = render_list(
            &OutputFormat::Table,
            &rows(),
            |r| Row { id: r.id, name: r.name },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert!(out.contains("Lungo"));
        assert!(out.contains("name"));
    }

    #[test]
    fn on_off_without_color() {
        assert_eq!(on_off(Some(true), false), "on");
        assert_eq!(on_off(None, true), "-");
    }
}
