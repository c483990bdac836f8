//! Output formatting options, passed explicitly instead of living in a global.

use std::fmt::Display;

use crossterm::style::{style, Color, Stylize};
use gcp_vm_manager_core::compute::VmStatus;
use gcp_vm_manager_core::project_definitions::Environment;

/// Whether rendering may use ANSI colors. Built once from `--no-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStyle {
    pub color: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self { color: true }
    }
}

impl OutputStyle {
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[must_use]
    pub fn paint(&self, text: impl Display, color: Color) -> String {
        if self.color {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn bold(&self, text: impl Display, color: Color) -> String {
        if self.color {
            style(text).with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// `[PRODUCTION]` in red, `[STAGING]` in green.
    #[must_use]
    pub fn environment_tag(&self, environment: Environment) -> String {
        let color = match environment {
            Environment::Production => Color::Red,
            Environment::Staging => Color::Green,
        };
        self.paint(format!("[{environment}]"), color)
    }
}

#[must_use]
pub fn status_color(status: &VmStatus) -> Color {
    match status {
        VmStatus::Running => Color::Green,
        VmStatus::Stopped | VmStatus::Terminated => Color::Red,
        _ => Color::Yellow,
    }
}

#[must_use]
pub fn severity_color(severity: &str) -> Color {
    match severity {
        "ERROR" => Color::Red,
        "WARNING" => Color::Yellow,
        "INFO" => Color::Green,
        "DEBUG" => Color::Blue,
        _ => Color::White,
    }
}

/// Pads every cell to its column width, then applies the cell's color.
///
/// Padding happens before painting so escape codes do not skew alignment.
#[must_use]
pub fn table_row(style: OutputStyle, cells: &[(String, Option<Color>)], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|((text, color), width)| {
            let padded = format!("{text:<width$}");
            match color {
                Some(color) => style.paint(padded, *color),
                None => padded,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// Widest cell per column, headers included.
#[must_use]
pub fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect()
}
