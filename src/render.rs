//! Read-only rendering of fields as styled terminal lines.
//!
//! `render_field` is a pure function: the same field renders to the
//! same lines every time, whatever happened in between. The canvas, the
//! preview command and the fill prompts all draw fields through it.
//!
//! With `interactive = false` (canvas and preview) the control is shown
//! exactly as an end-filler would see it, but dimmed to read-only.

use crate::schema::{Field, FieldType};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[91m";

/// Inner width of single-line input boxes.
const BOX_WIDTH: usize = 24;

/// Render one field as a list of styled lines.
///
/// The label is drawn above the control for every type except checkbox,
/// whose label sits inline beside the box. The required marker is
/// appended to the label whenever `required` is set.
pub fn render_field(field: &Field, interactive: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if field.kind != FieldType::Checkbox {
        lines.push(label_line(field));
    }
    for control in control_lines(field) {
        if interactive {
            lines.push(control);
        } else {
            lines.push(format!("{}{}{}", DIM, control, RESET));
        }
    }
    lines
}

fn label_line(field: &Field) -> String {
    let mut line = format!("{}{}{}", BOLD, field.label, RESET);
    if field.required {
        line.push_str(&format!(" {}*{}", RED, RESET));
    }
    line
}

/// The control body, unstyled except for placeholder hints. One entry
/// per terminal row.
fn control_lines(field: &Field) -> Vec<String> {
    match field.kind {
        FieldType::Text | FieldType::Tel => vec![input_box(&field.placeholder)],
        FieldType::Number => vec![input_box_with_suffix(&field.placeholder, "⇵")],
        FieldType::Date => vec![input_box_with_suffix("YYYY-MM-DD", "▾")],
        FieldType::Time => vec![input_box_with_suffix("--:--", "▾")],
        FieldType::Textarea => textarea_box(&field.placeholder),
        FieldType::Dropdown => dropdown_lines(&field.options),
        FieldType::Checkbox => vec![checkbox_line(field)],
        FieldType::Radio => field
            .options
            .iter()
            .map(|opt| format!("( ) {}", opt))
            .collect(),
    }
}

fn input_box(placeholder: &str) -> String {
    format!("[ {} ]", pad(placeholder, BOX_WIDTH))
}

fn input_box_with_suffix(hint: &str, suffix: &str) -> String {
    format!("[ {} {} ]", pad(hint, BOX_WIDTH - 2), suffix)
}

fn textarea_box(placeholder: &str) -> Vec<String> {
    let bar = "─".repeat(BOX_WIDTH + 2);
    vec![
        format!("┌{}┐", bar),
        format!("│ {} │", pad(placeholder, BOX_WIDTH)),
        format!("│ {} │", pad("", BOX_WIDTH)),
        format!("│ {} │", pad("", BOX_WIDTH)),
        format!("└{}┘", bar),
    ]
}

fn dropdown_lines(options: &[String]) -> Vec<String> {
    match options.split_first() {
        None => vec![input_box_with_suffix("", "▾")],
        Some((first, rest)) => {
            let mut lines = vec![input_box_with_suffix(first, "▾")];
            for opt in rest {
                lines.push(format!("    {}", opt));
            }
            lines
        }
    }
}

fn checkbox_line(field: &Field) -> String {
    let mut line = format!("[ ] {}", field.label);
    if field.required {
        line.push_str(&format!(" {}*{}", RED, RESET));
    }
    line
}

/// Pad or truncate to exactly `width` characters.
fn pad(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{:<width$}", truncated, width = width)
}
