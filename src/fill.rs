//! Filling a persisted template as a validated form instance.
//!
//! Fields are prompted in presentation order. `required` fields
//! re-prompt on empty input; numbers, dates, times and choice answers
//! are validated against the field before they are accepted. The result
//! is a `{label: value}` JSON object ready to print or submit.

use std::io::BufRead;

use chrono::{NaiveDate, NaiveTime};
use colored::Colorize;
use serde_json::{Map, Value};

use crate::error::FillError;
use crate::render::render_field;
use crate::schema::{Field, FieldType, FormSchema};

/// Prompt for every field of `schema`, reading answers from `input`.
pub fn fill_form<R: BufRead>(schema: &FormSchema, input: &mut R) -> Result<Value, FillError> {
    println!();
    println!("{}", schema.title.bold());
    println!();

    let mut submission = Map::new();
    for field in &schema.fields {
        for line in render_field(field, true) {
            println!("{}", line);
        }
        if let Some(value) = read_answer(field, input)? {
            submission.insert(field.label.clone(), value);
        }
        println!();
    }
    Ok(Value::Object(submission))
}

/// Read one validated answer. `None` means an optional field was
/// skipped.
fn read_answer<R: BufRead>(field: &Field, input: &mut R) -> Result<Option<Value>, FillError> {
    loop {
        let line = read_line(field, input)?;
        let answer = line.trim();

        if answer.is_empty() {
            if field.required {
                println!("{}", "This field is required.".red());
                continue;
            }
            // Unchecked is a value for checkboxes, absence for the rest.
            if field.kind == FieldType::Checkbox {
                return Ok(Some(Value::Bool(false)));
            }
            return Ok(None);
        }

        match validate(field, answer) {
            Ok(value) => return Ok(Some(value)),
            Err(message) => println!("{}", message.red()),
        }
    }
}

fn read_line<R: BufRead>(field: &Field, input: &mut R) -> Result<String, FillError> {
    print_prompt(field);
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Err(FillError::InputClosed);
    }
    Ok(line)
}

fn print_prompt(field: &Field) {
    let hint = match field.kind {
        FieldType::Checkbox => " (y/n)",
        FieldType::Dropdown | FieldType::Radio => " (number or text)",
        _ => "",
    };
    print!("{}{}> ", field.label.cyan(), hint.dimmed());
    use std::io::Write;
    std::io::stdout().flush().ok();
}

/// Check an answer against the field's type. Errors are re-prompt
/// messages, never failures.
fn validate(field: &Field, answer: &str) -> Result<Value, String> {
    match field.kind {
        FieldType::Text | FieldType::Textarea | FieldType::Tel => {
            Ok(Value::String(answer.to_string()))
        }
        // "inf" and "nan" parse as f64 but have no JSON number form.
        FieldType::Number => match answer.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(serde_json::json!(n)),
            _ => Err(format!("'{}' is not a number.", answer)),
        },
        FieldType::Date => match NaiveDate::parse_from_str(answer, "%Y-%m-%d") {
            Ok(_) => Ok(Value::String(answer.to_string())),
            Err(_) => Err("Enter a date as YYYY-MM-DD.".to_string()),
        },
        FieldType::Time => match NaiveTime::parse_from_str(answer, "%H:%M") {
            Ok(_) => Ok(Value::String(answer.to_string())),
            Err(_) => Err("Enter a time as HH:MM.".to_string()),
        },
        FieldType::Checkbox => match answer.to_lowercase().as_str() {
            "y" | "yes" | "true" => Ok(Value::Bool(true)),
            "n" | "no" | "false" => {
                if field.required {
                    Err("This box must be checked.".to_string())
                } else {
                    Ok(Value::Bool(false))
                }
            }
            _ => Err("Answer y or n.".to_string()),
        },
        FieldType::Dropdown | FieldType::Radio => pick_option(&field.options, answer),
    }
}

/// Exactly one option may be chosen, by 1-based position or by text.
fn pick_option(options: &[String], answer: &str) -> Result<Value, String> {
    if let Ok(position) = answer.parse::<usize>() {
        if position >= 1 && position <= options.len() {
            return Ok(Value::String(options[position - 1].clone()));
        }
    }
    if let Some(option) = options.iter().find(|o| o.as_str() == answer) {
        return Ok(Value::String(option.clone()));
    }
    Err(format!(
        "Choose one of the listed options (1-{}).",
        options.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::factory::FieldFactory;
    use std::io::Cursor;

    fn schema_with(fields: Vec<Field>) -> FormSchema {
        FormSchema {
            title: "Visit".to_string(),
            fields,
        }
    }

    #[test]
    fn collects_answers_keyed_by_label() {
        let mut factory = FieldFactory::new();
        let mut name = factory.create(FieldType::Text);
        name.label = "Name".to_string();
        let mut age = factory.create(FieldType::Number);
        age.label = "Age".to_string();
        let schema = schema_with(vec![name, age]);

        let mut input = Cursor::new("Ada\n36\n");
        let submission = fill_form(&schema, &mut input).unwrap();

        assert_eq!(submission["Name"], "Ada");
        assert_eq!(submission["Age"], 36.0);
    }

    #[test]
    fn required_field_reprompts_on_empty() {
        let mut factory = FieldFactory::new();
        let mut field = factory.create(FieldType::Text);
        field.required = true;
        let schema = schema_with(vec![field]);

        let mut input = Cursor::new("\n\nfinally\n");
        let submission = fill_form(&schema, &mut input).unwrap();
        assert_eq!(submission["Untitled text"], "finally");
    }

    #[test]
    fn optional_field_can_be_skipped() {
        let mut factory = FieldFactory::new();
        let schema = schema_with(vec![factory.create(FieldType::Text)]);

        let mut input = Cursor::new("\n");
        let submission = fill_form(&schema, &mut input).unwrap();
        assert!(submission.as_object().unwrap().is_empty());
    }

    #[test]
    fn number_rejects_garbage_then_accepts() {
        let mut factory = FieldFactory::new();
        let schema = schema_with(vec![factory.create(FieldType::Number)]);

        let mut input = Cursor::new("abc\n3.5\n");
        let submission = fill_form(&schema, &mut input).unwrap();
        assert_eq!(submission["Untitled number"], 3.5);
    }

    #[test]
    fn number_rejects_non_finite_values() {
        let field = FieldFactory::new().create(FieldType::Number);
        assert!(validate(&field, "inf").is_err());
        assert!(validate(&field, "-inf").is_err());
        assert!(validate(&field, "nan").is_err());
        assert!(validate(&field, "NaN").is_err());
        assert_eq!(validate(&field, "-7.25").unwrap(), -7.25);
    }

    #[test]
    fn date_and_time_are_format_checked() {
        assert!(validate(
            &FieldFactory::new().create(FieldType::Date),
            "2026-02-30"
        )
        .is_err());
        assert!(validate(
            &FieldFactory::new().create(FieldType::Date),
            "2026-02-27"
        )
        .is_ok());
        assert!(validate(&FieldFactory::new().create(FieldType::Time), "25:00").is_err());
        assert!(validate(&FieldFactory::new().create(FieldType::Time), "08:30").is_ok());
    }

    #[test]
    fn choice_answers_resolve_by_position_or_text() {
        let mut field = FieldFactory::new().create(FieldType::Radio);
        field.options = vec!["Red".into(), "Blue".into()];

        assert_eq!(validate(&field, "2").unwrap(), "Blue");
        assert_eq!(validate(&field, "Red").unwrap(), "Red");
        assert!(validate(&field, "0").is_err());
        assert!(validate(&field, "Green").is_err());
    }

    #[test]
    fn required_checkbox_must_be_checked() {
        let mut field = FieldFactory::new().create(FieldType::Checkbox);
        field.required = true;
        assert!(validate(&field, "n").is_err());
        assert_eq!(validate(&field, "y").unwrap(), true);

        field.required = false;
        assert_eq!(validate(&field, "no").unwrap(), false);
    }

    #[test]
    fn closed_input_surfaces_as_an_error() {
        let mut factory = FieldFactory::new();
        let mut field = factory.create(FieldType::Text);
        field.required = true;
        let schema = schema_with(vec![field]);

        let mut input = Cursor::new("");
        assert!(matches!(
            fill_form(&schema, &mut input),
            Err(FillError::InputClosed)
        ));
    }
}
