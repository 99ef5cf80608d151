use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output raw data as JSON, or through `text` for humans
pub fn output_data<F>(output_format: &OutputFormat, data: &Value, text: F) -> anyhow::Result<()>
where
    F: FnOnce(&Value),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text(data),
    }
    Ok(())
}

fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or("")
}

/// One-line summary of a note
pub fn note_line(note: &Value) -> String {
    let visibility = if note.get("isPublic").and_then(Value::as_bool).unwrap_or(true) {
        "public"
    } else {
        "private"
    };
    format!(
        "#{:<5} {} [{}] by {}",
        note.get("id").and_then(Value::as_i64).unwrap_or_default(),
        field(note, "title"),
        visibility,
        field(note, "authorName")
    )
}

pub fn print_note(note: &Value) {
    println!("{}", note_line(note));
    println!("created {}  updated {}", field(note, "createdAt"), field(note, "updatedAt"));
    println!();
    println!("{}", field(note, "content"));
}

pub fn print_user(user: &Value) {
    println!(
        "{} <{}> (id {}, age {})",
        field(user, "name"),
        field(user, "email"),
        user.get("id").and_then(Value::as_i64).unwrap_or_default(),
        user.get("age").and_then(Value::as_i64).unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_lines_show_visibility() {
        let note = json!({ "id": 4, "title": "Groceries", "isPublic": false, "authorName": "Jane" });
        assert_eq!(note_line(&note), "#4     Groceries [private] by Jane");
    }
}
