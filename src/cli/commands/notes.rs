use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{note_line, output_data, output_success, print_note};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum NoteCommands {
    #[command(about = "List visible notes")]
    List {
        #[arg(long, help = "Page number (1-based)")]
        page: Option<i64>,
        #[arg(long, help = "Notes per page")]
        limit: Option<i64>,
        #[arg(long, help = "Case-insensitive search over title and content")]
        search: Option<String>,
        #[arg(long, help = "newest | oldest | title_asc | title_desc")]
        sort: Option<String>,
        #[arg(long, help = "visible | mine | shared")]
        scope: Option<String>,
    },

    #[command(about = "Show one note")]
    Get {
        #[arg(help = "Note ID")]
        id: i64,
    },

    #[command(about = "Create a note")]
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, help = "Author name (defaults to Unknown)")]
        author: Option<String>,
        #[arg(long, help = "Hide the note from other users")]
        private: bool,
    },

    #[command(about = "Change fields of an owned note")]
    Update {
        #[arg(help = "Note ID")]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, help = "true or false")]
        public: Option<bool>,
    },

    #[command(about = "Delete an owned note")]
    Delete {
        #[arg(help = "Note ID")]
        id: i64,
    },

    #[command(about = "Share an owned note with another user")]
    Share {
        #[arg(help = "Note ID")]
        id: i64,
        #[arg(help = "Email of the user to share with")]
        email: String,
    },

    #[command(about = "Stop sharing an owned note")]
    Unshare {
        #[arg(help = "Note ID")]
        id: i64,
        #[arg(help = "User ID to remove")]
        user_id: i64,
    },

    #[command(about = "List users a note is shared with")]
    Shares {
        #[arg(help = "Note ID")]
        id: i64,
    },
}

/// Query string for `notes list`
pub fn list_path(
    page: Option<i64>,
    limit: Option<i64>,
    search: Option<&str>,
    sort: Option<&str>,
    scope: Option<&str>,
) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(page) = page {
        query.append_pair("page", &page.to_string());
    }
    if let Some(limit) = limit {
        query.append_pair("limit", &limit.to_string());
    }
    for (key, value) in [("search", search), ("sort", sort), ("scope", scope)] {
        if let Some(value) = value {
            query.append_pair(key, value);
        }
    }

    let query = query.finish();
    if query.is_empty() {
        "/api/notes".to_string()
    } else {
        format!("/api/notes?{}", query)
    }
}

pub async fn handle(cmd: NoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::from_disk()?;

    match cmd {
        NoteCommands::List {
            page,
            limit,
            search,
            sort,
            scope,
        } => {
            let path = list_path(page, limit, search.as_deref(), sort.as_deref(), scope.as_deref());
            let data = client.authed(Method::GET, &path, None).await?.into_data()?;
            output_data(&output_format, &data, |data| {
                let notes = data.get("notes").and_then(Value::as_array).cloned().unwrap_or_default();
                if notes.is_empty() {
                    println!("No notes found");
                }
                for note in &notes {
                    println!("{}", note_line(note));
                }
                if let Some(p) = data.get("pagination") {
                    println!("\npage {} of {} ({} total)", p["page"], p["pages"], p["total"]);
                }
            })
        }
        NoteCommands::Get { id } => {
            let data = client.authed(Method::GET, &format!("/api/notes/{}", id), None).await?.into_data()?;
            output_data(&output_format, &data, print_note)
        }
        NoteCommands::Create {
            title,
            content,
            author,
            private,
        } => {
            let mut body = json!({ "title": title, "content": content, "isPublic": !private });
            if let Some(author) = author {
                body["authorName"] = json!(author);
            }
            let data = client.authed(Method::POST, "/api/notes", Some(&body)).await?.into_data()?;
            output_success(&output_format, &format!("Created note {}", data["id"]), Some(data))
        }
        NoteCommands::Update {
            id,
            title,
            content,
            author,
            public,
        } => {
            let mut body = Map::new();
            if let Some(title) = title {
                body.insert("title".into(), json!(title));
            }
            if let Some(content) = content {
                body.insert("content".into(), json!(content));
            }
            if let Some(author) = author {
                body.insert("authorName".into(), json!(author));
            }
            if let Some(public) = public {
                body.insert("isPublic".into(), json!(public));
            }
            let data = client
                .authed(Method::PATCH, &format!("/api/notes/{}", id), Some(&Value::Object(body)))
                .await?
                .into_data()?;
            output_success(&output_format, &format!("Updated note {}", id), Some(data))
        }
        NoteCommands::Delete { id } => {
            client.authed(Method::DELETE, &format!("/api/notes/{}", id), None).await?.into_data()?;
            output_success(&output_format, &format!("Deleted note {}", id), None)
        }
        NoteCommands::Share { id, email } => {
            let body = json!({ "email": email });
            let data = client
                .authed(Method::POST, &format!("/api/notes/{}/share", id), Some(&body))
                .await?
                .into_data()?;
            output_success(&output_format, &format!("Shared note {} with {}", id, email), Some(data))
        }
        NoteCommands::Unshare { id, user_id } => {
            client
                .authed(Method::DELETE, &format!("/api/notes/{}/share/{}", id, user_id), None)
                .await?
                .into_data()?;
            output_success(&output_format, &format!("Note {} no longer shared with user {}", id, user_id), None)
        }
        NoteCommands::Shares { id } => {
            let data = client
                .authed(Method::GET, &format!("/api/notes/{}/shares", id), None)
                .await?
                .into_data()?;
            output_data(&output_format, &data, |data| {
                let users = data.as_array().cloned().unwrap_or_default();
                if users.is_empty() {
                    println!("Note {} is not shared", id);
                }
                for user in &users {
                    println!(
                        "{} <{}> (user {})",
                        user["name"].as_str().unwrap_or_default(),
                        user["email"].as_str().unwrap_or_default(),
                        user["userId"]
                    );
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_path_encodes_query() {
        assert_eq!(list_path(None, None, None, None, None), "/api/notes");
        assert_eq!(
            list_path(Some(2), Some(5), Some("milk & eggs"), Some("oldest"), None),
            "/api/notes?page=2&limit=5&search=milk+%26+eggs&sort=oldest"
        );
    }
}
