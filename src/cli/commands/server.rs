use clap::Subcommand;
use reqwest::Method;
use serde_json::json;
use url::Url;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_data, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at an API server")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:5000")]
        url: String,
    },

    #[command(about = "Show the selected server")]
    Show,

    #[command(about = "Check server health via /health")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::from_disk()?;

    match cmd {
        ServerCommands::Set { url } => {
            let parsed = Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", url, e))?;
            if Url::parse(&client.session.server_url).ok().as_ref() != Some(&parsed) {
                // Tokens belong to the previous server
                client.session.sign_out();
            }
            client.session.server_url = parsed.to_string();
            client.save()?;
            output_success(
                &output_format,
                &format!("Server set to {}", parsed),
                Some(json!({ "server_url": parsed.as_str() })),
            )
        }
        ServerCommands::Show => {
            let data = json!({
                "server_url": client.session.server_url,
                "logged_in": client.session.is_logged_in(),
                "email": client.session.email,
            });
            output_data(&output_format, &data, |_| {
                println!("Server: {}", client.session.server_url);
                match &client.session.email {
                    Some(email) => println!("Logged in as: {}", email),
                    None => println!("Not logged in"),
                }
            })
        }
        ServerCommands::Ping => {
            let reply = client.send(Method::GET, "/health", None).await?;
            let status = reply.status;
            output_data(&output_format, &reply.body, |body| {
                let state = body
                    .pointer("/data/status")
                    .and_then(|s| s.as_str())
                    .unwrap_or("unknown");
                println!("{} is {} ({})", client.session.server_url, state, status.as_u16());
            })?;
            if !status.is_success() {
                anyhow::bail!("server reported {}", status);
            }
            Ok(())
        }
    }
}
