use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_data, output_success, print_user};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account and log in")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Age in years")]
        age: i32,
        #[arg(long, help = "Password (at least 8 characters)")]
        password: String,
    },

    #[command(about = "Log in to the selected server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Revoke the stored refresh token and forget the session")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Refresh the access token")]
    Refresh,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::from_disk()?;

    match cmd {
        AuthCommands::Register {
            email,
            name,
            age,
            password,
        } => {
            let body = json!({
                "email": email,
                "name": name,
                "age": age,
                "password": password,
                "confirmPassword": password,
            });
            let data = client.send(Method::POST, "/api/auth/register", Some(&body)).await?.into_data()?;
            store_session(&mut client, &data)?;
            output_success(&output_format, &format!("Registered and logged in as {}", email), Some(data["user"].clone()))
        }
        AuthCommands::Login { email, password } => {
            let body = json!({ "email": email, "password": password });
            let data = client.send(Method::POST, "/api/auth/login", Some(&body)).await?.into_data()?;
            store_session(&mut client, &data)?;
            output_success(&output_format, &format!("Logged in as {}", email), Some(data["user"].clone()))
        }
        AuthCommands::Logout => {
            if client.session.is_logged_in() {
                let body = json!({ "refreshToken": client.session.refresh_token });
                let reply = client.authed(Method::POST, "/api/auth/logout", Some(&body)).await?;
                if !reply.status.is_success() {
                    tracing::warn!("Server refused logout with {}", reply.status);
                }
            }
            client.session.sign_out();
            client.save()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => {
            let data = client.authed(Method::GET, "/api/auth/whoami", None).await?.into_data()?;
            output_data(&output_format, &data, print_user)
        }
        AuthCommands::Refresh => {
            client.refresh().await?;
            output_success(&output_format, "Access token refreshed", None)
        }
    }
}

fn store_session(client: &mut ApiClient, data: &Value) -> anyhow::Result<()> {
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("response is missing '{}'", name))
    };

    let email = data
        .pointer("/user/email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    client.session.sign_in(email, field("token")?, field("refreshToken")?);
    client.save()
}
