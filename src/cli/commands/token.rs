use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{MemoryIdentityStore, TokenService};
use crate::cli::utils::{load_config, output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, PgIdentityStore};

#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    #[command(about = "Sign a token for a user id with the configured secret")]
    Issue {
        #[arg(help = "User id to put in the token")]
        user_id: i32,
        #[arg(long, help = "Lifetime in seconds (defaults to SECURITY_TOKEN_TTL_SECS)")]
        ttl: Option<u64>,
    },

    #[command(about = "Check a token's signature and expiry")]
    Verify {
        #[arg(help = "Token to check")]
        token: String,
        #[arg(long, help = "Also resolve the user in the database")]
        check_user: bool,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;

    match cmd {
        TokenCommands::Issue { user_id, ttl } => {
            let tokens = TokenService::new(&config.security, Arc::new(MemoryIdentityStore::default()));
            let ttl = ttl.unwrap_or(tokens.default_ttl());
            let token = tokens.issue(user_id, ttl)?;

            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "user_id": user_id, "expires_in": ttl })),
                )?,
            }
            Ok(())
        }
        TokenCommands::Verify { token, check_user } => {
            if check_user {
                let pool = DatabaseManager::connect(&config.database).await?;
                let tokens = TokenService::new(&config.security, Arc::new(PgIdentityStore::new(pool)));
                match tokens.verify(&token).await {
                    Ok(user) => output_success(
                        &output_format,
                        &format!("Token is valid for {} (id {})", user.username, user.id),
                        Some(json!({ "user": user })),
                    ),
                    Err(e) => {
                        output_error(&output_format, &e.to_string(), Some("INVALID_TOKEN"))?;
                        anyhow::bail!("token rejected")
                    }
                }
            } else {
                let tokens = TokenService::new(&config.security, Arc::new(MemoryIdentityStore::default()));
                match tokens.decode(&token) {
                    Ok(claims) => output_success(
                        &output_format,
                        &format!("Token signature valid, user_id {} expires at {}", claims.user_id, claims.exp),
                        Some(json!({ "user_id": claims.user_id, "exp": claims.exp })),
                    ),
                    Err(e) => {
                        output_error(&output_format, &e.to_string(), Some("INVALID_TOKEN"))?;
                        anyhow::bail!("token rejected")
                    }
                }
            }
        }
    }
}
