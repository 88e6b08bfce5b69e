use chrono::Duration;
use clap::Parser;
use serde_json::json;

use forum_api::auth::{Claims, JwtVerifier};
use forum_api::config::config;

#[derive(Parser)]
#[command(name = "forum-token")]
#[command(about = "Issue a bearer token for calling the Forum API by hand")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "test-user-id-123", help = "Identity placed in the `sub` claim")]
    subject: String,

    #[arg(long, help = "Hours until the token expires (defaults to JWT_EXPIRES_IN_HOURS)")]
    ttl_hours: Option<i64>,

    #[arg(long, help = "Signing secret (defaults to JWT_SECRET)")]
    secret: Option<String>,

    #[arg(long, help = "Output in JSON format")]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let ttl = match cli.ttl_hours {
        Some(hours) if hours < 1 => anyhow::bail!("--ttl-hours must be at least 1"),
        Some(hours) => Duration::try_hours(hours).ok_or_else(|| anyhow::anyhow!("--ttl-hours is too large"))?,
        None => config().security.token_ttl(),
    };

    let secret = cli
        .secret
        .unwrap_or_else(|| config().security.jwt_secret.clone());
    let verifier = JwtVerifier::new(&secret);

    let claims = Claims::new(cli.subject, ttl);
    let token = verifier.encode(&claims)?;

    if cli.json {
        println!(
            "{}",
            json!({
                "token": token,
                "subject": claims.sub,
                "expires_at": claims.exp,
                "authorization": format!("Bearer {}", token),
            })
        );
    } else {
        println!("Bearer {}", token);
    }

    Ok(())
}
