//! `logctl`: inspect and change log thresholds of a running service.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use request_logger::admin::handlers::{LevelEntry, SetLevelRequest};
use request_logger::Severity;

#[derive(Parser)]
#[command(name = "logctl")]
#[command(about = "Log level control for the request-logger admin API", long_about = None)]
struct Cli {
    /// Base URL of the service.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: Url,

    /// Admin API key.
    #[arg(short, long, env = "LOGCTL_KEY", hide_env_values = true)]
    key: String,

    /// Print raw JSON instead of a table.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Service version and status
    Status,
    /// List subsystems and their thresholds
    Levels,
    /// Change a subsystem's threshold
    SetLevel {
        subsystem: String,
        /// DEBUG, INFO, WARN or ERROR
        level: Severity,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let authed = |req: RequestBuilder| req.bearer_auth(&cli.key);

    match &cli.command {
        Command::Status => {
            let res = authed(client.get(cli.url.join("admin/status")?)).send().await?;
            let Some(body) = success_json(res).await? else {
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Levels => {
            let res = authed(client.get(cli.url.join("admin/log-levels")?)).send().await?;
            let Some(body) = success_json(res).await? else {
                return Ok(ExitCode::FAILURE);
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let entries: Vec<LevelEntry> = serde_json::from_value(body)?;
                print_levels(&entries);
            }
        }
        Command::SetLevel { subsystem, level } => {
            let endpoint = cli.url.join(&format!("admin/log-levels/{subsystem}"))?;
            let body = SetLevelRequest {
                level: level.to_string(),
            };
            let res = authed(client.put(endpoint).json(&body)).send().await?;
            let Some(body) = success_json(res).await? else {
                return Ok(ExitCode::FAILURE);
            };
            let entry: LevelEntry = serde_json::from_value(body)?;
            println!("{} -> {}", entry.subsystem, entry.level);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Body of a successful response; `None` after reporting a failed one.
async fn success_json(res: Response) -> Result<Option<Value>, reqwest::Error> {
    let status = res.status();
    if status.is_success() {
        return res.json().await.map(Some);
    }
    let text = res.text().await.unwrap_or_default();
    eprintln!("admin API returned {status}: {text}");
    Ok(None)
}

fn print_levels(entries: &[LevelEntry]) {
    let width = entries
        .iter()
        .map(|e| e.subsystem.len())
        .max()
        .unwrap_or(0)
        .max("SUBSYSTEM".len());
    println!("{:<width$}  LEVEL", "SUBSYSTEM");
    for entry in entries {
        println!("{:<width$}  {}", entry.subsystem, entry.level);
    }
}
