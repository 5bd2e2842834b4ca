mod auth;
mod cli;
mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use client::HimsClient;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let profile = &cli.profile;
    let format = match cli.format {
        Some(f) => f,
        None => config::load_profile(profile)?.output_format().unwrap_or_default(),
    };

    match &cli.command {
        Commands::Login(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::login(&server, args, profile).await?;
        }
        Commands::Logout => {
            commands::auth::logout(profile)?;
        }
        Commands::Whoami => {
            commands::auth::whoami(profile).await?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    cfg.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("table")
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                match set_args.key.as_str() {
                    "server" => cfg.server = Some(config::normalize_server(&set_args.value)?),
                    "format" => match set_args.value.as_str() {
                        "table" | "json" => cfg.format = Some(set_args.value.clone()),
                        other => anyhow::bail!("Unknown format: {other}. Valid formats: table, json"),
                    },
                    other => {
                        anyhow::bail!("Unknown config key: {other}. Valid keys: server, format")
                    }
                }
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Status => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = HimsClient::new(&server, None);
            commands::server::status(&client, &server).await?;
        }
        Commands::Beds(args) => {
            let client = make_client(&cli.server, profile)?;
            commands::beds::list(&client, args, format).await?;
        }
        Commands::Admissions(args) => {
            let client = make_client(&cli.server, profile)?;
            commands::admissions::list(&client, args, format).await?;
        }
        Commands::Admit(args) => {
            let client = make_client(&cli.server, profile)?;
            commands::admissions::admit(&client, args, format).await?;
        }
        Commands::AssignBed(args) => {
            let client = make_client(&cli.server, profile)?;
            commands::admissions::assign_bed(&client, args, format).await?;
        }
        Commands::Discharge(args) => {
            let client = make_client(&cli.server, profile)?;
            commands::admissions::discharge(&client, args, format).await?;
        }
    }

    Ok(())
}

/// Client for an authenticated command; requires a stored login.
fn make_client(cli_server: &Option<String>, profile: &str) -> Result<HimsClient> {
    let server = config::resolve_server(cli_server, profile)?;
    let Some(creds) = auth::load_credentials(profile)? else {
        anyhow::bail!("Not logged in (profile: \"{profile}\"). Run: hims login --username <name>");
    };
    Ok(HimsClient::new(&server, Some(creds.token)))
}
