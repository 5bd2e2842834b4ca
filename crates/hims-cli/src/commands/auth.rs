use anyhow::Result;
use colored::Colorize;

use crate::auth::{self, StoredCredentials};
use crate::cli::LoginArgs;
use crate::client::HimsClient;
use crate::output::{print_error, print_success};

pub async fn login(server: &str, args: &LoginArgs, profile: &str) -> Result<()> {
    let client = HimsClient::new(server, None);
    let session = client.login(&args.username, &args.password).await?;

    let creds = StoredCredentials {
        server: server.to_string(),
        username: session.staff.username.clone(),
        token: session.token,
        expires_at: session.expires_at,
    };
    auth::save_credentials(profile, &creds)?;
    print_success(&format!(
        "Logged in to {} as {} ({}), token valid until {}",
        server.cyan(),
        session.staff.username.cyan(),
        session.staff.role,
        creds.expires_at
    ));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if auth::remove_credentials(profile)? {
        print_success("Logged out (credentials removed)");
    } else {
        println!("No credentials found for profile \"{profile}\"");
    }
    Ok(())
}

/// Shows the stored session and asks the server whether it is still valid.
pub async fn whoami(profile: &str) -> Result<()> {
    let Some(creds) = auth::load_credentials(profile)? else {
        print_error(&format!("Not logged in (profile: \"{profile}\")"));
        return Ok(());
    };

    println!("{}: {}", "Profile".cyan(), profile);
    println!("{}: {}", "Server".cyan(), creds.server.cyan());
    println!("{}: {}", "User".cyan(), creds.username);
    println!("{}: {}", "Token".cyan(), creds.token_preview());
    println!("{}: {}", "Expires".cyan(), creds.expires_at);

    let client = HimsClient::new(&creds.server, Some(creds.token.clone()));
    match client.me().await {
        Ok(staff) => println!(
            "{}: {} ({}, {})",
            "Staff".cyan(),
            staff.display_name,
            staff.role,
            staff.id
        ),
        Err(e) => print_error(&format!("Session rejected by server: {e:#}")),
    }
    Ok(())
}
