use anyhow::Result;
use colored::Colorize;

use crate::client::HimsClient;

pub async fn status(client: &HimsClient, server: &str) -> Result<()> {
    let (code, body) = client.probe("healthz").await?;
    if code == 200 {
        println!("{} {} is {}", "✓".green(), server.cyan(), "healthy".green());
    } else {
        println!(
            "{} {} returned {} {}",
            "✗".red(),
            server.cyan(),
            code.to_string().red(),
            body
        );
        return Ok(());
    }

    let (code, body) = client.probe("readyz").await?;
    if code == 200 {
        println!("{} storage is {}", "✓".green(), "ready".green());
    } else {
        println!("{} storage is {} {}", "✗".red(), "unavailable".red(), body);
    }
    if !body.is_empty() {
        println!("  {body}");
    }
    Ok(())
}
