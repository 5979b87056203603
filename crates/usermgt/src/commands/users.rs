use super::cell;
use colored::Colorize;
use usermgt_cloud::DataSource;
use usermgt_fastly::FastlyProvider;

pub async fn handle(provider: &FastlyProvider, json: bool) -> anyhow::Result<()> {
    let state = provider.users().read().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("{} {}", "Customer:".bold(), state.id.cyan());
    if state.items.is_empty() {
        println!("{}", "No users".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<24} {:<32} {:<24} {:<10} {:<6} {:<6}",
            "ID", "LOGIN", "NAME", "ROLE", "2FA", "LOCKED"
        )
        .bold()
    );
    println!("{}", "─".repeat(107).dimmed());
    for user in &state.items {
        println!(
            "{:<24} {:<32} {:<24} {:<10} {:<6} {:<6}",
            cell(&user["id"]),
            cell(&user["login"]),
            cell(&user["name"]),
            cell(&user["role"]),
            cell(&user["two_factor_auth_enabled"]),
            cell(&user["locked"]),
        );
    }
    Ok(())
}
