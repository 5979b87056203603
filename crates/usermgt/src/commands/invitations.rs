use super::cell;
use colored::Colorize;
use usermgt_cloud::DataSource;
use usermgt_fastly::FastlyProvider;

pub async fn handle(provider: &FastlyProvider, json: bool) -> anyhow::Result<()> {
    let state = provider.invitations().read().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    if state.items.is_empty() {
        println!("{}", "No pending invitations".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<24} {:<32} {:<10} {:<6}", "ID", "EMAIL", "ROLE", "STATUS").bold()
    );
    println!("{}", "─".repeat(75).dimmed());
    for invitation in &state.items {
        println!(
            "{:<24} {:<32} {:<10} {:<6}",
            cell(&invitation["id"]),
            cell(&invitation["email"]),
            cell(&invitation["role"]),
            cell(&invitation["status_code"]),
        );
    }
    Ok(())
}
