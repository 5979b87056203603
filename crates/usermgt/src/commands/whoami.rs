use colored::Colorize;
use usermgt_fastly::FastlyProvider;

pub async fn handle(provider: &FastlyProvider) -> anyhow::Result<()> {
    let status = provider.check_auth().await?;
    if status.authenticated {
        println!(
            "{} {} ({})",
            "✓".green(),
            status.account_info.unwrap_or_default(),
            provider.client().base_url().dimmed()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "{} authentication failed: {}",
            provider.display_name(),
            status.error.unwrap_or_default()
        )
    }
}
