use colored::Colorize;
use usermgt_config::ProviderConfig;

pub fn handle(config: &ProviderConfig) {
    let shown = config.redacted();

    match usermgt_config::find_config_file() {
        Ok(Some(path)) => println!("{} {}", "Config file:".bold(), path.display()),
        _ => println!("{} {}", "Config file:".bold(), "(none)".dimmed()),
    }
    println!(
        "  api_key:           {}",
        shown.api_key.as_deref().unwrap_or("(not set)")
    );
    println!("  base_url:          {}", shown.base_url);
    println!("  force_http2:       {}", shown.force_http2);
    println!("  display_sensitive: {}", shown.display_sensitive);
    println!("  timeout_secs:      {}", shown.timeout_secs);
}
