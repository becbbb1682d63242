use anyhow::Result;

use crate::analytics::{self, AnalyticsStatus};
use crate::config::Config;

/// Print analytics availability and cache settings.
///
/// When analytics is unavailable this says what to fix, since the
/// analytics-backed abilities will refuse every call until it is.
pub fn run_status(config: &Config) -> Result<()> {
    let source = analytics::from_config(&config.analytics)?;
    let status = AnalyticsStatus::of(source.as_ref());

    println!("{:<20} {}", "SETTING", "VALUE");
    println!("{:<20} {}", "analytics.provider", config.analytics.provider);
    println!("{:<20} {}", "analytics.connected", status.connected);
    println!("{:<20} {}", "analytics.stats", status.stats_capability);
    println!("{:<20} {}", "cache.backend", config.cache.backend);
    println!("{:<20} {}s", "cache.ttl", config.cache.ttl_secs);
    println!("{:<20} {}", "cache.prefix", config.cache.prefix);
    println!("{:<20} {}", "auth.capability", config.auth.capability);
    println!("{:<20} {}", "auth.users", config.auth.users.len());

    if !status.connected {
        println!();
        println!(
            "Analytics is not connected. Set provider = \"http\" with base_url, site_id and \
             api_token under [analytics] to enable top posts, search terms and \
             underperforming posts."
        );
    } else if !status.stats_capability {
        println!();
        println!(
            "Analytics is connected but the stats module is disabled. Enable it on the \
             analytics account and set stats_enabled = true."
        );
    }

    Ok(())
}
