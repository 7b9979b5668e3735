use anyhow::Result;

use crate::config::Config;
use crate::resolver::{channel_name_from_url, find_channel_id, HttpChannelResolver};
use crate::traits::{ChannelResolver, ResolvedChannel};

/// List configured channels. With `resolve`, look each one up over HTTP
/// and show the channel id it maps to.
pub async fn list_sources(config: &Config, resolve: bool) -> Result<()> {
    let resolved = if resolve {
        let resolver = HttpChannelResolver::new(&config.fetch)?;
        Some(resolver.resolve(&config.channels).await)
    } else {
        None
    };

    println!("{:<24} {:<26} URL", "CHANNEL", "ID");
    for url in &config.channels {
        println!(
            "{:<24} {:<26} {}",
            channel_name_from_url(url),
            channel_status(url, resolved.as_deref()),
            url
        );
    }

    if let Some(resolved) = &resolved {
        println!();
        println!(
            "{} / {} channels resolved",
            resolved.len(),
            config.channels.len()
        );
    }

    Ok(())
}

fn channel_status(url: &str, resolved: Option<&[ResolvedChannel]>) -> String {
    match resolved {
        Some(resolved) => resolved
            .iter()
            .find(|c| c.url == url)
            .map(|c| c.channel_id.clone())
            .unwrap_or_else(|| "UNRESOLVED".to_string()),
        None => find_channel_id(url).unwrap_or_else(|| "needs lookup".to_string()),
    }
}
