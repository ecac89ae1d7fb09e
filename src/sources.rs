use anyhow::Result;

use crate::config::Config;
use crate::sync::{build_source, SOURCE_NAMES};

/// Print the configured sources and the index they feed.
pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<14} {:<10} ENDPOINT", "SOURCE", "KIND");
    for name in SOURCE_NAMES {
        let source = build_source(config, name)?;
        println!("{:<14} {:<10} {}", name, source.kind(), source.endpoint());
    }

    println!();
    println!("index: {}", config.search.index_url);
    if config.bearer_token().is_some() {
        println!("auth: bearer token");
    }

    Ok(())
}
