//! One-shot maintenance commands
//!
//! Each command connects with the configured cache settings, prints a JSON
//! report on stdout and exits.

use serde::Serialize;

use crate::config::AppConfig;
use crate::infrastructure::cache::CacheManager;
use crate::infrastructure::logging;

use super::Command;

/// Runs a non-server command
pub async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let cache = CacheManager::init(&config.cache).await?;
    let output = execute(&cache, command).await?;
    cache.close().await;

    println!("{}", output);
    Ok(())
}

/// Executes a command against `cache`, returning the rendered report
pub async fn execute(cache: &CacheManager, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Stats => render(&cache.get_stats().await),
        Command::Health => render(&cache.health_check().await),
        Command::Flush => render(&cache.clear_all().await?),
        Command::Invalidate { pattern } => render(&cache.delete_pattern(&pattern).await?),
        Command::Serve => anyhow::bail!("serve is not a one-shot command"),
    }
}

fn render<T: Serialize>(report: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CacheParams;
    use crate::infrastructure::cache::CacheConfig;
    use serde_json::Value;

    fn cache() -> CacheManager {
        CacheManager::local_only(&CacheConfig::local_only()).unwrap()
    }

    #[tokio::test]
    async fn test_health_report() {
        let output = execute(&cache(), Command::Health).await.unwrap();
        let report: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(report["cache_status"], "healthy");
        assert_eq!(report["local_status"], "active");
    }

    #[tokio::test]
    async fn test_invalidate_report() {
        let cache = cache();
        cache.set("grades", &CacheParams::new(), &1, None).await.unwrap();

        let output = execute(
            &cache,
            Command::Invalidate {
                pattern: "grades".to_string(),
            },
        )
        .await
        .unwrap();
        let report: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(report["local_deleted"], 1);
    }

    #[tokio::test]
    async fn test_invalidate_empty_pattern_fails() {
        let result = execute(
            &cache(),
            Command::Invalidate {
                pattern: String::new(),
            },
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_serve_is_rejected() {
        assert!(execute(&cache(), Command::Serve).await.is_err());
    }
}
