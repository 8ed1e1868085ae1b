//! Clear-cache command - empties both cache tiers

use crate::infrastructure::cache::ClearOutcome;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();
    let state = crate::create_app_state_with_config(&config).await?;

    match state.pipeline.cache().clear().await {
        ClearOutcome::Complete { persistent_rows } => {
            println!("Cache cleared ({} persistent entries removed)", persistent_rows);
            Ok(())
        }
        ClearOutcome::MemoryOnly => {
            anyhow::bail!("memory cache cleared, but the persistent cache could not be emptied")
        }
    }
}
