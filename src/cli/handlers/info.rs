//! Information display handlers (stats, config)

use crate::cli::output::*;
use crate::store::FileVectorStore;
use crate::store::VectorStore;
use crate::AppConfig;
use crate::Result;

pub async fn handle_stats_command(config: &AppConfig, json: bool) -> Result<()> {
    let store =
        FileVectorStore::open(&config.store.path, &config.store.collection, config.store.metric)
            .await?;
    let total = store.count().await?;
    let by_type = store.count_by_type().await?;

    if json {
        let body = serde_json::json!({
            "total_documents": total,
            "by_type": by_type,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_collection_stats(total, &by_type);
        println!("   Store file: {}", store.path().display());
    }
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) {
    print_config(config);
}
