//! CLI output formatting utilities

use std::collections::HashMap;

use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

pub fn print_info(message: &str) {
    println!("ℹ️  {message}");
}

pub fn print_success(message: &str) {
    println!("✅ {message}");
}

pub fn print_warning(message: &str) {
    println!("⚠️  {message}");
}

pub fn print_error(message: &str) {
    eprintln!("❌ {message}");
}

/// Print document counts with types in a stable order
pub fn print_collection_stats(total: usize, by_type: &HashMap<String, usize>) {
    println!("📊 Collection statistics");
    println!("  Total documents: {total}");

    let mut types: Vec<_> = by_type.iter().collect();
    types.sort();
    for (doc_type, count) in types {
        println!("  - {doc_type}: {count}");
    }
}

/// Print the effective configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    println!("📋 AgriSense Configuration:");
    println!("  Server:");
    println!("    Bind: {}", config.bind_address());
    println!("    CORS: {}", config.server.cors);
    println!("  Logging:");
    println!("    Level: {}", config.logging.level);
    println!("    Directory: {}", config.logging.directory);
    println!("  Embeddings:");
    println!("    Provider: {:?}", config.embeddings.provider);
    println!("    Model: {}", config.embeddings.model);
    println!("    Dimension: {}", config.embeddings.dimension);
    println!("    Endpoint: {}", config.embeddings.endpoint);
    println!("  Store:");
    println!("    Path: {}", config.store.path);
    println!("    Collection: {}", config.store.collection);
    println!("    Metric: {:?}", config.store.metric);
    println!("  Cache:");
    println!("    Enabled: {}", config.cache.enabled);
    println!("    Threshold: {}", config.cache.threshold);
    println!("    Interactions only: {}", config.cache.interactions_only);
    println!("  Retrieval:");
    println!("    Limit: {}", config.retrieval.limit);
    println!("    Prompt contexts: {}", config.retrieval.prompt_contexts);
    println!("  LLM:");
    println!("    Endpoint: {}", config.llm.endpoint);
    println!("    API key: {}", mask_secret(&config.llm.api_key));
    println!("    Mode: {:?}", config.llm.mode);
    println!(
        "    Grounded: {} (temperature {}, max tokens {})",
        config.llm.grounded.model, config.llm.grounded.temperature, config.llm.grounded.max_tokens
    );
    println!(
        "    Fast: {} (temperature {}, max tokens {})",
        config.llm.fast.model, config.llm.fast.temperature, config.llm.fast.max_tokens
    );
    println!("  History:");
    println!("    Enabled: {}", config.history.enabled);
    println!("    Max messages: {}", config.history.max_messages);
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("ਪੰਜਾਬ ਦੀ ਕਣਕ", 5), "ਪੰਜਾਬ...");
        assert_eq!(truncate_str("wheat", 10), "wheat");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("gsk_abcdef"), "gsk_****");
    }
}
