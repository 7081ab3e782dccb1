//! Data loading handlers (populate, remember)

use std::sync::Arc;

use crate::cli::output::*;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::ingest;
use crate::ingest::IngestReport;
use crate::models::FarmerProfile;
use crate::rag::InteractionRecorder;
use crate::store::FileVectorStore;
use crate::store::VectorStore;
use crate::AppConfig;
use crate::Result;

async fn open_store(config: &AppConfig) -> Result<FileVectorStore> {
    FileVectorStore::open(&config.store.path, &config.store.collection, config.store.metric).await
}

pub async fn handle_populate_command(config: &AppConfig, file: &str) -> Result<IngestReport> {
    print_info(&format!("Loading farmer data from {file}"));
    let farmers = ingest::load_farmers(file)?;
    print_info(&format!("Processing {} farmers...", farmers.len()));

    let embedder = EmbeddingService::new(&config.embeddings)?;
    let store = open_store(config).await?;
    let report = ingest::populate(&farmers, &embedder, &store).await?;

    print_success(&format!(
        "Added {} documents from {} farmers",
        report.documents, report.farmers
    ));
    if report.skipped > 0 {
        print_warning(&format!("Skipped {} farmers without an id", report.skipped));
    }
    println!("   Total documents in collection: {}", report.total_in_store);
    Ok(report)
}

pub async fn handle_remember_command(
    config: &AppConfig,
    question: &str,
    answer: &str,
    farmer_id: Option<String>,
    location: Option<String>,
) -> Result<String> {
    let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(&config.embeddings)?);
    let store: Arc<dyn VectorStore> = Arc::new(open_store(config).await?);
    let recorder = InteractionRecorder::new(embedder, store);

    let profile = FarmerProfile {
        id: farmer_id,
        location,
        ..FarmerProfile::default()
    };
    let id = recorder.write(question, answer, &profile).await?;

    print_success(&format!(
        "Saved interaction {id}: {}",
        truncate_str(question, 40)
    ));
    Ok(id)
}
