//! Populate the context collection from a farmer data file

use std::path::Path;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::Document;
use crate::models::DocumentType;
use crate::models::FarmerProfile;
use crate::models::META_FARMER_ID;
use crate::models::META_LOCATION;
use crate::models::META_TYPE;
use crate::store::VectorStore;

const BATCH_SIZE: usize = 64;

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub farmers: usize,
    pub skipped: usize,
    pub documents: usize,
    pub total_in_store: usize,
}

/// A document ready to embed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDocument {
    pub id: String,
    pub text: String,
    pub doc_type: DocumentType,
    pub farmer_id: String,
    pub location: String,
}

impl PendingDocument {
    fn into_document(self, vector: Vec<f32>) -> Document {
        Document::new(self.id, self.text, vector)
            .with_metadata(META_TYPE, self.doc_type.as_str())
            .with_metadata(META_FARMER_ID, self.farmer_id)
            .with_metadata(META_LOCATION, self.location)
    }
}

/// Read a JSON array of farmer profiles
pub fn load_farmers<P: AsRef<Path>>(path: P) -> Result<Vec<FarmerProfile>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Split one farmer into profile, challenges and previous-query documents
///
/// Farmers without an id yield nothing.
pub fn farmer_documents(farmer: &FarmerProfile) -> Vec<PendingDocument> {
    let Some(farmer_id) = farmer.id.as_deref().filter(|id| !id.trim().is_empty()) else {
        return Vec::new();
    };

    let location = field(farmer.location.as_deref());
    let crops = farmer.crops_joined();
    let land = field(farmer.land_size.as_deref());
    let soil = field(farmer.soil_type.as_deref());
    let irrigation = field(farmer.irrigation.as_deref());

    let pending = |suffix: String, text: String, doc_type: DocumentType| PendingDocument {
        id: format!("{farmer_id}_{suffix}"),
        text,
        doc_type,
        farmer_id: farmer_id.to_string(),
        location: location.to_string(),
    };

    let mut documents = vec![pending(
        "profile".to_string(),
        format!(
            "Farmer: {}\nLocation: {location}\nCrops: {crops}\nLand size: {land}\nSoil type: {soil}\nIrrigation: {irrigation}",
            field(farmer.name.as_deref())
        ),
        DocumentType::Profile,
    )];

    if let Some(challenges) = farmer.challenges.as_deref().filter(|c| !c.trim().is_empty()) {
        documents.push(pending(
            "challenges".to_string(),
            format!(
                "Farmer from {location} growing {crops}.\nChallenges: {challenges}\nSoil: {soil}, Irrigation: {irrigation}"
            ),
            DocumentType::Challenges,
        ));
    }

    for (idx, query) in farmer.previous_queries.iter().enumerate() {
        documents.push(pending(
            format!("query_{idx}"),
            format!(
                "Question from {location} farmer growing {crops}: {query}\nContext: {soil} soil, {land} land"
            ),
            DocumentType::Query,
        ));
    }

    documents
}

/// Embed and upsert every document derived from `farmers`
///
/// Ids are deterministic, so re-running replaces rather than duplicates.
pub async fn populate(
    farmers: &[FarmerProfile],
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let mut pending = Vec::new();

    for farmer in farmers {
        let documents = farmer_documents(farmer);
        if documents.is_empty() {
            warn!("Skipping farmer without id: {:?}", farmer.name);
            report.skipped += 1;
            continue;
        }
        report.farmers += 1;
        pending.extend(documents);
    }

    info!(
        "Generating embeddings for {} documents from {} farmers",
        pending.len(),
        report.farmers
    );

    let batches = pending.len().div_ceil(BATCH_SIZE);
    for (batch_idx, chunk) in pending.chunks(BATCH_SIZE).enumerate() {
        let texts: Vec<&str> = chunk.iter().map(|d| d.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        let documents = chunk
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(doc, vector)| doc.into_document(vector))
            .collect();
        store.upsert_batch(documents).await?;
        report.documents += chunk.len();

        info!("Stored batch {}/{}", batch_idx + 1, batches);
    }

    report.total_in_store = store.count().await?;
    info!(
        "Added {} documents, collection now holds {}",
        report.documents, report.total_in_store
    );
    Ok(report)
}

fn field(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::embeddings::HashEmbedder;
    use crate::store::InMemoryVectorStore;

    fn gurpreet() -> FarmerProfile {
        serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Gurpreet Singh",
                "location": "Punjab",
                "crops": ["Wheat", "Rice"],
                "land_size": "10 acres",
                "soil_type": "Alluvial",
                "irrigation": "Tube well",
                "challenges": "Falling groundwater",
                "previous_queries": ["When to sow wheat?", "Stubble management options"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_farmer_documents_ids_and_text() {
        let docs = farmer_documents(&gurpreet());
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1_profile", "1_challenges", "1_query_0", "1_query_1"]);

        assert_eq!(
            docs[0].text,
            "Farmer: Gurpreet Singh\nLocation: Punjab\nCrops: Wheat, Rice\nLand size: 10 acres\nSoil type: Alluvial\nIrrigation: Tube well"
        );
        assert!(docs[1].text.starts_with("Farmer from Punjab growing Wheat, Rice."));
        assert_eq!(
            docs[2].text,
            "Question from Punjab farmer growing Wheat, Rice: When to sow wheat?\nContext: Alluvial soil, 10 acres land"
        );
        assert!(docs.iter().all(|d| d.farmer_id == "1" && d.location == "Punjab"));
    }

    #[test]
    fn test_farmer_without_challenges_or_id() {
        let mut farmer = gurpreet();
        farmer.challenges = None;
        farmer.previous_queries.clear();
        assert_eq!(farmer_documents(&farmer).len(), 1);

        farmer.id = None;
        assert!(farmer_documents(&farmer).is_empty());
    }

    #[tokio::test]
    async fn test_populate_is_idempotent() {
        let embedder = HashEmbedder::new(32).unwrap();
        let store = InMemoryVectorStore::new();
        let farmers = vec![gurpreet(), FarmerProfile::default()];

        let report = populate(&farmers, &embedder, &store).await.unwrap();
        assert_eq!(
            report,
            IngestReport {
                farmers: 1,
                skipped: 1,
                documents: 4,
                total_in_store: 4
            }
        );

        let again = populate(&farmers, &embedder, &store).await.unwrap();
        assert_eq!(again.total_in_store, 4);

        let by_type = store.count_by_type().await.unwrap();
        assert_eq!(by_type.get("query"), Some(&2));
    }

    #[test]
    fn test_load_farmers_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a1", "name": "Meena", "crops": ["Bajra"]}}]"#).unwrap();
        let farmers = load_farmers(file.path()).unwrap();
        assert_eq!(farmers.len(), 1);
        assert_eq!(farmers[0].id.as_deref(), Some("a1"));
    }
}
