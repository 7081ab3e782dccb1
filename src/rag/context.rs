//! Prompt sections built from the farmer profile and retrieved contexts

use crate::models::FarmerProfile;
use crate::rag::RetrievedContext;

/// Assembler for the profile and context parts of a prompt
pub struct ContextAssembler {
    max_contexts: usize,
    max_context_length: usize,
}

impl ContextAssembler {
    /// `max_contexts` caps how many retrieved documents reach the prompt;
    /// `max_context_length` caps the context section in bytes
    #[must_use]
    pub const fn new(max_contexts: usize, max_context_length: usize) -> Self {
        Self {
            max_contexts,
            max_context_length,
        }
    }

    /// Numbered list of the top retrieved documents, empty when none fit
    #[must_use]
    pub fn context_section(&self, contexts: &[RetrievedContext]) -> String {
        let header = "\n\nRelevant farmer contexts and past queries:\n";
        let mut body = String::new();
        let mut total_length = header.len();

        for (idx, context) in contexts.iter().take(self.max_contexts).enumerate() {
            let entry = format!("{}. {}\n", idx + 1, context.text);
            if total_length + entry.len() > self.max_context_length {
                break;
            }
            body.push_str(&entry);
            total_length += entry.len();
        }

        if body.is_empty() {
            String::new()
        } else {
            format!("{header}{body}")
        }
    }

    /// Detailed profile block for grounded prompts, empty for an empty profile
    #[must_use]
    pub fn profile_section(&self, profile: &FarmerProfile) -> String {
        if profile.is_empty() {
            return String::new();
        }

        let mut section = String::from("\n\nCurrent farmer profile:\n");
        section.push_str(&format!("Name: {}\n", or_unknown(profile.name.as_deref())));
        section.push_str(&format!("Location: {}\n", or_unknown(profile.location.as_deref())));
        section.push_str(&format!("Crops: {}\n", profile.crops_joined()));
        section.push_str(&format!("Land: {}\n", or_unknown(profile.land_size.as_deref())));
        section.push_str(&format!("Soil: {}\n", or_unknown(profile.soil_type.as_deref())));
        section.push_str(&format!(
            "Irrigation: {}\n",
            or_unknown(profile.irrigation.as_deref())
        ));
        if let Some(challenges) = profile.challenges.as_deref().filter(|c| !c.trim().is_empty()) {
            section.push_str(&format!("Known challenges: {challenges}\n"));
        }
        section
    }

    /// One-line profile for fast prompts
    #[must_use]
    pub fn profile_summary(&self, profile: &FarmerProfile) -> String {
        format!(
            "Name: {}, Location: {}, Crops: {}",
            profile.name.as_deref().unwrap_or("Farmer"),
            profile.location.as_deref().unwrap_or("India"),
            profile.crops_joined()
        )
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(3, 4000)
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("Unknown")
}
