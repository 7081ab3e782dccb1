//! Prompt templates for both generation modes

use crate::models::Language;

/// System prompt for grounded answers
pub fn grounded_system_prompt(language: Language) -> String {
    format!(
        r"You are AgriSense, an expert agricultural AI assistant for Indian farmers.
You provide personalized, practical advice based on the farmer's profile and similar past queries.

Respond entirely in {}.

Guidelines:
- Be specific and actionable
- Consider local conditions (soil, climate, crops)
- Reference government schemes when relevant
- Provide step-by-step guidance
- Use simple, farmer-friendly language",
        language.display_name()
    )
}

/// User prompt for grounded answers
///
/// `profile_section` and `context_section` come from
/// [`ContextAssembler`](super::ContextAssembler) and may be empty.
pub fn grounded_user_prompt(
    profile_section: &str,
    context_section: &str,
    question: &str,
    language: Language,
) -> String {
    format!(
        "{profile_section}{context_section}\n\nFarmer's Question: {question}\n\nProvide a detailed, helpful answer in {}.",
        language.display_name()
    )
}

/// System prompt for short direct answers
pub fn fast_system_prompt(language: Language) -> String {
    format!(
        "You are AgriSense, an expert agricultural AI assistant. \
         Answer the user's question directly in {}. \
         Keep your answer practical, concise (max 2-3 sentences), and helpful.",
        language.display_name()
    )
}

/// User prompt for short direct answers
pub fn fast_user_prompt(profile_summary: &str, question: &str) -> String {
    format!("FARMER PROFILE: {profile_summary}\n\nQUESTION: {question}\n\nANSWER:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounded_prompts_name_language() {
        let system = grounded_system_prompt(Language::Punjabi);
        assert!(system.contains("Respond entirely in Punjabi."));
        assert!(system.contains("- Reference government schemes when relevant"));

        let user = grounded_user_prompt("", "", "How to save water?", Language::Hindi);
        assert!(user.contains("Farmer's Question: How to save water?"));
        assert!(user.ends_with("Provide a detailed, helpful answer in Hindi."));
    }

    #[test]
    fn test_fast_prompts() {
        let system = fast_system_prompt(Language::English);
        assert!(system.contains("directly in English."));
        assert!(system.contains("max 2-3 sentences"));

        let user = fast_user_prompt("Name: Farmer, Location: India, Crops: ", "Pest in cotton?");
        assert_eq!(
            user,
            "FARMER PROFILE: Name: Farmer, Location: India, Crops: \n\nQUESTION: Pest in cotton?\n\nANSWER:"
        );
    }
}
