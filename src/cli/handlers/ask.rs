//! Ask command handler: answer one question and print JSON

use crate::rag::ChatRequest;
use crate::rag::ChatResponse;
use crate::rag::ChatService;
use crate::rag::GenerationMode;
use crate::AgriSenseError;
use crate::AppConfig;
use crate::Result;

/// Build the request from either a JSON payload or plain flags
pub fn parse_ask_request(
    payload: Option<&str>,
    message: Option<&str>,
    language: &str,
) -> Result<ChatRequest> {
    match (payload, message) {
        (Some(payload), _) => serde_json::from_str(payload)
            .map_err(|e| AgriSenseError::InvalidInput(format!("Invalid JSON payload: {e}"))),
        (None, Some(message)) => Ok(ChatRequest::new(message).with_language(language)),
        (None, None) => Err(AgriSenseError::InvalidInput(
            "Missing arguments".to_string(),
        )),
    }
}

/// Answer one question; the JSON response goes to stdout
///
/// Pending memory writes are drained before returning so the answer is
/// cached for the next invocation.
pub async fn handle_ask(
    config: &AppConfig,
    request: ChatRequest,
    mode: Option<GenerationMode>,
) -> Result<ChatResponse> {
    let service = ChatService::from_config(config).await?;
    let mode = mode.unwrap_or_else(|| service.mode());

    let result = service.answer_with_mode(request, mode).await;
    service.memory().shutdown().await;

    let response = result?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_payload() {
        let request = parse_ask_request(
            Some(r#"{"message":"Pest in cotton?","language":"hindi","farmer_profile":{"location":"Gujarat"}}"#),
            None,
            "english",
        )
        .unwrap();
        assert_eq!(request.message, "Pest in cotton?");
        assert_eq!(request.language, "hindi");
        assert_eq!(request.farmer_profile.location.as_deref(), Some("Gujarat"));
    }

    #[test]
    fn test_parse_flags() {
        let request = parse_ask_request(None, Some("When to sow?"), "punjabi").unwrap();
        assert_eq!(request.language, "punjabi");
        assert!(request.farmer_profile.is_empty());
    }

    #[test]
    fn test_parse_errors_are_client_errors() {
        assert!(parse_ask_request(None, None, "english")
            .unwrap_err()
            .is_client_error());
        assert!(parse_ask_request(Some("{not json"), None, "english")
            .unwrap_err()
            .is_client_error());
    }
}
