/*!
 * Tests for provider implementations behind the translation client
 */

use std::time::Duration;

use slidelingo::errors::FailureKind;
use slidelingo::providers::gemini::{Gemini, GeminiResponse};
use slidelingo::providers::mock::MockProvider;
use slidelingo::providers::{Provider, TranslationRequest};
use slidelingo::translation::client::clean_response;
use slidelingo::translation::{TranslationClient, Translator};

fn request(temperature: Option<f32>) -> TranslationRequest {
    TranslationRequest {
        text: "Next steps".to_string(),
        target_language: "de".to_string(),
        target_language_name: "German".to_string(),
        model: "gemini-2.5-flash".to_string(),
        context: "PowerPoint presentation content".to_string(),
        temperature,
    }
}

#[tokio::test]
async fn test_translation_client_withMockProvider_shouldCountRequests() {
    let client = TranslationClient::new(MockProvider::working(), "mock");

    assert_eq!(client.translate("Growth", "es").await.unwrap(), "[es] Growth");
    assert_eq!(client.translate("Region", "es").await.unwrap(), "[es] Region");
    assert_eq!(client.provider().request_count(), 2);
}

#[tokio::test]
async fn test_translation_client_withFailingProvider_shouldClassifyAsTransient() {
    let client = TranslationClient::new(MockProvider::failing(), "mock");
    let error = client.translate("Growth", "es").await.unwrap_err();
    assert_eq!(error.kind(), FailureKind::Transient);
}

#[tokio::test]
async fn test_translation_client_withQuotedResponse_shouldStripQuotes() {
    let client = TranslationClient::new(
        MockProvider::working().with_custom_response(|req| format!("  \"{}!\"\n", req.text)),
        "mock",
    );
    assert_eq!(client.translate("Hola", "es").await.unwrap(), "Hola!");
}

#[test]
fn test_clean_response_withQuotedPhrasesAtBothEnds_shouldKeepResponse() {
    assert_eq!(clean_response("\"Oui\" ou \"non\"", "Yes or no"), "\"Oui\" ou \"non\"");
    assert_eq!(
        clean_response("'Start' drücken, dann 'Stop'", "Press 'Start' then 'Stop'"),
        "'Start' drücken, dann 'Stop'"
    );
    assert_eq!(clean_response(" Merci\n", "Thanks"), "Merci");
}

#[test]
fn test_gemini_build_request_withoutTemperature_shouldOmitGenerationConfig() {
    let gemini = Gemini::new("key", "", Duration::from_secs(30));
    let body = serde_json::to_value(gemini.build_request(&request(None))).unwrap();
    assert!(body.get("generationConfig").is_none());
}

#[test]
fn test_gemini_extract_text_withCandidateParts_shouldJoinText() {
    let response: GeminiResponse = serde_json::from_str(
        r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Nächste "}, {"text": "Schritte"}]},
            "finishReason": "STOP"}], "usageMetadata": {"promptTokenCount": 80, "candidatesTokenCount": 4}}"#,
    )
    .unwrap();

    assert_eq!(Gemini::extract_text(&response), "Nächste Schritte");
    assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 80);
}

#[tokio::test]
async fn test_gemini_withUnreachableEndpoint_shouldClassifyAsTransient() {
    let client = TranslationClient::new(
        Gemini::new("key", "http://127.0.0.1:9", Duration::from_secs(5)),
        "gemini-2.5-flash",
    )
    .with_timeout(Duration::from_secs(5));

    let error = client.translate("Growth", "fr").await.unwrap_err();
    assert!(matches!(error.kind(), FailureKind::Transient | FailureKind::Timeout));
}
