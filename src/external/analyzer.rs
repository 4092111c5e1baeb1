// ABOUTME: Gemini-backed meal photo analysis and diet plan generation client
// ABOUTME: Sends vision/chat requests expecting structured JSON back, no retries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Meal Analyzer
//!
//! The analyzer is an opaque capability: given a meal photo it returns
//! structured macro JSON, or it fails. The concrete client talks to the
//! Gemini `generateContent` endpoint with `response_mime_type` set to JSON
//! so the model answers with a parseable document.
//!
//! [`MockAnalyzer`] provides canned responses for tests and local
//! development without an API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::AnalyzerConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{BiometricProfile, MealAnalysis};

/// Opaque AI analysis capability
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    /// Estimate macro-nutrients for one meal photo
    async fn analyze_meal_photo(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> AppResult<MealAnalysis>;

    /// Generate a diet plan from a biometric profile
    async fn generate_diet_plan(&self, profile: &BiometricProfile) -> AppResult<Value>;
}

const MEAL_PROMPT: &str = "Analyze the meal in this photo. Respond with JSON only: \
{\"title\": short meal description, \"confidence\": 0..1, \
\"macros\": {\"calories\": number, \"protein_g\": number, \
\"carbs_g\": number, \"fats_g\": number}}. Estimate totals for the whole \
visible portion.";

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Gemini-backed analyzer
pub struct GeminiAnalyzer {
    client: Client,
    config: AnalyzerConfig,
}

impl GeminiAnalyzer {
    /// Create an analyzer from configuration
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        )
    }

    async fn generate(&self, request: &Value) -> AppResult<Value> {
        if self.config.api_key.is_empty() {
            return Err(AppError::external_service("gemini", "API key not configured"));
        }

        debug!(model = %self.config.model, "sending Gemini request");
        let response = self
            .client
            .post(self.build_url())
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::external_service("gemini", format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::external_service("gemini", format!("read failed: {e}")))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(AppError::external_service(
                "gemini",
                format!("status {status}"),
            ));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service("gemini", format!("unparseable response: {e}"))
        })?;

        if let Some(err) = parsed.error {
            return Err(AppError::external_service("gemini", err.message));
        }

        let text = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| AppError::external_service("gemini", "empty response"))?;

        parse_json_document(&text)
            .ok_or_else(|| AppError::external_service("gemini", "response is not JSON"))
    }
}

/// Extract the JSON document from model output, tolerating markdown fences
fn parse_json_document(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    serde_json::from_str(text.get(start..=end)?).ok()
}

#[async_trait]
impl MealAnalyzer for GeminiAnalyzer {
    async fn analyze_meal_photo(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> AppResult<MealAnalysis> {
        let request = json!({
            "contents": [{
                "parts": [
                    {"text": MEAL_PROMPT},
                    {"inline_data": {"mime_type": mime_type, "data": image_base64}}
                ]
            }],
            "generationConfig": {"response_mime_type": "application/json"}
        });
        let value = self.generate(&request).await?;
        serde_json::from_value(value).map_err(|e| {
            AppError::external_service("gemini", format!("unexpected analysis shape: {e}"))
        })
    }

    async fn generate_diet_plan(&self, profile: &BiometricProfile) -> AppResult<Value> {
        let prompt = format!(
            "Create a one-week diet plan as JSON with daily meals and macro \
             targets for a person: height {:.0} cm, weight {:.1} kg, sex {}, \
             activity level {}, goal {}. Respond with JSON only.",
            profile.height_cm,
            profile.weight_kg,
            profile.sex.as_deref().unwrap_or("unspecified"),
            profile.activity_level.as_deref().unwrap_or("unspecified"),
            profile.goal.as_deref().unwrap_or("maintain"),
        );
        let request = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"response_mime_type": "application/json"}
        });
        self.generate(&request).await
    }
}

/// Canned analyzer for tests and keyless local runs
pub struct MockAnalyzer {
    /// Analysis returned by every photo call
    pub analysis: MealAnalysis,
    /// Plan returned by every plan call
    pub plan: Value,
    /// When set, every call fails with an external error instead
    pub fail: bool,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self {
            analysis: MealAnalysis {
                title: "Grilled chicken with rice".to_owned(),
                macros: crate::models::MacroTotals {
                    calories: 640.0,
                    protein_g: 45.0,
                    carbs_g: 70.0,
                    fats_g: 18.0,
                },
                confidence: Some(0.9),
            },
            plan: json!({"days": []}),
            fail: false,
        }
    }
}

#[async_trait]
impl MealAnalyzer for MockAnalyzer {
    async fn analyze_meal_photo(
        &self,
        _image_base64: &str,
        _mime_type: &str,
    ) -> AppResult<MealAnalysis> {
        if self.fail {
            return Err(AppError::external_service("mock", "analysis failed"));
        }
        Ok(self.analysis.clone())
    }

    async fn generate_diet_plan(&self, _profile: &BiometricProfile) -> AppResult<Value> {
        if self.fail {
            return Err(AppError::external_service("mock", "plan generation failed"));
        }
        Ok(self.plan.clone())
    }
}
