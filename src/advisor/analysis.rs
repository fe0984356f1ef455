//! One-off analysis prompts (workout, nutrition, energy calibration, daily tips).
//!
//! These calls are not cached and, unlike [`super::AdviceGenerator`], report
//! upstream failures to the caller.

use crate::client::ChatClient;
use crate::types::profile::display_value;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json\n(.*?)\n```").expect("valid fenced-json pattern")
});
static BARE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutData {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(default)]
    pub exercises: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutritionData {
    #[serde(default)]
    pub focus: Option<Value>,
    #[serde(default)]
    pub meals: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTipsRequest {
    #[serde(default)]
    pub day_number: Option<Value>,
    #[serde(default)]
    pub workout_type: Option<Value>,
    #[serde(default)]
    pub nutrition_focus: Option<Value>,
    #[serde(default)]
    pub user_preferences: Option<Value>,
}

/// A single system + user prompt pair with its sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub system: &'static str,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl AnalysisRequest {
    pub fn workout(data: &WorkoutData) -> Self {
        Self {
            system: "You are a professional fitness trainer with a medical background.",
            prompt: format!(
                "As an expert in fitness and neurobiology, analyse this workout:\n\n\
                 Title: {}\n\
                 Type: {}\n\
                 Exercises: {}\n\n\
                 Give an analysis point by point:\n\
                 1. Target muscle groups\n\
                 2. Potential for strength/endurance growth\n\
                 3. Impact on energy metabolism\n\
                 4. Safety technique recommendations\n\
                 5. Modifications for different fitness levels\n\n\
                 Answer scientifically but accessibly.",
                display_value(data.title.as_ref()),
                display_value(data.kind.as_ref()),
                display_value(data.exercises.as_ref()),
            ),
            max_tokens: 1500,
            temperature: 0.7,
        }
    }

    pub fn nutrition(data: &NutritionData) -> Self {
        Self {
            system: "You are an experienced dietitian-nutritionist specialising in energy metabolism.",
            prompt: format!(
                "As a professional dietitian, analyse this nutrition plan:\n\n\
                 Focus of the day: {}\n\
                 Meals: {}\n\n\
                 Analyse:\n\
                 1. Balance of protein, fat and carbohydrates\n\
                 2. Adequacy of calorie intake\n\
                 3. Impact on blood sugar levels\n\
                 4. Potential for sustained energy\n\
                 5. Recommendations for improvement\n\n\
                 Keep in mind this is part of a 7-week energy management course.\n\
                 Answer professionally but practically.",
                display_value(data.focus.as_ref()),
                display_value(data.meals.as_ref()),
            ),
            max_tokens: 1500,
            temperature: 0.7,
        }
    }

    pub fn energy_calibration(answers: &[Value]) -> Self {
        let answers = answers
            .iter()
            .map(|a| display_value(Some(a)))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            system: "You are a specialist in chronotypes, circadian rhythms and energy management.",
            prompt: format!(
                "Based on these answers, determine the energy type and give recommendations:\n\n\
                 User answers: {}\n\n\
                 Determine:\n\
                 1. Likely chronotype (lark, owl, bear, lion, wolf, dolphin)\n\
                 2. Peak productivity periods\n\
                 3. Workout recommendations\n\
                 4. Nutrition recommendations\n\
                 5. Optimal daily routine\n\n\
                 Respond in JSON with the structure:\n\
                 {{\n\
                 \x20   \"energyType\": \"string\",\n\
                 \x20   \"productivityPeaks\": [\"morning\", \"afternoon\", \"evening\"],\n\
                 \x20   \"workoutRecommendations\": \"string\",\n\
                 \x20   \"nutritionRecommendations\": \"string\",\n\
                 \x20   \"dailySchedule\": \"string\",\n\
                 \x20   \"keyInsights\": [\"insight1\", \"insight2\"]\n\
                 }}",
                answers
            ),
            max_tokens: 2000,
            temperature: 0.3,
        }
    }

    pub fn daily_tips(req: &DailyTipsRequest) -> Self {
        let preferences = req
            .user_preferences
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "null".to_string());
        Self {
            system: "You are a personal coach for productivity and energy management.",
            prompt: format!(
                "Generate personalised tips for day {} of the energy management course.\n\n\
                 Context:\n\
                 - Workout type: {}\n\
                 - Nutrition focus: {}\n\
                 - User preferences: {}\n\n\
                 Give 5 practical tips on:\n\
                 1. Preparing for the workout\n\
                 2. Exercise technique\n\
                 3. Recovery afterwards\n\
                 4. Nutrition for energy\n\
                 5. Mental attitude\n\n\
                 Be specific, practical and motivating.",
                display_value(req.day_number.as_ref()),
                display_value(req.workout_type.as_ref()),
                display_value(req.nutrition_focus.as_ref()),
                preferences,
            ),
            max_tokens: 1500,
            temperature: 0.8,
        }
    }

    pub async fn run(&self, client: &ChatClient) -> Result<String> {
        client
            .chat()
            .system(self.system)
            .user(self.prompt.as_str())
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .execute()
            .await
    }
}

/// Extracts the calibration object from model output.
///
/// Prefers a fenced ```json block, then the widest `{...}` span. Output that
/// holds no parseable JSON is wrapped as `{"analysis": <text>}`.
pub fn parse_calibration(content: &str) -> Value {
    let candidate = FENCED_JSON
        .captures(content)
        .and_then(|c| c.get(1))
        .or_else(|| BARE_OBJECT.find(content))
        .map(|m| m.as_str());

    candidate
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .unwrap_or_else(|| serde_json::json!({ "analysis": content }))
}
