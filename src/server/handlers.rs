use super::{ApiError, AppState, ClientIdentity};
use crate::advisor::{
    parse_calibration, AnalysisRequest, DailyTipsRequest, NutritionData, WorkoutData,
};
use crate::cache::{CacheSnapshot, RequestContext};
use crate::types::{ClientProfile, Specialist, SpecialistReply};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

type Shared = State<Arc<AppState>>;
type ApiResult = std::result::Result<Json<Value>, ApiError>;
type Body<T> = std::result::Result<Json<T>, JsonRejection>;

/// Unwraps a JSON body, turning extractor rejections into a 400 envelope.
fn parse_body<T>(body: Body<T>) -> std::result::Result<T, ApiError> {
    body.map(|Json(inner)| inner).map_err(|rejection| {
        info!(error = %rejection.body_text(), "rejected request body");
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    })
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn test() -> Json<Value> {
    Json(json!({
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn get_ai_key(State(state): Shared) -> Json<Value> {
    if state.config.use_ai_proxy {
        return Json(json!({
            "success": true,
            "useProxy": true,
            "message": "Server-side proxy is in use",
        }));
    }
    match state.config.upstream.api_key.as_deref() {
        Some(key) => Json(json!({ "success": true, "apiKey": key })),
        None => Json(json!({
            "success": false,
            "message": "API key is not configured, use the proxy",
        })),
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    model: Option<String>,
    /// Forwarded untouched, whatever roles or content parts they carry.
    #[serde(default)]
    messages: Vec<Value>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    temperature: Option<f64>,
}

pub async fn query(State(state): Shared, body: Body<QueryBody>) -> ApiResult {
    let body = parse_body(body)?;
    if !state.chat.has_api_key() {
        return Err(ApiError::internal("API key is not configured on the server"));
    }

    let model = body
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| state.chat.model().to_string());
    let request = json!({
        "model": model,
        "messages": body.messages,
        "max_tokens": body.max_tokens.unwrap_or(1000),
        "temperature": body.temperature.unwrap_or(0.7),
    });

    match state.chat.forward(&request).await {
        Ok(completion) => Ok(Json(json!({
            "success": true,
            "choices": completion.choices,
        }))),
        Err(e) => {
            error!(error = %e, "query proxy failed");
            Err(ApiError::internal(e.public_message()))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutBody {
    #[serde(default)]
    workout_data: WorkoutData,
}

pub async fn analyze_workout(State(state): Shared, body: Body<WorkoutBody>) -> ApiResult {
    let body = parse_body(body)?;
    let analysis = AnalysisRequest::workout(&body.workout_data)
        .run(&state.chat)
        .await
        .map_err(|e| {
            error!(error = %e, "workout analysis failed");
            ApiError::internal("Failed to analyse the workout")
        })?;
    Ok(Json(json!({ "success": true, "analysis": analysis })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionBody {
    #[serde(default)]
    nutrition_data: NutritionData,
}

pub async fn analyze_nutrition(
    State(state): Shared,
    body: Body<NutritionBody>,
) -> ApiResult {
    let body = parse_body(body)?;
    let analysis = AnalysisRequest::nutrition(&body.nutrition_data)
        .run(&state.chat)
        .await
        .map_err(|e| {
            error!(error = %e, "nutrition analysis failed");
            ApiError::internal("Failed to analyse the nutrition plan")
        })?;
    Ok(Json(json!({ "success": true, "analysis": analysis })))
}

#[derive(Debug, Deserialize)]
pub struct CalibrationBody {
    #[serde(default)]
    answers: Vec<Value>,
}

pub async fn calibrate_energy(
    State(state): Shared,
    body: Body<CalibrationBody>,
) -> ApiResult {
    let body = parse_body(body)?;
    let content = AnalysisRequest::energy_calibration(&body.answers)
        .run(&state.chat)
        .await
        .map_err(|e| {
            error!(error = %e, "energy calibration failed");
            ApiError::internal("Failed to run the energy calibration")
        })?;
    Ok(Json(json!({
        "success": true,
        "calibration": parse_calibration(&content),
    })))
}

pub async fn daily_tips(State(state): Shared, body: Body<DailyTipsRequest>) -> ApiResult {
    let body = parse_body(body)?;
    let tips = AnalysisRequest::daily_tips(&body)
        .run(&state.chat)
        .await
        .map_err(|e| {
            error!(error = %e, "daily tips generation failed");
            ApiError::internal("Failed to generate tips")
        })?;
    Ok(Json(json!({ "success": true, "tips": tips })))
}

/// Activation is always reported complete; the bot and sheet integrations
/// are not part of this server.
pub async fn activation_status(Path(user_id): Path<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "userId": user_id,
        "status": "active",
        "currentStep": 3,
        "hasSheet": true,
        "hasTelegram": true,
        "isActivated": true,
    }))
}

pub async fn check_user(Path(user_id): Path<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "userId": user_id,
        "name": "Demo User",
        "username": "demo_user",
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistBody {
    #[serde(default)]
    user_data: Option<ClientProfile>,
}

pub async fn trainer(
    state: Shared,
    client: ClientIdentity,
    body: Body<SpecialistBody>,
) -> (StatusCode, Json<SpecialistReply>) {
    advise(Specialist::Trainer, state, client, body).await
}

pub async fn diet(
    state: Shared,
    client: ClientIdentity,
    body: Body<SpecialistBody>,
) -> (StatusCode, Json<SpecialistReply>) {
    advise(Specialist::Diet, state, client, body).await
}

pub async fn energy(
    state: Shared,
    client: ClientIdentity,
    body: Body<SpecialistBody>,
) -> (StatusCode, Json<SpecialistReply>) {
    advise(Specialist::Energy, state, client, body).await
}

async fn advise(
    specialist: Specialist,
    State(state): Shared,
    client: ClientIdentity,
    body: Body<SpecialistBody>,
) -> (StatusCode, Json<SpecialistReply>) {
    let body = match parse_body(body) {
        Ok(body) => body,
        Err(e) => {
            return (
                e.status,
                Json(SpecialistReply::failure(specialist, e.message)),
            )
        }
    };
    let Some(profile) = body.user_data else {
        return (
            StatusCode::BAD_REQUEST,
            Json(SpecialistReply::failure(specialist, "userData is required")),
        );
    };

    info!(specialist = specialist.as_str(), client = %client.identity, "specialist request");
    let prompt = profile.to_prompt();
    let ctx = RequestContext::new(client.identity, client.agent, specialist.path(), profile);
    let advisor = Arc::clone(&state.advisor);
    let reply = state
        .pipeline
        .handle(&ctx, move || async move {
            let advice = advisor.generate(&prompt, specialist).await;
            SpecialistReply::advice(specialist, advice)
        })
        .await;
    (StatusCode::OK, Json(reply))
}

pub async fn cache_stats(State(state): Shared) -> Json<CacheSnapshot> {
    Json(state.stats.snapshot().await)
}

pub async fn cache_metrics(State(state): Shared) -> Json<Value> {
    let stats = state.pipeline.stats();
    Json(json!({
        "success": true,
        "backend": state.pipeline.store().name(),
        "hitRatio": stats.hit_ratio(),
        "hits": stats.hits,
        "misses": stats.misses,
        "stale": stats.stale,
        "writes": stats.writes,
        "errors": stats.errors,
    }))
}
