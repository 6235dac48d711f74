use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use edumate_core::{Curriculum, StepDetail};
use edumate_service::NewCurriculum;

use super::request_token;
use crate::AppState;
use crate::api_error::ApiError;
use crate::request_types::{ApiJson, CreateCurriculumRequest, ModifyCurriculumRequest, NamedCurriculumRequest};
use crate::response_types::{CurriculumListResponse, DetailedStepsResponse, RoadmapResponse, SuccessResponse};

pub async fn generate_curriculum(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCurriculumRequest>,
) -> Result<Json<Curriculum>, ApiError> {
    let (cancel, _guard) = request_token();
    let request = NewCurriculum {
        subject: req.subject,
        syllabus_url: req.syllabus_url,
        time_constraint: req.time_constraint,
    };
    Ok(Json(state.services.curricula.generate(request, &cancel).await?))
}

pub async fn get_curriculum(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Curriculum>, ApiError> {
    Ok(Json(state.services.curricula.get(&id).await?))
}

pub async fn modify_curriculum(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ModifyCurriculumRequest>,
) -> Result<Json<Curriculum>, ApiError> {
    let (cancel, _guard) = request_token();
    Ok(Json(state.services.curricula.modify(&id, &req.modification_text, &cancel).await?))
}

pub async fn generate_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DetailedStepsResponse>, ApiError> {
    let (cancel, _guard) = request_token();
    let detailed_steps = state.services.curricula.generate_details(&id, &cancel).await?;
    Ok(Json(DetailedStepsResponse { curriculum_id: id, detailed_steps }))
}

pub async fn get_step_detail(
    State(state): State<Arc<AppState>>,
    Path((id, step)): Path<(String, usize)>,
) -> Result<Json<StepDetail>, ApiError> {
    let (cancel, _guard) = request_token();
    Ok(Json(state.services.curricula.step_detail(&id, step, &cancel).await?))
}

pub async fn get_roadmap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoadmapResponse>, ApiError> {
    let roadmap = state.services.curricula.roadmap(&id).await?;
    Ok(Json(RoadmapResponse { curriculum_id: id, roadmap }))
}

pub async fn list_curriculums(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurriculumListResponse>, ApiError> {
    Ok(Json(CurriculumListResponse { curriculums: state.services.curricula.list().await? }))
}

pub async fn create_curriculum(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NamedCurriculumRequest>,
) -> Result<Json<Curriculum>, ApiError> {
    Ok(Json(state.services.curricula.create_empty(&req.curriculum_name).await?))
}

pub async fn delete_curriculum(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.services.curricula.delete(&id).await?;
    Ok(Json(SuccessResponse::ok(format!("Curriculum {id} deleted"))))
}
