//! Route handlers.
//!
//! Each handler maps one request onto one [`PatientStore`](sencare_core::PatientStore) call
//! and wraps the answer in an [`Envelope`].

use crate::error::ApiError;
use crate::AppState;
use api_shared::{
    Envelope, HealthRes, HealthService, PatientBody, PatientInput, ReadingBody, ReadingInput,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Not behind the API key, so load balancers can poll it.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients, in insertion order", body = [PatientBody]),
        (status = 401, description = "Missing or invalid API key")
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_patients(State(state): State<AppState>) -> ApiResult<Vec<PatientBody>> {
    let patients = state.store.list_patients().await?;
    Ok(Json(Envelope::success(
        patients.iter().map(PatientBody::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientInput,
    responses(
        (status = 201, description = "Patient created", body = PatientBody),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid API key")
    )
)]
/// Create a new patient record
///
/// # Errors
/// Returns `400 Bad Request` if the body is not a patient or a text field is blank.
#[axum::debug_handler]
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    body: Result<Json<PatientInput>, JsonRejection>,
) -> Created<PatientBody> {
    let Json(input) = body?;
    let created = state.store.create_patient(&input.into_new_patient()?).await?;
    tracing::info!("created patient {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(PatientBody::from(&created))),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{pid}",
    params(("pid" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = PatientBody),
        (status = 404, description = "Unknown patient")
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> ApiResult<PatientBody> {
    let patient = state.store.get_patient(&pid).await?;
    Ok(Json(Envelope::success(PatientBody::from(&patient))))
}

#[utoipa::path(
    put,
    path = "/patients/{pid}",
    params(("pid" = String, Path, description = "Patient id")),
    request_body = PatientInput,
    responses(
        (status = 200, description = "Patient updated", body = PatientBody),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Unknown patient")
    )
)]
/// Replace every field of a patient
#[axum::debug_handler]
pub(crate) async fn update_patient(
    State(state): State<AppState>,
    Path(pid): Path<String>,
    body: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<PatientBody> {
    let Json(input) = body?;
    let updated = state.store.update_patient(&input.into_record(pid)?).await?;
    Ok(Json(Envelope::success(PatientBody::from(&updated))))
}

#[utoipa::path(
    delete,
    path = "/patients/{pid}",
    params(("pid" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient and readings deleted"),
        (status = 404, description = "Unknown patient")
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_patient(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> ApiResult<()> {
    state.store.delete_patient(&pid).await?;
    tracing::info!("deleted patient {}", pid);
    Ok(Json(Envelope::ok()))
}

#[utoipa::path(
    get,
    path = "/patients/{pid}/clinical-data",
    params(("pid" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient's readings", body = [ReadingBody]),
        (status = 404, description = "Unknown patient")
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_readings(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> ApiResult<Vec<ReadingBody>> {
    let readings = state.store.list_readings(&pid).await?;
    Ok(Json(Envelope::success(
        readings.iter().map(ReadingBody::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/patients/{pid}/clinical-data",
    params(("pid" = String, Path, description = "Patient id")),
    request_body = ReadingInput,
    responses(
        (status = 201, description = "Reading created", body = ReadingBody),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Unknown patient")
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_reading(
    State(state): State<AppState>,
    Path(pid): Path<String>,
    body: Result<Json<ReadingInput>, JsonRejection>,
) -> Created<ReadingBody> {
    let Json(input) = body?;
    let created = state
        .store
        .create_reading(&pid, &input.into_new_reading()?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(ReadingBody::from(&created))),
    ))
}

#[utoipa::path(
    put,
    path = "/patients/{pid}/clinical-data/{rid}",
    params(
        ("pid" = String, Path, description = "Patient id"),
        ("rid" = String, Path, description = "Reading id")
    ),
    request_body = ReadingInput,
    responses(
        (status = 200, description = "Reading replaced", body = ReadingBody),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Unknown patient or reading")
    )
)]
#[axum::debug_handler]
pub(crate) async fn update_reading(
    State(state): State<AppState>,
    Path((pid, rid)): Path<(String, String)>,
    body: Result<Json<ReadingInput>, JsonRejection>,
) -> ApiResult<ReadingBody> {
    let Json(input) = body?;
    let updated = state
        .store
        .update_reading(&pid, &rid, &input.into_new_reading()?)
        .await?;
    Ok(Json(Envelope::success(ReadingBody::from(&updated))))
}

#[utoipa::path(
    delete,
    path = "/patients/{pid}/clinical-data/{rid}",
    params(
        ("pid" = String, Path, description = "Patient id"),
        ("rid" = String, Path, description = "Reading id")
    ),
    responses(
        (status = 200, description = "Reading deleted"),
        (status = 404, description = "Unknown patient or reading")
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_reading(
    State(state): State<AppState>,
    Path((pid, rid)): Path<(String, String)>,
) -> ApiResult<()> {
    state.store.delete_reading(&pid, &rid).await?;
    Ok(Json(Envelope::ok()))
}
