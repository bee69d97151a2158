//! REST API - patient record endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use patient_records_core::{
    FieldError, NewPatient, PatientFields, PatientStore, PatientTable, RecordError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Build the router over a store handle.
pub fn routes(store: PatientStore) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/about", get(about))
        .route("/view", get(view_all))
        .route("/patient/:id", get(view_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit/:id", put(edit_patient))
        .route("/delete/:id", delete(delete_patient))
        .with_state(Arc::new(store))
}

type SharedStore = Arc<PatientStore>;

/// Error body returned by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Maps store errors and unreadable request bodies onto HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Record(RecordError),
    /// Body is not a JSON object (bad syntax, wrong content type, ...)
    Body(JsonRejection),
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        ApiError::Record(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Body(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Record(err) => err,
            ApiError::Body(rejection) => {
                let body = ErrorBody {
                    detail: rejection.body_text(),
                    fields: Vec::new(),
                };
                return (rejection.status(), Json(body)).into_response();
            }
        };

        let (status, body) = match err {
            RecordError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    detail: "Patient record not found".into(),
                    fields: Vec::new(),
                },
            ),
            RecordError::Conflict(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    detail: "Patient already exists".into(),
                    fields: Vec::new(),
                },
            ),
            RecordError::InvalidArgument(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    detail,
                    fields: Vec::new(),
                },
            ),
            RecordError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    detail: errors.to_string(),
                    fields: errors.errors().to_vec(),
                },
            ),
            other @ (RecordError::Io(_) | RecordError::Json(_)) => {
                error!(error = %other, "patient store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        detail: "Patient store unavailable".into(),
                        fields: Vec::new(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

async fn hello() -> Json<Value> {
    message("Patient Management System API")
}

async fn about() -> Json<Value> {
    message("A fully functional API to manage patient records")
}

async fn view_all(State(store): State<SharedStore>) -> ApiResult<Json<PatientTable>> {
    Ok(Json(store.all()?))
}

async fn view_patient(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(store.get(&id)?))
}

#[derive(Debug, Deserialize)]
struct SortParams {
    sortby: String,
    #[serde(default = "default_order")]
    order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

async fn sort_patients(
    State(store): State<SharedStore>,
    Query(params): Query<SortParams>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(store.list_sorted(&params.sortby, &params.order)?))
}

async fn create_patient(
    State(store): State<SharedStore>,
    body: Result<Json<NewPatient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(new) = body?;
    store.create(&new)?;
    info!(id = %new.id, "create request served");
    Ok((
        StatusCode::CREATED,
        message("Patient created successfully"),
    ))
}

async fn edit_patient(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    body: Result<Json<PatientFields>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(patch) = body?;
    store.update(&id, patch)?;
    Ok(message("Patient updated successfully"))
}

async fn delete_patient(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    store.delete(&id)?;
    Ok(message("Patient deleted successfully"))
}
