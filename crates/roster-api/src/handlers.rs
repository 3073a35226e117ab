//! HTTP boundary
//!
//! Maps the five user routes onto adapter calls and adapter outcomes onto
//! status codes: malformed input is a bad request, absence is not-found,
//! a lost optimistic-concurrency race is a conflict, and anything the
//! caller cannot fix is an internal error.

use crate::adapter::UserAdapter;
use crate::dto::{User, UserCreateResponse, UserListResponse, UserUpdateRequest};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use roster_errors::Error;
use roster_store::users::UserStore;
use serde::Deserialize;
use std::sync::Arc;

/// Query inputs for the list route
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "start-id")]
    pub start_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// Build the user router over any store implementation
pub fn router<S: UserStore + 'static>(adapter: Arc<UserAdapter<S>>) -> Router {
    Router::new()
        .route("/users", get(list_users::<S>).post(create_user::<S>))
        .route(
            "/users/:id",
            get(get_user::<S>)
                .patch(update_user::<S>)
                .delete(delete_user::<S>),
        )
        .with_state(adapter)
}

/// Adapter failure translated to an HTTP response
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Mapping { .. } | Error::Store { .. } | Error::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "request failed");
        } else {
            tracing::warn!(code = self.0.code(), error = %self.0, "request rejected");
        }
        status.into_response()
    }
}

async fn list_users<S: UserStore>(
    State(adapter): State<Arc<UserAdapter<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let users = adapter
        .list(params.start_id.as_deref(), params.limit)
        .await?;
    let total_count = adapter.total_count().await?;
    let response = UserListResponse {
        total_count,
        count: users.len() as i64,
        users,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

async fn create_user<S: UserStore>(
    State(adapter): State<Arc<UserAdapter<S>>>,
) -> Result<Response, ApiError> {
    let id = adapter.create().await?;
    tracing::info!(%id, "user created");
    let location = format!("/users/{id}");
    let body = UserCreateResponse { id };
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response())
}

async fn get_user<S: UserStore>(
    State(adapter): State<Arc<UserAdapter<S>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match adapter.get(&id).await? {
        Some(user) => Ok((StatusCode::OK, Json(user)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn update_user<S: UserStore>(
    State(adapter): State<Arc<UserAdapter<S>>>,
    Path(id): Path<String>,
    Json(request): Json<UserUpdateRequest>,
) -> Result<Response, ApiError> {
    let user = User {
        id,
        name: request.name,
        contact: None,
    };
    if adapter.set(user).await? {
        Ok(StatusCode::ACCEPTED.into_response())
    } else {
        Ok(StatusCode::NOT_FOUND.into_response())
    }
}

async fn delete_user<S: UserStore>(
    State(adapter): State<Arc<UserAdapter<S>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if adapter.delete(&id).await? {
        Ok(StatusCode::ACCEPTED.into_response())
    } else {
        Ok(StatusCode::NOT_FOUND.into_response())
    }
}
