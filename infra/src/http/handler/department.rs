use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use domain::{
    clients::EmployeeClient,
    models::{Department, DepartmentId},
    repositories::{DepartmentInput, DepartmentRepository},
};
use use_case::department::DepartmentUseCase;

use crate::{
    AppState,
    http::{ApiError, ApiResult},
};

/// 部署登録リクエストボディ
///
/// `employees`が含まれていても無視する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequestBody {
    pub id: Option<i64>,
    pub name: String,
}

impl From<CreateDepartmentRequestBody> for DepartmentInput {
    fn from(body: CreateDepartmentRequestBody) -> Self {
        DepartmentInput {
            id: body.id.map(DepartmentId),
            name: body.name,
        }
    }
}

/// 部署登録ハンドラ
#[tracing::instrument(skip(app_state))]
pub async fn create(
    State(app_state): State<AppState>,
    Json(request_body): Json<CreateDepartmentRequestBody>,
) -> ApiResult<Json<Department>> {
    let use_case = department_use_case(&app_state);
    let department = use_case
        .create(DepartmentInput::from(request_body))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(department))
}

/// 部署リストハンドラ
#[tracing::instrument(skip(app_state))]
pub async fn list(State(app_state): State<AppState>) -> ApiResult<Json<Vec<Department>>> {
    let use_case = department_use_case(&app_state);
    Ok(Json(use_case.list().await.map_err(ApiError::from)?))
}

/// 部署取得ハンドラ
#[tracing::instrument(skip(app_state))]
pub async fn by_id(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Department>> {
    let use_case = department_use_case(&app_state);
    let department = use_case
        .by_id(DepartmentId(id))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(department))
}

/// 従業員付き部署リストハンドラ
#[tracing::instrument(skip(app_state))]
pub async fn list_with_employees(
    State(app_state): State<AppState>,
) -> ApiResult<Json<Vec<Department>>> {
    let use_case = department_use_case(&app_state);
    Ok(Json(
        use_case
            .list_with_employees()
            .await
            .map_err(ApiError::from)?,
    ))
}

type DepartmentUseCaseImpl =
    DepartmentUseCase<Arc<dyn DepartmentRepository>, Arc<dyn EmployeeClient>>;

fn department_use_case(app_state: &AppState) -> DepartmentUseCaseImpl {
    DepartmentUseCase::new(
        app_state.department_repository.clone(),
        app_state.employee_client.clone(),
    )
}
