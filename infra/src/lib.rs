pub mod discovery;
pub mod http;
pub mod http_client;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use domain::{clients::EmployeeClient, repositories::DepartmentRepository};
use settings::AppSettings;

#[derive(Clone)]
pub struct AppState {
    pub app_settings: AppSettings,
    pub department_repository: Arc<dyn DepartmentRepository>,
    pub employee_client: Arc<dyn EmployeeClient>,
}
