use tokio::sync::RwLock;

use domain::{
    DomainErrorKind, DomainResult, domain_error,
    models::{Department, DepartmentId},
    repositories::{DepartmentInput, DepartmentRepository},
};

/// メモリ上に部署を保存するリポジトリ
///
/// 部署は登録した順にリストされる。
#[derive(Debug, Default)]
pub struct InMemoryDepartmentRepository {
    departments: RwLock<Vec<Department>>,
}

impl InMemoryDepartmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DepartmentRepository for InMemoryDepartmentRepository {
    /// 部署を登録する。
    ///
    /// IDを省略した場合は、登録済みの最大ID + 1を採番する。
    async fn create(&self, input: DepartmentInput) -> DomainResult<Department> {
        let mut departments = self.departments.write().await;
        let id = match input.id {
            Some(id) => {
                if departments.iter().any(|d| d.id == id) {
                    return Err(domain_error(
                        DomainErrorKind::Validation,
                        format!("Department {} already exists", id),
                    ));
                }
                id
            }
            None => match departments.iter().map(|d| d.id).max() {
                None => DepartmentId(1),
                Some(max) => max.0.checked_add(1).map(DepartmentId).ok_or_else(|| {
                    domain_error(
                        DomainErrorKind::Validation,
                        format!("No department id is available after {}", max),
                    )
                })?,
            },
        };
        let department = Department::new(id, input.name);
        departments.push(department.clone());
        Ok(department)
    }

    async fn by_id(&self, id: DepartmentId) -> DomainResult<Option<Department>> {
        let departments = self.departments.read().await;
        Ok(departments.iter().find(|d| d.id == id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<Department>> {
        Ok(self.departments.read().await.clone())
    }
}
