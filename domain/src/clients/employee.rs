use std::sync::Arc;

use crate::{
    DomainResult,
    models::{DepartmentId, Employee},
};

/// 従業員サービスのクライアント
#[async_trait::async_trait]
pub trait EmployeeClient: Sync + Send {
    /// 部署に所属する従業員を取得する。
    ///
    /// 返される従業員の部署IDが`department_id`と一致することは、従業員サービスを信頼する。
    async fn find_by_department_id(&self, department_id: DepartmentId)
    -> DomainResult<Vec<Employee>>;
}

#[async_trait::async_trait]
impl<T> EmployeeClient for Arc<T>
where
    T: EmployeeClient + ?Sized,
{
    async fn find_by_department_id(
        &self,
        department_id: DepartmentId,
    ) -> DomainResult<Vec<Employee>> {
        (**self).find_by_department_id(department_id).await
    }
}
