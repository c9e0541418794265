use std::sync::Arc;

use crate::{
    DomainResult,
    models::{Department, DepartmentId},
};

/// 部署登録入力
#[derive(Debug, Clone)]
pub struct DepartmentInput {
    /// ID
    ///
    /// 省略した場合はリポジトリが採番する。
    pub id: Option<DepartmentId>,
    /// 部署名
    pub name: String,
}

/// 部署リポジトリ
#[async_trait::async_trait]
pub trait DepartmentRepository: Sync + Send {
    /// 部署を登録する。
    async fn create(&self, input: DepartmentInput) -> DomainResult<Department>;

    /// 部署をIDで取得する。
    async fn by_id(&self, id: DepartmentId) -> DomainResult<Option<Department>>;

    /// 部署をリストする。
    ///
    /// 返される部署は従業員を持たない。
    async fn list(&self) -> DomainResult<Vec<Department>>;
}

#[async_trait::async_trait]
impl<T> DepartmentRepository for Arc<T>
where
    T: DepartmentRepository + ?Sized,
{
    async fn create(&self, input: DepartmentInput) -> DomainResult<Department> {
        (**self).create(input).await
    }

    async fn by_id(&self, id: DepartmentId) -> DomainResult<Option<Department>> {
        (**self).by_id(id).await
    }

    async fn list(&self) -> DomainResult<Vec<Department>> {
        (**self).list().await
    }
}
