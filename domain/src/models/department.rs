use serde::{Deserialize, Serialize};

use crate::impl_int_id;
use crate::models::Employee;

/// 部署ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub i64);
impl_int_id!(DepartmentId, i64);

/// 部署
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// ID
    pub id: DepartmentId,
    /// 部署名
    pub name: String,
    /// 所属する従業員
    ///
    /// 従業員付きで部署をリストしたときだけ設定される。
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl Department {
    /// 従業員を持たない部署を作成する。
    pub fn new(id: DepartmentId, name: String) -> Self {
        Self {
            id,
            name,
            employees: vec![],
        }
    }

    /// 従業員を設定した部署を返す。
    pub fn with_employees(self, employees: Vec<Employee>) -> Self {
        Self { employees, ..self }
    }
}
