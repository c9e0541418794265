use serde::{Deserialize, Serialize};

use crate::impl_int_id;
use crate::models::DepartmentId;

/// 従業員ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);
impl_int_id!(EmployeeId, i64);

/// 従業員
///
/// 従業員サービスが所有し、このサービスはリクエストの間だけ保持する。
/// すべてのフィールドは必須で、`null`を含む応答は受け付けない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// ID
    pub id: EmployeeId,
    /// 所属部署ID
    pub department_id: DepartmentId,
    /// 氏名
    pub name: String,
    /// 年齢
    pub age: i32,
    /// 役職
    pub position: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_uses_camel_case_field_names() {
        let json = r#"{"id":10,"departmentId":1,"name":"Ann","age":30,"position":"Dev"}"#;
        let employee = serde_json::from_str::<Employee>(json).unwrap();

        assert_eq!(
            employee,
            Employee {
                id: EmployeeId(10),
                department_id: DepartmentId(1),
                name: String::from("Ann"),
                age: 30,
                position: String::from("Dev"),
            }
        );
        assert_eq!(serde_json::to_string(&employee).unwrap(), json);
    }

    #[rstest::rstest]
    #[case(r#"{"id":null,"departmentId":1,"name":"Ann","age":30,"position":"Dev"}"#)]
    #[case(r#"{"id":10,"departmentId":null,"name":"Ann","age":30,"position":"Dev"}"#)]
    #[case(r#"{"id":10,"departmentId":1,"name":"Ann","age":null,"position":"Dev"}"#)]
    fn employee_rejects_null_fields(#[case] json: &str) {
        assert!(serde_json::from_str::<Employee>(json).is_err());
    }
}
