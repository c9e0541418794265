use domain::{
    DomainErrorKind, DomainResult,
    clients::EmployeeClient,
    domain_error,
    models::{Department, DepartmentId},
    repositories::{DepartmentInput, DepartmentRepository},
};

/// 部署ユースケース
pub struct DepartmentUseCase<R, C>
where
    R: DepartmentRepository,
    C: EmployeeClient,
{
    /// 部署リポジトリ
    pub department_repository: R,
    /// 従業員サービスクライアント
    pub employee_client: C,
}

impl<R, C> DepartmentUseCase<R, C>
where
    R: DepartmentRepository,
    C: EmployeeClient,
{
    /// 部署ユースケースを作成する。
    pub fn new(department_repository: R, employee_client: C) -> Self {
        Self {
            department_repository,
            employee_client,
        }
    }

    /// 部署を登録する。
    ///
    /// 入力は検証せずにリポジトリに渡す。
    pub async fn create(&self, input: DepartmentInput) -> DomainResult<Department> {
        tracing::info!(id = ?input.id, name = %input.name, "Department add");
        self.department_repository.create(input).await
    }

    /// 部署をリストする。
    pub async fn list(&self) -> DomainResult<Vec<Department>> {
        tracing::info!("Department find");
        self.department_repository.list().await
    }

    /// 部署を取得する。
    pub async fn by_id(&self, id: DepartmentId) -> DomainResult<Department> {
        tracing::info!(%id, "Department find");
        self.department_repository
            .by_id(id)
            .await?
            .ok_or_else(|| {
                domain_error(
                    DomainErrorKind::NotFound,
                    format!("Department {} is not found", id),
                )
            })
    }

    /// 従業員を設定した部署をリストする。
    ///
    /// 部署ごとに従業員サービスへ順番に問い合わせる。
    /// 1つでも問い合わせに失敗した場合は、途中までの結果を返さずにエラーを返す。
    pub async fn list_with_employees(&self) -> DomainResult<Vec<Department>> {
        tracing::info!("Department with employees find");
        let departments = self.department_repository.list().await?;
        let mut enriched = Vec::with_capacity(departments.len());
        for department in departments {
            let employees = self
                .employee_client
                .find_by_department_id(department.id)
                .await?;
            enriched.push(department.with_employees(employees));
        }
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use domain::models::{Employee, EmployeeId};

    use super::*;

    #[derive(Default)]
    struct FakeDepartmentRepository {
        departments: Mutex<Vec<Department>>,
    }

    impl FakeDepartmentRepository {
        fn with(departments: Vec<Department>) -> Self {
            Self {
                departments: Mutex::new(departments),
            }
        }
    }

    #[async_trait::async_trait]
    impl DepartmentRepository for FakeDepartmentRepository {
        async fn create(&self, input: DepartmentInput) -> DomainResult<Department> {
            let mut departments = self.departments.lock().unwrap();
            let id = input
                .id
                .unwrap_or(DepartmentId(departments.len() as i64 + 1));
            let department = Department::new(id, input.name);
            departments.push(department.clone());
            Ok(department)
        }

        async fn by_id(&self, id: DepartmentId) -> DomainResult<Option<Department>> {
            let departments = self.departments.lock().unwrap();
            Ok(departments.iter().find(|d| d.id == id).cloned())
        }

        async fn list(&self) -> DomainResult<Vec<Department>> {
            Ok(self.departments.lock().unwrap().clone())
        }
    }

    /// 部署IDごとに用意した応答を返し、問い合わせを記録するクライアント
    #[derive(Default)]
    struct FakeEmployeeClient {
        responses: HashMap<DepartmentId, Vec<Employee>>,
        failing: Option<DepartmentId>,
        calls: Mutex<Vec<DepartmentId>>,
    }

    #[async_trait::async_trait]
    impl EmployeeClient for FakeEmployeeClient {
        async fn find_by_department_id(
            &self,
            department_id: DepartmentId,
        ) -> DomainResult<Vec<Employee>> {
            self.calls.lock().unwrap().push(department_id);
            if self.failing == Some(department_id) {
                return Err(domain_error(
                    DomainErrorKind::RemoteUnavailable,
                    "employee-service is unavailable",
                ));
            }
            Ok(self
                .responses
                .get(&department_id)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn engineering() -> Department {
        Department::new(DepartmentId(1), String::from("Engineering"))
    }

    fn sales() -> Department {
        Department::new(DepartmentId(2), String::from("Sales"))
    }

    fn ann() -> Employee {
        Employee {
            id: EmployeeId(10),
            department_id: DepartmentId(1),
            name: String::from("Ann"),
            age: 30,
            position: String::from("Dev"),
        }
    }

    #[tokio::test]
    async fn create_returns_department_with_input_fields() -> anyhow::Result<()> {
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::default(),
            FakeEmployeeClient::default(),
        );

        let created = use_case
            .create(DepartmentInput {
                id: None,
                name: String::from("Engineering"),
            })
            .await?;

        assert_eq!(created.name, "Engineering");
        assert!(created.employees.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_departments_without_employees() -> anyhow::Result<()> {
        let client = FakeEmployeeClient {
            responses: HashMap::from([(DepartmentId(1), vec![ann()])]),
            ..Default::default()
        };
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::with(vec![engineering(), sales()]),
            client,
        );

        let departments = use_case.list().await?;

        assert_eq!(departments, vec![engineering(), sales()]);
        assert!(use_case.employee_client.calls.lock().unwrap().is_empty());
        Ok(())
    }

    #[rstest::rstest]
    #[case(DepartmentId(1), Some(engineering()))]
    #[case(DepartmentId(2), Some(sales()))]
    #[case(DepartmentId(3), None)]
    #[tokio::test]
    async fn by_id_returns_department_or_not_found(
        #[case] id: DepartmentId,
        #[case] expected: Option<Department>,
    ) {
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::with(vec![engineering(), sales()]),
            FakeEmployeeClient::default(),
        );

        let result = use_case.by_id(id).await;

        match expected {
            Some(expected) => assert_eq!(result.unwrap(), expected),
            None => assert_eq!(result.unwrap_err().kind, DomainErrorKind::NotFound),
        }
    }

    #[tokio::test]
    async fn list_with_employees_attaches_employees_per_department() -> anyhow::Result<()> {
        let client = FakeEmployeeClient {
            responses: HashMap::from([(DepartmentId(1), vec![ann()]), (DepartmentId(2), vec![])]),
            ..Default::default()
        };
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::with(vec![engineering(), sales()]),
            client,
        );

        let departments = use_case.list_with_employees().await?;

        assert_eq!(
            departments,
            vec![engineering().with_employees(vec![ann()]), sales()]
        );
        assert_eq!(
            *use_case.employee_client.calls.lock().unwrap(),
            vec![DepartmentId(1), DepartmentId(2)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_with_employees_queries_each_department_even_with_same_name()
    -> anyhow::Result<()> {
        let duplicate = Department::new(DepartmentId(3), String::from("Engineering"));
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::with(vec![engineering(), duplicate]),
            FakeEmployeeClient::default(),
        );

        let departments = use_case.list_with_employees().await?;

        assert_eq!(departments.len(), 2);
        assert_eq!(
            *use_case.employee_client.calls.lock().unwrap(),
            vec![DepartmentId(1), DepartmentId(3)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_with_employees_on_empty_store_makes_no_remote_calls() -> anyhow::Result<()> {
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::default(),
            FakeEmployeeClient::default(),
        );

        assert!(use_case.list_with_employees().await?.is_empty());
        assert!(use_case.employee_client.calls.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_with_employees_fails_when_any_lookup_fails() {
        let client = FakeEmployeeClient {
            responses: HashMap::from([(DepartmentId(1), vec![ann()])]),
            failing: Some(DepartmentId(1)),
            ..Default::default()
        };
        let use_case = DepartmentUseCase::new(
            FakeDepartmentRepository::with(vec![engineering(), sales()]),
            client,
        );

        let error = use_case.list_with_employees().await.unwrap_err();

        assert_eq!(error.kind, DomainErrorKind::RemoteUnavailable);
        // 失敗した時点で打ち切る
        assert_eq!(
            *use_case.employee_client.calls.lock().unwrap(),
            vec![DepartmentId(1)]
        );
    }
}
