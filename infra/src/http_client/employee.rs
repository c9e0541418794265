use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::Url;

use domain::{
    DomainErrorKind, DomainResult,
    clients::EmployeeClient,
    discovery::LoadBalancer,
    domain_error, domain_error_from,
    models::{DepartmentId, Employee},
};
use settings::EmployeeServiceSettings;

/// 従業員サービスにHTTPで問い合わせるクライアント
///
/// ベースURLのホストは論理サービス名として扱い、リクエストのたびにロードバランサーが
/// 選択したインスタンスのスキーム、ホスト及びポートに置き換える。
pub struct HttpEmployeeClient {
    client: reqwest::Client,
    base_url: Url,
    load_balancer: Arc<dyn LoadBalancer>,
}

impl HttpEmployeeClient {
    /// クライアントを作成する。
    pub fn new(
        settings: &EmployeeServiceSettings,
        load_balancer: Arc<dyn LoadBalancer>,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid employee service URL: {}", settings.base_url))?;
        if base_url.host_str().is_none() {
            anyhow::bail!(
                "The employee service URL has no service name: {}",
                settings.base_url
            );
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .context("Failed to build the employee service HTTP client")?;
        Ok(Self {
            client,
            base_url,
            load_balancer,
        })
    }

    /// 論理サービス名を返す。
    pub fn service_id(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// パスセグメントを、選択したインスタンスのURLに解決する。
    fn resolve(&self, segments: &[&str]) -> DomainResult<Url> {
        let instance = self.load_balancer.choose(self.service_id())?;
        tracing::debug!(instance = %instance.uri(), "Service instance chosen");

        let invalid_instance = || {
            domain_error(
                DomainErrorKind::RemoteUnavailable,
                format!("Invalid service instance: {}", instance.uri()),
            )
        };
        let mut url = self.base_url.clone();
        url.set_scheme(instance.scheme())
            .map_err(|_| invalid_instance())?;
        url.set_host(Some(&instance.host))
            .map_err(|_| invalid_instance())?;
        url.set_port(Some(instance.port))
            .map_err(|_| invalid_instance())?;
        url.path_segments_mut()
            .map_err(|_| invalid_instance())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl EmployeeClient for HttpEmployeeClient {
    #[tracing::instrument(skip(self))]
    async fn find_by_department_id(
        &self,
        department_id: DepartmentId,
    ) -> DomainResult<Vec<Employee>> {
        let department_id = department_id.to_string();
        let url = self.resolve(&["employees", "departments", &department_id])?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| domain_error_from(DomainErrorKind::RemoteUnavailable, e))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "Employee service responded with an error");
            return Err(domain_error(
                DomainErrorKind::Remote,
                format!("Employee service responded with {} for {}", status, url),
            ));
        }
        response
            .json::<Vec<Employee>>()
            .await
            .map_err(|e| domain_error_from(DomainErrorKind::Remote, e))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use domain::discovery::ServiceInstance;
    use domain::models::EmployeeId;

    use crate::discovery::{RoundRobinLoadBalancer, StaticServiceDiscovery};

    use super::*;

    fn instance(server: &MockServer) -> ServiceInstance {
        ServiceInstance {
            service_id: String::from("employee-service"),
            host: server.address().ip().to_string(),
            port: server.address().port(),
            secure: false,
        }
    }

    fn client_for(instances: Vec<ServiceInstance>) -> HttpEmployeeClient {
        let mut discovery = StaticServiceDiscovery::new();
        for instance in instances {
            discovery.register(instance);
        }
        let load_balancer = Arc::new(RoundRobinLoadBalancer::new(discovery));
        HttpEmployeeClient::new(&EmployeeServiceSettings::default(), load_balancer).unwrap()
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
    async fn find_by_department_id_returns_employees() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/employees/departments/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 10, "departmentId": 1, "name": "Ann", "age": 30, "position": "Dev"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(vec![instance(&server)]);

        let employees = client.find_by_department_id(DepartmentId(1)).await.unwrap();

        assert_eq!(employees, vec![ann()]);
    }

    #[tokio::test]
    async fn requests_are_spread_over_instances() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        for server in [&first, &second] {
            Mock::given(method("GET"))
                .and(path("/employees/departments/2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
                .expect(1)
                .mount(server)
                .await;
        }
        let client = client_for(vec![instance(&first), instance(&second)]);

        for _ in 0..2 {
            let employees = client.find_by_department_id(DepartmentId(2)).await.unwrap();
            assert!(employees.is_empty());
        }
    }

    #[rstest::rstest]
    #[case(404)]
    #[case(500)]
    #[case(503)]
    #[tokio::test]
    async fn non_success_status_is_a_remote_error(#[case] status: u16) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/employees/departments/1"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        let client = client_for(vec![instance(&server)]);

        let error = client
            .find_by_department_id(DepartmentId(1))
            .await
            .unwrap_err();

        assert_eq!(error.kind, DomainErrorKind::Remote);
    }

    #[tokio::test]
    async fn undecodable_body_is_a_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/employees/departments/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let client = client_for(vec![instance(&server)]);

        let error = client
            .find_by_department_id(DepartmentId(1))
            .await
            .unwrap_err();

        assert_eq!(error.kind, DomainErrorKind::Remote);
    }

    #[tokio::test]
    async fn null_employee_field_is_a_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/employees/departments/1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"id":10,"departmentId":1,"name":"Ann","age":null,"position":"Dev"}]"#,
                "application/json",
            ))
            .mount(&server)
            .await;
        let client = client_for(vec![instance(&server)]);

        let error = client
            .find_by_department_id(DepartmentId(1))
            .await
            .unwrap_err();

        assert_eq!(error.kind, DomainErrorKind::Remote);
    }

    #[tokio::test]
    async fn unresolvable_service_is_unavailable() {
        let client = client_for(vec![]);

        let error = client
            .find_by_department_id(DepartmentId(1))
            .await
            .unwrap_err();

        assert_eq!(error.kind, DomainErrorKind::RemoteUnavailable);
    }

    #[tokio::test]
    async fn unreachable_instance_is_unavailable() {
        // 空いているポートを取得してから閉じる
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client = client_for(vec![ServiceInstance {
            service_id: String::from("employee-service"),
            host: String::from("127.0.0.1"),
            port,
            secure: false,
        }]);

        let error = client
            .find_by_department_id(DepartmentId(1))
            .await
            .unwrap_err();

        assert_eq!(error.kind, DomainErrorKind::RemoteUnavailable);
    }

    #[test]
    fn base_url_without_service_name_is_rejected() {
        let settings = EmployeeServiceSettings {
            base_url: String::from("file:///employees"),
            timeout_seconds: None,
        };
        let load_balancer = Arc::new(RoundRobinLoadBalancer::new(StaticServiceDiscovery::new()));

        assert!(HttpEmployeeClient::new(&settings, load_balancer).is_err());
    }
}
