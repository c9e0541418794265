//! Test case for integration tests
//!
//! Each test case spawns its own HTTP server on a random port with an empty
//! in-memory department store.
use std::{thread::JoinHandle, time::Duration};

use serde::Serialize;
use settings::AppSettings;
use tokio::sync::oneshot;

use infra::AppState;

use crate::helpers::{TestApp, configure_test_app, init_tracing, spawn_app};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableTracing {
    Yes,
    No,
}

/// Test case for integration tests
///
/// ```ignore
/// #[tokio::test]
/// async fn integration_test_case_skeleton() {
///     let app_settings = load_app_settings_for_testing();
///     let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
///
///     let response = test_case.list_departments().await;
///     assert!(response.status().is_success());
///
///     test_case.end().await;
/// }
/// ```
pub struct TestCase {
    pub app_state: AppState,
    app_handle: JoinHandle<()>,
    shutdown_signal: oneshot::Sender<()>,
    log: bool,
    pub http_client: reqwest::Client,
}

impl TestCase {
    pub async fn begin(app_settings: AppSettings, tracing: EnableTracing) -> Self {
        let log = tracing == EnableTracing::Yes;
        if log {
            init_tracing();
        }
        let TestApp {
            app_state,
            listener,
        } = configure_test_app(app_settings).await;
        let (app_handle, shutdown_signal) = spawn_app(app_state.clone(), listener).await;
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap();
        Self {
            app_state,
            app_handle,
            shutdown_signal,
            log,
            http_client,
        }
    }

    pub async fn end(self) {
        if self.log {
            println!("Sending graceful shutdown signal...");
        }
        self.shutdown_signal.send(()).unwrap();
        if self.log {
            println!("Waiting for server to gracefully shutdown...");
        }
        self.app_handle.join().unwrap();
        if self.log {
            println!("Server has gracefully shutdown.");
        }
    }

    pub fn origin(&self) -> String {
        format!(
            "{}://{}:{}",
            self.app_state.app_settings.http.protocol,
            self.app_state.app_settings.http.host,
            self.app_state.app_settings.http.port,
        )
    }

    pub async fn create_department(
        &self,
        body: &RawCreateDepartmentRequestBody,
    ) -> reqwest::Response {
        let uri = format!("{}/departments", self.origin());
        self.http_client.post(&uri).json(body).send().await.unwrap()
    }

    pub async fn list_departments(&self) -> reqwest::Response {
        let uri = format!("{}/departments", self.origin());
        self.http_client.get(&uri).send().await.unwrap()
    }

    pub async fn department_by_id(&self, id: &str) -> reqwest::Response {
        let uri = format!("{}/departments/{}", self.origin(), id);
        self.http_client.get(&uri).send().await.unwrap()
    }

    pub async fn list_departments_with_employees(&self) -> reqwest::Response {
        let uri = format!("{}/departments/with-employees", self.origin());
        self.http_client.get(&uri).send().await.unwrap()
    }

    /// Creates the departments and asserts they are accepted
    pub async fn insert_departments(&self, departments: &[(i64, &str)]) {
        for (id, name) in departments {
            let body = RawCreateDepartmentRequestBody {
                id: Some(*id),
                name: name.to_string(),
            };
            let response = self.create_department(&body).await;
            assert!(
                response.status().is_success(),
                "Failed to create department {}: {}",
                id,
                response.status()
            );
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCreateDepartmentRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}
