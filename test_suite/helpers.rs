//! This module sets up and runs integration tests
//!
//! The integration test stores departments in memory, so no database is required.
//! The employee service is replaced by `wiremock` servers that are registered
//! as instances of the `employee-service` logical service name.
use std::{path::Path, thread::JoinHandle};

use once_cell::sync::Lazy;
use tokio::{net::TcpListener, sync::oneshot};
use wiremock::MockServer;

use app::{
    bind_address, build_app_state, get_subscriber, init_subscriber, load_app_settings,
    routes::create_router,
};
use infra::AppState;
use settings::{AppSettings, ServiceInstanceSettings};

pub const EMPLOYEE_SERVICE_ID: &str = "employee-service";

static TRACING: Lazy<()> = Lazy::new(|| {
    let subscriber = get_subscriber(
        String::from("test-department-service"),
        log::Level::Debug,
        std::io::stdout,
    );
    init_subscriber(subscriber).unwrap();
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Loads the application settings for testing
///
/// The departments are stored in memory, and the HTTP server binds to a random port.
pub fn load_app_settings_for_testing() -> AppSettings {
    let dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");
    let path = Path::new(&dir).join("..").join("app_settings.toml");
    let mut app_settings = load_app_settings(path.as_os_str().to_str().unwrap()).unwrap();
    app_settings.database = None;
    app_settings.http.port = 0;
    app_settings.discovery.instances.clear();
    app_settings
}

/// Registers the mock servers as the instances of the employee service
pub fn register_employee_service(app_settings: &mut AppSettings, servers: &[&MockServer]) {
    let instances = servers
        .iter()
        .map(|server| ServiceInstanceSettings {
            host: server.address().ip().to_string(),
            port: server.address().port(),
            secure: false,
        })
        .collect();
    app_settings
        .discovery
        .instances
        .insert(String::from(EMPLOYEE_SERVICE_ID), instances);
}

pub struct TestApp {
    pub app_state: AppState,
    pub listener: TcpListener,
}

pub async fn configure_test_app(mut app_settings: AppSettings) -> TestApp {
    // Specify a random port for the HTTP server to bind
    let (listener, port) = bind_address(&app_settings.http).await.unwrap();
    app_settings.http.port = port;

    let app_state = build_app_state(app_settings).await.unwrap();

    TestApp {
        app_state,
        listener,
    }
}

/// Spawns the application server in a separate thread
///
/// Returns a tuple containing the thread handle and a sender to signal for graceful shutdown.
pub async fn spawn_app(
    app_state: AppState,
    listener: TcpListener,
) -> (JoinHandle<()>, oneshot::Sender<()>) {
    let (close_tx, close_rx) = oneshot::channel();

    // The listener is registered with the caller's runtime, so hand the std listener over
    let listener = listener.into_std().unwrap();
    let handle = std::thread::spawn(|| run_server(app_state, listener, close_rx));
    (handle, close_tx)
}

/// Runs the application server with graceful shutdown support
fn run_server(
    app_state: AppState,
    listener: std::net::TcpListener,
    close_rx: oneshot::Receiver<()>,
) {
    let router = create_router(app_state);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async move {
        let listener = TcpListener::from_std(listener).unwrap();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                _ = close_rx.await;
            })
            .await
            .unwrap();
    });
}

pub struct ResponseParts {
    /// ステータスコード
    pub status_code: reqwest::StatusCode,
    /// ボディ
    pub body: String,
}

pub async fn split_response(response: reqwest::Response) -> ResponseParts {
    ResponseParts {
        status_code: response.status(),
        body: response.text().await.unwrap(),
    }
}
