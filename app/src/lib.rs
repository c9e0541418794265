pub mod routes;

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use config::Config;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt as _};

use domain::repositories::DepartmentRepository;
use infra::{
    AppState, discovery::create_load_balancer, http_client::HttpEmployeeClient,
    memory::InMemoryDepartmentRepository, postgres::repositories::PgDepartmentRepository,
};
use settings::{AppSettings, DatabaseSettings, HttpSettings};

pub fn load_app_settings(path: &str) -> anyhow::Result<AppSettings> {
    let config = Config::builder()
        .add_source(config::File::with_name(path))
        .build()
        .context("Failed to read the app_settings.toml file")?;
    config
        .try_deserialize()
        .context("The contents of the app_settings.toml file is incorrect")
}

pub async fn bind_address(settings: &HttpSettings) -> anyhow::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind(settings.bind_address())
        .await
        .context("Failed to bind to the address for the HTTP server")?;
    let port = listener
        .local_addr()
        .context("Failed to get the port of listener")?
        .port();

    Ok((listener, port))
}

pub async fn create_pg_pool(
    settings: &DatabaseSettings,
) -> anyhow::Result<sqlx::Pool<sqlx::Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.connection_timeout))
        .connect_with(settings.connect_options())
        .await
        .context("Failed to connect to the database")?;
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .context("Failed to migrate the database")?;
    Ok(pool)
}

/// アプリケーションの状態を構築する。
///
/// データベース設定がある場合はPostgreSQLに、ない場合はメモリに部署を保存する。
pub async fn build_app_state(app_settings: AppSettings) -> anyhow::Result<AppState> {
    let department_repository: Arc<dyn DepartmentRepository> = match &app_settings.database {
        Some(database) => {
            let pool = create_pg_pool(database).await?;
            tracing::info!(host = %database.host, name = %database.name, "Departments are stored in PostgreSQL");
            Arc::new(PgDepartmentRepository::new(pool))
        }
        None => {
            tracing::info!("Departments are stored in memory");
            Arc::new(InMemoryDepartmentRepository::new())
        }
    };
    let load_balancer = create_load_balancer(&app_settings.discovery);
    let employee_client = HttpEmployeeClient::new(&app_settings.employee_service, load_balancer)?;

    Ok(AppState {
        app_settings,
        department_repository,
        employee_client: Arc::new(employee_client),
    })
}

pub fn get_subscriber<Sink>(
    name: String,
    log_level: log::Level,
    sink: Sink,
) -> impl Subscriber + Sync + Send
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) -> anyhow::Result<()> {
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber).context("Failed to set subscriber")
}
