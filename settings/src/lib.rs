use std::collections::HashMap;

use enum_display::EnumDisplay;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer};
use sqlx::postgres::PgConnectOptions;

/// アプリケーション設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// HTTPサーバー設定
    pub http: HttpSettings,
    /// ログ設定
    pub log: LogSettings,
    /// データベース設定
    ///
    /// 省略した場合、部署はメモリ上に保存される。
    pub database: Option<DatabaseSettings>,
    /// 従業員サービス設定
    #[serde(default)]
    pub employee_service: EmployeeServiceSettings,
    /// サービスディスカバリー設定
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, EnumDisplay)]
#[serde(rename = "protocol")]
#[serde(rename_all = "lowercase")]
#[enum_display(case = "Lower")]
pub enum HttpProtocol {
    /// HTTPプロトコル
    Http,
    /// HTTPSプロトコル
    Https,
}

/// HTTPサーバー設定
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// プロトコル
    pub protocol: HttpProtocol,
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
}

/// ログ設定
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LogSettings {
    /// ログレベル
    #[serde(deserialize_with = "deserialize_log_level")]
    pub level: log::Level,
}

/// 文字列からログレベルを読み込む。
///
/// 大文字と小文字を区別しない。
fn deserialize_log_level<'de, D>(deserializer: D) -> Result<log::Level, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    value.parse::<log::Level>().map_err(serde::de::Error::custom)
}

/// データベース設定
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// ユーザー名
    pub user: String,
    /// パスワード
    pub password: SecretString,
    /// データベース名
    pub name: String,
    /// 最大接続数
    pub max_connections: u32,
    /// 接続タイムアウト（秒）
    pub connection_timeout: u64,
}

/// 従業員サービス設定
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeServiceSettings {
    /// ベースURL
    ///
    /// ホスト部は論理サービス名で、リクエストのたびにロードバランサーが
    /// 選択したインスタンスに置き換えられる。
    #[serde(default = "default_employee_service_base_url")]
    pub base_url: String,
    /// リクエストタイムアウト（秒）
    pub timeout_seconds: Option<u64>,
}

pub const DEFAULT_EMPLOYEE_SERVICE_BASE_URL: &str = "http://employee-service";

fn default_employee_service_base_url() -> String {
    DEFAULT_EMPLOYEE_SERVICE_BASE_URL.to_string()
}

impl Default for EmployeeServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_employee_service_base_url(),
            timeout_seconds: None,
        }
    }
}

/// ロードバランシング戦略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, EnumDisplay)]
#[serde(rename_all = "kebab-case")]
#[enum_display(case = "Kebab")]
pub enum LoadBalancingStrategy {
    /// ラウンドロビン
    #[default]
    RoundRobin,
    /// ランダム
    Random,
}

/// サービスディスカバリー設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverySettings {
    /// ロードバランシング戦略
    #[serde(default)]
    pub strategy: LoadBalancingStrategy,
    /// 論理サービス名ごとのインスタンス
    #[serde(default)]
    pub instances: HashMap<String, Vec<ServiceInstanceSettings>>,
}

/// サービスインスタンス設定
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInstanceSettings {
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// HTTPSで接続するか
    #[serde(default)]
    pub secure: bool,
}

impl HttpSettings {
    /// バインドするアドレス（ホスト名とポート番号）を返す。
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseSettings {
    /// データベース接続オプションを返す。
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
    }
}
