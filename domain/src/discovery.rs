//! 論理サービス名から接続先インスタンスを解決する。

use crate::DomainResult;

/// サービスインスタンス
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceInstance {
    /// 論理サービス名
    pub service_id: String,
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// HTTPSで接続するか
    pub secure: bool,
}

impl ServiceInstance {
    /// スキームを返す。
    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    /// インスタンスのURIを返す。
    pub fn uri(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }
}

/// サービスディスカバリー
pub trait ServiceDiscovery: Sync + Send {
    /// 論理サービス名に登録されたインスタンスを返す。
    fn instances(&self, service_id: &str) -> Vec<ServiceInstance>;
}

/// ロードバランサー
pub trait LoadBalancer: Sync + Send {
    /// 論理サービス名のインスタンスを1つ選択する。
    ///
    /// インスタンスが存在しない場合は`DomainErrorKind::RemoteUnavailable`を返す。
    fn choose(&self, service_id: &str) -> DomainResult<ServiceInstance>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(false, "http://10.0.0.1:8081")]
    #[case(true, "https://10.0.0.1:8081")]
    fn service_instance_uri(#[case] secure: bool, #[case] expected: &str) {
        let instance = ServiceInstance {
            service_id: String::from("employee-service"),
            host: String::from("10.0.0.1"),
            port: 8081,
            secure,
        };
        assert_eq!(instance.uri(), expected);
    }
}
