//! 設定ファイルに登録したインスタンスによるサービスディスカバリーとロードバランサー
mod load_balancer;

pub use load_balancer::*;

use std::collections::HashMap;

use domain::discovery::{ServiceDiscovery, ServiceInstance};
use settings::DiscoverySettings;

/// 固定のインスタンスを返すサービスディスカバリー
///
/// 論理サービス名は大文字と小文字を区別しない。
#[derive(Debug, Clone, Default)]
pub struct StaticServiceDiscovery {
    instances: HashMap<String, Vec<ServiceInstance>>,
}

impl StaticServiceDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// インスタンスを登録する。
    ///
    /// 同じ論理サービス名のインスタンスは登録した順に保持される。
    pub fn register(&mut self, instance: ServiceInstance) {
        self.instances
            .entry(instance.service_id.to_lowercase())
            .or_default()
            .push(instance);
    }
}

impl From<&DiscoverySettings> for StaticServiceDiscovery {
    fn from(settings: &DiscoverySettings) -> Self {
        let mut discovery = Self::new();
        for (service_id, instances) in &settings.instances {
            for instance in instances {
                discovery.register(ServiceInstance {
                    service_id: service_id.clone(),
                    host: instance.host.clone(),
                    port: instance.port,
                    secure: instance.secure,
                });
            }
        }
        discovery
    }
}

impl ServiceDiscovery for StaticServiceDiscovery {
    fn instances(&self, service_id: &str) -> Vec<ServiceInstance> {
        self.instances
            .get(&service_id.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}
