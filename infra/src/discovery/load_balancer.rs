use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng as _;

use domain::{
    DomainErrorKind, DomainResult,
    discovery::{LoadBalancer, ServiceDiscovery, ServiceInstance},
    domain_error,
};
use settings::{DiscoverySettings, LoadBalancingStrategy};

use super::StaticServiceDiscovery;

/// 設定に従ってロードバランサーを作成する。
pub fn create_load_balancer(settings: &DiscoverySettings) -> Arc<dyn LoadBalancer> {
    let discovery = StaticServiceDiscovery::from(settings);
    tracing::info!(strategy = %settings.strategy, "Load balancer created");
    match settings.strategy {
        LoadBalancingStrategy::RoundRobin => Arc::new(RoundRobinLoadBalancer::new(discovery)),
        LoadBalancingStrategy::Random => Arc::new(RandomLoadBalancer::new(discovery)),
    }
}

fn available_instances<D>(discovery: &D, service_id: &str) -> DomainResult<Vec<ServiceInstance>>
where
    D: ServiceDiscovery,
{
    let instances = discovery.instances(service_id);
    if instances.is_empty() {
        tracing::warn!(service_id, "No servers available for service");
        return Err(domain_error(
            DomainErrorKind::RemoteUnavailable,
            format!("No instances available for {}", service_id),
        ));
    }
    Ok(instances)
}

/// ラウンドロビンでインスタンスを選択するロードバランサー
///
/// 論理サービス名ごとに位置を保持し、登録順にインスタンスを巡回する。
pub struct RoundRobinLoadBalancer<D>
where
    D: ServiceDiscovery,
{
    discovery: D,
    positions: Mutex<HashMap<String, usize>>,
}

impl<D> RoundRobinLoadBalancer<D>
where
    D: ServiceDiscovery,
{
    pub fn new(discovery: D) -> Self {
        Self {
            discovery,
            positions: Mutex::new(HashMap::new()),
        }
    }
}

impl<D> LoadBalancer for RoundRobinLoadBalancer<D>
where
    D: ServiceDiscovery,
{
    fn choose(&self, service_id: &str) -> DomainResult<ServiceInstance> {
        let mut instances = available_instances(&self.discovery, service_id)?;
        let mut positions = self
            .positions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let position = positions.entry(service_id.to_lowercase()).or_default();
        let index = *position % instances.len();
        *position = position.wrapping_add(1);
        Ok(instances.swap_remove(index))
    }
}

/// ランダムにインスタンスを選択するロードバランサー
pub struct RandomLoadBalancer<D>
where
    D: ServiceDiscovery,
{
    discovery: D,
}

impl<D> RandomLoadBalancer<D>
where
    D: ServiceDiscovery,
{
    pub fn new(discovery: D) -> Self {
        Self { discovery }
    }
}

impl<D> LoadBalancer for RandomLoadBalancer<D>
where
    D: ServiceDiscovery,
{
    fn choose(&self, service_id: &str) -> DomainResult<ServiceInstance> {
        let mut instances = available_instances(&self.discovery, service_id)?;
        let index = rand::thread_rng().gen_range(0..instances.len());
        Ok(instances.swap_remove(index))
    }
}
