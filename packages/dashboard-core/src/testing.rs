//! Testing utilities including a scripted mock of the optimization service.
//!
//! Responses are queued per endpoint with an optional delay. The last queued
//! response repeats once the queue is down to one entry; endpoints with no
//! script return a small healthy default.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::source::OptimizationApi;
use crate::types::{
    CostAnalytics, HealthInfo, OptimizationPotential, OptimizationSummary, Resource,
    ResourceHealth,
};

/// Record of a call made to the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Resources,
    Recommendations,
    CostAnalytics,
    Health,
    ResourceHealth { resource_id: i64 },
}

struct Scripted<T> {
    delay: Duration,
    result: FetchResult<T>,
}

struct Script<T> {
    queue: Mutex<VecDeque<Scripted<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T: Clone> Script<T> {
    fn push(&self, delay: Duration, result: FetchResult<T>) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted { delay, result });
    }

    fn next(&self) -> Option<(Duration, FetchResult<T>)> {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().map(|s| (s.delay, s.result))
        } else {
            queue.front().map(|s| (s.delay, s.result.clone()))
        }
    }
}

/// A mock optimization service for testing the coordinator without HTTP.
#[derive(Default)]
pub struct MockOptimizationApi {
    resources: Script<Vec<Resource>>,
    recommendations: Script<OptimizationSummary>,
    analytics: Script<CostAnalytics>,
    health: Script<HealthInfo>,
    resource_health: Script<ResourceHealth>,

    /// Call tracking for assertions
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Calls whose response was actually produced
    completed: Arc<Mutex<Vec<MockCall>>>,
}

impl MockOptimizationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(self, resources: Vec<Resource>) -> Self {
        self.resources.push(Duration::ZERO, Ok(resources));
        self
    }

    pub fn with_resources_after(
        self,
        delay: Duration,
        result: FetchResult<Vec<Resource>>,
    ) -> Self {
        self.resources.push(delay, result);
        self
    }

    pub fn with_recommendations(self, summary: OptimizationSummary) -> Self {
        self.recommendations.push(Duration::ZERO, Ok(summary));
        self
    }

    pub fn with_recommendations_after(
        self,
        delay: Duration,
        result: FetchResult<OptimizationSummary>,
    ) -> Self {
        self.recommendations.push(delay, result);
        self
    }

    pub fn with_analytics(self, analytics: CostAnalytics) -> Self {
        self.analytics.push(Duration::ZERO, Ok(analytics));
        self
    }

    pub fn with_analytics_after(
        self,
        delay: Duration,
        result: FetchResult<CostAnalytics>,
    ) -> Self {
        self.analytics.push(delay, result);
        self
    }

    pub fn with_health_after(self, delay: Duration, result: FetchResult<HealthInfo>) -> Self {
        self.health.push(delay, result);
        self
    }

    pub fn with_resource_health(self, health: ResourceHealth) -> Self {
        self.resource_health.push(Duration::ZERO, Ok(health));
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<MockCall> {
        self.completed.lock().unwrap().clone()
    }

    pub fn call_count(&self, call: &MockCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    async fn respond<T: Clone>(
        &self,
        call: MockCall,
        script: &Script<T>,
        fallback: impl FnOnce() -> FetchResult<T>,
    ) -> FetchResult<T> {
        self.calls.lock().unwrap().push(call.clone());

        let (delay, result) = script
            .next()
            .unwrap_or_else(|| (Duration::ZERO, fallback()));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.completed.lock().unwrap().push(call);
        result
    }
}

#[async_trait]
impl OptimizationApi for MockOptimizationApi {
    async fn fetch_resources(&self) -> FetchResult<Vec<Resource>> {
        self.respond(MockCall::Resources, &self.resources, || Ok(Vec::new()))
            .await
    }

    async fn fetch_recommendations(&self) -> FetchResult<OptimizationSummary> {
        self.respond(MockCall::Recommendations, &self.recommendations, || {
            Ok(empty_summary())
        })
        .await
    }

    async fn fetch_cost_analytics(&self) -> FetchResult<CostAnalytics> {
        self.respond(MockCall::CostAnalytics, &self.analytics, || {
            Ok(empty_analytics())
        })
        .await
    }

    async fn fetch_health(&self) -> FetchResult<HealthInfo> {
        self.respond(MockCall::Health, &self.health, || Ok(healthy()))
            .await
    }

    async fn fetch_resource_health(&self, resource_id: i64) -> FetchResult<ResourceHealth> {
        self.respond(
            MockCall::ResourceHealth { resource_id },
            &self.resource_health,
            || Err(FetchError::unexpected(format!("Resource with ID {resource_id} not found"))),
        )
        .await
    }
}

pub fn empty_summary() -> OptimizationSummary {
    OptimizationSummary {
        total_resources: 0,
        total_monthly_cost: 0.0,
        total_potential_savings: 0.0,
        recommendations: Vec::new(),
        savings_percentage: 0.0,
    }
}

pub fn empty_analytics() -> CostAnalytics {
    CostAnalytics {
        total_monthly_cost: 0.0,
        total_resources: 0,
        cost_by_type: Default::default(),
        cost_by_provider: Default::default(),
        optimization_potential: OptimizationPotential::default(),
    }
}

pub fn healthy() -> HealthInfo {
    HealthInfo {
        status: "healthy".into(),
        message: "Cloud Cost Optimizer API is running".into(),
        version: "1.0.0".into(),
    }
}
