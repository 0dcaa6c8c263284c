//! Shared setup for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use homeguard::adapters::mock::{
    InMemoryArtifactStore, InMemoryCredentialRepository, ManualClock, MockHttpClient,
    StaticRenderer,
};
use homeguard::auth::hasher::MIN_COST;
use homeguard::auth::{CredentialStore, SecretHasher};
use homeguard::gate::Gate;
use homeguard::notifications::{AlarmEndpoints, AlarmWebhook, Notifier};

pub const ALARM_URL: &str = "http://ha.local:8123";
pub const DISARM_URL: &str = "http://ha.local:8123/api/webhook/someone_at_home";
pub const ARM_URL: &str = "http://ha.local:8123/api/webhook/no_one_at_home";

pub struct TestGate {
    pub gate: Arc<Gate>,
    pub repo: InMemoryCredentialRepository,
    pub artifacts: InMemoryArtifactStore,
    pub renderer: StaticRenderer,
    pub clock: ManualClock,
    pub http: MockHttpClient,
}

impl TestGate {
    pub fn new() -> Self {
        let repo = InMemoryCredentialRepository::new();
        let artifacts = InMemoryArtifactStore::new();
        let renderer = StaticRenderer::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let http = MockHttpClient::new();

        let store = Arc::new(CredentialStore::new(
            Arc::new(repo.clone()),
            Arc::new(artifacts.clone()),
            SecretHasher::new(MIN_COST).unwrap(),
            Arc::new(clock.clone()),
        ));
        let webhook = AlarmWebhook::new(
            Arc::new(http.clone()),
            AlarmEndpoints {
                base_url: ALARM_URL.to_string(),
                arm_signal_id: "no_one_at_home".to_string(),
                disarm_signal_id: "someone_at_home".to_string(),
            },
            Duration::from_secs(1),
        );
        let (notifier, _worker) = Notifier::spawn(webhook);

        let gate = Arc::new(Gate::new(
            store,
            Arc::new(artifacts.clone()),
            Arc::new(renderer.clone()),
            notifier,
            Duration::from_secs(3600),
            "http://gate.local/api/authenticate",
        ));

        Self {
            gate,
            repo,
            artifacts,
            renderer,
            clock,
            http,
        }
    }

    /// Secret embedded in the most recently rendered link.
    pub fn last_secret(&self) -> String {
        let link = self.renderer.payloads().pop().expect("nothing rendered");
        let encoded = link.split("password=").nth(1).expect("no password in link");
        urlencoding::decode(encoded).unwrap().into_owned()
    }

    /// Wait until at least `n` alarm signals have been posted.
    pub async fn wait_for_signals(&self, n: usize) -> Vec<String> {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while self.http.request_count() < n && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.http.requested_urls()
    }
}
