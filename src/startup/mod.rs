//! Service wiring.
//!
//! Turns a [`GateConfig`] into a ready [`Gate`] backed by the production
//! adapters:
//!
//! - credentials in `<data_dir>/credentials.json`
//! - QR code PNGs in `<data_dir>/artifacts/`
//! - alarm signals over reqwest, bounded by the notify timeout
//!
//! # Usage
//!
//! ```ignore
//! use homeguard::startup::{build_gate, GateConfig};
//!
//! let config = GateConfig::from_env()?;
//! let gate = build_gate(&config).await?;
//! ```

pub mod config;

pub use config::{ConfigError, GateConfig};

use std::sync::Arc;

use crate::adapters::{
    FileArtifactStore, FileCredentialRepository, QrPngRenderer, ReqwestHttpClient, SystemClock,
    ARTIFACTS_DIR, CREDENTIALS_FILE,
};
use crate::auth::{CredentialStore, SecretHasher};
use crate::gate::Gate;
use crate::notifications::{AlarmEndpoints, AlarmWebhook, Notifier};
use crate::traits::{ArtifactRenderer, ArtifactStore};

/// Validate `config` and assemble a gate from it.
///
/// Must be called inside a tokio runtime: the alarm notifier's worker is
/// spawned here.
///
/// # Errors
/// Invalid configuration, an unreadable credentials file, or an HTTP
/// client that cannot be built.
pub async fn build_gate(config: &GateConfig) -> color_eyre::Result<Arc<Gate>> {
    config.validate()?;

    let credentials_path = config.data_dir.join(CREDENTIALS_FILE);
    let repository = FileCredentialRepository::open(&credentials_path).await?;
    tracing::info!("Credentials stored in {}", credentials_path.display());

    let renderer = QrPngRenderer::new();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(
        config.data_dir.join(ARTIFACTS_DIR),
        renderer.extension(),
    ));

    let store = Arc::new(CredentialStore::new(
        Arc::new(repository),
        Arc::clone(&artifacts),
        SecretHasher::new(config.hash_cost)?,
        Arc::new(SystemClock),
    ));

    let http = ReqwestHttpClient::with_timeout(config.notify_timeout)?;
    let webhook = AlarmWebhook::new(
        Arc::new(http),
        AlarmEndpoints {
            base_url: config.alarm_base_url.clone(),
            arm_signal_id: config.arm_signal_id.clone(),
            disarm_signal_id: config.disarm_signal_id.clone(),
        },
        config.notify_timeout,
    );
    // The worker runs until the gate (and with it the notifier) is dropped.
    let (notifier, _worker) = Notifier::spawn(webhook);

    Ok(Arc::new(Gate::new(
        store,
        artifacts,
        Arc::new(renderer),
        notifier,
        config.sweep_interval,
        config.public_base_url.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hasher::MIN_COST;
    use crate::error::GateError;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> GateConfig {
        GateConfig::default()
            .with_data_dir(dir.path())
            .with_hash_cost(MIN_COST)
            .with_alarm_base_url("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_build_gate_persists_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let gate = build_gate(&config(&dir)).await.unwrap();

        gate.issue_credential("alice", 1).await.unwrap();

        assert!(dir.path().join(CREDENTIALS_FILE).exists());
        assert!(dir.path().join(ARTIFACTS_DIR).join("alice.png").exists());
        assert_eq!(gate.artifact_content_type(), "image/png");

        let png = gate.fetch_artifact("alice").await.unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_build_gate_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let bad = config(&dir).with_signal_ids("same", "same");
        assert!(build_gate(&bad).await.is_err());
    }

    #[tokio::test]
    async fn test_build_gate_reloads_credentials() {
        let dir = TempDir::new().unwrap();
        {
            let gate = build_gate(&config(&dir)).await.unwrap();
            gate.issue_credential("alice", 1).await.unwrap();
        }

        let gate = build_gate(&config(&dir)).await.unwrap();
        assert!(gate.revoke_credential("alice").await.unwrap());
        assert!(matches!(
            gate.fetch_artifact("alice").await,
            Err(GateError::NotFound(_))
        ));
    }
}
