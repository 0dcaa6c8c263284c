//! The gate: issuing entry credentials and authenticating arrivals.
//!
//! [`Gate`] is the surface the HTTP layer talks to. Authentication runs
//! `validate -> toggle -> dispatch` as one control path:
//!
//! 1. A credential that does not validate ends the request as unauthorized.
//! 2. A valid credential always toggles the caller's presence.
//! 3. The resulting transition is handed to the notifier, which never
//!    blocks and never fails the request.
//!
//! Dispatch happens while the occupancy lock is held, so signals reach the
//! delivery queue in the same order as the toggles that produced them.
//! Dispatch only enqueues; delivery runs outside the lock on the
//! notifier's worker, so a slow alarm endpoint cannot stall authentication.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::auth::credentials::{validate_identity, CredentialStore};
use crate::error::{GateError, GateResult};
use crate::notifications::{AlarmSignal, Notifier};
use crate::occupancy::{OccupancyTracker, Presence, Transition};
use crate::sweeper::Sweeper;
use crate::traits::{ArtifactRef, ArtifactRenderer, ArtifactStore};

/// Result of issuing a credential through the gate.
///
/// The plaintext secret is deliberately absent: it only exists inside the
/// rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedArtifact {
    pub identity: String,
    pub artifact: ArtifactRef,
    pub expires_at: DateTime<Utc>,
}

/// Result of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthOutcome {
    pub authorized: bool,
    /// Direction of the toggle, if one happened.
    pub presence: Option<Presence>,
    pub transition: Transition,
    /// Alarm signal queued for delivery, if any.
    pub signal: Option<AlarmSignal>,
}

impl AuthOutcome {
    fn denied() -> Self {
        Self {
            authorized: false,
            presence: None,
            transition: Transition::None,
            signal: None,
        }
    }
}

/// Orchestrates credentials, occupancy and alarm signals.
pub struct Gate {
    store: Arc<CredentialStore>,
    artifacts: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn ArtifactRenderer>,
    occupancy: OccupancyTracker,
    notifier: Notifier,
    sweeper: Sweeper,
    public_base_url: String,
}

impl Gate {
    /// Assemble a gate.
    ///
    /// # Arguments
    /// * `store` - Credential store; must share `artifacts` with the gate
    /// * `artifacts` - Where rendered artifacts are kept
    /// * `renderer` - Renders the authentication link into an artifact
    /// * `notifier` - Front of the alarm delivery worker
    /// * `sweep_interval` - Interval for the periodic sweeper
    /// * `public_base_url` - Authentication URL prefix embedded in artifacts
    pub fn new(
        store: Arc<CredentialStore>,
        artifacts: Arc<dyn ArtifactStore>,
        renderer: Arc<dyn ArtifactRenderer>,
        notifier: Notifier,
        sweep_interval: Duration,
        public_base_url: impl Into<String>,
    ) -> Self {
        let sweeper = Sweeper::new(Arc::clone(&store), sweep_interval);
        Self {
            store,
            artifacts,
            renderer,
            occupancy: OccupancyTracker::new(),
            notifier,
            sweeper,
            public_base_url: public_base_url.into(),
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn occupancy(&self) -> &OccupancyTracker {
        &self.occupancy
    }

    /// A handle to the sweeper, for scheduling periodic sweeps.
    pub fn sweeper(&self) -> Sweeper {
        self.sweeper.clone()
    }

    /// MIME type of the artifacts this gate renders.
    pub fn artifact_content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// Link a holder of `secret` follows to authenticate as `identity`.
    pub fn authentication_link(&self, identity: &str, secret: &str) -> String {
        format!(
            "{}/{}?password={}",
            self.public_base_url.trim_end_matches('/'),
            urlencoding::encode(identity),
            urlencoding::encode(secret)
        )
    }

    /// Issue a credential for `identity` valid for `ttl_hours`, and store
    /// its rendered authentication link as the identity's artifact.
    ///
    /// # Errors
    /// - `ValidationInput` for a bad identity or a ttl of zero or out of range
    /// - `Storage` if the record, the rendering or the artifact cannot be
    ///   written. If only the artifact write fails the new credential is
    ///   already in effect; issuing again repairs it.
    pub async fn issue_credential(
        &self,
        identity: &str,
        ttl_hours: u64,
    ) -> GateResult<IssuedArtifact> {
        let ttl = ttl_from_hours(ttl_hours)?;
        let issued = self.store.issue(identity, ttl).await?;

        let link = self.authentication_link(&issued.identity, &issued.secret);
        let artifact = match self.store_artifact(&issued.identity, &link).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!(
                    "Credential for {} issued but its artifact was not stored: {}",
                    issued.identity,
                    e
                );
                return Err(e);
            }
        };

        tracing::info!(
            "Issued credential for {} (expires {})",
            issued.identity,
            issued.expires_at.to_rfc3339()
        );
        Ok(IssuedArtifact {
            identity: issued.identity,
            artifact,
            expires_at: issued.expires_at,
        })
    }

    async fn store_artifact(&self, identity: &str, link: &str) -> GateResult<ArtifactRef> {
        let renderer = Arc::clone(&self.renderer);
        let link = link.to_string();
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&link))
            .await
            .map_err(|e| GateError::Storage(format!("render task failed: {}", e)))??;
        Ok(self.artifacts.save(identity, rendered).await?)
    }

    /// Revoke `identity`'s credential and artifact.
    ///
    /// Presence is left alone. Only the identity itself can toggle its
    /// membership, so a revoked identity that is inside stays counted until
    /// the process restarts.
    ///
    /// # Returns
    /// `true` if a credential existed.
    pub async fn revoke_credential(&self, identity: &str) -> GateResult<bool> {
        let existed = self.store.revoke(identity).await?;
        if existed {
            tracing::info!("Revoked credential for {}", identity);
        } else {
            tracing::debug!("Revoke for {}: nothing stored", identity);
        }
        Ok(existed)
    }

    /// Authenticate `identity` with `secret` and toggle its presence.
    ///
    /// # Errors
    /// `Storage` if the credential cannot be read. Alarm delivery problems
    /// never surface here.
    pub async fn authenticate(&self, identity: &str, secret: &str) -> GateResult<AuthOutcome> {
        if !self.store.validate(identity, secret).await? {
            tracing::info!("Rejected authentication for {}", identity);
            return Ok(AuthOutcome::denied());
        }

        let (toggle, signal) = self
            .occupancy
            .toggle_then(identity, |toggle| self.notifier.dispatch(toggle.transition));

        tracing::info!(
            "Authenticated {} ({:?}, {} present, transition: {})",
            identity,
            toggle.presence,
            toggle.present,
            toggle.transition
        );
        Ok(AuthOutcome {
            authorized: true,
            presence: Some(toggle.presence),
            transition: toggle.transition,
            signal,
        })
    }

    /// Start one sweep in the background and return immediately.
    ///
    /// The sweep is tracked by the sweeper, whose spawned loop waits for it
    /// on shutdown.
    pub fn trigger_sweep(&self) {
        self.sweeper.trigger();
    }

    /// The artifact previously rendered for `identity`.
    ///
    /// # Errors
    /// - `ValidationInput` if `identity` is not a valid identity
    /// - `NotFound` if no artifact is stored
    pub async fn fetch_artifact(&self, identity: &str) -> GateResult<Bytes> {
        validate_identity(identity)?;
        Ok(self.artifacts.load(identity).await?)
    }
}

fn ttl_from_hours(ttl_hours: u64) -> GateResult<chrono::Duration> {
    if ttl_hours == 0 {
        return Err(GateError::ValidationInput(
            "ttl must be at least one hour".to_string(),
        ));
    }
    i64::try_from(ttl_hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .ok_or_else(|| GateError::ValidationInput("ttl out of range".to_string()))
}
