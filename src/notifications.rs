//! Alarm notifications for occupancy boundary transitions.
//!
//! `FirstArrival` disarms the alarm, `LastDeparture` arms it, everything
//! else sends nothing. Delivery is fire-and-forget: [`Notifier::dispatch`]
//! only enqueues the signal and returns. A single background worker posts
//! signals in the order they were produced, each bounded by a timeout.
//! Failures are logged and dropped; nothing is retried and nothing reaches
//! the authenticating caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{GateError, GateResult};
use crate::occupancy::Transition;
use crate::traits::{is_success, HttpClient};

/// Signal sent to the external alarm system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSignal {
    /// Nobody is home any more.
    Arm,
    /// Somebody just arrived at an empty home.
    Disarm,
}

impl AlarmSignal {
    /// Signal owed for `transition`, if any.
    pub fn for_transition(transition: Transition) -> Option<Self> {
        match transition {
            Transition::FirstArrival => Some(AlarmSignal::Disarm),
            Transition::LastDeparture => Some(AlarmSignal::Arm),
            Transition::None | Transition::InteriorChange => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSignal::Arm => "arm",
            AlarmSignal::Disarm => "disarm",
        }
    }
}

impl std::fmt::Display for AlarmSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where arm and disarm signals are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEndpoints {
    /// Base URL of the alarm system (e.g. `http://homeassistant.local:8123`)
    pub base_url: String,
    /// Webhook id that arms the alarm
    pub arm_signal_id: String,
    /// Webhook id that disarms the alarm
    pub disarm_signal_id: String,
}

impl AlarmEndpoints {
    /// Full webhook URL for `signal`.
    pub fn url_for(&self, signal: AlarmSignal) -> String {
        let id = match signal {
            AlarmSignal::Arm => &self.arm_signal_id,
            AlarmSignal::Disarm => &self.disarm_signal_id,
        };
        format!(
            "{}/api/webhook/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(id)
        )
    }
}

/// Posts one signal to the alarm webhook.
#[derive(Clone)]
pub struct AlarmWebhook {
    client: Arc<dyn HttpClient>,
    endpoints: AlarmEndpoints,
    timeout: Duration,
}

impl AlarmWebhook {
    pub fn new(client: Arc<dyn HttpClient>, endpoints: AlarmEndpoints, timeout: Duration) -> Self {
        Self {
            client,
            endpoints,
            timeout,
        }
    }

    pub fn endpoints(&self) -> &AlarmEndpoints {
        &self.endpoints
    }

    /// Post `signal`, giving up after the configured timeout.
    ///
    /// # Errors
    /// `Notify` on timeout, transport failure or a non-2xx status.
    pub async fn send(&self, signal: AlarmSignal) -> GateResult<()> {
        let url = self.endpoints.url_for(signal);
        let status = tokio::time::timeout(self.timeout, self.client.post(&url))
            .await
            .map_err(|_| {
                GateError::Notify(format!("{} signal timed out after {:?}", signal, self.timeout))
            })??;

        if !is_success(status) {
            return Err(GateError::Notify(format!(
                "{} signal rejected with status {}",
                signal, status
            )));
        }
        Ok(())
    }
}

/// Non-blocking front of the delivery worker.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<AlarmSignal>,
}

impl Notifier {
    /// Start the delivery worker for `webhook`.
    ///
    /// The worker exits once every `Notifier` clone has been dropped and
    /// the queue is drained.
    pub fn spawn(webhook: AlarmWebhook) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<AlarmSignal>();
        let handle = tokio::spawn(async move {
            while let Some(signal) = rx.recv().await {
                match webhook.send(signal).await {
                    Ok(()) => tracing::info!("Alarm {} signal delivered", signal),
                    Err(e) => tracing::warn!("Alarm {} signal not delivered: {}", signal, e),
                }
            }
            tracing::debug!("Alarm notifier stopped");
        });
        (Self { tx }, handle)
    }

    /// Queue the signal owed for `transition`, if any, and return at once.
    ///
    /// # Returns
    /// The signal that was queued, or `None` for non-boundary transitions.
    pub fn dispatch(&self, transition: Transition) -> Option<AlarmSignal> {
        let signal = AlarmSignal::for_transition(transition)?;
        if self.tx.send(signal).is_err() {
            tracing::warn!("Alarm notifier is not running, dropped {} signal", signal);
        }
        Some(signal)
    }
}
