//! Notification bridge and SMS fan-out.
//!
//! The bridge is an external collaborator behind a trait seam: a real
//! deployment plugs an SMS provider in, and [`LogBridge`] is the
//! unconfigured default that deterministically "delivers" by logging.
//!
//! Fan-out is concurrent but bounded, and every target's outcome is
//! collected independently: one parent's dead number never blocks or
//! fails another's notification, and the aggregate result reports
//! exactly which targets failed and why.

use std::sync::Arc;

use async_trait::async_trait;
use drillcast_proto::{AlertDelivery, DeliveryFailure};
use thiserror::Error;
use tokio::{sync::Semaphore, task::JoinSet};

/// A single SMS delivery failed.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// The provider rejected or failed the send.
    #[error("send failed: {0}")]
    Send(String),
}

/// Best-effort SMS dispatch.
#[async_trait]
pub trait NotificationBridge: Send + Sync + 'static {
    /// Send one message. Failures are per-target and collected by the
    /// caller; implementations must not retry internally.
    async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError>;
}

/// Unconfigured-bridge fallback: logs the message instead of sending.
///
/// Deterministically succeeds for any target that has an address, so
/// development and tests behave like a healthy provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBridge;

#[async_trait]
impl NotificationBridge for LogBridge {
    async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(%to, %body, "sms bridge unconfigured, logging instead of sending");
        Ok(())
    }
}

/// One member of an alert fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsTarget {
    /// Username of the student whose parent is notified.
    pub username: String,
    /// Parent contact number; `None` becomes a per-target failure
    /// without a bridge call.
    pub to: Option<String>,
    /// Message body.
    pub body: String,
}

/// Deliver to every target with at most `concurrency` sends in
/// flight, and aggregate the outcomes.
pub async fn deliver_all(
    bridge: Arc<dyn NotificationBridge>,
    targets: Vec<SmsTarget>,
    concurrency: usize,
) -> AlertDelivery {
    let mut delivery = AlertDelivery { total: targets.len() as u64, ..AlertDelivery::default() };
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks: JoinSet<(String, Result<(), String>)> = JoinSet::new();

    for target in targets {
        let Some(to) = target.to else {
            // No bridge call to make; still one targeted member.
            delivery.failed += 1;
            delivery.failures.push(DeliveryFailure {
                username: target.username,
                reason: "no contact address on record".to_string(),
            });
            continue;
        };

        let bridge = Arc::clone(&bridge);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let permit = semaphore.acquire_owned().await;
            if permit.is_err() {
                return (target.username, Err("fan-out cancelled".to_string()));
            }
            let result = bridge.send(&to, &target.body).await.map_err(|e| e.to_string());
            (target.username, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => delivery.sent += 1,
            Ok((username, Err(reason))) => {
                tracing::warn!(%username, %reason, "sms delivery failed");
                delivery.failed += 1;
                delivery.failures.push(DeliveryFailure { username, reason });
            },
            Err(e) => {
                delivery.failed += 1;
                delivery.failures.push(DeliveryFailure {
                    username: String::new(),
                    reason: format!("delivery task failed: {e}"),
                });
            },
        }
    }

    delivery
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bridge that fails every number ending in "9".
    struct FlakyBridge;

    #[async_trait]
    impl NotificationBridge for FlakyBridge {
        async fn send(&self, to: &str, _body: &str) -> Result<(), NotifyError> {
            if to.ends_with('9') {
                Err(NotifyError::Send(format!("{to} unreachable")))
            } else {
                Ok(())
            }
        }
    }

    fn target(username: &str, to: Option<&str>) -> SmsTarget {
        SmsTarget {
            username: username.to_string(),
            to: to.map(String::from),
            body: "fire Alert: Evacuate".to_string(),
        }
    }

    #[tokio::test]
    async fn failures_are_isolated_per_target() {
        let targets = vec![
            target("s1", Some("+15550001")),
            target("s2", Some("+15550009")), // fails
            target("s3", Some("+15550002")),
            target("s4", Some("+15550019")), // fails
            target("s5", Some("+15550003")),
        ];

        let delivery = deliver_all(Arc::new(FlakyBridge), targets, 2).await;

        assert_eq!(delivery.total, 5);
        assert_eq!(delivery.sent, 3);
        assert_eq!(delivery.failed, 2);

        let mut failed: Vec<&str> = delivery.failures.iter().map(|f| f.username.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec!["s2", "s4"]);
    }

    #[tokio::test]
    async fn missing_address_is_a_failure_without_a_send() {
        let targets = vec![target("s1", Some("+15550001")), target("s2", None)];

        let delivery = deliver_all(Arc::new(LogBridge), targets, 4).await;

        assert_eq!(delivery.total, 2);
        assert_eq!(delivery.sent, 1);
        assert_eq!(delivery.failed, 1);
        assert_eq!(delivery.failures[0].username, "s2");
        assert!(delivery.failures[0].reason.contains("no contact address"));
    }

    #[tokio::test]
    async fn log_bridge_succeeds_deterministically() {
        let targets = vec![target("s1", Some("+15550001")), target("s2", Some("+15550002"))];
        let delivery = deliver_all(Arc::new(LogBridge), targets, 1).await;
        assert_eq!(delivery.sent, 2);
        assert_eq!(delivery.failed, 0);
    }

    #[tokio::test]
    async fn empty_roster_yields_empty_delivery() {
        let delivery = deliver_all(Arc::new(LogBridge), Vec::new(), 8).await;
        assert_eq!(delivery, AlertDelivery::default());
    }
}
