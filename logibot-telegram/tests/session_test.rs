//! Integration tests for [`logibot_telegram::BotManager`].
//!
//! Covers: initialize idempotency (exactly one client construction), fail-fast on
//! uninitialized use, the webhook/polling/stop mode transitions, and webhook update
//! forwarding with error propagation. All driven through a mock [`BotClient`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use logibot_core::{LogibotError, Result};
use logibot_telegram::{
    BotClient, BotConnector, BotIdentity, BotManager, BotMode, WebhookStatus,
};
use serde_json::json;
use tokio::sync::Mutex;

#[derive(Default)]
struct MockClient {
    polls: AtomicUsize,
    shutdowns: AtomicUsize,
    webhook_url: Mutex<Option<String>>,
    updates: Mutex<Vec<serde_json::Value>>,
    fail_updates: bool,
}

#[async_trait]
impl BotClient for MockClient {
    async fn identity(&self) -> Result<BotIdentity> {
        Ok(BotIdentity {
            id: 42,
            username: Some("logibot_test_bot".to_string()),
            first_name: "Logibot".to_string(),
        })
    }

    async fn start_polling(&self) -> Result<()> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_webhook(&self, url: &str) -> Result<()> {
        *self.webhook_url.lock().await = Some(url.to_string());
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        *self.webhook_url.lock().await = None;
        Ok(())
    }

    async fn webhook_status(&self) -> Result<WebhookStatus> {
        Ok(WebhookStatus {
            url: self.webhook_url.lock().await.clone(),
            pending_update_count: 0,
            last_error_message: None,
        })
    }

    async fn process_update(&self, update: serde_json::Value) -> Result<()> {
        if self.fail_updates {
            return Err(LogibotError::Bot("update dispatch failed".to_string()));
        }
        self.updates.lock().await.push(update);
        Ok(())
    }
}

struct MockConnector {
    connects: Arc<AtomicUsize>,
    client: Arc<MockClient>,
}

impl BotConnector for MockConnector {
    fn connect(&self, _token: &str) -> Result<Arc<dyn BotClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

fn manager_with_mock(client: Arc<MockClient>) -> (BotManager, Arc<AtomicUsize>) {
    let connects = Arc::new(AtomicUsize::new(0));
    let connector = MockConnector {
        connects: connects.clone(),
        client,
    };
    (BotManager::new(Box::new(connector)), connects)
}

/// **Test: Double initialize constructs exactly one client.**
///
/// **Setup:** Counting connector.
/// **Action:** `initialize` twice with the same token.
/// **Expected:** One connect; identity cached; manager initialized but not running.
#[tokio::test]
async fn test_initialize_is_idempotent_by_skip() {
    let (mut manager, connects) = manager_with_mock(Arc::new(MockClient::default()));

    manager.initialize("token").await.unwrap();
    manager.initialize("token").await.unwrap();

    assert_eq!(connects.load(Ordering::SeqCst), 1);
    assert!(manager.is_initialized());
    assert!(!manager.is_running());
    assert_eq!(manager.mode(), None);
    let identity = manager.identity().expect("identity cached");
    assert_eq!(identity.id, 42);
    assert_eq!(identity.username.as_deref(), Some("logibot_test_bot"));
}

/// **Test: Every lifecycle operation before initialize fails fast.**
///
/// **Setup:** Fresh manager, no initialize.
/// **Action:** `start_polling`, `stop`, `set_webhook`, `delete_webhook`,
/// `webhook_status`, `handle_webhook_update`.
/// **Expected:** Every call errors with exactly "Bot not initialized".
#[tokio::test]
async fn test_operations_before_initialize_fail_fast() {
    let (mut manager, _) = manager_with_mock(Arc::new(MockClient::default()));

    let errors = vec![
        manager.start_polling().await.unwrap_err(),
        manager.stop().await.unwrap_err(),
        manager.set_webhook("https://example.com/hook").await.unwrap_err(),
        manager.delete_webhook().await.unwrap_err(),
        manager.webhook_status().await.unwrap_err(),
        manager
            .handle_webhook_update(json!({"update_id": 1}))
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.to_string(), "Bot not initialized");
    }
}

/// **Test: set_webhook switches the session into running webhook mode; stop resets it.**
///
/// **Setup:** Initialized manager.
/// **Action:** `set_webhook`, then `stop`.
/// **Expected:** Webhook mode + running after set; not running + no mode + one graceful
/// shutdown after stop.
#[tokio::test]
async fn test_webhook_mode_transitions() {
    let client = Arc::new(MockClient::default());
    let (mut manager, _) = manager_with_mock(client.clone());
    manager.initialize("token").await.unwrap();

    manager.set_webhook("https://example.com/hook").await.unwrap();
    assert_eq!(manager.mode(), Some(BotMode::Webhook));
    assert!(manager.is_running());
    assert_eq!(
        client.webhook_url.lock().await.as_deref(),
        Some("https://example.com/hook")
    );

    manager.stop().await.unwrap();
    assert!(!manager.is_running());
    assert_eq!(manager.mode(), None);
    assert_eq!(client.shutdowns.load(Ordering::SeqCst), 1);
}

/// **Test: start_polling switches the session into running polling mode.**
///
/// **Setup:** Initialized manager.
/// **Action:** `start_polling`.
/// **Expected:** Polling mode, running, and the client's loop started once.
#[tokio::test]
async fn test_polling_mode_transition() {
    let client = Arc::new(MockClient::default());
    let (mut manager, _) = manager_with_mock(client.clone());
    manager.initialize("token").await.unwrap();

    manager.start_polling().await.unwrap();

    assert_eq!(manager.mode(), Some(BotMode::Polling));
    assert!(manager.is_running());
    assert_eq!(client.polls.load(Ordering::SeqCst), 1);
}

/// **Test: stop when not running logs and no-ops.**
///
/// **Setup:** Initialized manager, never started.
/// **Action:** `stop`.
/// **Expected:** Ok, no shutdown call on the client.
#[tokio::test]
async fn test_stop_when_not_running_is_noop() {
    let client = Arc::new(MockClient::default());
    let (mut manager, _) = manager_with_mock(client.clone());
    manager.initialize("token").await.unwrap();

    manager.stop().await.unwrap();

    assert_eq!(client.shutdowns.load(Ordering::SeqCst), 0);
    assert!(!manager.is_running());
}

/// **Test: Webhook updates are forwarded raw; client failures propagate.**
///
/// **Setup:** Initialized manager; second manager whose client rejects updates.
/// **Action:** `handle_webhook_update` on both.
/// **Expected:** Payload reaches the client verbatim; the failing client's error
/// surfaces to the caller.
#[tokio::test]
async fn test_webhook_update_forwarding_and_propagation() {
    let client = Arc::new(MockClient::default());
    let (mut manager, _) = manager_with_mock(client.clone());
    manager.initialize("token").await.unwrap();

    let payload = json!({"update_id": 7, "message": {"text": "/start"}});
    manager.handle_webhook_update(payload.clone()).await.unwrap();
    assert_eq!(client.updates.lock().await.clone(), vec![payload]);

    let failing = Arc::new(MockClient {
        fail_updates: true,
        ..MockClient::default()
    });
    let (mut failing_manager, _) = manager_with_mock(failing);
    failing_manager.initialize("token").await.unwrap();

    let err = failing_manager
        .handle_webhook_update(json!({"update_id": 8}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("update dispatch failed"));
}
