//! Popup session: the manual speed controls.
//!
//! The popup keeps its own copy of the speed for the active tab's domain.
//! Every change updates that copy first, then persists and messages the
//! tab concurrently. Neither side effect is awaited before the view
//! reflects the new value.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::contracts::ContextMessage;
use crate::domain::{ActiveTab, ContextId, DomainKey, SPEED_STEP, SpeedValue, TabId};
use crate::ports::{MessengerError, TabMessenger};
use crate::services::SpeedPreferences;

/// What the popup renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    /// Window title (`"Speed for <domain>"`), absent without a domain.
    pub title: Option<String>,
    /// Preset matching the current speed, if any.
    pub selected_preset: Option<f64>,
    /// Custom speed field text.
    pub custom_field: String,
    pub presets: Vec<f64>,
}

/// One open popup.
pub struct PopupSession {
    context: ContextId,
    tab: Option<TabId>,
    domain: Option<DomainKey>,
    speed: SpeedValue,
    presets: Vec<f64>,
    prefs: SpeedPreferences,
    messenger: Arc<dyn TabMessenger>,
}

impl PopupSession {
    /// Open over `active_tab` and load its domain's stored speed.
    ///
    /// No tab, no URL or a store failure all fall back to the default
    /// speed.
    pub async fn open(
        active_tab: Option<ActiveTab>,
        prefs: SpeedPreferences,
        messenger: Arc<dyn TabMessenger>,
        presets: Vec<f64>,
    ) -> Self {
        let tab = active_tab.as_ref().map(|t| t.id);
        let domain = active_tab
            .as_ref()
            .and_then(|t| t.url.as_deref())
            .and_then(DomainKey::from_url);

        let speed = match &domain {
            Some(domain) => match prefs.speed_for(domain).await {
                Ok(stored) => stored.unwrap_or_default(),
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Error loading saved speed");
                    SpeedValue::DEFAULT
                }
            },
            None => SpeedValue::DEFAULT,
        };

        Self {
            context: ContextId::next(),
            tab,
            domain,
            speed,
            presets,
            prefs,
            messenger,
        }
    }

    /// Current speed shown by the popup.
    pub const fn speed(&self) -> SpeedValue {
        self.speed
    }

    /// Domain of the active tab.
    pub const fn domain(&self) -> Option<&DomainKey> {
        self.domain.as_ref()
    }

    /// Render state.
    pub fn view(&self) -> PopupView {
        PopupView {
            title: self.domain.as_ref().map(|d| format!("Speed for {d}")),
            selected_preset: self
                .presets
                .iter()
                .copied()
                .find(|preset| *preset == self.speed.get()),
            custom_field: format!("{:.2}", self.speed.get()),
            presets: self.presets.clone(),
        }
    }

    /// Apply a new speed: update the view, then persist and message the
    /// tab concurrently. Returns the applied speed, or `None` if the
    /// request was not a usable speed.
    pub async fn handle_speed_change(&mut self, requested: f64) -> Option<SpeedValue> {
        let speed = SpeedValue::from_request(requested)?;
        self.speed = speed;

        let persist = async {
            let Some(domain) = &self.domain else {
                debug!("No domain for the active tab, not persisting speed");
                return;
            };
            if let Err(e) = self.prefs.save_speed(domain, speed, self.context).await {
                warn!(domain = %domain, error = %e, "Error saving speed");
            }
        };
        let notify = async {
            let Some(tab) = self.tab else {
                return;
            };
            let message = ContextMessage::SetSpeed { speed: speed.get() };
            match self.messenger.send(tab, message).await {
                Ok(_) => {}
                Err(MessengerError::NoReceiver(_)) => {
                    debug!(%tab, "No speed controller in tab");
                }
                Err(e) => warn!(%tab, error = %e, "Error sending speed to tab"),
            }
        };
        tokio::join!(persist, notify);

        Some(speed)
    }

    /// Preset button.
    pub async fn select_preset(&mut self, preset: f64) -> Option<SpeedValue> {
        self.handle_speed_change(preset).await
    }

    /// Fine-adjust up.
    pub async fn speed_up(&mut self) -> Option<SpeedValue> {
        let target = self.speed.adjusted(SPEED_STEP);
        self.handle_speed_change(target.get()).await
    }

    /// Fine-adjust down.
    pub async fn speed_down(&mut self) -> Option<SpeedValue> {
        let target = self.speed.adjusted(-SPEED_STEP);
        self.handle_speed_change(target.get()).await
    }

    /// Custom field submitted with Enter or the Set button.
    ///
    /// Unparsable, zero and negative input is ignored.
    pub async fn submit_custom(&mut self, text: &str) -> Option<SpeedValue> {
        let requested: f64 = text.trim().parse().ok()?;
        self.handle_speed_change(requested).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ContextReply;
    use crate::domain::DOMAIN_SPEEDS_KEY;
    use crate::ports::messenger::MockTabMessenger;
    use crate::ports::{KeyValueStore, StoreChange, StoreError};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    #[derive(Default)]
    struct MockStore {
        values: Mutex<HashMap<String, Value>>,
        fail: bool,
    }

    #[async_trait]
    impl KeyValueStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("offline".to_string()));
            }
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value, _origin: ContextId) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("offline".to_string()));
            }
            self.values.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
            broadcast::channel(1).1
        }
    }

    fn tab(url: &str) -> Option<ActiveTab> {
        Some(ActiveTab {
            id: TabId(7),
            url: Some(url.to_string()),
        })
    }

    fn presets() -> Vec<f64> {
        vec![1.0, 1.5, 2.0]
    }

    fn stored(store: &MockStore) -> Option<Value> {
        store.values.lock().unwrap().get(DOMAIN_SPEEDS_KEY).cloned()
    }

    #[tokio::test]
    async fn test_open_loads_stored_speed() {
        let store = Arc::new(MockStore::default());
        store
            .values
            .lock()
            .unwrap()
            .insert(DOMAIN_SPEEDS_KEY.to_string(), json!({ "example.com": 1.5 }));

        let popup = PopupSession::open(
            tab("https://www.example.com/v"),
            SpeedPreferences::new(store),
            Arc::new(MockTabMessenger::new()),
            presets(),
        )
        .await;

        let view = popup.view();
        assert_eq!(view.title.as_deref(), Some("Speed for example.com"));
        assert_eq!(view.selected_preset, Some(1.5));
        assert_eq!(view.custom_field, "1.50");
    }

    #[tokio::test]
    async fn test_speed_change_persists_and_messages_tab() {
        let store = Arc::new(MockStore::default());
        let mut messenger = MockTabMessenger::new();
        messenger
            .expect_send()
            .withf(|tab, message| {
                *tab == TabId(7) && *message == ContextMessage::SetSpeed { speed: 2.0 }
            })
            .times(1)
            .returning(|_, _| Ok(ContextReply::ok()));

        let mut popup = PopupSession::open(
            tab("https://example.com/"),
            SpeedPreferences::new(store.clone()),
            Arc::new(messenger),
            presets(),
        )
        .await;

        assert_eq!(popup.select_preset(2.0).await.map(SpeedValue::get), Some(2.0));
        assert_eq!(stored(&store), Some(json!({ "example.com": 2.0 })));
        assert_eq!(popup.view().selected_preset, Some(2.0));
    }

    #[tokio::test]
    async fn test_fine_adjust_rounds() {
        let store = Arc::new(MockStore::default());
        let mut messenger = MockTabMessenger::new();
        messenger
            .expect_send()
            .returning(|_, _| Ok(ContextReply::ok()));

        let mut popup = PopupSession::open(
            tab("https://example.com/"),
            SpeedPreferences::new(store.clone()),
            Arc::new(messenger),
            presets(),
        )
        .await;

        for _ in 0..3 {
            popup.speed_up().await;
        }
        assert_eq!(popup.speed().get(), 1.15);
        popup.speed_down().await;
        assert_eq!(popup.speed().get(), 1.1);
        assert_eq!(popup.view().custom_field, "1.10");
        assert_eq!(stored(&store), Some(json!({ "example.com": 1.1 })));
    }

    #[tokio::test]
    async fn test_custom_input_validation() {
        let mut messenger = MockTabMessenger::new();
        messenger
            .expect_send()
            .times(1)
            .returning(|_, _| Ok(ContextReply::ok()));

        let mut popup = PopupSession::open(
            tab("https://example.com/"),
            SpeedPreferences::new(Arc::new(MockStore::default())),
            Arc::new(messenger),
            presets(),
        )
        .await;

        assert!(popup.submit_custom("fast").await.is_none());
        assert!(popup.submit_custom("0").await.is_none());
        assert!(popup.submit_custom("-2").await.is_none());
        assert_eq!(popup.speed(), SpeedValue::DEFAULT);

        assert_eq!(popup.submit_custom(" 40 ").await.map(SpeedValue::get), Some(16.0));
    }

    #[tokio::test]
    async fn test_failures_are_not_fatal() {
        let mut messenger = MockTabMessenger::new();
        messenger
            .expect_send()
            .returning(|tab, _| Err(MessengerError::NoReceiver(tab)));

        let store = Arc::new(MockStore {
            fail: true,
            ..MockStore::default()
        });
        let mut popup = PopupSession::open(
            tab("https://example.com/"),
            SpeedPreferences::new(store),
            Arc::new(messenger),
            presets(),
        )
        .await;
        assert_eq!(popup.speed(), SpeedValue::DEFAULT);

        // Local state is still updated
        assert_eq!(popup.select_preset(1.5).await.map(SpeedValue::get), Some(1.5));
        assert_eq!(popup.speed().get(), 1.5);
    }

    #[tokio::test]
    async fn test_no_tab_means_no_persistence() {
        let store = Arc::new(MockStore::default());
        let mut popup = PopupSession::open(
            None,
            SpeedPreferences::new(store.clone()),
            Arc::new(MockTabMessenger::new()),
            presets(),
        )
        .await;

        assert!(popup.view().title.is_none());
        popup.select_preset(2.0).await;
        assert!(stored(&store).is_none());
    }
}
