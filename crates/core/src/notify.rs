//! Push notifications and notification clicks.
//!
//! Presentation belongs to the host; this module only builds the payload
//! and decides what a click should do.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Vibration pattern in milliseconds: buzz, pause, buzz.
const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Action id that opens the app.
pub const ACTION_EXPLORE: &str = "explore";

/// Action id that only dismisses.
pub const ACTION_CLOSE: &str = "close";

/// Presentation settings for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Used as the notification title and in default copy.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    #[serde(default = "default_badge")]
    pub badge: String,
}

fn default_app_name() -> String {
    "Harbor".into()
}

fn default_icon() -> String {
    "/icons/icon-192.png".into()
}

fn default_badge() -> String {
    "/icons/icon-72.png".into()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { app_name: default_app_name(), icon: default_icon(), badge: default_badge() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Structured notification handed to the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the notification for a push message; `text` is the push payload.
    pub fn from_push(settings: &NotificationSettings, text: Option<&str>) -> Self {
        let body = match text.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("New notification from {}", settings.app_name),
        };

        Self {
            title: settings.app_name.clone(),
            body,
            icon: settings.icon.clone(),
            badge: settings.badge.clone(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            data: NotificationData { date_of_arrival: chrono::Utc::now().timestamp_millis(), primary_key: 1 },
            actions: vec![
                NotificationAction {
                    action: ACTION_EXPLORE.into(),
                    title: format!("Open {}", settings.app_name),
                    icon: settings.icon.clone(),
                },
                NotificationAction { action: ACTION_CLOSE.into(), title: "Close".into(), icon: settings.icon.clone() },
            ],
        }
    }
}

/// What a notification click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", content = "url", rename_all = "kebab-case")]
pub enum ClickOutcome {
    /// An existing client was brought to the front.
    Focused(String),
    /// A new window was opened.
    Opened(String),
    /// Nothing beyond closing the notification.
    Dismissed,
}

/// Presentation collaborator: shows notifications and manages client windows.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    /// Focus an open client at `url`; `false` if none is open.
    async fn focus(&self, url: &str) -> Result<bool, Error>;

    async fn open_window(&self, url: &str) -> Result<(), Error>;
}

/// Presenter that only logs. Used when the host has no display surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, "notification");
        Ok(())
    }

    async fn focus(&self, url: &str) -> Result<bool, Error> {
        tracing::debug!(url, "no open clients to focus");
        Ok(false)
    }

    async fn open_window(&self, url: &str) -> Result<(), Error> {
        tracing::info!(url, "open window");
        Ok(())
    }
}

/// Resolve a notification click.
///
/// `explore` always opens a new window at `root`; `close` does nothing more;
/// any other action focuses an existing client at `root` or opens one.
pub async fn handle_click(presenter: &dyn Presenter, action: Option<&str>, root: &str) -> Result<ClickOutcome, Error> {
    match action {
        Some(ACTION_EXPLORE) => {
            presenter.open_window(root).await?;
            Ok(ClickOutcome::Opened(root.to_string()))
        }
        Some(ACTION_CLOSE) => Ok(ClickOutcome::Dismissed),
        _ => {
            if presenter.focus(root).await? {
                return Ok(ClickOutcome::Focused(root.to_string()));
            }
            presenter.open_window(root).await?;
            Ok(ClickOutcome::Opened(root.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPresenter {
        open_client: bool,
        opened: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Presenter for RecordingPresenter {
        async fn show(&self, _notification: &Notification) -> Result<(), Error> {
            Ok(())
        }

        async fn focus(&self, _url: &str) -> Result<bool, Error> {
            Ok(self.open_client)
        }

        async fn open_window(&self, url: &str) -> Result<(), Error> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_from_push_with_text() {
        let n = Notification::from_push(&NotificationSettings::default(), Some("3 new posts"));
        assert_eq!(n.title, "Harbor");
        assert_eq!(n.body, "3 new posts");
        assert_eq!(n.vibrate, vec![200, 100, 200]);
        assert_eq!(n.data.primary_key, 1);
        assert_eq!(n.actions.len(), 2);
        assert_eq!(n.actions[0].action, "explore");
        assert_eq!(n.actions[0].title, "Open Harbor");
        assert_eq!(n.actions[1].action, "close");
    }

    #[test]
    fn test_from_push_default_body() {
        let settings = NotificationSettings { app_name: "Space".into(), ..Default::default() };
        let n = Notification::from_push(&settings, None);
        assert_eq!(n.body, "New notification from Space");

        let n = Notification::from_push(&settings, Some("  "));
        assert_eq!(n.body, "New notification from Space");
    }

    #[tokio::test]
    async fn test_click_explore_opens_window() {
        let presenter = RecordingPresenter { open_client: true, ..Default::default() };
        let outcome = handle_click(&presenter, Some("explore"), "/").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Opened("/".into()));
        assert_eq!(presenter.opened.lock().unwrap().as_slice(), ["/".to_string()]);
    }

    #[tokio::test]
    async fn test_click_close_dismisses() {
        let presenter = RecordingPresenter::default();
        let outcome = handle_click(&presenter, Some("close"), "/").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Dismissed);
        assert!(presenter.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_default_focuses_open_client() {
        let presenter = RecordingPresenter { open_client: true, ..Default::default() };
        let outcome = handle_click(&presenter, None, "/").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Focused("/".into()));
    }

    #[tokio::test]
    async fn test_click_default_opens_when_no_client() {
        let presenter = RecordingPresenter::default();
        let outcome = handle_click(&presenter, Some(""), "/").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Opened("/".into()));
    }
}
