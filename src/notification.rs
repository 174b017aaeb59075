use crate::error::{Result, UrgencyError};
use crate::report::template::substitute;
use crate::report::FormatFields;
use crate::types::config::{NotificationConfig, NotificationUrgency};
use crate::types::report::{ScoreReport, UrgencyLevel};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub app_name: String,
    pub icon: String,
    pub title: String,
    pub message: String,
    pub timeout: u32,
    pub urgency: Option<NotificationUrgency>,
}

impl Notification {
    pub fn from_report(config: &NotificationConfig, report: &ScoreReport) -> Self {
        let fields = FormatFields::from_report(report);
        Self {
            app_name: config.app_name.clone(),
            icon: config.icon.clone(),
            title: substitute(&config.title, &fields),
            message: substitute(&config.message, &fields),
            timeout: config.timeout,
            urgency: config.urgency,
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Desktop notification through `notify-send`.
pub struct NotifySend;

impl Notifier for NotifySend {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let mut command = Command::new("notify-send");
        command
            .arg("--app-name")
            .arg(&notification.app_name)
            .arg("--icon")
            .arg(&notification.icon)
            .arg("--expire-time")
            .arg(notification.timeout.to_string());
        if let Some(urgency) = notification.urgency {
            command.arg("--urgency").arg(urgency.as_str());
        }
        let output = command
            .arg(&notification.title)
            .arg(&notification.message)
            .output()
            .map_err(|e| UrgencyError::Notification(format!("failed to run notify-send: {e}")))?;

        if !output.status.success() {
            return Err(UrgencyError::Notification(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

/// Notify only when the level reaches the threshold and rose since the last persisted report.
///
/// Without a previous level (first run or caching disabled) any qualifying level notifies.
pub fn should_notify(
    config: &NotificationConfig,
    current: UrgencyLevel,
    previous: Option<UrgencyLevel>,
) -> bool {
    current >= config.threshold && previous.map_or(true, |previous| current > previous)
}

/// Returns whether a notification was shown.
pub fn maybe_notify(
    config: &NotificationConfig,
    report: &ScoreReport,
    previous: Option<UrgencyLevel>,
    notifier: &dyn Notifier,
) -> bool {
    if !should_notify(config, report.level, previous) {
        tracing::debug!(level = report.level.as_str(), "notification not required");
        return false;
    }
    match notifier.notify(&Notification::from_report(config, report)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "unable to show notification");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        shown: RefCell<Vec<Notification>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) -> Result<()> {
            self.shown.borrow_mut().push(notification.clone());
            Ok(())
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn notify(&self, _notification: &Notification) -> Result<()> {
            Err(UrgencyError::Notification("no session bus".to_string()))
        }
    }

    fn config(toml_str: &str) -> NotificationConfig {
        toml::from_str(toml_str).expect("notification config should parse")
    }

    #[test]
    fn notifies_when_level_rises_past_threshold() {
        let cfg = config(r#"threshold = "warning""#);
        assert!(should_notify(&cfg, UrgencyLevel::Warning, Some(UrgencyLevel::Available)));
        assert!(should_notify(&cfg, UrgencyLevel::Critical, Some(UrgencyLevel::Warning)));
        assert!(!should_notify(&cfg, UrgencyLevel::Available, Some(UrgencyLevel::None)));
    }

    #[test]
    fn does_not_repeat_for_unchanged_or_falling_level() {
        let cfg = config("");
        assert!(!should_notify(&cfg, UrgencyLevel::Warning, Some(UrgencyLevel::Warning)));
        assert!(!should_notify(&cfg, UrgencyLevel::Available, Some(UrgencyLevel::Critical)));
    }

    #[test]
    fn missing_previous_level_always_qualifies() {
        let cfg = config("");
        assert!(should_notify(&cfg, UrgencyLevel::Available, None));
        assert!(!should_notify(&cfg, UrgencyLevel::None, None));
    }

    #[test]
    fn templates_are_filled_from_report() {
        let cfg = config(
            r#"
title = "$status_text ($score)"
message = "$update_count pending: $available_updates"
urgency = "critical"
"#,
        );
        let recorder = Recorder::default();
        let shown = maybe_notify(&cfg, &sample_report(UrgencyLevel::Warning), None, &recorder);
        assert!(shown);

        let shown = recorder.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Updates recommended (2)");
        assert_eq!(shown[0].message, "2 pending: linux, foo");
        assert_eq!(shown[0].urgency, Some(NotificationUrgency::Critical));
        assert_eq!(shown[0].timeout, 5000);
    }

    #[test]
    fn delivery_failure_is_not_fatal() {
        let cfg = config("");
        assert!(!maybe_notify(
            &cfg,
            &sample_report(UrgencyLevel::Critical),
            None,
            &Failing
        ));
    }
}
