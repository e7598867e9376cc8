//! Provider task model.
//!
//! Tasks are created and mutated by the generation provider; this system
//! only reads them. The lifecycle as observed from here is
//! `CREATED -> RUNNING -> {SUCCEEDED | FAILED | CANCELED}`, with a
//! client-side timeout reported by [`crate::poll::PollOutcome::TimedOut`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::poll::PollStep;

/// Status of a provider task, as reported by the status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Throttled,
    Running,
    Succeeded,
    Failed,
    Canceled,
    /// Any status this build does not know about, or none at all. Treated
    /// as in-flight.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Wire form, e.g. `"SUCCEEDED"`.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Throttled => "THROTTLED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Canceled => "CANCELED",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }

    /// Whether the provider will never change this task again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }

    /// Whether this is one of the provider's failure states.
    pub fn is_failure(self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::Canceled)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a provider task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Result URLs. The provider sends `null` or omits the field until the
    /// task has succeeded.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub output: Vec<String>,
    /// Provider-supplied failure message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl TaskSnapshot {
    /// First result URL, if the provider has produced one.
    pub fn first_output(&self) -> Option<&str> {
        self.output.first().map(String::as_str)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Classify a task snapshot for [`crate::poll::poll_until`].
///
/// Success needs both `SUCCEEDED` and at least one output URL; a succeeded
/// task with no output yet keeps polling. The success value is the first
/// output URL.
pub fn classify_task(task: &TaskSnapshot) -> PollStep<String> {
    match task.status {
        TaskStatus::Succeeded => match task.first_output() {
            Some(url) => PollStep::Success(url.to_string()),
            None => PollStep::Continue,
        },
        status if status.is_failure() => PollStep::Failure(status.as_str().to_string()),
        _ => PollStep::Continue,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn snapshot(status: TaskStatus, output: &[&str]) -> TaskSnapshot {
        TaskSnapshot {
            id: "task-1".to_string(),
            status,
            output: output.iter().map(|s| s.to_string()).collect(),
            failure: None,
        }
    }

    #[test]
    fn deserializes_provider_payload() {
        let task: TaskSnapshot = serde_json::from_value(json!({
            "id": "abc",
            "status": "SUCCEEDED",
            "createdAt": "2024-11-06T00:00:00Z",
            "output": ["https://cdn/a.mp4", "https://cdn/b.mp4"],
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(task.first_output(), Some("https://cdn/a.mp4"));
    }

    #[test]
    fn null_and_missing_output_become_empty() {
        let with_null: TaskSnapshot =
            serde_json::from_value(json!({"id": "a", "status": "RUNNING", "output": null}))
                .unwrap();
        let missing: TaskSnapshot =
            serde_json::from_value(json!({"id": "a", "status": "PENDING"})).unwrap();

        assert!(with_null.output.is_empty());
        assert!(missing.output.is_empty());
    }

    #[test]
    fn unknown_status_is_not_terminal() {
        let task: TaskSnapshot =
            serde_json::from_value(json!({"id": "a", "status": "ASSETS_UPLOADING"})).unwrap();

        assert_eq!(task.status, TaskStatus::Unknown);
        assert!(!task.status.is_terminal());
    }

    #[test]
    fn missing_status_reads_as_unknown() {
        let task: TaskSnapshot = serde_json::from_value(json!({"output": ["x"]})).unwrap();

        assert_eq!(task.status, TaskStatus::Unknown);
        assert_matches!(classify_task(&task), PollStep::Continue);
    }

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Throttled.is_terminal());
    }

    #[test]
    fn succeeded_with_output_is_success() {
        let step = classify_task(&snapshot(TaskStatus::Succeeded, &["https://cdn/x.png"]));
        assert_matches!(step, PollStep::Success(url) if url == "https://cdn/x.png");
    }

    #[test]
    fn succeeded_without_output_keeps_polling() {
        assert_matches!(
            classify_task(&snapshot(TaskStatus::Succeeded, &[])),
            PollStep::Continue
        );
    }

    #[test]
    fn failed_and_canceled_are_failures() {
        assert_matches!(
            classify_task(&snapshot(TaskStatus::Failed, &[])),
            PollStep::Failure(reason) if reason == "FAILED"
        );
        assert_matches!(
            classify_task(&snapshot(TaskStatus::Canceled, &[])),
            PollStep::Failure(reason) if reason == "CANCELED"
        );
    }

    #[test]
    fn in_flight_states_continue() {
        for status in [TaskStatus::Pending, TaskStatus::Running, TaskStatus::Throttled] {
            assert_matches!(classify_task(&snapshot(status, &[])), PollStep::Continue);
        }
    }

    #[test]
    fn status_serializes_in_wire_form() {
        assert_eq!(serde_json::to_value(TaskStatus::Canceled).unwrap(), json!("CANCELED"));
        assert_eq!(TaskStatus::Running.to_string(), "RUNNING");
    }
}
