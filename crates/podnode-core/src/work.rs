//! Coordinator work responses and the descriptors derived from them.

use podnode_ipfs::ContentAddress;
use serde::{Deserialize, Serialize};

/// Prefix of the coordinator message signalling that no work is available.
pub const NO_WORK_PREFIX: &str = "No Work";

/// Coordinator message signalling that it could not process the work request.
pub const REQUEST_ERROR_MESSAGE: &str = "Request Error";

/// Raw work response as returned by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkResponse {
    /// Status message; carries the "no work" and "request error" sentinels.
    #[serde(default)]
    pub message: Option<String>,
    /// URL of the episode to download.
    #[serde(default)]
    pub download: Option<String>,
    /// File name to store the download under.
    #[serde(default)]
    pub filename: Option<String>,
    /// Show title, for logging.
    #[serde(default)]
    pub show: Option<String>,
    /// Episode title, for logging.
    #[serde(default)]
    pub episode: Option<String>,
    /// Address to pin.
    #[serde(default)]
    pub pin: Option<String>,
    /// Address to unpin.
    #[serde(default)]
    pub delete: Option<String>,
}

/// Outcome of classifying a coordinator work response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkAssignment {
    /// The coordinator could not process the request.
    RequestError,
    /// Nothing to do this cycle.
    NoWork {
        /// Message the coordinator sent.
        message: String,
    },
    /// A unit of work to execute.
    Work(WorkDescriptor),
}

impl WorkResponse {
    /// Classify the response, short-circuiting on the coordinator sentinels.
    #[must_use]
    pub fn classify(self) -> WorkAssignment {
        let message = self.message.clone().unwrap_or_default();
        if message == REQUEST_ERROR_MESSAGE {
            WorkAssignment::RequestError
        } else if message.starts_with(NO_WORK_PREFIX) {
            WorkAssignment::NoWork { message }
        } else {
            WorkAssignment::Work(WorkDescriptor::from(self))
        }
    }
}

/// A single unit of work: at most one add, one pin and one unpin.
///
/// Empty strings from the coordinator are normalised to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkDescriptor {
    /// URL to download for the add action.
    pub download_url: Option<String>,
    /// File name for the add action.
    pub filename: Option<String>,
    /// Address to pin.
    pub pin_target: Option<ContentAddress>,
    /// Address to unpin.
    pub unpin_target: Option<ContentAddress>,
    /// Show title.
    pub show: String,
    /// Episode title.
    pub episode: String,
}

impl From<WorkResponse> for WorkDescriptor {
    fn from(response: WorkResponse) -> Self {
        Self {
            download_url: non_empty(response.download),
            filename: non_empty(response.filename),
            pin_target: non_empty(response.pin).map(ContentAddress::from),
            unpin_target: non_empty(response.delete).map(ContentAddress::from),
            show: response.show.unwrap_or_default(),
            episode: response.episode.unwrap_or_default(),
        }
    }
}

impl WorkDescriptor {
    /// Download URL and file name, when both are present.
    #[must_use]
    pub fn add_request(&self) -> Option<(&str, &str)> {
        self.download_url
            .as_deref()
            .zip(self.filename.as_deref())
    }

    /// Pin target, unless the same address is also being unpinned.
    #[must_use]
    pub fn pin_request(&self) -> Option<&ContentAddress> {
        self.pin_target
            .as_ref()
            .filter(|target| self.unpin_target.as_ref() != Some(*target))
    }

    /// Unpin target, when present.
    #[must_use]
    pub const fn unpin_request(&self) -> Option<&ContentAddress> {
        self.unpin_target.as_ref()
    }

    /// `<show> - <episode>` for log lines.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.show, self.episode)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> WorkResponse {
        serde_json::from_value(value).expect("valid work response")
    }

    #[test]
    fn request_error_sentinel_short_circuits() {
        let work = response(json!({"message": "Request Error", "download": "http://x/ep.mp3"}));
        assert_eq!(work.classify(), WorkAssignment::RequestError);
    }

    #[test]
    fn no_work_prefix_short_circuits() {
        let work = response(json!({"message": "No Work (try again later)"}));
        assert_eq!(
            work.classify(),
            WorkAssignment::NoWork {
                message: "No Work (try again later)".to_string()
            }
        );
    }

    #[test]
    fn other_messages_yield_work() {
        let work = response(json!({
            "message": "Work",
            "download": "http://x/ep.mp3",
            "filename": "ep.mp3",
            "show": "Show",
            "episode": "Ep 1",
            "pin": "",
            "delete": ""
        }));
        let WorkAssignment::Work(descriptor) = work.classify() else {
            panic!("expected work");
        };
        assert_eq!(descriptor.add_request(), Some(("http://x/ep.mp3", "ep.mp3")));
        assert!(descriptor.pin_target.is_none());
        assert!(descriptor.unpin_target.is_none());
        assert_eq!(descriptor.label(), "Show - Ep 1");
    }

    #[test]
    fn missing_or_null_fields_are_absent() {
        let work = response(json!({"message": "", "pin": null}));
        let WorkAssignment::Work(descriptor) = work.classify() else {
            panic!("expected work");
        };
        assert_eq!(descriptor, WorkDescriptor::default());
    }

    #[test]
    fn add_requires_url_and_filename() {
        let only_url = WorkDescriptor {
            download_url: Some("http://x/ep.mp3".into()),
            ..WorkDescriptor::default()
        };
        assert!(only_url.add_request().is_none());

        let only_name = WorkDescriptor {
            filename: Some("ep.mp3".into()),
            ..WorkDescriptor::default()
        };
        assert!(only_name.add_request().is_none());
    }

    #[test]
    fn delete_supersedes_pin_of_same_address() {
        let same = WorkDescriptor {
            pin_target: Some("Qm1".into()),
            unpin_target: Some("Qm1".into()),
            ..WorkDescriptor::default()
        };
        assert!(same.pin_request().is_none());
        assert_eq!(same.unpin_request().map(ContentAddress::as_str), Some("Qm1"));

        let different = WorkDescriptor {
            pin_target: Some("Qm1".into()),
            unpin_target: Some("Qm2".into()),
            ..WorkDescriptor::default()
        };
        assert_eq!(different.pin_request().map(ContentAddress::as_str), Some("Qm1"));
    }
}
