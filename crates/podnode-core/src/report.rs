//! Report snapshots threaded through the pipeline stages.
//!
//! Each stage consumes the current snapshot and returns the next one. A key
//! that was never set is omitted from the report entirely; absence means the
//! corresponding action did not happen.

use podnode_ipfs::{AddResult, ContentAddress};

/// Error code reported when the node returns a malformed store response.
pub const STORE_ERROR_CODE: u32 = 99;

/// Outcome report sent to the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPayload {
    downloaded: Option<String>,
    length: Option<u64>,
    pinned: Option<String>,
    deleted: Option<ContentAddress>,
    error: Option<u32>,
    used: Option<u64>,
    avail: Option<u64>,
}

impl ReportPayload {
    /// Record a stored download and the size of the stored file.
    #[must_use]
    pub fn with_download(self, added: &AddResult, length: u64) -> Self {
        Self {
            downloaded: Some(added.qualified_path()),
            length: Some(length),
            ..self
        }
    }

    /// Record that the node returned a malformed store response.
    #[must_use]
    pub fn with_store_error(self) -> Self {
        Self {
            error: Some(STORE_ERROR_CODE),
            ..self
        }
    }

    /// Record a pin. `length` replaces any size recorded by an earlier stage.
    #[must_use]
    pub fn with_pin(self, first_link: &ContentAddress, target: &ContentAddress, length: u64) -> Self {
        Self {
            pinned: Some(format!("{first_link}/{target}")),
            length: Some(length),
            ..self
        }
    }

    /// Record an unpin of `target`.
    #[must_use]
    pub fn with_deleted(self, target: &ContentAddress) -> Self {
        Self {
            deleted: Some(target.clone()),
            ..self
        }
    }

    /// Record repository usage and free disk space.
    #[must_use]
    pub fn with_telemetry(self, used: u64, avail: u64) -> Self {
        Self {
            used: Some(used),
            avail: Some(avail),
            ..self
        }
    }

    /// `<wrapper>/<file>` of a stored download.
    #[must_use]
    pub fn downloaded(&self) -> Option<&str> {
        self.downloaded.as_deref()
    }

    /// Most recently reported object size.
    #[must_use]
    pub const fn length(&self) -> Option<u64> {
        self.length
    }

    /// `<first link>/<pin target>` of a pin.
    #[must_use]
    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    /// Address that was unpinned.
    #[must_use]
    pub const fn deleted(&self) -> Option<&ContentAddress> {
        self.deleted.as_ref()
    }

    /// Error code, when one was raised.
    #[must_use]
    pub const fn error(&self) -> Option<u32> {
        self.error
    }

    /// Repository size in bytes.
    #[must_use]
    pub const fn used(&self) -> Option<u64> {
        self.used
    }

    /// Free bytes on the disk root.
    #[must_use]
    pub const fn avail(&self) -> Option<u64> {
        self.avail
    }

    /// Present keys and their values, in wire order.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(downloaded) = &self.downloaded {
            fields.push(("downloaded", downloaded.clone()));
        }
        if let Some(length) = self.length {
            fields.push(("length", length.to_string()));
        }
        if let Some(pinned) = &self.pinned {
            fields.push(("pinned", pinned.clone()));
        }
        if let Some(deleted) = &self.deleted {
            fields.push(("deleted", deleted.to_string()));
        }
        if let Some(error) = self.error {
            fields.push(("error", error.to_string()));
        }
        if let Some(used) = self.used {
            fields.push(("used", used.to_string()));
        }
        if let Some(avail) = self.avail {
            fields.push(("avail", avail.to_string()));
        }
        fields
    }
}
