use crate::model::status::{FALLBACK_STATUSES, StatusConfig, StatusType};

/// Maps board columns to status markers and back.
///
/// Pure lookup over an optional status configuration, with a fixed four-entry
/// table behind it.
#[derive(Debug, Clone, Copy)]
pub struct StatusMapper<'a> {
    statuses: Option<&'a StatusConfig>,
}

impl<'a> StatusMapper<'a> {
    pub fn new(statuses: Option<&'a StatusConfig>) -> Self {
        StatusMapper { statuses }
    }

    /// Marker to write for a column. Configured name, then type, then marker;
    /// then the fallback table; any other key is returned as-is.
    pub fn to_marker(&self, column_key: &str) -> String {
        if let Some(config) = self.statuses {
            let found = config
                .by_name(column_key)
                .or_else(|| StatusType::from_key(column_key).and_then(|t| config.by_type(t)))
                .or_else(|| config.by_marker(column_key));
            if let Some(status) = found {
                return status.marker.clone();
            }
        }
        FALLBACK_STATUSES
            .iter()
            .find(|(_, kind)| kind.label() == column_key || kind.code() == column_key)
            .map(|(marker, _)| marker.to_string())
            .unwrap_or_else(|| column_key.to_string())
    }

    /// Whether `key` is the name of a configured status
    pub fn is_status_name(&self, key: &str) -> bool {
        self.statuses.is_some_and(|c| c.by_name(key).is_some())
    }

    /// Column key (status type label) for a marker
    pub fn to_column_key(&self, marker: &str) -> String {
        if let Some(status) = self.statuses.and_then(|c| c.by_marker(marker)) {
            return status.kind.label().to_string();
        }
        FALLBACK_STATUSES
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, kind)| kind.label().to_string())
            .unwrap_or_else(|| marker.to_string())
    }
}
