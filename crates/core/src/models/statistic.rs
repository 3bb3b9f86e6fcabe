use serde::{Deserialize, Serialize};

/// A display-ready derived fact. A `None` percentage suppresses the change
/// indicator in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticEntry {
    pub title: String,
    pub value: String,
    pub percentage_change: Option<f64>,
}

impl StatisticEntry {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            percentage_change: None,
        }
    }

    pub fn with_change(
        title: impl Into<String>,
        value: impl Into<String>,
        percentage_change: Option<f64>,
    ) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            percentage_change,
        }
    }
}
