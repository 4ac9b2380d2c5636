//! View models assembled by the dashboards. Nothing here crosses the wire.

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub id: String,
    /// `payment`, `contact`, `document`; anything else gets the generic icon.
    pub kind: String,
    pub description: String,
    pub date: String,
    /// `success` or `info`.
    pub status: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub task: String,
    pub due: String,
    /// `high`, `medium` or `low`.
    pub priority: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricTone {
    Positive,
    Attention,
    Info,
    Highlight,
}

impl MetricTone {
    pub fn class(self) -> &'static str {
        match self {
            Self::Positive => "metric-card tone-green",
            Self::Attention => "metric-card tone-amber",
            Self::Info => "metric-card tone-blue",
            Self::Highlight => "metric-card tone-purple",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub title: String,
    pub value: String,
    pub change: String,
    pub tone: MetricTone,
}
