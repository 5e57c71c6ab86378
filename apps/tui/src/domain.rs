use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A race weekend, as listed by `GET /races`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Round {
    #[serde(rename = "round", deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

impl Round {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("Round {} - {}", self.id, self.name)
    }
}

// The backend has served round numbers both as JSON strings and as integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Ok(value),
        serde_json::Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected round identifier, found {other}"
        ))),
    }
}

/// A session within a round ("FP1", "Qualifying", "Race", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Session(String);

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    #[default]
    Timeline,
    Wordcloud,
    Heatmap,
    Distribution,
}

impl VisualizationType {
    pub const ALL: [Self; 4] = [
        Self::Timeline,
        Self::Wordcloud,
        Self::Heatmap,
        Self::Distribution,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Wordcloud => "wordcloud",
            Self::Heatmap => "heatmap",
            Self::Distribution => "distribution",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Timeline),
            1 => Some(Self::Wordcloud),
            2 => Some(Self::Heatmap),
            3 => Some(Self::Distribution),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Timeline => 0,
            Self::Wordcloud => 1,
            Self::Heatmap => 2,
            Self::Distribution => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "timeline" => Some(Self::Timeline),
            "wordcloud" | "word_cloud" => Some(Self::Wordcloud),
            "heatmap" => Some(Self::Heatmap),
            "distribution" => Some(Self::Distribution),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Timeline => "Sentiment Timeline",
            Self::Wordcloud => "Word Cloud",
            Self::Heatmap => "Heatmap",
            Self::Distribution => "Sentiment Distribution",
        }
    }
}

impl fmt::Display for VisualizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered chart. `data` is the base64 encoding of a PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visualization {
    pub kind: VisualizationType,
    pub data: String,
}

impl Visualization {
    pub fn new(kind: VisualizationType, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.data)
    }
}

/// Scrape statistics attached to a realtime analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RealtimeStats {
    pub post_limit: u32,
    #[serde(default)]
    pub comment_limit: Option<u32>,
    pub visualizations_generated: u32,
}

/// Visualizations produced by one realtime run, in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealtimeBatch {
    entries: IndexMap<VisualizationType, Visualization>,
}

/// Outcome of choosing a visualization out of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPick {
    pub visualization: Visualization,
    /// Set when the requested type was missing and another one was used instead.
    pub substituted_for: Option<VisualizationType>,
}

impl BatchPick {
    /// The requested type from a fetched list, otherwise its first entry.
    pub fn from_list(visualizations: &[Visualization], requested: VisualizationType) -> Option<Self> {
        visualizations
            .iter()
            .find(|viz| viz.kind == requested)
            .or_else(|| visualizations.first())
            .map(|visualization| Self {
                visualization: visualization.clone(),
                substituted_for: (visualization.kind != requested).then_some(requested),
            })
    }
}

impl RealtimeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, visualization: Visualization) {
        self.entries.insert(visualization.kind, visualization);
    }

    pub fn get(&self, kind: VisualizationType) -> Option<&Visualization> {
        self.entries.get(&kind)
    }

    pub fn first(&self) -> Option<&Visualization> {
        self.entries.values().next()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = VisualizationType> + '_ {
        self.entries.keys().copied()
    }

    pub fn pick(&self, requested: VisualizationType) -> Option<BatchPick> {
        if let Some(found) = self.get(requested) {
            return Some(BatchPick {
                visualization: found.clone(),
                substituted_for: None,
            });
        }

        self.first().map(|fallback| BatchPick {
            visualization: fallback.clone(),
            substituted_for: Some(requested),
        })
    }
}

impl FromIterator<Visualization> for RealtimeBatch {
    fn from_iter<I: IntoIterator<Item = Visualization>>(iter: I) -> Self {
        let mut batch = Self::new();
        for visualization in iter {
            batch.insert(visualization);
        }
        batch
    }
}
