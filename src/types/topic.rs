use serde::{Deserialize, Serialize};

/// A named scope used to bias the assistant's system instructions toward a
/// subject area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Stable identifier referenced by topic selections.
    pub id: String,

    /// Human-readable label embedded in the system context.
    pub label: String,

    /// Short description shown in topic pickers.
    pub description: String,
}

impl Topic {
    /// Create a new `Topic`.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// A read-only catalog of topics, supplied by the embedding application.
///
/// The catalog is consulted when resolving a topic selection; ids absent
/// from the catalog are silently dropped, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Create a catalog from a list of topics.
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// A small catalog suitable for the REPL binary and examples.
    pub fn builtin() -> Self {
        Self::new(vec![
            Topic::new("api-design", "API Design", "REST and RPC interface design"),
            Topic::new("databases", "Databases", "Schema design, queries, and migrations"),
            Topic::new("testing", "Testing", "Unit, integration, and property testing"),
            Topic::new("security", "Security", "Authentication, authorization, and secrets"),
            Topic::new(
                "performance",
                "Performance",
                "Profiling, caching, and optimization",
            ),
        ])
    }

    /// Look up a topic by id.
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    /// Returns true if the catalog contains a topic with the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over all topics in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// The number of topics in the catalog.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
