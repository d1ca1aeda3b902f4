//! Addressing for the collection → cluster → record hierarchy.
//!
//! OstrichDB builds its routes dynamically from the names in the request path,
//! so every request is addressed by one of these paths:
//!
//! - `/c/{collection}`
//! - `/c/{collection}/cl/{cluster}`
//! - `/c/{collection}/cl/{cluster}/r/{record}`

use crate::{OstrichError, OstrichResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const FORBIDDEN: &[char] = &['/', '?', '#'];

fn validate_name(kind: &str, name: &str) -> OstrichResult<String> {
    if name.is_empty() {
        return Err(OstrichError::validation(format!("{} name is empty", kind)));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN.contains(c))
    {
        return Err(OstrichError::validation(format!(
            "{} name {:?} contains forbidden character {:?}",
            kind, name, c
        )));
    }
    Ok(name.to_string())
}

/// Which level of the hierarchy a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Collection,
    Cluster,
    Record,
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Level::Collection => "Collection",
            Level::Cluster => "Cluster",
            Level::Record => "Record",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    collection: String,
}

impl CollectionPath {
    pub fn new(collection: impl AsRef<str>) -> OstrichResult<Self> {
        Ok(Self {
            collection: validate_name("collection", collection.as_ref())?,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Address a cluster inside this collection.
    pub fn cluster(&self, cluster: impl AsRef<str>) -> OstrichResult<ClusterPath> {
        Ok(ClusterPath {
            collection: self.clone(),
            cluster: validate_name("cluster", cluster.as_ref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterPath {
    collection: CollectionPath,
    cluster: String,
}

impl ClusterPath {
    pub fn new(collection: impl AsRef<str>, cluster: impl AsRef<str>) -> OstrichResult<Self> {
        CollectionPath::new(collection)?.cluster(cluster)
    }

    pub fn collection(&self) -> &str {
        self.collection.collection()
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn parent(&self) -> &CollectionPath {
        &self.collection
    }

    /// Address a record inside this cluster.
    pub fn record(&self, record: impl AsRef<str>) -> OstrichResult<RecordPath> {
        Ok(RecordPath {
            cluster: self.clone(),
            record: validate_name("record", record.as_ref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordPath {
    cluster: ClusterPath,
    record: String,
}

impl RecordPath {
    pub fn new(
        collection: impl AsRef<str>,
        cluster: impl AsRef<str>,
        record: impl AsRef<str>,
    ) -> OstrichResult<Self> {
        ClusterPath::new(collection, cluster)?.record(record)
    }

    pub fn collection(&self) -> &str {
        self.cluster.collection()
    }

    pub fn cluster(&self) -> &str {
        self.cluster.cluster()
    }

    pub fn record(&self) -> &str {
        &self.record
    }

    pub fn parent(&self) -> &ClusterPath {
        &self.cluster
    }
}

/// Any addressable resource below the server root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourcePath {
    Collection(CollectionPath),
    Cluster(ClusterPath),
    Record(RecordPath),
}

impl ResourcePath {
    pub fn level(&self) -> Level {
        match self {
            ResourcePath::Collection(_) => Level::Collection,
            ResourcePath::Cluster(_) => Level::Cluster,
            ResourcePath::Record(_) => Level::Record,
        }
    }

    /// The enclosing path, `None` for a collection.
    pub fn parent(&self) -> Option<ResourcePath> {
        match self {
            ResourcePath::Collection(_) => None,
            ResourcePath::Cluster(cl) => Some(ResourcePath::Collection(cl.parent().clone())),
            ResourcePath::Record(r) => Some(ResourcePath::Cluster(r.parent().clone())),
        }
    }

    /// Path segments in request order, e.g. `["c", "users", "cl", "admins"]`.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            ResourcePath::Collection(c) => vec!["c", c.collection()],
            ResourcePath::Cluster(cl) => vec!["c", cl.collection(), "cl", cl.cluster()],
            ResourcePath::Record(r) => {
                vec!["c", r.collection(), "cl", r.cluster(), "r", r.record()]
            }
        }
    }

    /// Name of the addressed resource itself.
    pub fn name(&self) -> &str {
        match self {
            ResourcePath::Collection(c) => c.collection(),
            ResourcePath::Cluster(cl) => cl.cluster(),
            ResourcePath::Record(r) => r.record(),
        }
    }
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for segment in self.segments() {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<CollectionPath> for ResourcePath {
    fn from(path: CollectionPath) -> Self {
        ResourcePath::Collection(path)
    }
}

impl From<ClusterPath> for ResourcePath {
    fn from(path: ClusterPath) -> Self {
        ResourcePath::Cluster(path)
    }
}

impl From<RecordPath> for ResourcePath {
    fn from(path: RecordPath) -> Self {
        ResourcePath::Record(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paths_per_level() {
        let record = RecordPath::new("go_collection", "go_cluster", "go_record").unwrap();
        let as_resource = ResourcePath::from(record.clone());

        assert_eq!(
            as_resource.to_string(),
            "/c/go_collection/cl/go_cluster/r/go_record"
        );
        assert_eq!(as_resource.level(), Level::Record);
        assert_eq!(as_resource.name(), "go_record");

        let cluster = as_resource.parent().unwrap();
        assert_eq!(cluster.to_string(), "/c/go_collection/cl/go_cluster");

        let collection = cluster.parent().unwrap();
        assert_eq!(collection.to_string(), "/c/go_collection");
        assert!(collection.parent().is_none());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(CollectionPath::new("").is_err());
        assert!(CollectionPath::new("a/b").is_err());
        assert!(ClusterPath::new("users", "has space").is_err());
        assert!(RecordPath::new("users", "admins", "what?").is_err());
        assert!(RecordPath::new("users", "admins", "tab\tbed").is_err());
    }

    #[test]
    fn accepts_punctuation_other_than_separators() {
        let path = RecordPath::new("js-collection", "js.cluster", "name_1%").unwrap();
        assert_eq!(path.record(), "name_1%");
    }

    #[test]
    fn levels_order_from_outermost() {
        assert!(Level::Collection < Level::Cluster);
        assert!(Level::Cluster < Level::Record);
    }
}
