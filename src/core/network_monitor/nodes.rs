//! Per-node telemetry records and the set operations the criteria run on.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{NetmonError, Result};

/// Height reported for a node that could not be reached.
pub const DOWN_HEIGHT: i64 = -1;

/// Sub-network a node belongs to, identified by its scheme byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkScheme {
    #[serde(rename = "W")]
    Mainnet,
    #[serde(rename = "T")]
    Testnet,
    #[serde(rename = "S")]
    Stagenet,
    #[serde(rename = "E")]
    Custom,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NetworkScheme {
    pub fn as_char(&self) -> char {
        match self {
            NetworkScheme::Mainnet => 'W',
            NetworkScheme::Testnet => 'T',
            NetworkScheme::Stagenet => 'S',
            NetworkScheme::Custom => 'E',
            NetworkScheme::Unknown => '?',
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NetworkScheme::Unknown)
    }
}

impl fmt::Display for NetworkScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for NetworkScheme {
    type Err = NetmonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "mainnet" => Ok(NetworkScheme::Mainnet),
            "t" | "testnet" => Ok(NetworkScheme::Testnet),
            "s" | "stagenet" => Ok(NetworkScheme::Stagenet),
            "e" | "custom" => Ok(NetworkScheme::Custom),
            _ => Err(NetmonError::invalid_network_scheme(s)),
        }
    }
}

/// Telemetry of a single node as reported by the stats service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub domain: String,
    pub network: NetworkScheme,
    pub height: i64,
    pub state_hash: String,
    pub state_hash_height: Option<i64>,
    pub version: String,
}

impl NodeRecord {
    pub fn new(domain: impl Into<String>, network: NetworkScheme, height: i64) -> Self {
        Self {
            domain: domain.into(),
            network,
            height,
            state_hash: String::new(),
            state_hash_height: None,
            version: String::new(),
        }
    }

    pub fn with_state_hash(mut self, state_hash: impl Into<String>) -> Self {
        self.state_hash = state_hash.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn is_working(&self) -> bool {
        self.height > 0
    }

    pub fn is_down(&self) -> bool {
        self.height == DOWN_HEIGHT
    }
}

/// Ordered collection of node records from one fetch.
///
/// Every operation returns a new set; nothing is filtered in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeSet(Vec<NodeRecord>);

impl NodeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRecord> {
        self.0.iter()
    }

    pub fn push(&mut self, node: NodeRecord) {
        self.0.push(node);
    }

    pub fn filter<F>(&self, mut condition: F) -> NodeSet
    where
        F: FnMut(&NodeRecord) -> bool,
    {
        self.0.iter().filter(|&node| condition(node)).cloned().collect()
    }

    pub fn filter_by_network(&self, network: NetworkScheme) -> NodeSet {
        self.filter(|node| node.network == network)
    }

    pub fn working_nodes(&self) -> NodeSet {
        self.filter(NodeRecord::is_working)
    }

    pub fn down_nodes(&self) -> NodeSet {
        self.filter(NodeRecord::is_down)
    }

    pub fn group_by_height(&self) -> BTreeMap<i64, NodeSet> {
        let mut groups: BTreeMap<i64, NodeSet> = BTreeMap::new();
        for node in &self.0 {
            groups.entry(node.height).or_default().push(node.clone());
        }
        groups
    }

    pub fn group_by_state_hash(&self) -> HashMap<String, NodeSet> {
        self.group_by(|node| node.state_hash.clone())
    }

    pub fn group_by_version(&self) -> HashMap<String, NodeSet> {
        self.group_by(|node| node.version.clone())
    }

    fn group_by<F>(&self, key: F) -> HashMap<String, NodeSet>
    where
        F: Fn(&NodeRecord) -> String,
    {
        let mut groups: HashMap<String, NodeSet> = HashMap::new();
        for node in &self.0 {
            groups.entry(key(node)).or_default().push(node.clone());
        }
        groups
    }
}

impl From<Vec<NodeRecord>> for NodeSet {
    fn from(nodes: Vec<NodeRecord>) -> Self {
        Self(nodes)
    }
}

impl FromIterator<NodeRecord> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeRecord;
    type IntoIter = std::vec::IntoIter<NodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a NodeRecord;
    type IntoIter = std::slice::Iter<'a, NodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Wire shape of one entry in the stats payload.
#[derive(Debug, Deserialize)]
struct RawNodeStats {
    #[serde(default)]
    netbyte: NetworkScheme,
    height: i64,
    #[serde(default)]
    statehash: Option<String>,
    #[serde(default, deserialize_with = "lenient_height")]
    statehash_height: Option<i64>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeightRepr {
    Number(i64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

// The stats service has emitted `statehash_height` both as a number and as a
// numeric string. The field is informational only.
fn lenient_height<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<HeightRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(HeightRepr::Number(height)) => Ok(Some(height)),
        // unreadable values decode as absent
        Some(HeightRepr::Text(text)) => Ok(text.trim().parse().ok()),
        Some(HeightRepr::Other(_)) => Ok(None),
    }
}

impl<'de> Deserialize<'de> for NodeSet {
    /// Decodes `{ "<domain>": { ...stats } }`. Records come out sorted by
    /// domain.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, RawNodeStats>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(domain, stats)| NodeRecord {
                domain,
                network: stats.netbyte,
                height: stats.height,
                state_hash: stats.statehash.unwrap_or_default(),
                state_hash_height: stats.statehash_height,
                version: stats.version.unwrap_or_default(),
            })
            .collect())
    }
}
