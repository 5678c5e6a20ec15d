/// Default number of revisions kept per document.
pub const DEFAULT_REVS_LIMIT: usize = 1000;

/// Configuration of a [MemoryStore](super::MemoryStore).
///
/// ```text
/// let config = MemoryStoreConfig::new().name("greetings").revs_limit(10);
/// let store = MemoryStore::with_config(config);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    name: String,
    revs_limit: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        MemoryStoreConfig {
            name: "memory".to_string(),
            revs_limit: DEFAULT_REVS_LIMIT,
        }
    }
}

impl MemoryStoreConfig {
    pub fn new() -> Self {
        MemoryStoreConfig::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Maximum number of revisions remembered per document. Older
    /// revisions can no longer be fetched. Values below one are raised
    /// to one.
    pub fn revs_limit(mut self, revs_limit: usize) -> Self {
        self.revs_limit = revs_limit.max(1);
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_revs_limit(&self) -> usize {
        self.revs_limit
    }
}
