use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper::Mapper;
use crate::mapper_config::MapperConfig;
use crate::mapping::ClassRegistry;
use crate::store::DocumentStore;

/// Builder for [Mapper].
///
/// # Examples
///
/// ```rust,ignore
/// let mapper = Mapper::builder()
///     .store(DocumentStore::new(MemoryStore::new()))
///     .registry(ClassRegistry::new())
///     .validate_shapes(false)
///     .open()?;
/// ```
#[derive(Default)]
pub struct MapperBuilder {
    error: Option<MapperError>,
    store: Option<DocumentStore>,
    config: MapperConfig,
}

impl MapperBuilder {
    pub fn new() -> Self {
        MapperBuilder {
            error: None,
            store: None,
            config: MapperConfig::new(),
        }
    }

    pub fn store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(mut self, registry: ClassRegistry) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_registry(registry) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn validate_shapes(mut self, validate: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_validate_shapes(validate) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn attach_store(mut self, attach: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_attach_store(attach) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the mapper.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while configuring, or an
    /// `InvalidOperation` error when no store was given.
    pub fn open(self) -> MapperResult<Mapper> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let store = self.store.ok_or_else(|| {
            log::error!("A mapper needs a document store");
            MapperError::new("A mapper needs a document store", ErrorKind::InvalidOperation)
        })?;
        Ok(Mapper::new(store, self.config))
    }
}
