//! Configuration of a [Mapper](crate::mapper::Mapper).

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapping::ClassRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Settings shared by a mapper and everything it hands out.
///
/// Settings can be changed until a mapper is opened with the
/// configuration; after that they are frozen and setters fail with
/// `InvalidOperation`.
///
/// * `registry` - the [ClassRegistry] to register and resolve types in.
///   Defaults to [ClassRegistry::global].
/// * `validate_shapes` - whether rehydrated documents are checked against
///   their registered shape. Stored documents are schema-less, so this is
///   opt-in and defaults to `false`.
/// * `attach_store` - whether rehydrated documents get the store attached
///   so they can save and delete themselves. Defaults to `true`.
#[derive(Clone)]
pub struct MapperConfig {
    inner: Arc<MapperConfigInner>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MapperConfig {
    pub fn new() -> Self {
        MapperConfig {
            inner: Arc::new(MapperConfigInner::new()),
        }
    }

    pub fn registry(&self) -> ClassRegistry {
        self.inner.registry.read_with(|registry| registry.clone())
    }

    pub fn set_registry(&self, registry: ClassRegistry) -> MapperResult<()> {
        self.inner.ensure_mutable("registry")?;
        self.inner.registry.write_with(|it| *it = registry);
        Ok(())
    }

    pub fn validate_shapes(&self) -> bool {
        self.inner.validate_shapes.load(Ordering::Relaxed)
    }

    pub fn set_validate_shapes(&self, validate: bool) -> MapperResult<()> {
        self.inner.ensure_mutable("validate_shapes")?;
        self.inner.validate_shapes.store(validate, Ordering::Relaxed);
        Ok(())
    }

    pub fn attach_store(&self) -> bool {
        self.inner.attach_store.load(Ordering::Relaxed)
    }

    pub fn set_attach_store(&self, attach: bool) -> MapperResult<()> {
        self.inner.ensure_mutable("attach_store")?;
        self.inner.attach_store.store(attach, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    pub(crate) fn freeze(&self) {
        self.inner.configured.store(true, Ordering::Relaxed);
    }
}

struct MapperConfigInner {
    configured: AtomicBool,
    registry: Atomic<ClassRegistry>,
    validate_shapes: AtomicBool,
    attach_store: AtomicBool,
}

impl MapperConfigInner {
    fn new() -> Self {
        MapperConfigInner {
            configured: AtomicBool::from(false),
            registry: atomic(ClassRegistry::global()),
            validate_shapes: AtomicBool::from(false),
            attach_store: AtomicBool::from(true),
        }
    }

    fn ensure_mutable(&self, setting: &str) -> MapperResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after the mapper is opened", setting);
            return Err(MapperError::new(
                &format!("{} cannot be changed after the mapper is opened", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
