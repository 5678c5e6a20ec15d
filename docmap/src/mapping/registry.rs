use crate::mapping::RegisteredType;
use dashmap::DashMap;
use itertools::Itertools;
use std::sync::{Arc, LazyLock};

static GLOBAL_REGISTRY: LazyLock<ClassRegistry> = LazyLock::new(ClassRegistry::new);

/// Maps type names to the [RegisteredType] synthesized for them.
///
/// Populated by [Mapper::add](crate::mapper::Mapper::add) and read during
/// rehydration. Clones share the same table. The process-wide table is
/// [ClassRegistry::global]; a mapper can be given its own registry instead,
/// which is what tests do to stay isolated.
///
/// Registration is last-write-wins: registering a name again replaces the
/// previous type without any conflict detection. The table is a `DashMap`
/// only so that concurrent use stays memory safe.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    inner: Arc<DashMap<String, RegisteredType>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// The process-wide registry. Never torn down.
    pub fn global() -> ClassRegistry {
        GLOBAL_REGISTRY.clone()
    }

    pub fn get(&self, name: &str) -> Option<RegisteredType> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    /// Resolves a discriminator to its registered type, falling back to
    /// the base document type when the name is absent or unknown.
    pub fn resolve(&self, name: Option<&str>) -> RegisteredType {
        match name {
            Some(name) => self.get(name).unwrap_or_else(|| {
                log::debug!("No type registered as {}, using the base document type", name);
                RegisteredType::base()
            }),
            None => RegisteredType::base(),
        }
    }

    /// Records `registered_type` under `name`, returning the type it
    /// displaced.
    pub fn register(&self, name: &str, registered_type: RegisteredType) -> Option<RegisteredType> {
        let previous = self.inner.insert(name.to_string(), registered_type.clone());
        match &previous {
            Some(previous) if previous != &registered_type => {
                log::warn!("Registered type {} replaced by a different shape", name);
            }
            Some(_) => {}
            None => log::debug!("Registered type {}", name),
        }
        previous
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).sorted().collect()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}
