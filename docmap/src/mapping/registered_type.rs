use crate::common::BASE_TYPE_NAME;
use crate::mapping::ShapeType;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, LazyLock};

static BASE_TYPE: LazyLock<RegisteredType> = LazyLock::new(|| RegisteredType {
    inner: Arc::new(RegisteredTypeInner {
        name: BASE_TYPE_NAME.to_string(),
        shape: None,
    }),
});

/// A synthesized type combining an application shape with document
/// persistence.
///
/// Every [MappedDocument](crate::mapping::MappedDocument) points at one.
/// Registered types are created once by the coercion engine and then
/// shared; two handles compare equal only when they refer to the same
/// synthesized type, not merely to types with the same name.
#[derive(Clone)]
pub struct RegisteredType {
    inner: Arc<RegisteredTypeInner>,
}

struct RegisteredTypeInner {
    name: String,
    shape: Option<ShapeType>,
}

impl RegisteredType {
    /// The base document capability: persistable, without any
    /// application shape.
    pub fn base() -> RegisteredType {
        BASE_TYPE.clone()
    }

    pub(crate) fn synthesize(shape: ShapeType) -> RegisteredType {
        log::debug!("Synthesizing registered type {} for {}", shape.name(), shape.rust_type_name());
        RegisteredType {
            inner: Arc::new(RegisteredTypeInner {
                name: shape.name().to_string(),
                shape: Some(shape),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn shape(&self) -> Option<&ShapeType> {
        self.inner.shape.as_ref()
    }

    pub fn is_base(&self) -> bool {
        self.inner.shape.is_none()
    }

    pub fn is_shape_of<T: 'static>(&self) -> bool {
        self.shape().is_some_and(|shape| shape.is::<T>())
    }

    /// Whether this type was synthesized from `shape`.
    pub(crate) fn has_shape(&self, shape: &ShapeType) -> bool {
        self.shape().is_some_and(|own| own == shape)
    }
}

impl PartialEq for RegisteredType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for RegisteredType {}

impl Debug for RegisteredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredType")
            .field("name", &self.inner.name)
            .field("shape", &self.inner.shape)
            .finish()
    }
}

impl Display for RegisteredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Convertible, Value};
    use crate::errors::MapperResult;
    use crate::mapping::MappedEntity;

    struct Probe;

    impl Convertible for Probe {
        type Output = Probe;

        fn to_value(&self) -> MapperResult<Value> {
            Ok(Value::Document(crate::doc! {}))
        }

        fn from_value(_: &Value) -> MapperResult<Probe> {
            Ok(Probe)
        }
    }

    impl MappedEntity for Probe {
        fn entity_name() -> String {
            "Probe".to_string()
        }
    }

    #[test]
    fn test_base_is_shared() {
        let a = RegisteredType::base();
        let b = RegisteredType::base();
        assert_eq!(a, b);
        assert!(a.is_base());
        assert_eq!(a.name(), "Document");
        assert!(a.shape().is_none());
    }

    #[test]
    fn test_equality_is_identity() {
        let first = RegisteredType::synthesize(ShapeType::of::<Probe>());
        let second = RegisteredType::synthesize(ShapeType::of::<Probe>());
        assert_eq!(first.name(), second.name());
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn test_shape_queries() {
        let ty = RegisteredType::synthesize(ShapeType::of::<Probe>());
        assert!(!ty.is_base());
        assert!(ty.is_shape_of::<Probe>());
        assert!(!ty.is_shape_of::<String>());
        assert!(ty.has_shape(&ShapeType::of::<Probe>()));
        assert!(!RegisteredType::base().has_shape(&ShapeType::of::<Probe>()));
        assert_eq!(ty.to_string(), "Probe");
    }
}
