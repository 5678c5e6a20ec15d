#[cfg(test)]
#[allow(dead_code, unused)]
mod tests {
    use docmap::common::{Convertible, Value};
    use docmap::doc;
    use docmap::errors::ErrorKind;
    use docmap::mapping::{EntityMeta, MappedEntity};
    use docmap_derive::{Convertible, MappedEntity};
    use std::collections::BTreeMap;

    #[test]
    fn test_default_entity_name() {
        #[derive(Convertible, MappedEntity, Default)]
        pub struct Book {
            title: String,
        }

        assert_eq!(Book::entity_name(), "Book");
        assert_eq!(Book::entity_meta(), EntityMeta::default());
    }

    #[test]
    fn test_entity_with_name_and_meta() {
        #[derive(Convertible, MappedEntity, Default)]
        #[entity(name = "books", id(field = "isbn"), rev(field = "version"))]
        pub struct Book {
            isbn: Option<String>,
            version: Option<String>,
            title: String,
        }

        assert_eq!(Book::entity_name(), "books");
        let meta = Book::entity_meta();
        assert_eq!(meta.id_field(), Some("isbn"));
        assert_eq!(meta.rev_field(), Some("version"));
        assert!(meta.is_meta_field("isbn"));
        assert!(!meta.is_meta_field("title"));
    }

    #[test]
    fn test_entity_with_id_only() {
        #[derive(Convertible, MappedEntity, Default)]
        #[entity(id(field = "slug"))]
        pub struct Page {
            slug: Option<String>,
            body: String,
        }

        assert_eq!(Page::entity_meta(), EntityMeta::new(Some("slug"), None));
    }

    #[test]
    fn test_struct_round_trip() {
        #[derive(Debug, Convertible, PartialEq)]
        pub struct Profile {
            name: String,
            age: u32,
            score: f64,
            active: bool,
            nickname: Option<String>,
            tags: Vec<String>,
            links: BTreeMap<String, String>,
            address: Address,
        }

        #[derive(Debug, Convertible, PartialEq)]
        pub struct Address {
            city: String,
        }

        let mut links = BTreeMap::new();
        links.insert("home".to_string(), "https://example.org".to_string());
        let profile = Profile {
            name: "A".to_string(),
            age: 30,
            score: 1.5,
            active: true,
            nickname: None,
            tags: vec!["x".to_string()],
            links,
            address: Address {
                city: "Oslo".to_string(),
            },
        };

        let value = profile.to_value().unwrap();
        let doc = value.as_document().unwrap();
        assert_eq!(doc.get("age"), Value::from(30));
        assert_eq!(doc.get("nickname"), Value::Null);
        assert_eq!(doc.get("address"), Value::Document(doc! { city: "Oslo" }));
        assert_eq!(Profile::from_value(&value).unwrap(), profile);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        #[derive(Debug, Convertible)]
        pub struct Strict {
            required: String,
            optional: Option<i64>,
        }

        let err = Strict::from_value(&Value::Document(doc! { optional: 1 })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

        let err = Strict::from_value(&Value::from("text")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

        let decoded = Strict::from_value(&Value::Document(doc! { required: "r" })).unwrap();
        assert_eq!(decoded.optional, None);
    }

    #[test]
    fn test_ignored_fields() {
        #[derive(Debug, Convertible, PartialEq)]
        #[converter(ignored = "scratch, cache")]
        pub struct Session {
            user: String,
            scratch: Option<String>,
            cache: Vec<i64>,
        }

        let session = Session {
            user: "u".to_string(),
            scratch: Some("tmp".to_string()),
            cache: vec![1, 2],
        };
        let value = session.to_value().unwrap();
        assert_eq!(value, Value::Document(doc! { user: "u" }));

        let decoded = Session::from_value(&value).unwrap();
        assert_eq!(decoded.scratch, None);
        assert!(decoded.cache.is_empty());
    }

    #[test]
    fn test_enum_variants() {
        #[derive(Debug, Convertible, PartialEq)]
        pub enum Shape {
            Empty,
            Circle(f64),
            Rect { width: i64, height: i64 },
        }

        for shape in [Shape::Empty, Shape::Circle(2.5), Shape::Rect { width: 2, height: 3 }] {
            let value = shape.to_value().unwrap();
            assert_eq!(Shape::from_value(&value).unwrap(), shape);
        }

        let value = Shape::Empty.to_value().unwrap();
        assert_eq!(value, Value::Document(doc! { variant: "Empty", value: (Value::Null) }));

        let err = Shape::from_value(&Value::Document(doc! { variant: "Hexagon" })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

        let err = Shape::from_value(&Value::Document(doc! { variant: "Circle", value: [1.0, 2.0] })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }
}
