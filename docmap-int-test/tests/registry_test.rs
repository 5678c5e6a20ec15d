use docmap::doc;
use docmap::errors::{ErrorKind, MapperResult};
use docmap::mapper::Added;
use docmap::mapping::{ClassRegistry, Coercible, RegisteredType};
use docmap::store::memory::MemoryStore;
use docmap::store::{DocumentStore, QueryParams};
use docmap_int_test::test_util::{cleanup, create_test_context, run_test, Greeting, Salutation, StickyNote};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_registration_is_stable() {
    run_test(
        create_test_context,
        |ctx| {
            let mapper = ctx.mapper();
            let first = mapper.register::<Greeting>()?;
            let second = mapper.register::<Greeting>()?;
            assert_eq!(first, second);

            let instance = mapper.add_entity(&Greeting::new("A", "hi"))?;
            assert_eq!(instance.registered_type(), &first);

            let added = mapper.add(first.clone())?;
            assert!(matches!(added, Added::Type(ref registered) if registered == &first));
            assert_eq!(mapper.registry().len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_name_collision_last_write_wins() {
    run_test(
        create_test_context,
        |ctx| {
            let mapper = ctx.mapper();
            let greeting = mapper.register::<Greeting>()?;
            let salutation = mapper.register::<Salutation>()?;
            assert_ne!(greeting, salutation);
            assert_eq!(mapper.registry().get("Greeting"), Some(salutation.clone()));

            // re-registering the first shape synthesizes a new type
            let again = mapper.register::<Greeting>()?;
            assert_ne!(again, greeting);
            assert!(again.is_shape_of::<Greeting>());
            assert_eq!(mapper.registry().get("Greeting"), Some(again));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_renamed_entity_registers_under_its_name() {
    run_test(
        create_test_context,
        |ctx| {
            let mapper = ctx.mapper();
            let registered = mapper.register::<StickyNote>()?;
            assert_eq!(registered.name(), "Note");
            assert!(mapper.registry().contains("Note"));
            assert!(!mapper.registry().contains("StickyNote"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_raw_mapping_registers_base_type() {
    run_test(
        create_test_context,
        |ctx| {
            let mapper = ctx.mapper();
            let added = mapper.add(doc! { "_id": "plain", value: 1 })?;
            assert_eq!(added.registered_type(), &RegisteredType::base());

            let instance = added.into_instance()?;
            assert_eq!(instance.id(), Some("plain"));
            assert_eq!(instance.fields().keys().as_slice(), &["value"]);
            assert_eq!(mapper.registry().names(), vec!["Document".to_string()]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_discriminator_falls_back_to_base() {
    run_test(
        create_test_context,
        |ctx| {
            let mapper = ctx.mapper();
            mapper.save(doc! { "_id": "mystery", "doc_type": "Mystery", clue: "none" })?;

            let fetched = mapper.get("mystery")?.into_typed()?;
            assert!(fetched.registered_type().is_base());
            assert_eq!(fetched.get("clue"), docmap::common::Value::from("none"));
            assert!(!mapper.registry().contains("Mystery"));

            let err = fetched.to_entity::<Greeting>().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_view_as_requires_registered_shape() {
    run_test(
        create_test_context,
        |ctx| {
            let mapper = ctx.mapper();
            let err = mapper
                .view_as::<Greeting>("greeting/all", QueryParams::new())
                .err()
                .expect("unregistered shape");
            assert_eq!(err.kind(), &ErrorKind::InvalidWrapper);

            mapper.register::<Salutation>()?;
            let err = mapper
                .view_as::<Greeting>("greeting/all", QueryParams::new())
                .err()
                .expect("displaced shape");
            assert_eq!(err.kind(), &ErrorKind::InvalidWrapper);

            assert!(mapper.view_as::<Salutation>("greeting/all", QueryParams::new()).is_ok());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_registries_are_isolated() -> MapperResult<()> {
    let first = docmap::mapper::Mapper::builder()
        .store(DocumentStore::new(MemoryStore::new()))
        .registry(ClassRegistry::new())
        .open()?;
    let second = docmap::mapper::Mapper::builder()
        .store(DocumentStore::new(MemoryStore::new()))
        .registry(ClassRegistry::new())
        .open()?;

    first.register::<Greeting>()?;
    assert!(first.registry().contains("Greeting"));
    assert!(!second.registry().contains("Greeting"));

    let shared = first.clone();
    assert!(shared.registry().contains("Greeting"));
    Ok(())
}

#[test]
fn test_default_mapper_uses_global_registry() -> MapperResult<()> {
    let mapper = docmap::map(DocumentStore::new(MemoryStore::new()));
    let registered = mapper.add(Coercible::shape::<StickyNote>())?.into_type();

    assert_eq!(ClassRegistry::global().get("Note"), Some(registered));
    let err = mapper.config().set_validate_shapes(true).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    Ok(())
}
