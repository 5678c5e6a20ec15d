use docmap::errors::MapperResult;
use docmap::mapper::Mapper;
use docmap::mapping::ClassRegistry;
use docmap::store::memory::{MemoryStore, MemoryStoreConfig};
use docmap::store::DocumentStore;
use docmap_derive::{Convertible, MappedEntity};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use std::panic::{self, AssertUnwindSafe};

/// Runs `test` between `before` and `after`. `after` runs even when the
/// test fails or panics; the failure is reported afterwards.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> MapperResult<()>,
    B: Fn() -> MapperResult<TestContext>,
    A: Fn(TestContext) -> MapperResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| test(ctx.clone())));
    let after_result = after(ctx);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(cause) => panic::resume_unwind(cause),
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// A mapper over a private in-memory store with its own class registry.
#[derive(Clone)]
pub struct TestContext {
    store: MemoryStore,
    mapper: Mapper,
}

impl TestContext {
    pub fn new(store: MemoryStore, mapper: Mapper) -> Self {
        Self { store, mapper }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn mapper(&self) -> Mapper {
        self.mapper.clone()
    }
}

pub fn random_name() -> String {
    format!("test-{}", uuid::Uuid::new_v4().simple())
}

pub fn create_test_context() -> MapperResult<TestContext> {
    let store = MemoryStore::with_config(MemoryStoreConfig::new().name(&random_name()));
    define_greeting_views(&store)?;

    let mapper = Mapper::builder()
        .store(DocumentStore::new(store.clone()))
        .registry(ClassRegistry::new())
        .open()?;
    Ok(TestContext::new(store, mapper))
}

pub fn cleanup(ctx: TestContext) -> MapperResult<()> {
    ctx.mapper().registry().clear();
    Ok(())
}

/// `greeting/all` emits every greeting keyed by author with the full
/// document as value; `greeting/content` emits the content as a scalar.
pub fn define_greeting_views(store: &MemoryStore) -> MapperResult<()> {
    store.define_view("greeting/all", |doc, emitter| {
        if doc.doc_type() == Some("Greeting") {
            emitter.emit(doc.get("author"), doc.clone());
        }
    })?;
    store.define_view("greeting/content", |doc, emitter| {
        if doc.doc_type() == Some("Greeting") {
            emitter.emit(doc.get("author"), doc.get("content"));
        }
    })
}

#[derive(Debug, Convertible, MappedEntity, Default, Clone, PartialEq)]
pub struct Greeting {
    pub author: String,
    pub content: String,
}

impl Greeting {
    pub fn new(author: &str, content: &str) -> Self {
        Greeting {
            author: author.to_string(),
            content: content.to_string(),
        }
    }
}

/// A shape keeping the document identifier and revision in its own
/// fields.
#[derive(Debug, Convertible, MappedEntity, Default, Clone, PartialEq)]
#[entity(name = "Note", id(field = "key"), rev(field = "revision"))]
pub struct StickyNote {
    pub key: Option<String>,
    pub revision: Option<String>,
    pub body: String,
    pub color: Option<Color>,
}

#[derive(Debug, Convertible, Clone, PartialEq)]
pub enum Color {
    Yellow,
    Pink,
    Custom { red: u32, green: u32, blue: u32 },
    Named(String),
}

#[derive(Debug, Convertible, MappedEntity, Default, Clone, PartialEq)]
#[converter(ignored = "cached")]
pub struct Counter {
    pub name: String,
    pub count: i64,
    pub cached: Option<String>,
}

/// Claims the `Greeting` name with an incompatible shape.
#[derive(Debug, Convertible, MappedEntity, Default, Clone, PartialEq)]
#[entity(name = "Greeting")]
pub struct Salutation {
    pub text: String,
}

/// Tries to store a field the store owns.
#[derive(Debug, Convertible, MappedEntity, Default, Clone, PartialEq)]
pub struct Intruder {
    pub _rev: String,
    pub name: String,
}

pub fn generate_greeting() -> Greeting {
    Greeting {
        author: Name().fake::<String>(),
        content: Sentence(3..8).fake::<String>(),
    }
}

pub fn generate_greetings(count: usize) -> Vec<Greeting> {
    (0..count).map(|_| generate_greeting()).collect()
}

pub fn generate_note() -> StickyNote {
    StickyNote {
        key: Some(random_name()),
        revision: None,
        body: Sentence(2..5).fake::<String>(),
        color: Some(Color::Yellow),
    }
}
