use docmap::errors::MapperResult;
use docmap::mapping::Coercible;
use docmap::store::QueryParams;
use docmap_int_test::test_util::{cleanup, create_test_context, generate_greetings, Greeting};

fn main() -> MapperResult<()> {
    colog::init();
    let ctx = create_test_context()?;
    let mapper = ctx.mapper();

    let count = 10_000;
    let start = std::time::Instant::now();
    for greeting in generate_greetings(count) {
        mapper.save(Coercible::entity(&greeting)?)?;
    }
    println!("Saved {} greetings in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let mut rehydrated = 0;
    for greeting in mapper.view_as::<Greeting>("greeting/all", QueryParams::new())? {
        let greeting = greeting?;
        if !greeting.author.is_empty() {
            rehydrated += 1;
        }
    }
    println!("Rehydrated {} greetings in {:?}", rehydrated, start.elapsed());

    let start = std::time::Instant::now();
    let listed = mapper.list_all(QueryParams::new().limit(100))?.count();
    println!("Listed {} documents in {:?}", listed, start.elapsed());

    cleanup(ctx)
}
