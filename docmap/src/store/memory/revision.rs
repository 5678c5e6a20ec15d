use crate::errors::{ErrorKind, MapperError, MapperResult};
use uuid::Uuid;

/// Generation number of a `<generation>-<token>` revision.
pub(crate) fn generation(rev: &str) -> MapperResult<u64> {
    rev.split_once('-')
        .and_then(|(generation, _)| generation.parse::<u64>().ok())
        .ok_or_else(|| {
            log::error!("Malformed revision {}", rev);
            MapperError::new(&format!("Malformed revision '{}'", rev), ErrorKind::StoreError)
        })
}

/// Next revision after `previous`, starting at generation 1.
pub(crate) fn next_revision(previous: Option<&str>) -> MapperResult<String> {
    let generation = match previous {
        Some(previous) => generation(previous)? + 1,
        None => 1,
    };
    Ok(format!("{}-{}", generation, Uuid::new_v4().simple()))
}

pub(crate) fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}
