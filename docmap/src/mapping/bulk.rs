use crate::document::Document;
use crate::errors::MapperResult;
use crate::mapping::{Coercible, MappedDocument, MappedEntity};

/// One element of a bulk save or bulk delete.
///
/// Raw mappings go to the store as they are. Everything else is first
/// added to the mapper (which registers its type) and then serialized.
#[derive(Clone, Debug)]
pub enum BulkItem {
    Raw(Document),
    Object(Coercible),
}

impl BulkItem {
    pub fn entity<T: MappedEntity>(entity: &T) -> MapperResult<BulkItem> {
        Coercible::entity(entity).map(BulkItem::Object)
    }
}

impl From<Document> for BulkItem {
    fn from(document: Document) -> Self {
        BulkItem::Raw(document)
    }
}

impl From<MappedDocument> for BulkItem {
    fn from(document: MappedDocument) -> Self {
        BulkItem::Object(Coercible::Mapped(document))
    }
}

impl From<Coercible> for BulkItem {
    fn from(input: Coercible) -> Self {
        match input {
            Coercible::Raw(document) => BulkItem::Raw(document),
            other => BulkItem::Object(other),
        }
    }
}
