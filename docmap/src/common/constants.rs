// document metadata fields
pub const DOC_ID: &str = "_id";
pub const DOC_REV: &str = "_rev";
pub const DOC_ATTACHMENTS: &str = "_attachments";
pub const DOC_DELETED: &str = "_deleted";
pub const DOC_CONFLICTS: &str = "_conflicts";
pub const DOC_DELETED_CONFLICTS: &str = "_deleted_conflicts";
pub const DOC_REVISIONS: &str = "_revisions";
pub const DOC_REVS_INFO: &str = "_revs_info";
pub const DOC_LOCAL_SEQ: &str = "_local_seq";
pub const RESERVED_FIELDS: [&str; 9] = [
    DOC_ID,
    DOC_REV,
    DOC_ATTACHMENTS,
    DOC_DELETED,
    DOC_CONFLICTS,
    DOC_DELETED_CONFLICTS,
    DOC_REVISIONS,
    DOC_REVS_INFO,
    DOC_LOCAL_SEQ,
];

// every top level key with this prefix belongs to the store
pub const RESERVED_PREFIX: &str = "_";

// discriminator written by the mapper
pub const DOC_TYPE: &str = "doc_type";

// name of the base document capability
pub const BASE_TYPE_NAME: &str = "Document";

// identifier prefixes
pub const DESIGN_DOC_PREFIX: &str = "_design/";
pub const LOCAL_DOC_PREFIX: &str = "_local/";

// view constants
pub const ALL_DOCS_VIEW: &str = "_all_docs";
pub const VIEW_NAME_SEPARATOR: &str = "/";
pub const ROW_ID: &str = "id";
pub const ROW_KEY: &str = "key";
pub const ROW_VALUE: &str = "value";
pub const ROW_REV: &str = "rev";
pub const ROW_DOC: &str = "doc";

pub const DOCMAP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns `true` when `field` is owned by store metadata and must never be
/// used as an application field name.
pub fn is_reserved_field(field: &str) -> bool {
    RESERVED_FIELDS.contains(&field) || field.starts_with(RESERVED_PREFIX)
}

/// Returns `true` when `field` is store metadata or the mapper's own
/// discriminator.
pub fn is_metadata_field(field: &str) -> bool {
    is_reserved_field(field) || field == DOC_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_fields_are_detected() {
        assert!(is_reserved_field(DOC_ID));
        assert!(is_reserved_field(DOC_REV));
        assert!(is_reserved_field("_attachments"));
        assert!(is_reserved_field("_anything"));
        assert!(!is_reserved_field("author"));
        assert!(!is_reserved_field(DOC_TYPE));
    }

    #[test]
    fn discriminator_is_metadata() {
        assert!(is_metadata_field(DOC_TYPE));
        assert!(is_metadata_field(DOC_REV));
        assert!(!is_metadata_field("content"));
    }
}
