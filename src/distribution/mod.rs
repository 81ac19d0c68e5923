//! Registry id mappings kept in a [`MetadataStore`].
mod v1id;
pub use v1id::V1IdService;
