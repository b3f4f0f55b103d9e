// Capability matching: taxonomy scoping, catalog constraint validation,
// and capability/requirement fit scoring.
// Everything here except `handlers` is synchronous and storage-agnostic.

pub mod handlers;
pub mod score;
pub mod taxonomy;
pub mod validator;
