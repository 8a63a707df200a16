//! Binary caching of the signature tables.

mod signature_cache;

pub use signature_cache::{load_or_rebuild, SignatureCache};
