/// Filesystem listing and document decoding.
pub mod fs;
