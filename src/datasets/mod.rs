//! Dataset status model and the small pure helpers the controller builds on

pub mod catalog;
mod types;

pub use types::{DatasetStatus, JobStatus, RefreshKind};

/// Move the pinned product to the front, keeping every other record in the
/// order it arrived.
pub fn pin_first(mut records: Vec<DatasetStatus>, pinned: &str) -> Vec<DatasetStatus> {
    if let Some(index) = records.iter().position(|r| r.product_name == pinned) {
        let record = records.remove(index);
        records.insert(0, record);
    }
    records
}

/// Parent directory of a storage path.
///
/// The separator is `\` when the path contains one, `/` otherwise. A path
/// without a separator is returned unchanged.
pub fn parent_directory(path: &str) -> &str {
    let separator = if path.contains('\\') { '\\' } else { '/' };
    match path.rfind(separator) {
        Some(index) => &path[..index],
        None => path,
    }
}
