//! Storage Adapters
//!
//! Implementations of the storage-flavoured ports.
//!
//! ## Available Adapters
//!
//! - **LocalMediaStore** - Evidence images on local disk
//! - **InMemoryMediaStore** - Evidence images in memory (testing/development)
//! - **InMemorySubmissionStore** - Finished reports in memory, with failure injection
//! - **FileSettingsOverlay** - Runtime overrides as a JSON file
//! - **InMemorySettingsOverlay** - Runtime overrides in memory
//!
//! The PostgreSQL submission store lives in `adapters::postgres`.

mod file_settings_overlay;
mod in_memory_media_store;
mod in_memory_settings_overlay;
mod in_memory_submission_store;
mod local_media_store;

pub use file_settings_overlay::FileSettingsOverlay;
pub use in_memory_media_store::InMemoryMediaStore;
pub use in_memory_settings_overlay::InMemorySettingsOverlay;
pub use in_memory_submission_store::InMemorySubmissionStore;
pub use local_media_store::LocalMediaStore;

/// Keeps only characters that are safe in a path segment.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_file_name;

    #[test]
    fn file_names_are_reduced_to_safe_segments() {
        assert_eq!(sanitize_file_name("foto.jpg"), "foto.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("mi foto (1).png"), "mi_foto__1_.png");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name(".."), "upload");
    }
}
