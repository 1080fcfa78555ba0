//! Upload policy table
//!
//! Maps a declared media type to the file extensions and maximum size accepted
//! for it. The table is static; a declared type missing from it gets a policy
//! that rejects every file.

use serde::Serialize;

use crate::constants::{FALLBACK_DECLARED_TYPE, MIB};

/// One row of the static table: several declared types sharing extensions and a size limit.
struct PolicyGroup {
    declared_types: &'static [&'static str],
    extensions: &'static [&'static str],
    max_bytes: u64,
}

const POLICY_GROUPS: &[PolicyGroup] = &[
    PolicyGroup {
        declared_types: &["video/avi", "video/webm", "video/mp4"],
        extensions: &["avi", "webm", "mp4"],
        max_bytes: 250 * MIB,
    },
    PolicyGroup {
        declared_types: &["application/pdf"],
        extensions: &["pdf"],
        max_bytes: 270 * MIB,
    },
    PolicyGroup {
        declared_types: &[
            "image/tiff",
            "image/psd",
            "image/eps",
            "image/svg+xml",
            "image/webp",
        ],
        extensions: &["tiff", "psd", "eps", "svg", "webp"],
        max_bytes: 50 * MIB,
    },
    PolicyGroup {
        declared_types: &["audio/mp4"],
        extensions: &["m4a"],
        max_bytes: 50 * MIB,
    },
    PolicyGroup {
        declared_types: &[
            "text/plain",
            "application/rtf",
            "application/vnd.ms-powerpoint",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ],
        extensions: &["txt", "rtf", "ppt", "pptx"],
        max_bytes: 50 * MIB,
    },
];

/// Extensions and size limit accepted for one declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaPolicy {
    pub declared_type: String,
    pub allowed_extensions: &'static [&'static str],
    pub max_bytes: u64,
}

impl MediaPolicy {
    fn reject_all(declared_type: &str) -> Self {
        Self {
            declared_type: declared_type.to_string(),
            allowed_extensions: &[],
            max_bytes: 0,
        }
    }

    /// Whether `extension` (already lowercased) is accepted.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(&extension)
    }

    /// Whether this is the implicit policy of an unknown declared type.
    pub fn rejects_everything(&self) -> bool {
        self.allowed_extensions.is_empty() && self.max_bytes == 0
    }
}

/// Look up the policy for a declared type.
///
/// Media types compare case-insensitively. Unknown types yield a policy with no
/// allowed extensions and a zero size limit; that is the rejection signal, not an error.
pub fn lookup(declared_type: &str) -> MediaPolicy {
    let normalized = declared_type.trim().to_lowercase();

    POLICY_GROUPS
        .iter()
        .find(|group| group.declared_types.contains(&normalized.as_str()))
        .map(|group| MediaPolicy {
            declared_type: normalized.clone(),
            allowed_extensions: group.extensions,
            max_bytes: group.max_bytes,
        })
        .unwrap_or_else(|| MediaPolicy::reject_all(&normalized))
}

/// Every known declared type with its policy, in table order.
pub fn policy_table() -> Vec<MediaPolicy> {
    POLICY_GROUPS
        .iter()
        .flat_map(|group| {
            group.declared_types.iter().map(|declared_type| MediaPolicy {
                declared_type: (*declared_type).to_string(),
                allowed_extensions: group.extensions,
                max_bytes: group.max_bytes,
            })
        })
        .collect()
}

/// Declared type to assume for a local file, from its lowercased extension.
///
/// Only covers the extensions the policy table knows about; anything else maps
/// to `application/octet-stream`, which no policy accepts.
pub fn declared_type_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "avi" => "video/avi",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        "tiff" => "image/tiff",
        "psd" => "image/psd",
        "eps" => "image/eps",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "m4a" => "audio/mp4",
        "txt" => "text/plain",
        "rtf" => "application/rtf",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => FALLBACK_DECLARED_TYPE,
    }
}
