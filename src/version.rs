// Version information for vision-relay

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "yolov8-detection",
    "annotated-image",
    "structured-object-analysis",
    "vision-chat",
    "schema-flattening",
    "retry-backoff",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!(
        "vision-relay {} ({}) [{}]",
        VERSION_NUMBER,
        BUILD_DATE,
        FEATURES.join(", ")
    )
}
