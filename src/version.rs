//! OpenAPI specification version constants and compatibility checking.

/// The OpenAPI specification version emitted by default
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Specification major version this crate targets
pub const OPENAPI_MAJOR: u32 = 3;

/// Specification minor version this crate targets
pub const OPENAPI_MINOR: u32 = 1;

/// Checks whether a document's `openapi` field names a specification
/// version this crate can represent.
///
/// Supported means major version 3 and minor version 1 (any patch level).
///
/// # Examples
///
/// ```
/// use oasdoc::version::is_supported;
///
/// assert!(is_supported("3.1.0"));
/// assert!(is_supported("3.1.2"));
/// assert!(!is_supported("3.0.3"));
/// assert!(!is_supported("2.0"));
/// ```
pub fn is_supported(version: &str) -> bool {
    let mut parts = version.split('.');
    let major = parts.next().and_then(|p| p.parse::<u32>().ok());
    let minor = parts.next().and_then(|p| p.parse::<u32>().ok());
    match (major, minor) {
        (Some(major), Some(minor)) => major == OPENAPI_MAJOR && minor == OPENAPI_MINOR,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_versions() {
        assert!(is_supported("3.1.0"));
        assert!(is_supported("3.1.1"));
        assert!(is_supported(OPENAPI_VERSION));
    }

    #[test]
    fn test_unsupported_versions() {
        assert!(!is_supported("3.0.0"));
        assert!(!is_supported("2.0"));
        assert!(!is_supported("4.0.0"));
        assert!(!is_supported(""));
        assert!(!is_supported("three.one"));
    }
}
