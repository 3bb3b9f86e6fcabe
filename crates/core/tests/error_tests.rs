// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use coinwatch_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_url() {
        let err = CoreError::InvalidUrl("ftp://example.com".into());
        assert_eq!(err.to_string(), "Invalid URL: ftp://example.com");
    }

    #[test]
    fn invalid_response() {
        let err = CoreError::InvalidResponse(0);
        assert_eq!(err.to_string(), "Invalid response statusCode: 0");
    }

    #[test]
    fn http_error_code_contains_status() {
        let err = CoreError::HttpErrorCode(500);
        assert_eq!(err.to_string(), "HTTP error code: 500");
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn decode() {
        let err = CoreError::Decode("missing field `id`".into());
        assert_eq!(err.to_string(), "Decode error: missing field `id`");
    }

    #[test]
    fn cache_io() {
        let err = CoreError::CacheIo("disk full".into());
        assert_eq!(err.to_string(), "Cache I/O error: disk full");
    }

    #[test]
    fn unknown() {
        let err = CoreError::Unknown("connection reset".into());
        assert_eq!(err.to_string(), "Unknown error: connection reset");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported file version: 99");
    }

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("Coin id must not be empty".into());
        assert_eq!(err.to_string(), "Validation failed: Coin id must not be empty");
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn network_errors() {
        assert!(CoreError::InvalidUrl(String::new()).is_network());
        assert!(CoreError::InvalidResponse(0).is_network());
        assert!(CoreError::HttpErrorCode(404).is_network());
        assert!(CoreError::Unknown("timeout".into()).is_network());
    }

    #[test]
    fn local_errors_are_not_network() {
        assert!(!CoreError::Decode(String::new()).is_network());
        assert!(!CoreError::CacheIo(String::new()).is_network());
        assert!(!CoreError::ValidationError(String::new()).is_network());
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error_is_cache_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::CacheIo(ref m) if m.contains("denied")));
    }

    #[test]
    fn from_serde_json_error_is_decode() {
        let json_err = serde_json::from_str::<Vec<u32>>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Decode(_)));
    }

    #[test]
    fn from_bincode_error_is_serialization() {
        let bin_err = bincode::deserialize::<String>(&[0xFF]).unwrap_err();
        let err: CoreError = bin_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn errors_are_comparable_and_cloneable() {
        let err = CoreError::HttpErrorCode(429);
        assert_eq!(err.clone(), CoreError::HttpErrorCode(429));
        assert_ne!(err, CoreError::HttpErrorCode(500));
    }
}
