//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use quadstitch::StitchError;
    use quadstitch::io::error::{
        computation_error, configuration_error, integrity_error, invalid_parameter,
    };
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = StitchError::FileSystem {
            path: "/tmp/test.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/test.png"));
        assert!(configuration_error(&"x").source().is_none());
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let message = invalid_parameter("n_parents", &-1, &"must be positive").to_string();
        assert!(message.contains("n_parents"));
        assert!(message.contains("-1"));
        assert!(message.contains("must be positive"));
    }

    // Tests integrity errors carry the candidate file line
    // Verified by formatting a 0-based line
    #[test]
    fn test_integrity_error_line() {
        let error = integrity_error(7, &"embedded score token disagrees");
        assert!(matches!(error, StitchError::Integrity { line: 7, .. }));
        let message = error.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("embedded score token"));
    }

    // Tests configuration and computation errors name their cause
    // Verified by dropping the operation from the message
    #[test]
    fn test_configuration_and_computation_messages() {
        assert!(
            configuration_error(&"UL assigned twice")
                .to_string()
                .contains("UL assigned twice")
        );
        let message = computation_error("fuse", &"no tissue").to_string();
        assert!(message.contains("fuse"));
        assert!(message.contains("no tissue"));
    }

    // Tests image errors convert with an unknown path
    // Verified by dropping the conversion
    #[test]
    fn test_from_image_error() {
        let image_error = image::ImageError::IoError(std::io::Error::other("broken"));
        let error: StitchError = image_error.into();
        assert!(matches!(error, StitchError::ImageLoad { .. }));
        assert!(error.source().is_some());
    }
}
