//! Boundary validation for output specs and upload candidates.

use crate::constants::is_supported_language;
use crate::error::GenerationError;
use crate::models::OutputSpec;

/// Checks an enabled spec can be serialized into a generation request.
pub fn validate_output_spec(spec: &OutputSpec) -> Result<(), GenerationError> {
    if spec.width == 0 || spec.height == 0 {
        return Err(GenerationError::InvalidOutputSpec(format!(
            "{} ({}) must have positive dimensions, got {}x{}",
            spec.id, spec.output_type, spec.width, spec.height
        )));
    }
    if spec.formats.is_empty() {
        return Err(GenerationError::InvalidOutputSpec(format!(
            "{} ({}) must request at least one format",
            spec.id, spec.output_type
        )));
    }
    if !is_supported_language(&spec.language) {
        return Err(GenerationError::InvalidOutputSpec(format!(
            "{} ({}) has unsupported language {}",
            spec.id, spec.output_type, spec.language
        )));
    }
    Ok(())
}

/// Whether a media type designates an image (`image/*`).
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(|essence| essence.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputType;

    #[test]
    fn image_media_types() {
        assert!(is_image_media_type("image/jpeg"));
        assert!(is_image_media_type("IMAGE/PNG"));
        assert!(is_image_media_type("image/svg+xml; charset=utf-8"));
        assert!(!is_image_media_type("text/plain"));
        assert!(!is_image_media_type("application/octet-stream"));
        assert!(!is_image_media_type(""));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut spec = OutputSpec::with_defaults("ad-1".into(), OutputType::Ad);
        spec.height = 0;
        assert!(matches!(
            validate_output_spec(&spec),
            Err(GenerationError::InvalidOutputSpec(_))
        ));
    }

    #[test]
    fn unsupported_language_is_rejected() {
        let mut spec = OutputSpec::with_defaults("ad-1".into(), OutputType::Ad);
        spec.language = "Elvish".into();
        assert!(validate_output_spec(&spec).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        for t in OutputType::ALL {
            let spec = OutputSpec::with_defaults(format!("{}-1", t), t);
            assert!(validate_output_spec(&spec).is_ok());
        }
    }
}
