use serde::{Deserialize, Serialize};

use super::output::{AssetFormat, GlobalSettings, OutputSpec, OutputType};
use crate::error::GenerationError;
use crate::validation::validate_output_spec;

/// Wire shape of one requested output in `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "type")]
    pub output_type: OutputType,
    pub language: String,
    pub width: u32,
    pub height: u32,
    pub formats: Vec<AssetFormat>,
    pub generate_print: bool,
}

impl From<&OutputSpec> for OutputConfig {
    fn from(spec: &OutputSpec) -> Self {
        Self {
            output_type: spec.output_type,
            language: spec.language.clone(),
            width: spec.width,
            height: spec.height,
            formats: spec.formats.iter().copied().collect(),
            generate_print: spec.wants_print(),
        }
    }
}

/// Body of `POST /api/generate`, built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub job_id: String,
    pub outputs: Vec<OutputConfig>,
    pub settings: GlobalSettings,
}

impl GenerationRequest {
    /// Snapshot the enabled specs into a request.
    ///
    /// Disabled specs are skipped. Fails with `NoOutputsSelected` when nothing is
    /// enabled and with `InvalidOutputSpec` when an enabled spec cannot be sent.
    pub fn build<'a>(
        job_id: &str,
        specs: impl IntoIterator<Item = &'a OutputSpec>,
        settings: GlobalSettings,
    ) -> Result<Self, GenerationError> {
        let outputs = specs
            .into_iter()
            .filter(|s| s.enabled)
            .map(|s| validate_output_spec(s).map(|_| OutputConfig::from(s)))
            .collect::<Result<Vec<_>, _>>()?;

        if outputs.is_empty() {
            return Err(GenerationError::NoOutputsSelected);
        }

        Ok(Self {
            job_id: job_id.to_string(),
            outputs,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(id: &str, t: OutputType, enabled: bool) -> OutputSpec {
        let mut s = OutputSpec::with_defaults(id.into(), t);
        s.enabled = enabled;
        s
    }

    #[test]
    fn build_serializes_wire_shape() {
        let specs = vec![spec("poster-1", OutputType::Poster, true)];
        let req = GenerationRequest::build("J1", &specs, GlobalSettings::default()).unwrap();
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "job_id": "J1",
                "outputs": [{
                    "type": "poster",
                    "language": "English",
                    "width": 1080,
                    "height": 1350,
                    "formats": ["png", "jpeg", "pdf"],
                    "generate_print": true
                }],
                "settings": {
                    "auto_alt_text": true,
                    "contrast_check": true,
                    "brand_guidelines": false
                }
            })
        );
    }

    #[test]
    fn build_skips_disabled_specs() {
        let specs = vec![
            spec("poster-1", OutputType::Poster, false),
            spec("ad-2", OutputType::Ad, true),
        ];
        let req = GenerationRequest::build("J1", &specs, GlobalSettings::default()).unwrap();
        assert_eq!(req.outputs.len(), 1);
        assert_eq!(req.outputs[0].output_type, OutputType::Ad);
        assert!(!req.outputs[0].generate_print);
    }

    #[test]
    fn build_rejects_when_nothing_enabled() {
        let specs = vec![spec("poster-1", OutputType::Poster, false)];
        let err = GenerationRequest::build("J1", &specs, GlobalSettings::default()).unwrap_err();
        assert!(matches!(err, GenerationError::NoOutputsSelected));
    }

    #[test]
    fn build_rejects_enabled_spec_without_formats() {
        let mut s = spec("banner-1", OutputType::Banner, true);
        s.formats.clear();
        let err = GenerationRequest::build("J1", [&s], GlobalSettings::default()).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutputSpec(_)));
    }

    #[test]
    fn disabled_invalid_spec_does_not_block_submission() {
        let mut broken = spec("banner-1", OutputType::Banner, false);
        broken.width = 0;
        let ok = spec("ad-2", OutputType::Ad, true);
        assert!(GenerationRequest::build("J1", [&broken, &ok], GlobalSettings::default()).is_ok());
    }
}
