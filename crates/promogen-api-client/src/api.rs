//! Domain methods for the generation API client.
//!
//! Request and response types live in `promogen_core::models`.

use base64::Engine;
use promogen_core::models::{
    AltTextResponse, AssetResult, AssetsResponse, ContrastCheckResponse, GenerateAck,
    GenerationRequest, HealthResponse, ImageDataRequest, JobStatusResponse, UploadResponse,
};

use crate::{ApiClient, ApiError, API_PREFIX};

fn job_path(resource: &str, job_id: &str) -> Result<String, ApiError> {
    if job_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("job id must not be empty".to_string()));
    }
    Ok(format!(
        "{}/{}/{}",
        API_PREFIX,
        resource,
        urlencoding::encode(job_id)
    ))
}

impl ApiClient {
    /// Upload a source image as the multipart `file` field. Creates a remote job.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(media_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.post_multipart(&format!("{}/upload", API_PREFIX), form)
            .await
    }

    /// Ask the server to start generating. Returns once the run is accepted.
    #[tracing::instrument(
        skip(self, request),
        fields(job_id = %request.job_id, outputs = request.outputs.len())
    )]
    pub async fn start_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerateAck, ApiError> {
        let body = self
            .post_json_text(&format!("{}/generate", API_PREFIX), request)
            .await?;
        // Only success is part of the contract; tolerate any acknowledgement body.
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    /// Current status of a job.
    #[tracing::instrument(skip(self))]
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        self.get(&job_path("jobs", job_id)?).await
    }

    /// All assets generated for a job, in server order.
    #[tracing::instrument(skip(self))]
    pub async fn job_assets(&self, job_id: &str) -> Result<Vec<AssetResult>, ApiError> {
        let response: AssetsResponse = self.get(&job_path("assets", job_id)?).await?;
        Ok(response.assets)
    }

    /// Generate alt text for an image.
    #[tracing::instrument(skip(self, image), fields(size = image.len()))]
    pub async fn analyze_image(&self, image: &[u8]) -> Result<AltTextResponse, ApiError> {
        let body = ImageDataRequest {
            image_data: base64::engine::general_purpose::STANDARD.encode(image),
        };
        self.post_json(&format!("{}/analyze", API_PREFIX), &body)
            .await
    }

    /// Score the contrast of an image.
    #[tracing::instrument(skip(self, image), fields(size = image.len()))]
    pub async fn check_contrast(&self, image: &[u8]) -> Result<ContrastCheckResponse, ApiError> {
        let body = ImageDataRequest {
            image_data: base64::engine::general_purpose::STANDARD.encode(image),
        };
        self.post_json(&format!("{}/contrast-check", API_PREFIX), &body)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get(&format!("{}/", API_PREFIX)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Auth;
    use mockito::Matcher;
    use promogen_core::models::{
        AssetFormat, ContrastStatus, GlobalSettings, JobStatus, OutputSpec, OutputType,
    };
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &mockito::Server, auth: Auth) -> ApiClient {
        ApiClient::new(&server.url(), auth, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn upload_sends_multipart_and_returns_job_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_header("x-api-key", "secret")
            .match_body(Matcher::Regex("name=\"file\"; filename=\"shoe.jpg\"".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"job_id":"J1","status":"pending"}"#)
            .create_async()
            .await;

        let api = client(&server, Auth::XApiKey("secret".into()));
        let resp = api
            .upload_image("shoe.jpg", "image/jpeg", b"fake-jpeg-bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(resp.job_id, "J1");
        assert_eq!(resp.status.as_deref(), Some("pending"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_rejection_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .with_status(400)
            .with_body(r#"{"detail":"File must be an image"}"#)
            .create_async()
            .await;

        let api = client(&server, Auth::None);
        let err = api
            .upload_image("notes.png", "image/png", b"text".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "File must be an image");
    }

    #[tokio::test]
    async fn start_generation_posts_request_body() {
        let mut server = mockito::Server::new_async().await;
        let spec = OutputSpec::with_defaults("poster-1".into(), OutputType::Poster);
        let request = GenerationRequest::build("J1", [&spec], GlobalSettings::default()).unwrap();

        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({
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
            })))
            .with_status(200)
            .with_body(r#"{"message":"Generation started","job_id":"J1"}"#)
            .create_async()
            .await;

        let ack = client(&server, Auth::None)
            .start_generation(&request)
            .await
            .unwrap();
        assert_eq!(ack.message.as_deref(), Some("Generation started"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn start_generation_accepts_empty_ack() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(202)
            .create_async()
            .await;

        let spec = OutputSpec::with_defaults("ad-1".into(), OutputType::Ad);
        let request = GenerationRequest::build("J1", [&spec], GlobalSettings::default()).unwrap();
        let ack = client(&server, Auth::None)
            .start_generation(&request)
            .await
            .unwrap();
        assert!(ack.message.is_none());
    }

    #[tokio::test]
    async fn job_status_classifies_processing_as_pending() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/jobs/J1")
            .with_status(200)
            .with_body(r#"{"id":"J1","status":"processing","error":null}"#)
            .create_async()
            .await;

        let status = client(&server, Auth::None).job_status("J1").await.unwrap();
        assert_eq!(status.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn job_status_not_found_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/jobs/missing")
            .with_status(404)
            .with_body(r#"{"detail":"Job not found"}"#)
            .create_async()
            .await;

        let err = client(&server, Auth::None)
            .job_status("missing")
            .await
            .unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
        assert_eq!(err.detail(), "Job not found");
    }

    #[tokio::test]
    async fn empty_job_id_is_rejected_locally() {
        let server = mockito::Server::new_async().await;
        let err = client(&server, Auth::None).job_status(" ").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn job_assets_returns_batch_in_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/assets/J1")
            .with_status(200)
            .with_body(
                json!({"assets": [
                    {"id":"a","output_type":"poster","language":"English","width":1080,
                     "height":1350,"format":"png","data":"AA=="},
                    {"id":"b","output_type":"poster_print_A2","language":"English","width":1191,
                     "height":1684,"format":"pdf","data":"AA=="}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let assets = client(&server, Auth::None).job_assets("J1").await.unwrap();
        assert_eq!(
            assets.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(assets[1].format, AssetFormat::Pdf);
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/assets/J1")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let err = client(&server, Auth::None).job_assets("J1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn contrast_check_encodes_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/contrast-check")
            .match_body(Matcher::Json(json!({"image_data": "AQID"})))
            .with_status(200)
            .with_body(r#"{"contrast_score":42.0,"status":"warning"}"#)
            .create_async()
            .await;

        let resp = client(&server, Auth::None)
            .check_contrast(&[1, 2, 3])
            .await
            .unwrap();
        assert_eq!(resp.status(), ContrastStatus::Warning);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn analyze_returns_alt_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/analyze")
            .with_status(200)
            .with_body(r#"{"alt_text":"Red running shoe on white background"}"#)
            .create_async()
            .await;

        let resp = client(&server, Auth::None).analyze_image(b"img").await.unwrap();
        assert_eq!(resp.alt_text, "Red running shoe on white background");
    }

    #[tokio::test]
    async fn health_reads_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/")
            .with_status(200)
            .with_body(r#"{"message":"Marketing Asset Generator API"}"#)
            .create_async()
            .await;

        let resp = client(&server, Auth::None).health().await.unwrap();
        assert_eq!(resp.message, "Marketing Asset Generator API");
    }
}
