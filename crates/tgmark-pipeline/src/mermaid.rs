//! mermaid.ink diagram renderer.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use reqwest::header::USER_AGENT;
use serde_json::json;
use tgmark_core::config::MermaidConfig;

use crate::render::{DiagramRenderer, RenderError, RenderedDiagram};

const LIVE_EDITOR_URL: &str = "https://mermaid.live/edit/#";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";
const IMAGE_WIDTH: u32 = 500;
const IMAGE_SCALE: u32 = 2;

/// Renders mermaid diagrams through the mermaid.ink HTTP service.
#[derive(Debug, Clone)]
pub struct MermaidInkRenderer {
    http: reqwest::Client,
    base_url: String,
    theme: String,
}

impl MermaidInkRenderer {
    pub fn new(base_url: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            theme: theme.into(),
        }
    }

    pub fn from_config(config: &MermaidConfig) -> Self {
        Self::new(config.base_url.clone(), config.theme.clone())
    }

    /// Encodes diagram source as a `pako:` payload understood by mermaid.ink
    /// and the mermaid live editor.
    pub fn encode_pako(&self, source: &str) -> Result<String, RenderError> {
        let document = json!({
            "code": source,
            "mermaid": { "theme": self.theme },
        });
        let json =
            serde_json::to_vec(&document).map_err(|err| RenderError::Encode(err.to_string()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&json)
            .map_err(|err| RenderError::Encode(err.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|err| RenderError::Encode(err.to_string()))?;

        Ok(format!("pako:{}", URL_SAFE.encode(compressed)))
    }

    pub fn image_url(&self, pako: &str) -> String {
        format!(
            "{}/img/{pako}?theme={}&width={IMAGE_WIDTH}&scale={IMAGE_SCALE}&type=webp",
            self.base_url, self.theme
        )
    }

    pub fn live_editor_url(pako: &str) -> String {
        format!("{LIVE_EDITOR_URL}{pako}")
    }
}

impl Default for MermaidInkRenderer {
    fn default() -> Self {
        Self::from_config(&MermaidConfig::default())
    }
}

impl DiagramRenderer for MermaidInkRenderer {
    async fn render(&self, source: &str) -> Result<RenderedDiagram, RenderError> {
        let pako = self.encode_pako(source)?;
        let url = self.image_url(&pako);
        tracing::debug!(%url, "requesting diagram image");

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status(status));
        }

        let data = response.bytes().await?.to_vec();
        if !infer::is_image(&data) {
            return Err(RenderError::NotAnImage { len: data.len() });
        }

        Ok(RenderedDiagram {
            data,
            caption: Self::live_editor_url(&pako),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const DIAGRAM: &str = "graph TD\n  A --> B";

    fn decode_pako(pako: &str) -> Value {
        let encoded = pako.strip_prefix("pako:").unwrap();
        let compressed = URL_SAFE.decode(encoded).unwrap();
        let mut json = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_encode_pako_round_trip() {
        let renderer = MermaidInkRenderer::new("https://mermaid.ink", "dark");
        let pako = renderer.encode_pako(DIAGRAM).unwrap();

        assert!(pako.starts_with("pako:"));
        assert!(!pako.contains('+') && !pako.contains('/'));
        let document = decode_pako(&pako);
        assert_eq!(document["code"], DIAGRAM);
        assert_eq!(document["mermaid"]["theme"], "dark");
    }

    #[test]
    fn test_urls() {
        let renderer = MermaidInkRenderer::new("https://mermaid.ink/", "default");
        assert_eq!(
            renderer.image_url("pako:abc"),
            "https://mermaid.ink/img/pako:abc?theme=default&width=500&scale=2&type=webp"
        );
        assert_eq!(
            MermaidInkRenderer::live_editor_url("pako:abc"),
            "https://mermaid.live/edit/#pako:abc"
        );
    }

    #[tokio::test]
    async fn test_render_downloads_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/img/pako:[A-Za-z0-9_=-]+$"))
            .and(query_param("type", "webp"))
            .and(query_param("theme", "default"))
            .and(header("user-agent", BROWSER_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
            .expect(1)
            .mount(&server)
            .await;

        let renderer = MermaidInkRenderer::new(server.uri(), "default");
        let diagram = renderer.render(DIAGRAM).await.unwrap();

        assert_eq!(diagram.data, PNG_BYTES);
        assert!(diagram.caption.starts_with("https://mermaid.live/edit/#pako:"));
        let pako = diagram.caption.trim_start_matches(LIVE_EDITOR_URL);
        assert_eq!(decode_pako(pako)["code"], DIAGRAM);
    }

    #[tokio::test]
    async fn test_render_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Syntax error"))
            .mount(&server)
            .await;

        let renderer = MermaidInkRenderer::new(server.uri(), "default");
        let err = renderer.render("not a diagram").await.unwrap_err();
        assert!(matches!(err, RenderError::Status(status) if status.as_u16() == 400));
    }

    #[tokio::test]
    async fn test_render_rejects_non_image_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let renderer = MermaidInkRenderer::new(server.uri(), "default");
        let err = renderer.render(DIAGRAM).await.unwrap_err();
        assert!(matches!(err, RenderError::NotAnImage { len: 17 }));
    }
}
