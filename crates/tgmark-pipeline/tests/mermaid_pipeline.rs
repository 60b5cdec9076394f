use tgmark_pipeline::{
    Content, ContentSource, MermaidInkRenderer, PipelineOptions, process_markdown,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

const DOCUMENT: &str = "\
# Architecture

The request flow:

```mermaid
sequenceDiagram
    Client->>Server: GET /
```

Done.
";

#[tokio::test]
async fn test_diagram_rendered_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/pako:"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(WEBP))
        .expect(1)
        .mount(&server)
        .await;

    let renderer = MermaidInkRenderer::new(server.uri(), "default");
    let contents = process_markdown(
        DOCUMENT,
        &PipelineOptions::default(),
        &renderer,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(contents.len(), 3);
    let heading = contents[0].as_text().unwrap();
    assert_eq!(heading.text, "📌 Architecture\n\nThe request flow:");

    let Content::Photo(photo) = &contents[1] else {
        panic!("expected photo, got {:?}", contents[1]);
    };
    assert_eq!(photo.data, WEBP);
    assert!(photo.caption.starts_with("https://mermaid.live/edit/#pako:"));
    assert_eq!(photo.source, ContentSource::Diagram);

    assert_eq!(contents[2].as_text().unwrap().text, "Done.");
}

#[tokio::test]
async fn test_server_error_falls_back_to_source_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let renderer = MermaidInkRenderer::new(server.uri(), "default");
    let contents = process_markdown(
        DOCUMENT,
        &PipelineOptions::default(),
        &renderer,
        &CancellationToken::new(),
    )
    .await;

    let Content::File(file) = &contents[1] else {
        panic!("expected file, got {:?}", contents[1]);
    };
    assert_eq!(file.file_name, "invalid_mermaid.txt");
    assert_eq!(
        String::from_utf8_lossy(&file.data),
        "sequenceDiagram\n    Client->>Server: GET /"
    );
}
