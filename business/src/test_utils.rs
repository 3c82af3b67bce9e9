//! Mock Gemini server plus a ready-to-use [`StateCtx`] for flow tests.
//!
//! ```ignore
//! let mut test_ctx = TestContext::new().await;
//! test_ctx.mock_generate_text(r#"{"contenido":{"tipo":"texto_plano","data":"hola"}}"#).await;
//! test_ctx.ctx.update::<GenerateQrInput>(|input| input.prompt = "hola".to_owned());
//! test_ctx.ctx.enqueue_command::<GenerateQrCommand>();
//! test_ctx.flush_and_wait().await;
//! ```

#![cfg(test)]

use std::time::Duration;

use lumiqr_states::StateCtx;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{
    BusinessConfig, GenerateQrCommand, GenerateQrInput, GeneratorCompute, ResetScannerCommand,
    SaveQrCommand, SaveQrCompute, SaveQrInput, ScanDisplayCompute, ScanFrameCommand,
    ScanFrameInput, ScannerCompute,
};

pub const TEST_API_KEY: &str = "test-key";

pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = BusinessConfig::new(mock_server.uri()).with_api_key(TEST_API_KEY);
        let ctx = build_test_state_ctx(config);
        Self { mock_server, ctx }
    }

    /// Sync, flush, then await every spawned task, syncing after each one.
    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(5);
        let start = std::time::Instant::now();
        while self.ctx.task_count() > 0 {
            assert!(
                start.elapsed() < timeout,
                "Timed out waiting for pending tasks ({} still in JoinSet)",
                self.ctx.task_count()
            );
            if self.ctx.task_set_mut().join_next().await.is_some() {
                self.ctx.sync_computes();
            }
        }
        self.ctx.sync_computes();
    }

    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    fn generate_path(&self) -> String {
        format!(
            "/v1beta/models/{}:generateContent",
            self.ctx.state::<BusinessConfig>().model
        )
    }

    /// Answer generate calls with one candidate whose text is `text`.
    pub async fn mock_generate_text(&self, text: &str) {
        let body = json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        });
        Mock::given(method("POST"))
            .and(path(self.generate_path()))
            .and(header("x-goog-api-key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_generate_error(&self, status: u16, message: &str) {
        let body = json!({ "error": { "code": status, "message": message } });
        Mock::given(method("POST"))
            .and(path(self.generate_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }
}

fn build_test_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();
    ctx.add_state(config);

    ctx.add_state(GenerateQrInput::default());
    ctx.record_compute(GeneratorCompute::default());
    ctx.add_state(SaveQrInput::default());
    ctx.record_compute(SaveQrCompute::default());

    ctx.add_state(ScanFrameInput::default());
    ctx.record_compute(ScannerCompute::default());
    ctx.record_compute(ScanDisplayCompute::default());

    ctx.record_command(GenerateQrCommand);
    ctx.record_command(SaveQrCommand);
    ctx.record_command(ScanFrameCommand);
    ctx.record_command(ResetScannerCommand);
    ctx
}

#[cfg(test)]
mod tests {
    use lumiqr_input::Frame;

    use super::*;
    use crate::{
        ContentType, GeneratorStatus, PayloadKind, QrContentSpec, QrRenderer, SaveStatus,
    };

    const WIFI_SPEC: &str = r##"{"contenido":{"tipo":"wifi","data":{"ssid":"Net","password":"pass","tipo_seguridad":"WPA"}},"nivel_de_correccion":"H","colores":{"fondo":"#FFFFFF","principal":{"tipo":"solido","valores":["#1E3A8A"]}},"estilo":"puntos"}"##;

    fn qr_frame(payload: &str) -> Frame {
        let spec = QrContentSpec::plain_text(payload);
        let rendered = QrRenderer::new(6, 4).render(payload, &spec).unwrap();
        Frame::from_image(&image::DynamicImage::ImageRgba8(rendered.image().clone()))
    }

    async fn generate(test_ctx: &mut TestContext, prompt: &str) -> GeneratorStatus {
        test_ctx
            .ctx
            .update::<GenerateQrInput>(|input| input.prompt = prompt.to_owned());
        test_ctx.ctx.enqueue_command::<GenerateQrCommand>();
        test_ctx.flush_and_wait().await;
        test_ctx.ctx.compute::<GeneratorCompute>().status.clone()
    }

    async fn scan(test_ctx: &mut TestContext, frame: Frame) {
        test_ctx
            .ctx
            .update::<ScanFrameInput>(|input| input.frame = Some(frame));
        test_ctx.ctx.enqueue_command::<ScanFrameCommand>();
        test_ctx.flush_and_wait().await;
    }

    #[tokio::test]
    async fn generate_wifi_payload() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .mock_generate_text(&format!("Aquí está:\n{WIFI_SPEC}\n"))
            .await;

        match generate(&mut test_ctx, "wifi Net con clave pass").await {
            GeneratorStatus::Success { spec, payload } => {
                assert_eq!(payload, "WIFI:T:WPA;S:Net;P:pass;;");
                assert_eq!(spec.content.kind, PayloadKind::Wifi);
            }
            other => panic!("Expected Success, got {other:?}"),
        }
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn empty_model_text_is_an_error() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_generate_text("   ").await;

        assert_eq!(
            generate(&mut test_ctx, "algo").await,
            GeneratorStatus::Error("AI response was empty".to_owned())
        );
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn model_text_without_json_is_an_error() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_generate_text("no puedo ayudar con eso").await;

        assert_eq!(
            generate(&mut test_ctx, "algo").await,
            GeneratorStatus::Error("No valid JSON object found in the response".to_owned())
        );
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let mut test_ctx = TestContext::new().await;
        test_ctx.mock_generate_error(403, "API key not valid").await;

        match generate(&mut test_ctx, "algo").await {
            GeneratorStatus::Error(message) => {
                assert!(message.contains("403"), "{message}");
                assert!(message.contains("API key not valid"), "{message}");
            }
            other => panic!("Expected Error, got {other:?}"),
        }
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn missing_key_never_reaches_the_server() {
        let mut test_ctx = TestContext::new().await;
        test_ctx
            .ctx
            .update::<BusinessConfig>(|config| config.api_key = None);

        match generate(&mut test_ctx, "algo").await {
            GeneratorStatus::Error(message) => assert!(message.contains("API key"), "{message}"),
            other => panic!("Expected Error, got {other:?}"),
        }
        let received = test_ctx.mock_server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn save_writes_into_the_configured_album() {
        let album = tempfile::tempdir().unwrap();
        let mut test_ctx = TestContext::new().await;
        let dir = album.path().to_path_buf();
        test_ctx
            .ctx
            .update::<BusinessConfig>(|config| config.album_dir = Some(dir));
        test_ctx
            .ctx
            .update::<SaveQrInput>(|input| input.png = Some(b"png".to_vec()));
        test_ctx.ctx.enqueue_command::<SaveQrCommand>();
        test_ctx.flush_and_wait().await;

        match &test_ctx.ctx.compute::<SaveQrCompute>().status {
            SaveStatus::Saved(path) => assert!(path.starts_with(album.path())),
            other => panic!("Expected Saved, got {other:?}"),
        }
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn scan_holds_result_until_reset() {
        let mut test_ctx = TestContext::new().await;

        scan(&mut test_ctx, qr_frame("https://lumi.mx")).await;
        let scanner = test_ctx.ctx.compute::<ScannerCompute>().clone();
        assert!(!scanner.is_loading);
        assert_eq!(scanner.barcodes[0].raw_value, "https://lumi.mx");

        let display = test_ctx.ctx.compute::<ScanDisplayCompute>().display.clone();
        assert_eq!(display.map(|d| d.content_type), Some(ContentType::Url));

        // Paused: a second code is ignored while the first is held.
        scan(&mut test_ctx, qr_frame("otro")).await;
        assert_eq!(test_ctx.ctx.compute::<ScannerCompute>(), &scanner);

        test_ctx.ctx.enqueue_command::<ResetScannerCommand>();
        test_ctx.flush_and_wait().await;
        assert_eq!(test_ctx.ctx.compute::<ScannerCompute>(), &ScannerCompute::default());
        assert!(test_ctx.ctx.compute::<ScanDisplayCompute>().display.is_none());

        scan(&mut test_ctx, qr_frame("otro")).await;
        assert_eq!(
            test_ctx.ctx.compute::<ScannerCompute>().barcodes[0].raw_value,
            "otro"
        );
        test_ctx.shutdown().await;
    }

    #[tokio::test]
    async fn empty_frame_keeps_previous_state() {
        let mut test_ctx = TestContext::new().await;
        scan(&mut test_ctx, Frame::new(32, 32, vec![255; 32 * 32]).unwrap()).await;

        let scanner = test_ctx.ctx.compute::<ScannerCompute>();
        assert!(!scanner.is_loading);
        assert!(scanner.barcodes.is_empty());
        assert!(scanner.error.is_none());
        test_ctx.shutdown().await;
    }
}
