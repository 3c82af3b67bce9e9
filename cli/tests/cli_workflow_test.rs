//! CLI integration tests.
//!
//! The state-context tests drive the same states and commands the binary
//! registers, against a wiremock Gemini server. The process tests run the
//! built `lumiqr` binary end to end.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use lumiqr_business::{
    BusinessConfig, GenerateQrCommand, GenerateQrInput, GeneratorCompute, GeneratorStatus,
    QrRenderer, ResetScannerCommand, SaveQrCommand, SaveQrCompute, SaveQrInput, SaveStatus,
    ScanDisplayCompute, ScanFrameCommand, ScanFrameInput, ScannerCompute, ValueType,
};
use lumiqr_input::Frame;
use lumiqr_states::StateCtx;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "cli-test-key";
const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash-lite-001:generateContent";

const WIFI_SPEC: &str = r##"{"contenido":{"tipo":"wifi","data":{"ssid":"Net","password":"pass","tipo_seguridad":"WPA"}},"nivel_de_correccion":"M","colores":{"fondo":"#FFFFFF","principal":{"tipo":"gradiente","valores":["#1E3A8A","#7C3AED"]}},"estilo":"redondeado"}"##;

struct CliTestContext {
    mock_server: MockServer,
    ctx: StateCtx,
}

impl CliTestContext {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = BusinessConfig::new(mock_server.uri()).with_api_key(API_KEY);
        let ctx = build_cli_test_state_ctx(config);
        Self { mock_server, ctx }
    }

    async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(5);
        let start = std::time::Instant::now();
        while self.ctx.task_count() > 0 {
            assert!(
                start.elapsed() <= timeout,
                "Timed out waiting for pending tasks ({} still in JoinSet)",
                self.ctx.task_count()
            );
            if self.ctx.task_set_mut().join_next().await.is_some() {
                self.ctx.sync_computes();
            }
        }
        self.ctx.sync_computes();
    }

    async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    async fn mock_model_reply(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": text }] } }]
            })))
            .mount(&self.mock_server)
            .await;
    }
}

fn build_cli_test_state_ctx(config: BusinessConfig) -> StateCtx {
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

// =========================================================================
// State context workflows
// =========================================================================

#[tokio::test]
async fn generate_render_save_and_scan_back() {
    let album = tempfile::tempdir().unwrap();
    let mut test_ctx = CliTestContext::new().await;
    test_ctx.mock_model_reply(WIFI_SPEC).await;

    test_ctx
        .ctx
        .update::<GenerateQrInput>(|input| input.prompt = "wifi Net clave pass".to_owned());
    test_ctx.ctx.enqueue_command::<GenerateQrCommand>();
    test_ctx.flush_and_wait().await;

    let GeneratorStatus::Success { spec, payload } =
        test_ctx.ctx.compute::<GeneratorCompute>().status.clone()
    else {
        panic!("generation failed: {:?}", test_ctx.ctx.compute::<GeneratorCompute>().status);
    };
    assert_eq!(payload, "WIFI:T:WPA;S:Net;P:pass;;");

    let rendered = QrRenderer::default().render(&payload, &spec).unwrap();
    let png = rendered.branded_png_bytes().unwrap();
    let dir = album.path().to_path_buf();
    test_ctx.ctx.update::<SaveQrInput>(|input| {
        input.png = Some(png);
        input.directory = Some(dir);
    });
    test_ctx.ctx.enqueue_command::<SaveQrCommand>();
    test_ctx.flush_and_wait().await;

    let SaveStatus::Saved(saved) = test_ctx.ctx.compute::<SaveQrCompute>().status.clone() else {
        panic!("save failed: {:?}", test_ctx.ctx.compute::<SaveQrCompute>().status);
    };

    let frame = Frame::open(&saved).unwrap();
    test_ctx
        .ctx
        .update::<ScanFrameInput>(|input| input.frame = Some(frame));
    test_ctx.ctx.enqueue_command::<ScanFrameCommand>();
    test_ctx.flush_and_wait().await;

    let scanner = test_ctx.ctx.compute::<ScannerCompute>();
    assert_eq!(scanner.barcodes.len(), 1);
    assert_eq!(scanner.barcodes[0].raw_value, payload);
    assert_eq!(scanner.barcodes[0].value_type, ValueType::Wifi);

    let display = test_ctx.ctx.compute::<ScanDisplayCompute>().display.clone().unwrap();
    let labels: Vec<&str> = display.fields.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, ["Tipo", "Nombre de red", "Contraseña"]);

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn newer_generate_request_replaces_older_one() {
    let mut test_ctx = CliTestContext::new().await;
    for (word, delay) in [("primero", 800), ("segundo", 0)] {
        let reply = format!(r#"{{"contenido":{{"tipo":"texto_plano","data":"{word}"}}}}"#);
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_string_contains(word))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "candidates": [{ "content": { "parts": [{ "text": reply }] } }]
                    }))
                    .set_delay(Duration::from_millis(delay)),
            )
            .mount(&test_ctx.mock_server)
            .await;
    }

    test_ctx
        .ctx
        .update::<GenerateQrInput>(|input| input.prompt = "primero".to_owned());
    test_ctx.ctx.enqueue_command::<GenerateQrCommand>();
    test_ctx.ctx.flush_commands();
    test_ctx
        .ctx
        .update::<GenerateQrInput>(|input| input.prompt = "segundo".to_owned());
    test_ctx.ctx.enqueue_command::<GenerateQrCommand>();
    test_ctx.flush_and_wait().await;

    match &test_ctx.ctx.compute::<GeneratorCompute>().status {
        GeneratorStatus::Success { payload, .. } => assert_eq!(payload, "segundo"),
        other => panic!("Expected Success, got {other:?}"),
    }
    test_ctx.shutdown().await;
}

// =========================================================================
// Binary
// =========================================================================

async fn lumiqr(args: &[&str], config_dir: &Path) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_lumiqr"))
        .args(args)
        .env("LUMIQR_CONFIG", config_dir.join("config.toml"))
        .env_remove("LUMIQR_API_KEY")
        .env_remove("LUMIQR_MODEL")
        .env_remove("LUMIQR_BASE_URL")
        .env("RUST_LOG", "off")
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[tokio::test]
async fn inspect_reports_type_fields_and_actions() {
    let home = tempfile::tempdir().unwrap();
    let output = lumiqr(&["inspect", "--json", "mailto:ana@lumi.mx?subject=Hola"], home.path()).await;
    let value = stdout_json(&output);

    assert_eq!(value["content_type"], "EMAIL");
    assert_eq!(value["fields"][0]["label"], "Para");
    assert_eq!(value["fields"][0]["value"], "ana@lumi.mx");
    assert_eq!(value["actions"][0]["kind"], "send_email");
}

#[tokio::test]
async fn render_then_scan_a_file() {
    let home = tempfile::tempdir().unwrap();
    let spec = home.path().join("spec.json");
    let png = home.path().join("code.png");
    std::fs::write(
        &spec,
        r##"{"contenido":{"tipo":"geolocalizacion","data":{"latitud":19.4326,"longitud":-99.1332}},"estilo":"redondeado"}"##,
    )
    .unwrap();

    let rendered = lumiqr(
        &["render", spec.to_str().unwrap(), "-o", png.to_str().unwrap()],
        home.path(),
    )
    .await;
    assert!(rendered.status.success(), "{}", String::from_utf8_lossy(&rendered.stderr));
    assert!(png.exists());

    let scanned = lumiqr(&["scan", png.to_str().unwrap(), "--json"], home.path()).await;
    let value = stdout_json(&scanned);
    assert_eq!(value["barcodes"][0]["raw_value"], "geo:19.4326,-99.1332");
    assert_eq!(value["barcodes"][0]["value_type"], "GEO");
    assert_eq!(value["display"]["actions"][0]["kind"], "view_map");
}

#[tokio::test]
async fn scanning_an_image_without_a_code_fails() {
    let home = tempfile::tempdir().unwrap();
    let blank = home.path().join("blank.png");
    image::GrayImage::from_pixel(40, 40, image::Luma([255]))
        .save(&blank)
        .unwrap();

    let output = lumiqr(&["scan", blank.to_str().unwrap()], home.path()).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No barcode recognized"));
}

#[tokio::test]
async fn generate_through_the_binary() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": WIFI_SPEC }] } }]
        })))
        .mount(&server)
        .await;

    let png = home.path().join("wifi.png");
    let uri = server.uri();
    let output = lumiqr(
        &[
            "--base-url",
            &uri,
            "--api-key",
            API_KEY,
            "generate",
            "wifi Net clave pass",
            "-o",
            png.to_str().unwrap(),
        ],
        home.path(),
    )
    .await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("WIFI:T:WPA;S:Net;P:pass;;"));
    assert!(stdout.contains("QR saved successfully"));
    assert!(png.exists());
}

#[tokio::test]
async fn config_key_lifecycle() {
    let home = tempfile::tempdir().unwrap();

    let set = lumiqr(&["config", "set-key", "AIzaSyExample1234"], home.path()).await;
    assert!(set.status.success());
    let stored = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(stored.contains("AIzaSyExample1234"));

    let show = lumiqr(&["config", "show"], home.path()).await;
    let shown = String::from_utf8_lossy(&show.stdout);
    assert!(shown.contains("AIza…1234"));
    assert!(!shown.contains("AIzaSyExample1234"));

    let clear = lumiqr(&["config", "clear-key"], home.path()).await;
    assert!(clear.status.success());
    let show = lumiqr(&["config", "show"], home.path()).await;
    assert!(String::from_utf8_lossy(&show.stdout).contains("(not set)"));
}
