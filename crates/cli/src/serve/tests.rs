use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;
use uap_jobs::{JobTrigger, Launcher, ProcessOutput, RoutineCommand, Routines};

use super::{router, AppState};
use crate::config::{CliOverrides, Config, FileConfig};

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::resolve(
            FileConfig::default(),
            CliOverrides {
                base_dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        );
        fs::create_dir_all(&config.state.data_dir).unwrap();
        Self { dir, config }
    }

    fn data(&self, name: &str, content: &str) {
        fs::write(self.config.state.data_dir.join(name), content).unwrap();
    }

    fn backup(&self, name: &str, file_bytes: usize) -> PathBuf {
        let path = self.config.state.backup_dir.join(name);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("archive.tar"), vec![0u8; file_bytes]).unwrap();
        path
    }

    fn with_routines(mut self, routines: Routines) -> Self {
        self.config.routines = routines;
        self
    }

    fn app(&self) -> Router {
        router(Arc::new(AppState::from_config(&self.config)))
    }

    fn app_with(&self, trigger: JobTrigger) -> Router {
        router(Arc::new(AppState::new(&self.config, trigger)))
    }

    fn base(&self) -> &Path {
        self.dir.path()
    }
}

fn shell(script: &str) -> RoutineCommand {
    RoutineCommand::new("sh").arg("-c").arg(script)
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> Value {
    let (status, content_type, body) = send(app, "GET", uri).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    assert_eq!(content_type.as_deref(), Some("application/json"));
    serde_json::from_slice(&body).unwrap()
}

async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let (status, _, body) = send(app, "GET", uri).await;
    (status, String::from_utf8(body).unwrap())
}

#[tokio::test]
async fn api_views_default_without_artifacts() {
    let fixture = Fixture::new();

    let monitoring = get_json(fixture.app(), "/api/monitoring").await;
    assert_eq!(monitoring["summary"]["timestamp"], "Never");
    assert_eq!(monitoring["summary"]["alerts"], 0);
    assert_eq!(monitoring["cpu"], json!([]));

    let security = get_json(fixture.app(), "/api/security").await;
    assert_eq!(security["summary"]["total_issues"], 0);
    assert_eq!(security["issues"], json!([]));

    let backups = get_json(fixture.app(), "/api/backups").await;
    assert_eq!(backups["last_backup"]["location"], "Unknown");
    assert_eq!(backups["last_backup"]["directories"], "None");
    assert_eq!(backups["backups"], json!([]));

    let system = get_json(fixture.app(), "/api/system").await;
    assert_eq!(system["source"], "live");
    assert!(system["hostname"].is_string());
}

#[tokio::test]
async fn api_system_prefers_snapshot() {
    let fixture = Fixture::new();
    fixture.data(
        "system_info.json",
        r#"{"hostname": "snap-host", "kernel": "5.10.0", "os": "Debian", "uptime": "3 days", "disks": 2}"#,
    );

    let system = get_json(fixture.app(), "/api/system").await;
    assert_eq!(system["source"], "snapshot");
    assert_eq!(system["hostname"], "snap-host");
    assert_eq!(system["disks"], 2);
}

#[tokio::test]
async fn api_monitoring_groups_series_and_skips_bad_lines() {
    let fixture = Fixture::new();
    fixture.data(
        "monitoring_data.json",
        "{\"type\": \"cpu\", \"value\": 10}\n\
         {\"type\": \"cpu\", \"value\": 20}\n\
         not json\n\
         {\"type\": \"load\", \"value\": 0.5, \"load1\": 0.5}\n\
         {\"type\": \"cpu\", \"value\": 30}\n",
    );
    fixture.data("monitoring_summary.json", r#"{"timestamp": "2024-05-01 10:00:00", "alerts": 1}"#);

    let view = get_json(fixture.app(), "/api/monitoring").await;
    assert_eq!(view["cpu"].as_array().unwrap().len(), 3);
    assert_eq!(view["current"]["cpu"], 30.0);
    assert_eq!(view["load"][0]["load1"], 0.5);
    assert_eq!(view["summary"]["alerts"], 1);
}

#[tokio::test]
async fn api_backups_newest_first_without_latest() {
    let fixture = Fixture::new();
    fixture.backup("20230101_000000", 10);
    let newest = fixture.backup("20230615_143000", 1536);
    fs::create_dir_all(fixture.config.state.backup_dir.join("latest")).unwrap();
    fs::write(fixture.config.state.backup_dir.join("stray.txt"), "x").unwrap();
    assert!(newest.is_dir());

    let view = get_json(fixture.app(), "/api/backups").await;
    let ids: Vec<&str> = view["backups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["20230615_143000", "20230101_000000"]);
    assert_eq!(view["backups"][0]["date"], "2023-06-15 14:30:00");
    assert_eq!(view["backups"][0]["size"], "1.50 KB");
}

#[tokio::test]
async fn pages_render_fallback_without_templates() {
    let fixture = Fixture::new();
    for (uri, title) in [
        ("/", "Dashboard"),
        ("/index.html", "Dashboard"),
        ("/system", "System Information"),
        ("/monitoring", "Monitoring Data"),
        ("/security", "Security Data"),
        ("/backups", "Backup Data"),
    ] {
        let (status, content_type, body) = send(fixture.app(), "GET", uri).await;
        let html = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(html.contains(&format!("<h2>{title}</h2>")), "{uri}");
        assert!(!html.contains("{{current_time}}"), "{uri}");
    }
}

#[tokio::test]
async fn pages_fill_installed_templates() {
    let fixture = Fixture::new();
    fs::create_dir_all(&fixture.config.template_dir).unwrap();
    fs::write(
        fixture.config.template_dir.join("security.html"),
        "<p>{{total_issues}}/{{high_issues}}</p>{{issues}}<i>{{custom}}</i>",
    )
    .unwrap();
    fixture.data("security_summary.json", r#"{"total_issues": 2, "high_issues": 1}"#);
    fixture.data(
        "security_data.json",
        "{\"severity\": \"HIGH\", \"message\": \"root <login>\", \"timestamp\": \"t\"}\n",
    );

    let (status, html) = get_text(fixture.app(), "/security").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.starts_with("<p>2/1</p><div class=\"issue high\">"));
    assert!(html.contains("root &lt;login&gt;"));
    assert!(html.ends_with("<i>{{custom}}</i>"));
}

#[tokio::test]
async fn static_assets_by_extension() {
    let fixture = Fixture::new();
    let static_dir = &fixture.config.static_dir;
    fs::create_dir_all(static_dir.join("img")).unwrap();
    fs::write(static_dir.join("site.css"), "body {}").unwrap();
    fs::write(static_dir.join("app.js"), "1;").unwrap();
    fs::write(static_dir.join("img").join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(static_dir.join("notes.md"), "# hi").unwrap();
    fs::write(fixture.base().join("secret.txt"), "secret").unwrap();

    for (uri, expected) in [
        ("/static/site.css", "text/css"),
        ("/static/app.js", "application/javascript"),
        ("/static/img/logo.png", "image/png"),
        ("/static/notes.md", "text/plain"),
    ] {
        let (status, content_type, _) = send(fixture.app(), "GET", uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(content_type.as_deref(), Some(expected), "{uri}");
    }

    let (_, _, body) = send(fixture.app(), "GET", "/static/site.css").await;
    assert_eq!(body, b"body {}");

    for uri in ["/static/missing.css", "/static/../secret.txt", "/static/%2e%2e/secret.txt"] {
        let (status, _, body) = send(fixture.app(), "GET", uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_ne!(body, b"secret");
    }
}

#[tokio::test]
async fn unknown_routes_are_plain_404() {
    let fixture = Fixture::new();
    for (method, uri) in [
        ("GET", "/nonexistent"),
        ("POST", "/nonexistent"),
        ("GET", "/api/run_monitor"),
        ("POST", "/api/system"),
        ("DELETE", "/"),
    ] {
        let (status, content_type, body) = send(fixture.app(), method, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert_eq!(body, b"File not found");
    }
}

#[tokio::test]
async fn failing_routine_is_200_with_captured_stderr() {
    let base = Routines::under(Path::new("/nonexistent"));
    let fixture = Fixture::new().with_routines(Routines {
        monitor: shell("printf boom >&2; exit 1"),
        ..base
    });

    let app = fixture.app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/run_monitor")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("ignored=1"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        result,
        json!({
            "success": false,
            "message": "Monitoring failed",
            "output": "",
            "error": "boom"
        })
    );
}

#[tokio::test]
async fn successful_routine_reports_output() {
    let base = Routines::under(Path::new("/nonexistent"));
    let fixture = Fixture::new().with_routines(Routines {
        backup: shell("echo done"),
        ..base
    });

    let (status, _, body) = send(fixture.app(), "POST", "/api/run_backup").await;
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["message"], "Backup completed successfully");
    assert_eq!(result["output"], "done\n");
}

#[tokio::test]
async fn unlaunchable_routine_is_500() {
    let fixture = Fixture::new();
    let (status, content_type, body) = send(fixture.app(), "POST", "/api/run_security_scan").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["success"], false);
    assert!(result["message"].as_str().unwrap().contains("scanner.sh"));
}

struct GatedLauncher {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Launcher for GatedLauncher {
    async fn run(&self, _command: &RoutineCommand) -> std::io::Result<ProcessOutput> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(ProcessOutput {
            success: true,
            code: Some(0),
            stdout: b"ok".to_vec(),
            stderr: Vec::new(),
        })
    }
}

#[tokio::test]
async fn concurrent_trigger_is_409() {
    let fixture = Fixture::new();
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let trigger = JobTrigger::with_launcher(
        fixture.config.routines.clone(),
        GatedLauncher {
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        },
    );
    let app = fixture.app_with(trigger);

    let first = tokio::spawn(send(app.clone(), "POST", "/api/run_monitor"));
    started.notified().await;

    let (status, _, body) = send(app.clone(), "POST", "/api/run_monitor").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["success"], false);

    release.notify_one();
    let (status, _, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["output"], "ok");
}
