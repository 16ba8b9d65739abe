use std::fs;
use std::path::Path;
use std::sync::{mpsc, Mutex};

use anyhow::Result;
use axum::extract::State;
use axum::Json;
use lexrag_cli::bootstrap::{build_engine, build_service_with, index_corpus};
use lexrag_cli::server::{ask_json, ApiError, AskRequest, QueryWorker};
use lexrag_core::config::{Config, Settings};
use lexrag_core::{GenerationParams, Generator, RetrievalParams};
use tempfile::TempDir;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

struct EchoGenerator;

impl Generator for EchoGenerator {
    fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        Ok(format!("{prompt}可能构成盗窃罪。"))
    }
}

/// Echoes like [`EchoGenerator`], but announces each call and then blocks
/// until the test releases it.
struct GatedGenerator {
    started: UnboundedSender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl Generator for GatedGenerator {
    fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        let _ = self.started.send(());
        self.release.lock().expect("lock").recv()?;
        Ok(format!("{prompt}可能构成盗窃罪。"))
    }
}

const CATALOG: &str = "../reference_book/刑法.txt\t盗窃公私财物数额较大的处三年以下有期徒刑\n\
../reference_book/刑法.txt\t故意伤害他人身体的处三年以下有期徒刑\n\
../reference_book/民法典.txt\t自然人的民事权利能力一律平等\n";

fn settings_in(dir: &Path, backend: &str) -> Settings {
    let toml = format!(
        "[paths]\ncatalog = \"entries.txt\"\nindex_dir = \"lancedb\"\n\n\
         [index]\nbackend = \"{backend}\"\n\n\
         [embedding]\nfake = true\n\n\
         [catalog]\nstrip_source_prefix = \"../reference_book/\"\n"
    );
    fs::write(dir.join("config.toml"), toml).expect("write config");
    Config::load_from(dir)
        .expect("config")
        .settings()
        .expect("settings")
}

#[test]
fn memory_backend_answers_from_catalog() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("entries.txt"), CATALOG).expect("write catalog");
    let settings = settings_in(tmp.path(), "memory");
    assert_eq!(settings.paths.catalog, tmp.path().join("entries.txt"));

    let engine = build_engine(&settings).expect("engine");
    assert_eq!(engine.catalog().len(), 3);
    let out = engine
        .retrieve("自然人的民事权利能力一律平等", &RetrievalParams::default())
        .expect("retrieve");
    assert_eq!(out.results[0].source_id, "民法典.txt");
    assert!(out.results.len() <= 3);
}

#[test]
fn index_from_directory_then_serve_from_lance() {
    let tmp = TempDir::new().expect("tmp");
    let books = tmp.path().join("books");
    fs::create_dir_all(&books).expect("mkdir");
    fs::write(
        books.join("刑法.txt"),
        "盗窃公私财物数额较大的处三年以下有期徒刑\n\n故意杀人的处死刑\n",
    )
    .expect("write");
    fs::write(
        books.join("宪法.txt"),
        "中华人民共和国的一切权力属于人民\n",
    )
    .expect("write");
    let settings = settings_in(tmp.path(), "lance");

    let written = index_corpus(&settings, Some(&books)).expect("index");
    assert_eq!(written, 3);
    assert!(settings.paths.catalog.exists());

    let engine = build_engine(&settings).expect("engine");
    assert_eq!(engine.catalog().len(), 3);
    let out = engine
        .retrieve("故意杀人的处死刑", &RetrievalParams::default())
        .expect("retrieve");
    assert_eq!(out.results[0].text, "故意杀人的处死刑");
    assert!(out.results[0].source_id.ends_with("刑法.txt"));
}

#[test]
fn missing_lance_table_fails_at_startup() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("entries.txt"), CATALOG).expect("write catalog");
    let settings = settings_in(tmp.path(), "lance");
    assert!(build_engine(&settings).is_err());
}

#[tokio::test]
async fn worker_serves_queries_one_at_a_time() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("entries.txt"), CATALOG).expect("write catalog");
    let settings = settings_in(tmp.path(), "memory");
    let service = build_service_with(&settings, Box::new(EchoGenerator)).expect("service");
    let (worker, _handle) = QueryWorker::spawn(service, 4).expect("spawn");

    let response = worker.ask("偷东西会判几年").await.expect("ask");
    assert_eq!(response.answer, "可能构成盗窃罪。");
    assert!(!response.citations.is_empty());

    let request = AskRequest {
        query: "盗窃".into(),
    };
    let Json(body) = ask_json(State(worker.clone()), Json(request))
        .await
        .expect("json ask");
    assert_eq!(body.answer, "可能构成盗窃罪。");

    assert!(matches!(worker.ask("   ").await, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn full_queue_is_refused_as_unavailable() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("entries.txt"), CATALOG).expect("write catalog");
    let settings = settings_in(tmp.path(), "memory");
    let (started_tx, mut started_rx) = unbounded_channel();
    let (release_tx, release_rx) = mpsc::channel();
    let generator = GatedGenerator {
        started: started_tx,
        release: Mutex::new(release_rx),
    };
    let service = build_service_with(&settings, Box::new(generator)).expect("service");
    let (worker, _handle) = QueryWorker::spawn(service, 1).expect("spawn");

    // The worker takes the first query off the queue and blocks in generation.
    let first = worker.submit("偷东西会判几年").expect("first");
    started_rx.recv().await.expect("worker started");
    // One slot: the second query waits, the third is turned away.
    let second = worker.submit("盗窃").expect("second");
    let third = worker.submit("抢劫");
    assert!(matches!(third, Err(ApiError::ServiceUnavailable)));

    release_tx.send(()).expect("release first");
    release_tx.send(()).expect("release second");
    let first = first.await.expect("reply").expect("answer");
    let second = second.await.expect("reply").expect("answer");
    assert_eq!(first.answer, "可能构成盗窃罪。");
    assert_eq!(second.answer, "可能构成盗窃罪。");
}
