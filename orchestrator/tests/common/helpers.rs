//! Test helpers and builder patterns for orchestrator tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::task::JoinHandle;

use ::orchestrator::traits::{MockProcessManager, MockWorkerClient};
use ::orchestrator::*;
use shared::{FailureFlags, FailureKind, InjectRequest, InjectResponse, WorkerSpec};

use super::fixtures::TestFixtures;

/// Builder for orchestrators wired to mocks
pub struct OrchestratorBuilder {
    client: MockWorkerClient,
    process_manager: MockProcessManager,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Mocks without expectations and zero delays
    pub fn new() -> Self {
        Self {
            client: MockWorkerClient::new(),
            process_manager: MockProcessManager::new(),
            config: OrchestratorConfig::immediate(),
        }
    }

    /// Configure the worker client mock with a setup function
    pub fn with_client<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockWorkerClient),
    {
        setup(&mut self.client);
        self
    }

    pub fn with_process_manager(mut self, process_manager: MockProcessManager) -> Self {
        self.process_manager = process_manager;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Orchestrator<MockWorkerClient, MockProcessManager> {
        Orchestrator::new(self.client, self.process_manager, self.config)
    }

    /// Build and start the standard fleet
    pub async fn started(self) -> Orchestrator<MockWorkerClient, MockProcessManager> {
        let mut orchestrator = self.build();
        orchestrator
            .start_all(&TestFixtures::specs())
            .await
            .expect("fleet starts");
        orchestrator
    }
}

/// Common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Process manager that spawns everything, reports nothing and expects
    /// `stop_calls` teardowns
    pub fn process_manager(stop_calls: usize) -> MockProcessManager {
        let mut process_manager = MockProcessManager::new();
        process_manager
            .expect_spawn_worker()
            .returning(|spec| Ok(TestFixtures::info_for(spec)))
            .times(0..);
        process_manager.expect_reap_exited().returning(Vec::new).times(0..);
        process_manager.expect_process_status().returning(Vec::new).times(0..);
        process_manager
            .expect_stop_all()
            .returning(|_| StopSummary {
                terminated: 3,
                ..StopSummary::default()
            })
            .times(stop_calls);
        process_manager
    }

    /// Orchestrator with a started standard fleet and the given client
    pub async fn fleet_with_client<F>(setup: F) -> Orchestrator<MockWorkerClient, MockProcessManager>
    where
        F: FnOnce(&mut MockWorkerClient),
    {
        OrchestratorBuilder::new()
            .with_process_manager(Self::process_manager(1))
            .with_client(setup)
            .started()
            .await
    }

    /// Feed `script` to the command loop as operator input
    pub async fn run_script(
        orchestrator: &Orchestrator<MockWorkerClient, MockProcessManager>,
        script: &str,
    ) -> StopSummary {
        tokio::time::timeout(Duration::from_secs(5), orchestrator.run(script.as_bytes()))
            .await
            .expect("command loop finishes")
            .expect("command loop succeeds")
    }

    pub fn worker(name: &str, port: u16) -> WorkerInfo {
        TestFixtures::info_for(&WorkerSpec::new(name, port))
    }
}

/// How a fake worker answers
#[derive(Clone, Copy)]
enum FakeMode {
    Healthy,
    Status(StatusCode),
    Stalled(Duration),
}

#[derive(Clone)]
struct FakeState {
    name: String,
    flags: Arc<Mutex<FailureFlags>>,
    hits: Arc<AtomicUsize>,
    mode: FakeMode,
}

/// In-process HTTP server speaking the worker control-plane protocol
pub struct FakeWorker {
    pub port: u16,
    name: String,
    flags: Arc<Mutex<FailureFlags>>,
    hits: Arc<AtomicUsize>,
    server: JoinHandle<()>,
}

impl FakeWorker {
    /// Behaves like a real worker
    pub async fn start(name: &str) -> Self {
        Self::spawn(name, FakeMode::Healthy).await
    }

    /// Answers every request with `status`
    pub async fn failing(name: &str, status: StatusCode) -> Self {
        Self::spawn(name, FakeMode::Status(status)).await
    }

    /// Waits `delay` before answering
    pub async fn stalled(name: &str, delay: Duration) -> Self {
        Self::spawn(name, FakeMode::Stalled(delay)).await
    }

    async fn spawn(name: &str, mode: FakeMode) -> Self {
        let state = FakeState {
            name: name.to_string(),
            flags: Arc::new(Mutex::new(FailureFlags::default())),
            hits: Arc::new(AtomicUsize::new(0)),
            mode,
        };

        let router = Router::new()
            .route("/health", get(fake_health))
            .route("/inject-failure", post(fake_inject))
            .route("/clear-failures", post(fake_clear))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            port,
            name: state.name,
            flags: state.flags,
            hits: state.hits,
            server,
        }
    }

    pub fn spec(&self) -> WorkerSpec {
        WorkerSpec::new(self.name.clone(), self.port)
    }

    pub fn flags(&self) -> FailureFlags {
        *self.flags.lock().unwrap()
    }

    pub fn set_flag(&self, kind: FailureKind) {
        let mut flags = self.flags.lock().unwrap();
        *flags = flags.with(kind);
    }

    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeWorker {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Process manager that "spawns" the given fake workers
pub fn process_manager_for(fakes: &[&FakeWorker], stop_calls: usize) -> MockProcessManager {
    let ports: Vec<(String, u16)> = fakes.iter().map(|f| (f.name.clone(), f.port)).collect();
    let mut process_manager = MockProcessManager::new();
    process_manager
        .expect_spawn_worker()
        .returning(move |spec| {
            assert!(ports.contains(&(spec.name.clone(), spec.port)), "unexpected spawn of {spec}");
            Ok(TestFixtures::info_for(spec))
        })
        .times(0..);
    process_manager.expect_reap_exited().returning(Vec::new).times(0..);
    process_manager.expect_process_status().returning(Vec::new).times(0..);
    process_manager
        .expect_stop_all()
        .returning(|_| StopSummary::default())
        .times(stop_calls);
    process_manager
}

async fn gate(state: &FakeState) -> Option<Response> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    match state.mode {
        FakeMode::Healthy => None,
        FakeMode::Status(status) => Some(status.into_response()),
        FakeMode::Stalled(delay) => {
            tokio::time::sleep(delay).await;
            None
        }
    }
}

async fn fake_health(State(state): State<FakeState>) -> Response {
    if let Some(response) = gate(&state).await {
        return response;
    }
    let flags = *state.flags.lock().unwrap();
    Json(TestFixtures::health(&state.name, 9999, flags)).into_response()
}

async fn fake_inject(State(state): State<FakeState>, Json(request): Json<InjectRequest>) -> Response {
    if let Some(response) = gate(&state).await {
        return response;
    }
    match request.kind.parse::<FailureKind>() {
        Ok(kind) => {
            let mut flags = state.flags.lock().unwrap();
            *flags = flags.with(kind);
            Json(TestFixtures::injected(&state.name, kind)).into_response()
        }
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(InjectResponse {
                success: false,
                message: "Invalid failure type".to_string(),
                worker: None,
            }),
        )
            .into_response(),
    }
}

async fn fake_clear(State(state): State<FakeState>) -> Response {
    if let Some(response) = gate(&state).await {
        return response;
    }
    *state.flags.lock().unwrap() = FailureFlags::default();
    Json(TestFixtures::cleared()).into_response()
}
