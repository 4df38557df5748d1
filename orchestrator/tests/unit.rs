//! Unit tests for the orchestrator against mocked services
//!
//! Every test here runs without processes or sockets: the process manager and
//! the worker client are mockall mocks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ::orchestrator::traits::MockProcessManager;
use ::orchestrator::*;
use shared::{FailureFlags, FailureKind, WorkerSpec};

mod common;
use common::{OrchestratorBuilder, TestFixtures, TestHelpers};

/// Test that every spec is spawned in order and recorded in the fleet
#[tokio::test]
async fn test_start_all_spawns_fleet_in_order() {
    // Arrange
    let mut orchestrator = OrchestratorBuilder::new()
        .with_process_manager(TestHelpers::process_manager(0))
        .build();

    // Act
    let fleet = orchestrator.start_all(&TestFixtures::specs()).await.unwrap().to_vec();

    // Assert
    let names: Vec<&str> = fleet.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, [TestFixtures::WORKER_1, TestFixtures::WORKER_2, TestFixtures::WORKER_3]);
    assert_eq!(fleet[1].port, 8002);
    assert_eq!(fleet[1].pid, TestFixtures::BASE_PID + 2);
}

/// Test that a single failed spawn is skipped
#[tokio::test]
async fn test_start_all_skips_failed_spawn() {
    // Arrange
    let mut process_manager = MockProcessManager::new();
    process_manager.expect_spawn_worker().times(3).returning(|spec| {
        if spec.name == TestFixtures::WORKER_2 {
            Err(OrchestratorError::spawn(&spec.name, "no such file"))
        } else {
            Ok(TestFixtures::info_for(spec))
        }
    });
    let mut orchestrator = OrchestratorBuilder::new().with_process_manager(process_manager).build();

    // Act
    let fleet = orchestrator.start_all(&TestFixtures::specs()).await.unwrap().to_vec();

    // Assert
    assert_eq!(fleet.len(), 2);
    assert!(fleet.iter().all(|w| w.name != TestFixtures::WORKER_2));
}

/// Test that a fleet with no surviving spawn is an error
#[tokio::test]
async fn test_start_all_fails_when_nothing_spawns() {
    // Arrange
    let mut process_manager = MockProcessManager::new();
    process_manager
        .expect_spawn_worker()
        .times(3)
        .returning(|spec| Err(OrchestratorError::spawn(&spec.name, "permission denied")));
    let mut orchestrator = OrchestratorBuilder::new().with_process_manager(process_manager).build();

    // Act
    let result = orchestrator.start_all(&TestFixtures::specs()).await;

    // Assert
    assert!(matches!(result, Err(OrchestratorError::WorkerSpawnFailed { .. })));
    assert!(orchestrator.fleet().is_empty());
}

/// Test that inconsistent specs are rejected before anything is spawned
#[tokio::test]
async fn test_start_all_rejects_duplicates() {
    let cases = [
        vec![TestFixtures::spec("worker1", 8001), TestFixtures::spec("worker1", 8002)],
        vec![TestFixtures::spec("worker1", 8001), TestFixtures::spec("worker2", 8001)],
        vec![],
    ];

    for specs in cases {
        // Arrange
        let mut process_manager = MockProcessManager::new();
        process_manager.expect_spawn_worker().times(0);
        let mut orchestrator = OrchestratorBuilder::new().with_process_manager(process_manager).build();

        // Act
        let result = orchestrator.start_all(&specs).await;

        // Assert
        assert!(
            matches!(result, Err(OrchestratorError::ConfigurationError { .. })),
            "specs {specs:?} should be rejected"
        );
    }
}

/// Test health classification for every kind of outcome
#[tokio::test]
async fn test_check_health_classifies_each_worker() {
    // Arrange
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        client.expect_health().times(3).returning(|worker| match worker.name.as_str() {
            "worker1" => Ok(TestFixtures::health(&worker.name, 11, FailureFlags::default())),
            "worker2" => Ok(TestFixtures::health(
                &worker.name,
                12,
                FailureFlags::default().with(FailureKind::CpuSpike),
            )),
            _ => Err(OrchestratorError::WorkerUnreachable {
                name: worker.name.clone(),
                reason: "connection refused".to_string(),
            }),
        });
    })
    .await;

    // Act
    let health = orchestrator.check_health().await;

    // Assert
    assert_eq!(health.len(), 3);
    assert_eq!(health[0].class, HealthClass::Healthy);
    assert_eq!(health[0].pid, Some(11));
    assert_eq!(health[1].class, HealthClass::Degraded(vec![FailureKind::CpuSpike]));
    assert_eq!(health[2].class, HealthClass::Unresponsive("connection refused".to_string()));
    assert_eq!(health[2].pid, None);

    orchestrator.stop_all().await;
}

/// Test that a non-success status is reported as an error class
#[tokio::test]
async fn test_check_health_reports_http_errors() {
    // Arrange
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        client.expect_health().returning(|worker| {
            Err(OrchestratorError::WorkerRejected {
                name: worker.name.clone(),
                status: 500,
            })
        });
    })
    .await;

    // Act
    let health = orchestrator.check_health().await;

    // Assert
    assert!(health.iter().all(|h| h.class == HealthClass::Error(500)));
    orchestrator.stop_all().await;
}

/// Test that an unknown worker name never reaches the network
#[tokio::test]
async fn test_unknown_worker_makes_no_call() {
    // Arrange
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        client.expect_inject_failure().times(0);
        client.expect_clear_failures().times(0);
    })
    .await;

    // Act
    let inject = orchestrator.inject_failure("worker9", FailureKind::Crash).await;
    let clear = orchestrator.clear_failures("worker9").await;

    // Assert
    assert!(matches!(inject, Err(OrchestratorError::UnknownWorker { ref name }) if name == "worker9"));
    assert!(matches!(clear, Err(OrchestratorError::UnknownWorker { .. })));
    orchestrator.stop_all().await;
}

/// Test that inject is routed to the named worker with the given kind
#[tokio::test]
async fn test_inject_routes_to_named_worker() {
    // Arrange
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        client
            .expect_inject_failure()
            .withf(|worker, kind| worker.name == "worker2" && worker.port == 8002 && *kind == FailureKind::MemoryLeak)
            .times(1)
            .returning(|worker, kind| Ok(TestFixtures::injected(&worker.name, kind)));
    })
    .await;

    // Act
    let response = orchestrator.inject_failure("worker2", FailureKind::MemoryLeak).await.unwrap();

    // Assert
    assert!(response.success);
    assert_eq!(response.worker.as_deref(), Some("worker2"));
    orchestrator.stop_all().await;
}

/// Test that teardown happens exactly once however often it is requested
#[tokio::test]
async fn test_stop_all_runs_once() {
    // Arrange
    let orchestrator = OrchestratorBuilder::new()
        .with_process_manager(TestHelpers::process_manager(1))
        .started()
        .await;

    // Act
    let (first, second) = tokio::join!(orchestrator.stop_all(), orchestrator.stop_all());
    let third = orchestrator.stop_all().await;

    // Assert
    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(first.terminated, 3);
    assert!(orchestrator.shutdown_trigger().is_triggered());
}

/// Test the command loop against a scripted session
#[tokio::test]
async fn test_run_executes_script_and_stops_once() {
    // Arrange
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        client
            .expect_inject_failure()
            .withf(|worker, kind| worker.name == "worker1" && *kind == FailureKind::CpuSpike)
            .times(1)
            .returning(|worker, kind| Ok(TestFixtures::injected(&worker.name, kind)));
        client
            .expect_clear_failures()
            .withf(|worker| worker.name == "worker1")
            .times(1)
            .returning(|_| Ok(TestFixtures::cleared()));
        client
            .expect_health()
            .times(3)
            .returning(|worker| Ok(TestFixtures::health(&worker.name, 1, FailureFlags::default())));
    })
    .await;

    let script = "\n\
        help\n\
        inject worker1 cpu_spike\n\
        inject worker1 bogus\n\
        inject worker9 crash\n\
        launch rockets\n\
        health\n\
        status\n\
        clear worker1\n\
        quit\n\
        inject worker2 crash\n";

    // Act
    let summary = TestHelpers::run_script(&orchestrator, script).await;

    // Assert - the line after quit is never executed
    assert_eq!(summary.terminated, 3);
}

/// Test that end of input behaves like quit
#[tokio::test]
async fn test_run_treats_eof_as_quit() {
    // Arrange
    let orchestrator = OrchestratorBuilder::new()
        .with_process_manager(TestHelpers::process_manager(1))
        .started()
        .await;

    // Act
    let summary = TestHelpers::run_script(&orchestrator, "").await;

    // Assert
    assert_eq!(summary.total(), 3);
    orchestrator.stop_all().await;
}

/// Test that the shutdown trigger ends a loop blocked on input
#[tokio::test]
async fn test_shutdown_trigger_interrupts_run() {
    // Arrange
    let orchestrator = OrchestratorBuilder::new()
        .with_process_manager(TestHelpers::process_manager(1))
        .started()
        .await;
    let (_operator, input) = tokio::io::duplex(64);
    let trigger = orchestrator.shutdown_trigger();

    // Act
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });
    let result = tokio::time::timeout(
        Duration::from_secs(2),
        orchestrator.run(tokio::io::BufReader::new(input)),
    )
    .await;

    // Assert
    let summary = result.expect("loop ends on shutdown").unwrap();
    assert_eq!(summary.terminated, 3);
}

/// Test that the liveness monitor polls until teardown and then stops
#[tokio::test]
async fn test_liveness_monitor_stops_before_teardown() {
    // Arrange
    let polls = Arc::new(AtomicUsize::new(0));
    let mut process_manager = MockProcessManager::new();
    process_manager
        .expect_spawn_worker()
        .returning(|spec| Ok(TestFixtures::info_for(spec)));
    {
        let polls = polls.clone();
        process_manager.expect_reap_exited().returning(move || {
            polls.fetch_add(1, Ordering::SeqCst);
            vec![ExitedWorker {
                name: "worker3".to_string(),
                pid: 4003,
                code: Some(1),
            }]
        });
    }
    process_manager
        .expect_stop_all()
        .times(1)
        .returning(|_| StopSummary::default());

    let orchestrator = OrchestratorBuilder::new()
        .with_process_manager(process_manager)
        .with_config(OrchestratorConfig::immediate().with_liveness_interval(Duration::from_millis(10)))
        .started()
        .await;

    // Act
    orchestrator.spawn_liveness_monitor();
    orchestrator.spawn_liveness_monitor();
    tokio::time::sleep(Duration::from_millis(100)).await;
    orchestrator.stop_all().await;
    let after_stop = polls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Assert
    assert!(after_stop >= 2, "monitor polled {after_stop} times");
    assert_eq!(polls.load(Ordering::SeqCst), after_stop);
}

/// Test the scripted demo walks one failure kind per worker
#[tokio::test]
async fn test_demo_injects_one_kind_per_worker() {
    // Arrange
    let expected = [
        ("worker1", FailureKind::CpuSpike),
        ("worker2", FailureKind::MemoryLeak),
        ("worker3", FailureKind::IoHeavy),
    ];
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        for (name, expected_kind) in expected {
            client
                .expect_inject_failure()
                .withf(move |worker, kind| worker.name == name && *kind == expected_kind)
                .times(1)
                .returning(|worker, kind| Ok(TestFixtures::injected(&worker.name, kind)));
        }
        client
            .expect_health()
            .times(12)
            .returning(|worker| Ok(TestFixtures::health(&worker.name, 1, FailureFlags::default())));
    })
    .await;

    // Act
    let summary = orchestrator.run_demo().await;

    // Assert
    assert_eq!(summary.terminated, 3);
}

/// Test that a smaller fleet runs fewer demo scenarios
#[tokio::test]
async fn test_demo_with_single_worker() {
    // Arrange
    let mut orchestrator = OrchestratorBuilder::new()
        .with_process_manager(TestHelpers::process_manager(1))
        .with_client(|client| {
            client
                .expect_inject_failure()
                .times(1)
                .returning(|worker, kind| Ok(TestFixtures::injected(&worker.name, kind)));
            client
                .expect_health()
                .times(2)
                .returning(|_| Err(OrchestratorError::WorkerRejected { name: "worker1".into(), status: 503 }));
        })
        .build();
    orchestrator
        .start_all(&[WorkerSpec::new("worker1", 8001)])
        .await
        .unwrap();

    // Act
    let summary = orchestrator.run_demo().await;

    // Assert
    assert_eq!(summary.terminated, 3);
}

/// Test that commands split across reads are reassembled into lines
#[tokio::test]
async fn test_run_reads_fragmented_input() {
    // Arrange
    let orchestrator = TestHelpers::fleet_with_client(|client| {
        client
            .expect_clear_failures()
            .withf(|worker| worker.name == "worker3")
            .times(1)
            .returning(|_| Ok(TestFixtures::cleared()));
    })
    .await;
    let input = tokio_test::io::Builder::new()
        .read(b"cle")
        .read(b"ar worker3\nqu")
        .read(b"it\n")
        .build();

    // Act
    let summary = orchestrator.run(tokio::io::BufReader::new(input)).await.unwrap();

    // Assert
    assert_eq!(summary.terminated, 3);
}
