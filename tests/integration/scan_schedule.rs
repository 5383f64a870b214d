//! Scan scheduling against the mock agent on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use fortune::engine::{ScanDriver, ScanScheduler, ScheduleConfig, SchedulerPhase, SystemClock};
use fortune::state::AgentStateStore;
use fortune::types::AgentState;

use crate::mock_agent::MockAgent;

fn driver(agent: &MockAgent, store: Arc<AgentStateStore>) -> Arc<ScanDriver<SystemClock>> {
    Arc::new(ScanDriver::new(
        ScanScheduler::new(SystemClock, ScheduleConfig::default()),
        Arc::new(agent.clone()),
        store,
        "Scan now",
    ))
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_schedule_over_fifteen_minutes() {
    let agent = MockAgent::new();
    let driver = driver(&agent, Arc::new(AgentStateStore::new()));
    let handle = driver.spawn();

    // t = 2s, 5m2s, 10m2s
    tokio::time::sleep(Duration::from_secs(15 * 60)).await;
    settle().await;

    assert_eq!(agent.sent_count(), 3);
    assert!(agent.sent().iter().all(|p| p.prompt == "Scan now"));
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_prompt_carries_current_snapshot() {
    let agent = MockAgent::new();
    let store = Arc::new(AgentStateStore::new());
    store.publish(AgentState {
        last_action: "watching 3 markets".into(),
        ..Default::default()
    });

    let driver = driver(&agent, store);
    let handle = driver.spawn();
    tokio::time::sleep(Duration::from_secs(3)).await;
    settle().await;

    let sent = agent.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].state.last_action, "watching 3 markets");
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_busy_agent_recovers_next_period() {
    let agent = MockAgent::new();
    agent.set_busy(true);
    let driver = driver(&agent, Arc::new(AgentStateStore::new()));
    let handle = driver.spawn();

    tokio::time::sleep(Duration::from_secs(3)).await;
    settle().await;
    assert_eq!(agent.sent_count(), 0);
    assert_eq!(driver.status().await.stats.skipped, 1);

    agent.set_busy(false);
    tokio::time::sleep(Duration::from_secs(300)).await;
    settle().await;
    assert_eq!(agent.sent_count(), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_transport_errors_do_not_stop_schedule() {
    let agent = MockAgent::new();
    agent.set_error(Some("connection refused"));
    let driver = driver(&agent, Arc::new(AgentStateStore::new()));
    let handle = driver.spawn();

    tokio::time::sleep(Duration::from_secs(3)).await;
    settle().await;
    let status = driver.status().await;
    assert_eq!(status.stats.failed, 1);
    assert!(status.last_scan.is_none());

    agent.set_error(None);
    tokio::time::sleep(Duration::from_secs(300)).await;
    settle().await;
    assert_eq!(agent.sent_count(), 1);
    assert!(driver.status().await.last_scan.is_some());
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_fires_after_shutdown() {
    let agent = MockAgent::new();
    let driver = driver(&agent, Arc::new(AgentStateStore::new()));
    let handle = driver.spawn();
    settle().await;
    handle.shutdown().await;

    tokio::time::sleep(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(agent.sent_count(), 0);
    assert_eq!(driver.status().await.phase, SchedulerPhase::Stopped);
}
