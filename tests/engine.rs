mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use rubriq::engine::{Engine, EngineConfig, EngineError, JobOutcome, JobRecord, NodeRegistry};
use rubriq::graph::GraphBuilder;
use rubriq::progress::JobEvent;
use rubriq::scoring::Verdict;
use rubriq::types::{JobId, JobStatus};

use common::{
    review_input, review_rubric, AwaitCancelNode, FailingNode, ScoreNode, TechniqueNode,
};

/// Drain the event stream until the terminal event, then fetch the record.
async fn run_to_completion(engine: &Engine, job: JobId) -> JobRecord {
    let events = engine.subscribe(job).expect("job exists");
    while let Ok(event) = events.recv_async().await {
        if matches!(event, JobEvent::Closed { .. }) {
            break;
        }
    }
    match engine.result(job).expect("job exists") {
        JobOutcome::Finished(record) => record,
        JobOutcome::InProgress(record) => {
            panic!("job closed its stream but is not terminal: {record:?}")
        }
    }
}

fn scoring_registry() -> NodeRegistry {
    NodeRegistry::new()
        .bind("naming", Arc::new(ScoreNode::new("naming", "readability", 8.0, 10.0)))
        .bind("structure", Arc::new(ScoreNode::new("structure", "design", 9.0, 10.0)))
        .bind("tests", Arc::new(ScoreNode::new("tests", "design", 4.0, 5.0)))
}

fn scoring_graph() -> GraphBuilder {
    GraphBuilder::new()
        .define("naming", Vec::<&str>::new())
        .define("structure", Vec::<&str>::new())
        .define("tests", ["naming", "structure"])
}

#[tokio::test]
async fn full_job_completes_with_a_passing_report() {
    let config = EngineConfig::default().with_rubric(review_rubric());
    let engine = Engine::new(config, scoring_registry());

    let job = engine.submit(scoring_graph(), review_input()).unwrap();
    let record = run_to_completion(&engine, job).await;

    assert_eq!(record.status, JobStatus::Completed);
    assert!(record.errors.is_empty());

    let report = record.report.expect("terminal job has a report");
    assert_eq!(report.verdict, Verdict::Pass);
    assert!((report.coverage - 1.0).abs() < 1e-9);
    // (8 + 9 + 4) / 25 at full confidence.
    assert!((report.normalized - 84.0).abs() < 1e-9);
    assert_eq!(report.rollups.len(), 2);
}

#[tokio::test]
async fn one_failing_node_degrades_instead_of_aborting() {
    let registry = scoring_registry().bind("security", Arc::new(FailingNode));
    let config = EngineConfig::default().with_rubric(review_rubric());
    let engine = Engine::new(config, registry);

    let graph = scoring_graph().define("security", Vec::<&str>::new());
    let job = engine.submit(graph, review_input()).unwrap();
    let record = run_to_completion(&engine, job).await;

    assert_eq!(record.status, JobStatus::PartiallyFailed);
    assert_eq!(record.errors.len(), 1);

    // Scores from the healthy siblings still made it into the report.
    let report = record.report.expect("partially failed jobs are scored");
    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
async fn finalize_node_failure_fails_the_job() {
    let registry = NodeRegistry::new()
        .bind("naming", Arc::new(ScoreNode::new("naming", "readability", 8.0, 10.0)))
        .bind("report", Arc::new(FailingNode));
    let config = EngineConfig::default()
        .with_rubric(review_rubric())
        .with_finalize_node("report");
    let engine = Engine::new(config, registry);

    let graph = GraphBuilder::new()
        .define("naming", Vec::<&str>::new())
        .define("report", ["naming"]);
    let job = engine.submit(graph, review_input()).unwrap();
    let record = run_to_completion(&engine, job).await;

    assert_eq!(record.status, JobStatus::Failed);
}

#[tokio::test]
async fn cancellation_skips_undispatched_layers() {
    let registry = NodeRegistry::new()
        .bind("fast", Arc::new(ScoreNode::new("naming", "readability", 8.0, 10.0)))
        .bind("blocked", Arc::new(AwaitCancelNode))
        .bind("never", Arc::new(TechniqueNode::new("never")));
    let config = EngineConfig::default().with_rubric(review_rubric());
    let engine = Engine::new(config, registry);

    let graph = GraphBuilder::new()
        .define("fast", Vec::<&str>::new())
        .define("blocked", ["fast"])
        .define("never", ["blocked"]);
    let job = engine.submit(graph, json!({})).unwrap();

    let events = engine.subscribe(job).unwrap();
    let mut saw_skip = false;
    let mut status = None;
    while let Ok(event) = events.recv_async().await {
        match event {
            JobEvent::NodeCompleted { ref node, .. } if node.as_str() == "fast" => {
                engine.cancel(job).unwrap();
            }
            JobEvent::NodeSkipped { ref node, .. } => {
                assert_eq!(node.as_str(), "never");
                saw_skip = true;
            }
            JobEvent::Closed { status: s, .. } => {
                status = Some(s);
                break;
            }
            _ => {}
        }
    }

    assert!(saw_skip, "the undispatched layer should be skipped");
    assert_eq!(status, Some(JobStatus::Cancelled));

    let JobOutcome::Finished(record) = engine.result(job).unwrap() else {
        panic!("cancelled job should be terminal");
    };
    assert_eq!(record.status, JobStatus::Cancelled);

    // The layer that ran before cancellation stays visible in the report;
    // one scored item out of three gates the verdict to Incomplete.
    let report = record.report.as_ref().expect("cancelled jobs are scored");
    assert_eq!(report.verdict, Verdict::Incomplete);
    assert!((report.coverage - 1.0 / 3.0).abs() < 1e-9);
    let readability = report
        .rollups
        .iter()
        .find(|r| r.category == "readability")
        .expect("scored category present");
    assert!((readability.score - 8.0).abs() < 1e-9);
    assert_eq!(readability.evaluated, 1);

    use rubriq::types::{NodeId, NodeStatus};
    assert_eq!(
        record.node_statuses[&NodeId::from("never")],
        NodeStatus::Skipped
    );
    assert_eq!(
        record.node_statuses[&NodeId::from("fast")],
        NodeStatus::Completed
    );
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_fails_the_job() {
    let registry = NodeRegistry::new()
        .bind("stuck", Arc::new(common::SlowNode { name: "stuck", delay_ms: 60_000 }));
    let config = EngineConfig::default().with_job_deadline(Duration::from_secs(5));
    let engine = Engine::new(config, registry);

    let graph = GraphBuilder::new().define("stuck", Vec::<&str>::new());
    let job = engine.submit(graph, json!({})).unwrap();
    let record = run_to_completion(&engine, job).await;

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record
        .errors
        .iter()
        .any(|e| e.fault.message.contains("deadline")));
}

#[tokio::test]
async fn unbound_node_ids_are_rejected_at_submission() {
    let engine = Engine::new(EngineConfig::default(), NodeRegistry::new());
    let graph = GraphBuilder::new()
        .define("ghost", Vec::<&str>::new())
        .define("phantom", Vec::<&str>::new());

    let err = engine.submit(graph, json!({})).unwrap_err();
    match err {
        EngineError::UnboundNodes { missing } => {
            let ids: Vec<&str> = missing.iter().map(|n| n.as_str()).collect();
            assert_eq!(ids, ["ghost", "phantom"]);
        }
        other => panic!("expected UnboundNodes, got {other:?}"),
    }
}

#[tokio::test]
async fn cycle_errors_surface_through_submit() {
    let engine = Engine::new(
        EngineConfig::default(),
        NodeRegistry::new().bind("a", Arc::new(TechniqueNode::new("a"))),
    );
    let graph = GraphBuilder::new().define("a", ["a"]);
    assert!(matches!(
        engine.submit(graph, json!({})),
        Err(EngineError::Graph(_))
    ));
}

#[tokio::test]
async fn unknown_jobs_are_distinguished_from_in_progress() {
    let engine = Engine::new(EngineConfig::default(), NodeRegistry::new());
    let missing = JobId::new();
    assert!(matches!(
        engine.result(missing),
        Err(EngineError::UnknownJob { .. })
    ));
    assert!(matches!(
        engine.cancel(missing),
        Err(EngineError::UnknownJob { .. })
    ));
}

#[tokio::test]
async fn later_layers_observe_earlier_merges() {
    let registry = NodeRegistry::new()
        .bind("lint", Arc::new(TechniqueNode::new("lint")))
        .bind("inspect", Arc::new(common::InspectNode));
    let config = EngineConfig::default();
    let engine = Engine::new(config, registry);

    let graph = GraphBuilder::new()
        .define("lint", Vec::<&str>::new())
        .define("inspect", ["lint"]);
    let job = engine.submit(graph, json!({})).unwrap();
    let record = run_to_completion(&engine, job).await;

    assert_eq!(record.status, JobStatus::Completed);
}
