use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aegis_core::{
    AgentResponse, AgentStatus, AgentTask, Collaborator, CollaboratorError, CycleConfig,
    CyclePhase, CycleVerdict, EscalationHandler, EscalationRequest, ToolCallRecord,
    VerificationCycle, VerifierStage,
};
use async_trait::async_trait;
use serde_json::{json, Value};

type Reply = Result<AgentResponse, CollaboratorError>;

/// Replays queued replies in order, repeating the last one, and records every task.
struct Scripted {
    name: &'static str,
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<AgentTask>>,
    delay: Option<Duration>,
}

impl Scripted {
    fn new(name: &'static str, replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            name,
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            replies: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    fn seen(&self) -> Vec<AgentTask> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Collaborator for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    async fn process(&self, task: &AgentTask) -> Reply {
        self.seen.lock().unwrap().push(task.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut replies = self.replies.lock().unwrap();
        match replies.len() {
            0 => Ok(AgentResponse::success(json!({"from": self.name}))),
            1 => replies[0].clone(),
            _ => replies.pop_front().unwrap(),
        }
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<EscalationRequest>>);

impl EscalationHandler for Recorder {
    fn escalate(&self, request: &EscalationRequest) {
        self.0.lock().unwrap().push(request.clone());
    }
}

fn ok(data: Value) -> Reply {
    Ok(AgentResponse::success(data))
}

fn reject<const N: usize>(errors: [&str; N]) -> Reply {
    Ok(AgentResponse::fail(errors))
}

fn cycle(
    generator: Arc<Scripted>,
    tester: Arc<Scripted>,
    reviewer: Arc<Scripted>,
    max_attempts: u32,
) -> (VerificationCycle, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let cycle = VerificationCycle::new(generator, tester, reviewer)
        .with_config(CycleConfig {
            max_attempts,
            collaborator_timeout_ms: None,
        })
        .with_escalation(recorder.clone());
    (cycle, recorder)
}

fn task() -> AgentTask {
    AgentTask::new("t1", "code", json!({"goal": "calculator page"}))
}

#[tokio::test]
async fn first_attempt_success() {
    let generator = Scripted::new(
        "generator",
        vec![Ok(AgentResponse::success(json!({"files": ["main.py"]}))
            .with_tool_call(ToolCallRecord::new("write_file", json!({"path": "main.py"}))))],
    );
    let tester = Scripted::new(
        "tester",
        vec![Ok(AgentResponse::success(Value::Null)
            .with_tool_call(ToolCallRecord::new("run_tests", json!({}))))],
    );
    let reviewer = Scripted::new("reviewer", vec![]);
    let (cycle, recorder) = cycle(generator.clone(), tester.clone(), reviewer.clone(), 3);

    let outcome = cycle.run(task()).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.summary, "Verification completed in 1 attempt");
    assert_eq!(outcome.response.data, json!({"files": ["main.py"]}));
    assert_eq!(outcome.response.tool_calls.len(), 2);
    assert_eq!(outcome.tool_calls.len(), 2);
    assert!(!outcome.escalated);
    assert!(recorder.0.lock().unwrap().is_empty());

    let phases: Vec<CyclePhase> = outcome.transitions.iter().map(|t| t.to).collect();
    assert_eq!(
        phases,
        vec![
            CyclePhase::Test,
            CyclePhase::Review,
            CyclePhase::Done(CycleVerdict::Success)
        ]
    );

    let test_task = &tester.seen()[0];
    assert_eq!(test_task.id, "t1_test_1");
    assert_eq!(test_task.kind, "test");
    assert_eq!(test_task.payload, json!({"goal": "calculator page"}));
    assert_eq!(test_task.candidate, Some(json!({"files": ["main.py"]})));
    assert_eq!(reviewer.seen()[0].id, "t1_review_1");
}

#[tokio::test]
async fn test_rejection_feeds_next_generation() {
    let generator = Scripted::new("generator", vec![ok(json!("v1")), ok(json!("v2"))]);
    let tester = Scripted::new(
        "tester",
        vec![reject(["2 tests failed"]), ok(Value::Null)],
    );
    let reviewer = Scripted::new("reviewer", vec![]);
    let (cycle, _) = cycle(generator.clone(), tester.clone(), reviewer, 3);

    let outcome = cycle.run(task()).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.response.data, json!("v2"));

    let generations = generator.seen();
    assert_eq!(generations.len(), 2);
    assert!(generations[0].context.is_empty());
    assert_eq!(generations[1].context.previous_output, Some(json!("v1")));
    assert_eq!(generations[1].context.test_feedback, vec!["2 tests failed"]);
    assert_eq!(generations[1].payload, json!({"goal": "calculator page"}));
    assert_eq!(tester.seen()[1].id, "t1_test_2");
}

#[tokio::test]
async fn review_rejection_carries_review_feedback() {
    let generator = Scripted::new("generator", vec![ok(json!("v1")), ok(json!("v2"))]);
    let tester = Scripted::new("tester", vec![]);
    let reviewer = Scripted::new(
        "reviewer",
        vec![reject(["missing input validation"]), ok(Value::Null)],
    );
    let (cycle, _) = cycle(generator.clone(), tester, reviewer, 3);

    let outcome = cycle.run(task()).await;

    assert!(outcome.succeeded());
    let second = &generator.seen()[1];
    assert_eq!(second.context.review_feedback, vec!["missing input validation"]);
    assert!(second.context.test_feedback.is_empty());
    assert_eq!(second.context.previous_output, Some(json!("v1")));
}

#[tokio::test]
async fn exhausted_budget_escalates_with_last_rejection() {
    let generator = Scripted::new("generator", vec![]);
    let tester = Scripted::new("tester", vec![]);
    let reviewer = Scripted::new("reviewer", vec![reject(["insecure eval() call"])]);
    let (cycle, recorder) = cycle(generator.clone(), tester, reviewer.clone(), 2);

    let outcome = cycle.run(task()).await;

    assert!(!outcome.succeeded());
    assert!(outcome.escalated);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.summary, "Verification failed after 2 attempts");
    assert_eq!(outcome.response.status, AgentStatus::Fail);
    assert_eq!(outcome.response.errors, vec!["insecure eval() call"]);
    assert_eq!(generator.seen().len(), 2);
    assert_eq!(reviewer.seen().len(), 2);
    assert_eq!(
        outcome.transitions.last().map(|t| t.to),
        Some(CyclePhase::Done(CycleVerdict::Failure))
    );

    let escalations = recorder.0.lock().unwrap();
    assert_eq!(escalations.len(), 1);
    assert_eq!(escalations[0].task_id, "t1");
    assert_eq!(escalations[0].attempts, 2);
    assert_eq!(escalations[0].failed_phase, CyclePhase::Review);
    assert_eq!(escalations[0].cycle_id, outcome.cycle_id);
}

#[tokio::test]
async fn failing_tests_on_last_attempt_also_escalate() {
    let generator = Scripted::new("generator", vec![]);
    let tester = Scripted::new("tester", vec![reject(["ImportError"])]);
    let reviewer = Scripted::new("reviewer", vec![]);
    let (cycle, recorder) = cycle(generator, tester, reviewer.clone(), 1);

    let outcome = cycle.run(task()).await;

    assert!(outcome.escalated);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.response.errors, vec!["ImportError"]);
    assert!(reviewer.seen().is_empty());
    assert_eq!(recorder.0.lock().unwrap()[0].failed_phase, CyclePhase::Test);
}

#[tokio::test]
async fn collaborator_error_is_a_rejection() {
    let generator = Scripted::new(
        "generator",
        vec![
            Err(CollaboratorError::failed("generator", "provider unavailable")),
            ok(json!("v2")),
        ],
    );
    let tester = Scripted::new("tester", vec![]);
    let reviewer = Scripted::new("reviewer", vec![]);
    let (cycle, _) = cycle(generator.clone(), tester.clone(), reviewer, 3);

    let outcome = cycle.run(task()).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.attempts, 2);
    assert_eq!(tester.seen().len(), 1);
    assert_eq!(
        outcome.transitions[0].to,
        CyclePhase::Generate,
        "generator failure loops straight back"
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_consumes_an_attempt() {
    let generator = Scripted::new("generator", vec![]);
    let tester = Scripted::slow("tester", Duration::from_secs(60));
    let reviewer = Scripted::new("reviewer", vec![]);
    let recorder = Arc::new(Recorder::default());
    let cycle = VerificationCycle::new(generator, tester.clone(), reviewer)
        .with_config(CycleConfig {
            max_attempts: 2,
            collaborator_timeout_ms: Some(100),
        })
        .with_escalation(recorder.clone());

    let outcome = cycle.run(task()).await;

    assert!(outcome.escalated);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(tester.seen().len(), 2);
    assert_eq!(outcome.response.errors, vec!["tester timed out after 100 ms"]);
}

const BROKEN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><script src="app.js"></script></head>
<body>
  <form id="calc">
    <input type="number" id="amount">
    <button type="submit">Go</button>
  </form>
</body>
</html>
"#;

const FIXED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><script src="app.js"></script></head>
<body>
  <form id="calc" onsubmit="return handleSubmit(event)">
    <input type="number" id="amount">
    <button type="submit">Go</button>
  </form>
</body>
</html>
"#;

/// Writes a page and script, fixing them once test feedback arrives.
struct PageWriter {
    root: PathBuf,
    seen: Mutex<Vec<AgentTask>>,
}

#[async_trait]
impl Collaborator for PageWriter {
    fn name(&self) -> &str {
        "page-writer"
    }

    async fn process(&self, task: &AgentTask) -> Reply {
        self.seen.lock().unwrap().push(task.clone());
        let (html, js) = if task.context.test_feedback.is_empty() {
            (BROKEN_PAGE, "export function handleSubmit(event) {\n  return false;\n}\n")
        } else {
            (FIXED_PAGE, "function handleSubmit(event) {\n  event.preventDefault();\n  return false;\n}\n")
        };
        let write = |name: &str, body: &str| {
            std::fs::write(self.root.join(name), body)
                .map_err(|e| CollaboratorError::failed("page-writer", e.to_string()))
        };
        write("index.html", html)?;
        write("app.js", js)?;
        Ok(AgentResponse::success(json!({
            "files": [
                {"path": "index.html", "purpose": "page"},
                {"path": "app.js", "purpose": "behaviour"}
            ]
        })))
    }
}

#[tokio::test]
async fn verifier_stage_drives_the_test_phase() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = Arc::new(PageWriter {
        root: dir.path().to_path_buf(),
        seen: Mutex::new(Vec::new()),
    });
    let reviewer = Scripted::new("reviewer", vec![]);
    let cycle = VerificationCycle::new(
        writer.clone(),
        Arc::new(VerifierStage::new(dir.path())),
        reviewer,
    );

    let outcome = cycle.run(task()).await;

    assert!(outcome.succeeded(), "{:?}", outcome.response.errors);
    assert_eq!(outcome.attempts, 2);

    let second = &writer.seen.lock().unwrap()[1];
    let feedback = &second.context.test_feedback;
    assert!(feedback.iter().any(|f| f.contains("type=\"module\"")), "{feedback:?}");
    assert!(feedback.iter().any(|f| f.contains("Form 'calc'")), "{feedback:?}");
    assert!(feedback.iter().any(|f| f.starts_with("Tip: ")), "{feedback:?}");
}
