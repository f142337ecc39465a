use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use roscmd::command::CommandDescriptor;
use roscmd::config::{ConnectOptions, MatchMode, RetryPolicy};
use roscmd::error::CommandError;
use roscmd::runner::{BatchRequest, BatchRunner};
use roscmd::translate::StructuredCommand;
use roscmd::transport::api::{ApiCallError, ApiConnection, ApiConnector};
use roscmd::transport::{DeviceTransport, SessionReply, TerminalSession};

const CONVERGES_FIXTURE: &str = include_str!("fixtures/wait_for_converges.jsonl");
const FAILURE_FIXTURE: &str = r#"{"command": "/system identity print", "status": 0, "stdout": "name: router", "stderr": ""}
{"command": "/ip address add address=10.0.0.1/24", "status": 1, "stdout": "", "stderr": "no such item"}
{"command": "/ip route print", "status": 0, "stdout": "unreached", "stderr": ""}
"#;

/// One scripted device round trip.
#[derive(Debug, Clone, Deserialize)]
struct ScriptEntry {
    command: String,
    status: i32,
    stdout: String,
    stderr: String,
}

fn load_script(jsonl: &str) -> VecDeque<ScriptEntry> {
    jsonl
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("fixture line should parse"))
        .collect()
}

/// Terminal session replaying a fixed script, recording every dispatch.
struct ScriptedSession {
    script: VecDeque<ScriptEntry>,
    dispatched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSession {
    fn new(jsonl: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
        let dispatched = Arc::new(Mutex::new(Vec::new()));
        let session = Self {
            script: load_script(jsonl),
            dispatched: dispatched.clone(),
        };
        (session, dispatched)
    }
}

#[async_trait]
impl TerminalSession for ScriptedSession {
    async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
    ) -> Result<SessionReply, CommandError> {
        self.dispatched
            .lock()
            .expect("dispatch log lock")
            .push(descriptor.command.clone());

        let entry = self
            .script
            .pop_front()
            .ok_or_else(|| CommandError::Session("script exhausted".to_string()))?;

        if entry.command != descriptor.command {
            return Err(CommandError::Session(format!(
                "expected `{}`, got `{}`",
                entry.command, descriptor.command
            )));
        }

        Ok(SessionReply {
            status: entry.status,
            stdout: entry.stdout,
            stderr: entry.stderr,
        })
    }
}

fn cli_runner(jsonl: &str) -> (BatchRunner, Arc<Mutex<Vec<String>>>) {
    let (session, dispatched) = ScriptedSession::new(jsonl);
    let runner = BatchRunner::new(DeviceTransport::cli(Box::new(session)));
    (runner, dispatched)
}

fn retry(retries: u32, match_mode: MatchMode) -> RetryPolicy {
    RetryPolicy {
        retries,
        interval: 0,
        match_mode,
    }
}

#[tokio::test]
async fn malformed_command_fails_before_any_dispatch() {
    let (mut runner, dispatched) = cli_runner("");

    let request = BatchRequest::new(vec![
        "/system identity print".into(),
        "ip neighbor print".into(),
    ]);
    let err = runner.run_batch(&request).await.expect_err("must fail");

    assert!(matches!(err, CommandError::MalformedCommand(_)));
    assert!(dispatched.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn no_conditionals_runs_exactly_once_despite_retries() {
    let script = r#"{"command": "/system identity print", "status": 0, "stdout": "name: router", "stderr": ""}"#;
    let (mut runner, dispatched) = cli_runner(script);

    let mut request = BatchRequest::new(vec!["/system identity print".into()]);
    request.retry = retry(10, MatchMode::All);

    let report = runner.run_batch(&request).await.expect("run batch");

    assert_eq!(dispatched.lock().expect("lock").len(), 1);
    assert_eq!(report.stdout, vec![json!("name: router")]);
    assert!(!report.changed);
}

#[tokio::test]
async fn any_mode_stops_after_first_iteration_when_satisfied() {
    let script = r#"{"command": "/system identity print", "status": 0, "stdout": "name: router", "stderr": ""}"#;
    let (mut runner, dispatched) = cli_runner(script);

    let mut request = BatchRequest::new(vec!["/system identity print".into()]);
    request.wait_for = vec![
        "result[0] contains router".to_string(),
        "result[0] contains impossible".to_string(),
    ];
    request.retry = retry(10, MatchMode::Any);

    runner.run_batch(&request).await.expect("run batch");
    assert_eq!(dispatched.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn all_mode_polls_until_every_conditional_holds() {
    let (mut runner, dispatched) = cli_runner(CONVERGES_FIXTURE);

    let mut request = BatchRequest::new(vec!["/ip neighbor print".into()]);
    request.wait_for = vec![
        "result[0] contains INTERFACE".to_string(),
        "result[0] contains ether1".to_string(),
    ];
    request.retry = retry(10, MatchMode::All);

    let report = runner.run_batch(&request).await.expect("run batch");

    // First conditional holds from iteration one; the second appears on the
    // second scripted reply.
    assert_eq!(dispatched.lock().expect("lock").len(), 2);
    let last = report.stdout[0].as_str().expect("text response");
    assert!(last.contains("ether1"));
}

#[tokio::test]
async fn exhaustion_reports_original_conditional_text() {
    let line = r#"{"command": "/ip neighbor print", "status": 0, "stdout": "nothing here", "stderr": ""}"#;
    let script = [line, line, line].join("\n");
    let (mut runner, dispatched) = cli_runner(&script);

    let mut request = BatchRequest::new(vec!["/ip neighbor print".into()]);
    request.wait_for = vec!["result[0] contains ether1".to_string()];
    request.retry = retry(3, MatchMode::All);

    let err = runner.run_batch(&request).await.expect_err("must exhaust");

    assert_eq!(dispatched.lock().expect("lock").len(), 3);
    match err {
        CommandError::UnsatisfiedConditions(failed) => {
            assert_eq!(failed, vec!["result[0] contains ether1"]);
        }
        other => panic!("expected UnsatisfiedConditions, got {other}"),
    }
}

#[tokio::test]
async fn failing_command_aborts_remaining_batch() {
    let (mut runner, dispatched) = cli_runner(FAILURE_FIXTURE);

    let request = BatchRequest::new(vec![
        "/system identity print".into(),
        "/ip address add address=10.0.0.1/24".into(),
        "/ip route print".into(),
    ]);
    let err = runner.run_batch(&request).await.expect_err("must fail");

    match err {
        CommandError::DeviceExecution { command, message } => {
            assert_eq!(command, "/ip address add address=10.0.0.1/24");
            assert_eq!(message, "no such item");
        }
        other => panic!("expected DeviceExecution, got {other}"),
    }
    // The third command is never dispatched.
    assert_eq!(dispatched.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn disabled_error_checking_tolerates_failures() {
    let (mut runner, dispatched) = cli_runner(FAILURE_FIXTURE);

    let mut request = BatchRequest::new(vec![
        "/system identity print".into(),
        "/ip address add address=10.0.0.1/24".into(),
        "/ip route print".into(),
    ]);
    request.check_errors = false;

    let report = runner.run_batch(&request).await.expect("run batch");

    assert_eq!(dispatched.lock().expect("lock").len(), 3);
    assert_eq!(report.stdout.len(), 3);
    assert_eq!(report.stdout[1], json!(""));
}

#[tokio::test]
async fn check_mode_skips_mutating_commands_without_dispatching() {
    let script = r#"{"command": "/ip neighbor print", "status": 0, "stdout": "ok", "stderr": ""}"#;
    let (mut runner, dispatched) = cli_runner(script);

    let mut request = BatchRequest::new(vec![
        "/ip neighbor print".into(),
        "/system identity set name=router".into(),
    ]);
    request.check_mode = true;

    let report = runner.run_batch(&request).await.expect("run batch");

    let dispatched = dispatched.lock().expect("lock");
    assert_eq!(dispatched.as_slice(), ["/ip neighbor print"]);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("/system identity set name=router"));
}

#[tokio::test]
async fn stdout_lines_splits_text_responses() {
    let script = r#"{"command": "/ip neighbor print", "status": 0, "stdout": "line one\nline two", "stderr": ""}"#;
    let (mut runner, _) = cli_runner(script);

    let request = BatchRequest::new(vec!["/ip neighbor print".into()]);
    let report = runner.run_batch(&request).await.expect("run batch");

    assert_eq!(report.stdout_lines, vec![json!(["line one", "line two"])]);
}

/// API connection replaying canned values keyed by command word.
struct CannedApi {
    replies: Vec<(String, Value)>,
}

#[async_trait]
impl ApiConnection for CannedApi {
    async fn call(&mut self, command: &StructuredCommand) -> Result<Value, ApiCallError> {
        self.replies
            .iter()
            .find(|(word, _)| *word == command.command_word())
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ApiCallError(format!("no such command {}", command.command_word())))
    }
}

struct CannedConnector {
    replies: Vec<(String, Value)>,
}

#[async_trait]
impl ApiConnector for CannedConnector {
    async fn connect(
        &self,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn ApiConnection>, CommandError> {
        Ok(Box::new(CannedApi {
            replies: self.replies.clone(),
        }))
    }
}

#[tokio::test]
async fn cli_and_api_transports_normalize_output_identically() {
    let payload = json!([{"interface": "ether1"}, {"interface": "ether2"}]);

    let script = format!(
        r#"{{"command": "/ip neighbor print", "status": 0, "stdout": {}, "stderr": ""}}"#,
        serde_json::to_string(&payload.to_string()).expect("encode stdout")
    );
    let (mut cli, _) = cli_runner(&script);

    let connector = CannedConnector {
        replies: vec![("/ip/neighbor/print".to_string(), payload.clone())],
    };
    let mut api = BatchRunner::new(DeviceTransport::api(
        Box::new(connector),
        ConnectOptions::new("10.0.0.1", "admin"),
    ));

    let request = BatchRequest::new(vec!["/ip neighbor print".into()]);
    let cli_report = cli.run_batch(&request).await.expect("cli batch");
    let api_report = api.run_batch(&request).await.expect("api batch");

    assert_eq!(cli_report.stdout, api_report.stdout);
    assert_eq!(cli_report.stdout, vec![payload]);
}

#[tokio::test]
async fn api_call_error_surfaces_device_text() {
    let connector = CannedConnector { replies: Vec::new() };
    let mut runner = BatchRunner::new(DeviceTransport::api(
        Box::new(connector),
        ConnectOptions::new("10.0.0.1", "admin"),
    ));

    let request = BatchRequest::new(vec!["/ip neighbor print".into()]);
    let err = runner.run_batch(&request).await.expect_err("must fail");

    match err {
        CommandError::DeviceExecution { message, .. } => {
            assert_eq!(message, "no such command /ip/neighbor/print");
        }
        other => panic!("expected DeviceExecution, got {other}"),
    }
}
