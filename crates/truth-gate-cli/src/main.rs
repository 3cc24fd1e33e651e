// crates/truth-gate-cli/src/main.rs
// ============================================================================
// Module: Truth Gate CLI Entry Point
// Description: Command dispatcher for running audits from the shell.
// Purpose: Run the triple-pass protocol and persist its verifiable outputs.
// Dependencies: clap, serde_json, thiserror, tokio, truth-gate-{agents,core,inference}
// ============================================================================

//! ## Overview
//! The CLI binds a claim file to a target path, runs the full audit
//! pipeline, and writes the result, a human-oriented report, and every
//! evidence payload under the output directory. Outputs are written once per
//! task and never mutated; rerunning the same task id against the same
//! output directory is refused. Exit codes are stable: 0 verified, 1 not
//! verified, 2 critical discrepancy, 3 internal error.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod render;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use truth_gate_agents::AgentRegistry;
use truth_gate_core::AuditConfig;
use truth_gate_core::AuditId;
use truth_gate_core::AuditOrchestrator;
use truth_gate_core::AuditRequest;
use truth_gate_core::Claim;
use truth_gate_core::ClaimField;
use truth_gate_core::DecisionEngine;
use truth_gate_core::Severity;
use truth_gate_core::StrategyAdvisor;
use truth_gate_core::Timestamp;
use truth_gate_core::TruthGate;
use truth_gate_core::runtime::AuditRun;
use truth_gate_inference::HttpAdvisor;
use truth_gate_inference::HttpAdvisorConfig;
use truth_gate_inference::StaticStrategy;

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Truth Gate: evidence-first verification of claims about completed work.
#[derive(Debug, Parser)]
#[command(name = "truth-gate", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the triple-pass audit for one claim.
    Run(RunArgs),
}

/// Arguments for `truth-gate run`.
#[derive(Debug, clap::Args)]
struct RunArgs {
    /// Task identifier; names the output subdirectory.
    #[arg(long)]
    task_id: String,
    /// Target path the claim is verified against.
    #[arg(long)]
    target: PathBuf,
    /// Path to the claim JSON file (a metrics object, or `{"metrics": ...}`).
    #[arg(long)]
    claim: PathBuf,
    /// Optional free-text report backing the claim.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Confidence floor required for a verified outcome.
    #[arg(long, default_value_t = 0.95)]
    min_confidence: f64,
    /// Output directory root.
    #[arg(long, default_value = "truth-gate-out")]
    out: PathBuf,
    /// Optional inference endpoint for strategy advice.
    #[arg(long)]
    inference_url: Option<Url>,
    /// Allow a cleartext http:// inference endpoint.
    #[arg(long, default_value_t = false)]
    allow_http_inference: bool,
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// Terminal CLI error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Exit code for a verified claim.
const EXIT_VERIFIED: u8 = 0;
/// Exit code for an unverified claim without critical findings.
const EXIT_NOT_VERIFIED: u8 = 1;
/// Exit code when at least one critical discrepancy was found.
const EXIT_CRITICAL: u8 = 2;
/// Exit code for internal errors (unreadable target, invalid claim, tamper).
const EXIT_INTERNAL: u8 = 3;

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => match run_audit(args).await {
            Ok(code) => ExitCode::from(code),
            Err(err) => {
                // An unwritable stderr leaves nothing else to report to.
                drop(write_stderr_line(&format!("truth-gate: {err}")));
                ExitCode::from(EXIT_INTERNAL)
            }
        },
    }
}

/// Runs one audit end to end and maps the outcome to an exit code.
async fn run_audit(args: RunArgs) -> CliResult<u8> {
    let mut claim = load_claim(&args.claim)?;
    if args.report.is_some() {
        claim.report_ref = args.report.clone();
    }

    let config = AuditConfig {
        min_confidence: args.min_confidence,
        ..AuditConfig::default()
    };

    let request = AuditRequest::new(
        AuditId::new(args.task_id.clone()),
        args.target.clone(),
        claim,
        args.min_confidence,
        now_timestamp(),
    )
    .map_err(|err| CliError::new(format!("invalid claim: {err}")))?;

    let advisor = build_advisor(&args)?;
    let orchestrator = AuditOrchestrator::new(AgentRegistry::default_roster(), config.clone())
        .map_err(|err| CliError::new(format!("invalid configuration: {err}")))?;
    let engine = DecisionEngine::new(advisor, config.inference_timeout());
    let gate = TruthGate::new(orchestrator, engine, config)
        .map_err(|err| CliError::new(format!("invalid configuration: {err}")))?;

    let run = gate
        .run(&request)
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    write_outputs(&args.out, &args.task_id, &run)?;
    write_stdout_line(&format!(
        "{}: {} (confidence {:.3})",
        args.task_id,
        if run.result.verified { "verified" } else { "not verified" },
        run.result.confidence,
    ))
    .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;

    Ok(exit_code_for(&run))
}

/// Maps a completed run to its exit code.
fn exit_code_for(run: &AuditRun) -> u8 {
    if run.result.has_severity(Severity::Critical) {
        EXIT_CRITICAL
    } else if run.result.verified {
        EXIT_VERIFIED
    } else {
        EXIT_NOT_VERIFIED
    }
}

// ============================================================================
// SECTION: Claim Loading
// ============================================================================

/// Loads a claim from a JSON file.
///
/// Accepts either a full claim document with a `metrics` key or a bare
/// metrics object.
fn load_claim(path: &Path) -> CliResult<Claim> {
    let text = fs::read_to_string(path)
        .map_err(|err| CliError::new(format!("cannot read claim {}: {err}", path.display())))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|err| CliError::new(format!("claim is not valid JSON: {err}")))?;
    if value.get("metrics").is_some() {
        return serde_json::from_value(value)
            .map_err(|err| CliError::new(format!("malformed claim document: {err}")));
    }
    let Value::Object(map) = value else {
        return Err(CliError::new("claim must be a JSON object"));
    };
    let metrics: BTreeMap<ClaimField, Value> = map
        .into_iter()
        .map(|(field, value)| (ClaimField::new(field), value))
        .collect();
    Ok(Claim::new(metrics))
}

// ============================================================================
// SECTION: Advisor Selection
// ============================================================================

/// Builds the strategy advisor from the CLI arguments.
fn build_advisor(args: &RunArgs) -> CliResult<Arc<dyn StrategyAdvisor>> {
    match &args.inference_url {
        None => Ok(Arc::new(StaticStrategy)),
        Some(endpoint) => {
            let mut config = HttpAdvisorConfig::new(endpoint.clone());
            config.allow_http = args.allow_http_inference;
            let advisor = HttpAdvisor::new(config)
                .map_err(|err| CliError::new(format!("inference endpoint rejected: {err}")))?;
            Ok(Arc::new(advisor))
        }
    }
}

// ============================================================================
// SECTION: Output Layout
// ============================================================================

/// Writes the result, report, and evidence payloads for one run.
///
/// The task directory is write-once: an existing result file refuses the
/// whole write so completed audits are never silently replaced.
fn write_outputs(out: &Path, task_id: &str, run: &AuditRun) -> CliResult<()> {
    let task_dir = out.join(task_id);
    let reports_dir = task_dir.join("reports");
    let evidence_dir = task_dir.join("evidence");
    let result_path = reports_dir.join("audit-result.json");
    if result_path.exists() {
        return Err(CliError::new(format!(
            "output {} already exists; audits are write-once",
            result_path.display()
        )));
    }
    fs::create_dir_all(&reports_dir)
        .map_err(|err| CliError::new(format!("cannot create output directory: {err}")))?;
    fs::create_dir_all(&evidence_dir)
        .map_err(|err| CliError::new(format!("cannot create output directory: {err}")))?;

    write_json(&result_path, &run.result)?;
    write_json(&reports_dir.join("audit-report.json"), &render::human_report(run))?;
    for item in run.ledger.items() {
        let file_name = format!("{}.json", item.id.as_str().replace('/', "-"));
        write_json(&evidence_dir.join(file_name), item)?;
    }
    Ok(())
}

/// Serializes a value as pretty JSON to a path.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("serialization failed: {err}")))?;
    fs::write(path, bytes)
        .map_err(|err| CliError::new(format!("cannot write {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Time and Output Helpers
// ============================================================================

/// Returns the current wall-clock timestamp for the request envelope.
fn now_timestamp() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
    Timestamp::UnixMillis(millis)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions may panic on failure."
    )]

    use std::fs;

    use truth_gate_core::AuditId;
    use truth_gate_core::AuditResult;
    use truth_gate_core::Discrepancy;
    use truth_gate_core::EvidenceLedger;
    use truth_gate_core::Severity;
    use truth_gate_core::runtime::AuditRun;

    use super::EXIT_CRITICAL;
    use super::EXIT_NOT_VERIFIED;
    use super::EXIT_VERIFIED;
    use super::exit_code_for;
    use super::load_claim;
    use super::write_outputs;

    fn run_with(discrepancies: Vec<Discrepancy>, verified: bool) -> AuditRun {
        AuditRun {
            result: AuditResult {
                request_id: AuditId::new("cli-test"),
                verified,
                confidence: if verified { 1.0 } else { 0.1 },
                discrepancies,
                evidence_ledger_hash: "0".repeat(64),
                passes: Vec::new(),
                agreement_ab: 1.0,
                disputed: false,
                health_score: 1.0,
            },
            ledger: EvidenceLedger::new(AuditId::new("cli-test")),
            pass_reports: Vec::new(),
        }
    }

    #[test]
    fn exit_codes_follow_the_verdict() {
        assert_eq!(exit_code_for(&run_with(Vec::new(), true)), EXIT_VERIFIED);
        assert_eq!(exit_code_for(&run_with(Vec::new(), false)), EXIT_NOT_VERIFIED);
        let critical =
            vec![Discrepancy::unscoped("deliverable-gap", Severity::Critical, "gap")];
        assert_eq!(exit_code_for(&run_with(critical, false)), EXIT_CRITICAL);
    }

    #[test]
    fn bare_metrics_object_loads_as_a_claim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claim.json");
        fs::write(&path, r#"{"filesCreated": 5, "linesOfCode": 120}"#).unwrap();
        let claim = load_claim(&path).unwrap();
        assert_eq!(claim.numeric("filesCreated"), Some(5.0));
        assert!(claim.report_ref.is_none());
    }

    #[test]
    fn full_claim_document_loads_report_ref() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claim.json");
        fs::write(
            &path,
            r#"{"metrics": {"filesCreated": 2}, "report_ref": "report.md"}"#,
        )
        .unwrap();
        let claim = load_claim(&path).unwrap();
        assert_eq!(claim.numeric("filesCreated"), Some(2.0));
        assert!(claim.report_ref.is_some());
    }

    #[test]
    fn outputs_are_write_once() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_with(Vec::new(), true);
        write_outputs(dir.path(), "task-1", &run).unwrap();
        assert!(dir.path().join("task-1/reports/audit-result.json").exists());
        assert!(dir.path().join("task-1/reports/audit-report.json").exists());
        let second = write_outputs(dir.path(), "task-1", &run);
        assert!(second.is_err());
    }
}
