#![forbid(unsafe_code)]

//! `pinnacle-review`: reviewer console for teacher requests.
//!
//! Loads configuration and credentials, then runs one review command
//! (list, show, approve, reject) through the decision orchestrator.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use pinnacle_review::api::http::HttpRequestRepository;
use pinnacle_review::config::GlobalConfig;
use pinnacle_review::models::decision::DecisionAction;
use pinnacle_review::models::request::{RequestStatus, RequestType, TeacherRequest};
use pinnacle_review::notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
use pinnacle_review::registry;
use pinnacle_review::workflow::eligibility::EligibilitySet;
use pinnacle_review::workflow::error_map::{user_message, Operation};
use pinnacle_review::workflow::list::ListQuery;
use pinnacle_review::workflow::state::{EligibilityState, Loadable, ReviewPanel};
use pinnacle_review::workflow::{DecisionOrchestrator, DecisionOutcome};
use pinnacle_review::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pinnacle-review", about = "Review Pinnacle teacher requests", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json). Logs go to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List staff-visible requests.
    List {
        /// Status filter (PENDING, WAITING_CONFIRM, APPROVED, REJECTED).
        #[arg(long)]
        status: Option<RequestStatus>,
        /// Request type filter (MODALITY_CHANGE, RESCHEDULE, SWAP).
        #[arg(long = "type")]
        request_type: Option<RequestType>,
        /// Match class, course or teacher name.
        #[arg(long)]
        search: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one request with its decision options.
    Show {
        /// Request ID.
        id: i64,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Approve a pending request.
    Approve {
        /// Request ID.
        id: i64,
        /// Resource to assign (modality change, reschedule).
        #[arg(long)]
        resource: Option<i64>,
        /// Replacement teacher (swap).
        #[arg(long)]
        teacher: Option<i64>,
        /// Optional note for the teacher.
        #[arg(long)]
        note: Option<String>,
    },

    /// Reject a pending request.
    Reject {
        /// Request ID.
        id: i64,
        /// Reason shown to the teacher.
        #[arg(long)]
        reason: String,
    },
}

/// Prints notices the way the console's toasts read, and logs them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        TracingNotifier.notify(notice.clone());
        match notice.level {
            NoticeLevel::Success => println!("\u{2705} {}", notice.message),
            NoticeLevel::Validation => eprintln!("\u{26a0}\u{fe0f} {}", notice.message),
            NoticeLevel::Error => eprintln!("\u{274c} {}", notice.message),
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("{err}");
        return ExitCode::from(2);
    }
    // Decision failures are reported by the notifier, so what reaches
    // `main` is a load failure.
    let operation = match args.command {
        Command::List { .. } => Operation::LoadList,
        _ => Operation::LoadRequest,
    };

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))
        .and_then(|runtime| runtime.block_on(run(args)));

    match outcome {
        Ok(code) => code,
        Err(AppError::Config(msg)) => {
            eprintln!("configuration error: {msg}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{}", user_message(&err, operation));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode> {
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials().await?;
    info!(reviewer = config.reviewer.user_id, "configuration loaded");

    let repo = Arc::new(HttpRequestRepository::new(&config.api)?);
    let orchestrator = DecisionOrchestrator::new(
        repo,
        config.reviewer_context(),
        config.review.clone(),
        Arc::new(ConsoleNotifier),
    );

    let decision = match args.command {
        Command::List {
            status,
            request_type,
            search,
            json,
        } => {
            orchestrator
                .set_list_query(ListQuery {
                    status: status.or(config.review.default_status_filter),
                    request_type,
                    search,
                })
                .await;
            orchestrator.refresh_list().await?;
            let visible = orchestrator.list().await.visible();
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_list(&visible);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Show { id, json } => {
            let panel = open_panel(&orchestrator, id).await?;
            if json {
                if let Some(request) = panel.detail.loaded() {
                    println!("{}", serde_json::to_string_pretty(request)?);
                }
            } else {
                print_panel(&panel);
            }
            orchestrator.close().await;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Approve {
            id,
            resource,
            teacher,
            note,
        } => {
            open_panel(&orchestrator, id).await?;
            orchestrator.select_resource(resource).await?;
            orchestrator.select_candidate(teacher).await?;
            orchestrator.set_note(note.unwrap_or_default()).await?;
            orchestrator.decide(DecisionAction::Approve).await
        }
        Command::Reject { id, reason } => {
            open_panel(&orchestrator, id).await?;
            orchestrator.set_note(reason).await?;
            orchestrator.decide(DecisionAction::Reject).await
        }
    };

    match decision {
        Ok(outcome) => {
            report(outcome);
            Ok(ExitCode::SUCCESS)
        }
        // Already shown through the notifier.
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

/// Load the list for summary fields, then open `id`.
async fn open_panel(orchestrator: &DecisionOrchestrator, id: i64) -> Result<ReviewPanel> {
    if let Err(err) = orchestrator.refresh_list().await {
        warn!(%err, "list unavailable; showing detail without list summary");
    }
    orchestrator.open(id).await?;
    orchestrator
        .panel()
        .await
        .ok_or_else(|| AppError::NotFound(format!("request {id} is not open")))
}

fn report(outcome: DecisionOutcome) {
    match outcome {
        DecisionOutcome::Submitted { .. } => {}
        DecisionOutcome::NotDecidable { status } => {
            println!("Request is {status}; nothing to decide.");
        }
        DecisionOutcome::AlreadySubmitting => println!("A decision is already being saved."),
    }
}

fn print_list(requests: &[TeacherRequest]) {
    if requests.is_empty() {
        println!("No requests match.");
        return;
    }
    for request in requests {
        println!(
            "#{:<6} {:<16} {:<15} {:<24} {:<20} {}",
            request.id,
            registry::describe(request.request_type).label,
            request.status,
            request.class_name.as_deref().unwrap_or("-"),
            request.teacher_name.as_deref().unwrap_or("-"),
            registry::summarize(request),
        );
    }
}

fn print_panel(panel: &ReviewPanel) {
    let request = match &panel.detail {
        Loadable::Loaded(request) => request,
        Loadable::Failed(message) => {
            println!("Could not load request #{}: {message}", panel.request_id);
            return;
        }
        Loadable::Idle | Loadable::Loading => {
            println!("Request #{} is still loading.", panel.request_id);
            return;
        }
    };

    println!(
        "#{} {} [{}]",
        request.id,
        registry::describe(request.request_type).label,
        request.status
    );
    println!("  Teacher: {}", request.teacher_name.as_deref().unwrap_or("-"));
    println!(
        "  Class:   {} {}",
        request.class_name.as_deref().unwrap_or("-"),
        request.class_code.as_deref().unwrap_or("")
    );
    println!("  Course:  {}", request.course_name.as_deref().unwrap_or("-"));
    if let Some(date) = request.session_date {
        println!(
            "  Session: {date} {}",
            request.time_slot_label.as_deref().unwrap_or("")
        );
    }
    println!("  Change:  {}", registry::summarize(request));
    if let Some(reason) = &request.request_reason {
        println!("  Reason:  {reason}");
    }
    if let Some(note) = &request.decision_note {
        println!("  Decision note: {note}");
    }

    match &panel.eligibility {
        EligibilityState::Unplanned | EligibilityState::NotRequired => {}
        EligibilityState::Blocked(reason) => println!("  Options: unavailable ({reason})"),
        EligibilityState::Loading(_) => println!("  Options: loading\u{2026}"),
        EligibilityState::Failed { message, .. } => {
            println!("  Options: failed to load ({message})");
        }
        EligibilityState::Ready(set) if set.is_empty() => {
            println!("  Options: none found");
        }
        EligibilityState::Ready(EligibilitySet::Resources(resources)) => {
            println!("  Eligible resources:");
            for resource in resources {
                println!(
                    "    {:<6} {:<20} {:<10} {}",
                    resource.id,
                    resource.name,
                    resource.resource_type.as_deref().unwrap_or("-"),
                    resource
                        .capacity
                        .map_or_else(|| "-".to_owned(), |c| format!("{c} seats")),
                );
            }
        }
        EligibilityState::Ready(EligibilitySet::Candidates(candidates)) => {
            println!("  Swap candidates:");
            for candidate in candidates {
                let skills: Vec<String> = candidate
                    .skills
                    .iter()
                    .map(|tag| match &tag.level {
                        Some(level) => format!("{} {level}", tag.skill),
                        None => tag.skill.clone(),
                    })
                    .collect();
                println!(
                    "    {:<6} {:<24} {:>3}%  {}",
                    candidate.teacher_id,
                    candidate.display_name,
                    candidate.match_score,
                    skills.join(", "),
                );
            }
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
