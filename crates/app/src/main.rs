use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::{Attempt, AttemptId, QuestionDraft};
use services::{
    Clock, InMemoryQuizProvider, InMemorySubmissionSink, QuizApiClient, QuizApiConfig,
    QuizProvider, QuizSessionLoop, SessionConfig, SubmissionSink,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

const DEMO_ATTEMPT_ID: &str = "demo";
const DEMO_TIME_LIMIT_SECS: u32 = 180;

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidAttemptId { raw: String },
    InvalidApiUrl { raw: String },
    RequiresFlag { flag: &'static str, needs: &'static str },
    StartWithoutApi,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAttemptId { raw } => write!(f, "invalid --attempt value: {raw:?}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw:?}"),
            ArgsError::RequiresFlag { flag, needs } => write!(f, "{flag} requires {needs}"),
            ArgsError::StartWithoutApi => {
                write!(f, "--quiz needs a portal: pass --api or set QUIZ_API_BASE_URL")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--attempt <id>] [--api <base_url>] [--demo]");
    eprintln!("  cargo run -p app -- --api <base_url> --quiz <id> --student <id>");
    eprintln!();
    eprintln!("Without --api (or QUIZ_API_BASE_URL) a built-in demo quiz is served.");
    eprintln!("--quiz/--student start a new attempt on the portal and open it.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_ATTEMPT_ID, QUIZ_API_BASE_URL, QUIZ_API_TOKEN,");
    eprintln!("  QUIZ_DEFAULT_TIME_LIMIT_SECS, QUIZ_API_TIMEOUT_SECS, RUST_LOG");
}

/// A new attempt to open on the portal at launch.
#[derive(Debug, PartialEq, Eq)]
struct StartArgs {
    quiz_id: String,
    student_id: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    attempt: Option<AttemptId>,
    api_base_url: Option<String>,
    start: Option<StartArgs>,
    demo: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env_attempt: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            attempt: env_attempt.and_then(|raw| raw.parse::<AttemptId>().ok()),
            ..Self::default()
        };
        let mut quiz_id = None;
        let mut student_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--attempt" => {
                    let value = require_value(args, "--attempt")?;
                    let attempt = value
                        .parse::<AttemptId>()
                        .map_err(|_| ArgsError::InvalidAttemptId { raw: value.clone() })?;
                    parsed.attempt = Some(attempt);
                }
                "--api" => {
                    let value = require_value(args, "--api")?;
                    if !value.starts_with("http://") && !value.starts_with("https://") {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    parsed.api_base_url = Some(value);
                }
                "--quiz" => quiz_id = Some(require_value(args, "--quiz")?),
                "--student" => student_id = Some(require_value(args, "--student")?),
                "--demo" => parsed.demo = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        parsed.start = match (quiz_id, student_id) {
            (Some(quiz_id), Some(student_id)) => Some(StartArgs {
                quiz_id,
                student_id,
            }),
            (Some(_), None) => {
                return Err(ArgsError::RequiresFlag {
                    flag: "--quiz",
                    needs: "--student",
                });
            }
            (None, Some(_)) => {
                return Err(ArgsError::RequiresFlag {
                    flag: "--student",
                    needs: "--quiz",
                });
            }
            (None, None) => None,
        };

        Ok(parsed)
    }
}

struct DesktopApp {
    quiz_loop: Arc<QuizSessionLoop>,
    initial_attempt: Option<AttemptId>,
    backend_label: String,
}

impl UiApp for DesktopApp {
    fn quiz_loop(&self) -> Arc<QuizSessionLoop> {
        Arc::clone(&self.quiz_loop)
    }

    fn initial_attempt(&self) -> Option<AttemptId> {
        self.initial_attempt.clone()
    }

    fn backend_label(&self) -> String {
        self.backend_label.clone()
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "app=info,services=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn demo_attempt() -> Result<Attempt, quiz_core::Error> {
    let questions = [
        (
            "demo-1",
            "Which data structure gives O(1) average lookup by key?",
            ["A) Linked list", "B) Hash map", "C) Binary heap", "D) Stack"],
            "B",
            2,
        ),
        (
            "demo-2",
            "What does HTTP status 404 mean?",
            ["A) Not Found", "B) Forbidden", "C) Server Error", "D) Moved"],
            "A",
            1,
        ),
        (
            "demo-3",
            "Which keyword moves ownership into a Rust closure?",
            ["A) ref", "B) static", "C) move", "D) dyn"],
            "C",
            2,
        ),
    ];

    let questions = questions
        .into_iter()
        .map(|(id, text, options, correct, points)| {
            let mut draft = QuestionDraft::multiple_choice(id, text, options, correct, points);
            draft.topic = "demo".to_string();
            draft.validate()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Attempt::new(
        AttemptId::new(DEMO_ATTEMPT_ID),
        questions,
        DEMO_TIME_LIMIT_SECS,
    )?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv, std::env::var("QUIZ_ATTEMPT_ID").ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    let clock = Clock::system();
    let api_config = match (&args.api_base_url, args.demo) {
        (_, true) => None,
        (Some(base_url), false) => {
            let mut config = QuizApiConfig::from_env()
                .unwrap_or_else(|| QuizApiConfig::new(base_url.clone()));
            config.base_url.clone_from(base_url);
            Some(config)
        }
        (None, false) => QuizApiConfig::from_env(),
    };

    let (provider, sink, backend_label, initial_attempt): (
        Arc<dyn QuizProvider>,
        Arc<dyn SubmissionSink>,
        String,
        Option<AttemptId>,
    ) = match api_config {
        Some(config) => {
            let label = config.base_url.clone();
            let client = Arc::new(QuizApiClient::new(config)?.with_clock(clock.clone()));
            info!(base_url = %label, "using quiz portal backend");
            let initial = match &args.start {
                Some(start) => {
                    let attempt = client
                        .start_attempt(&start.quiz_id, &start.student_id)
                        .await?;
                    info!(
                        attempt_id = %attempt.id(),
                        quiz_id = %start.quiz_id,
                        "started portal attempt"
                    );
                    Some(attempt.id().clone())
                }
                None => args.attempt,
            };
            let provider: Arc<dyn QuizProvider> = client.clone();
            let sink: Arc<dyn SubmissionSink> = client;
            (provider, sink, label, initial)
        }
        None if args.start.is_some() => return Err(ArgsError::StartWithoutApi.into()),
        None => {
            let provider = InMemoryQuizProvider::new();
            provider.insert(demo_attempt()?)?;
            info!("using built-in demo quiz");
            let initial = args
                .attempt
                .or_else(|| Some(AttemptId::new(DEMO_ATTEMPT_ID)));
            let provider: Arc<dyn QuizProvider> = Arc::new(provider);
            let sink: Arc<dyn SubmissionSink> = Arc::new(InMemorySubmissionSink::new());
            (provider, sink, "the built-in demo quiz".to_string(), initial)
        }
    };

    let quiz_loop = Arc::new(
        QuizSessionLoop::new(clock, provider, sink).with_config(SessionConfig::default()),
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        quiz_loop,
        initial_attempt,
        backend_label,
    });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Quiz")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
