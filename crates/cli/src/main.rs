use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use bullpen_api::{BullpenClient, ClientConfig, Executor, HttpTransport};
use bullpen_engine::{
    AssessmentLifecycle, Decision, HttpIdentityProvider, IdentityProvider, QueryCache, QueryClient, RetryPolicy, Router, Session,
    StaticIdentity,
};
use bullpen_registry::ContractRegistry;
use bullpen_types::{CreateAssessmentRequest, CreateAthleteRequest, CreateCoachRequest, CreateTeamRequest, SessionUser, UpdateAthleteRequest};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "bullpen", version, about = "Terminal client for the Bullpen coaching API")]
struct Cli {
    /// Read client settings from this file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show where a client path leads for the current (or a simulated) session.
    Route(RouteArgs),
    /// List the API operations the client knows.
    Contracts,
    #[command(subcommand)]
    Athletes(AthleteCommand),
    #[command(subcommand)]
    Teams(TeamCommand),
    #[command(subcommand)]
    Coaches(CoachCommand),
    #[command(subcommand)]
    Assessments(AssessmentCommand),
    /// Show the signed-in player's onboarding progress.
    Onboarding,
}

#[derive(Debug, Args)]
struct RouteArgs {
    path: String,
    /// Simulate a signed-in user with this role ("" for no role).
    #[arg(long, conflicts_with = "anonymous")]
    role: Option<String>,
    /// Simulate a signed-out visitor.
    #[arg(long)]
    anonymous: bool,
}

#[derive(Debug, Subcommand)]
enum AthleteCommand {
    List {
        #[arg(long)]
        team: Option<i64>,
    },
    Get {
        id: i64,
    },
    Create(AthleteFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: AthletePatch,
    },
}

#[derive(Debug, Args)]
struct AthleteFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    team: Option<i64>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    throwing_hand: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Args)]
struct AthletePatch {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    team: Option<i64>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    throwing_hand: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Subcommand)]
enum TeamCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        level: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum CoachCommand {
    /// Show the signed-in coach's profile.
    Me,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum AssessmentCommand {
    List {
        #[arg(long)]
        athlete: Option<i64>,
    },
    Get {
        id: i64,
    },
    /// Create an assessment, start its analysis and follow it to completion.
    Create {
        #[arg(long)]
        athlete: i64,
        #[arg(long)]
        video_url: String,
        #[arg(long)]
        notes: Option<String>,
        /// Return as soon as the assessment is created.
        #[arg(long)]
        no_watch: bool,
    },
    /// Request analysis again for a stranded assessment.
    Analyze {
        id: i64,
    },
    /// Poll an assessment until it completes or fails.
    Watch {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::load_path(path).with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::load().context("failed to load client config")?,
    };
    let transport: Arc<dyn HttpTransport> = Arc::new(BullpenClient::new(&config).context("invalid client configuration")?);
    let client = QueryClient::new(
        Executor::new(Arc::clone(&transport)),
        QueryCache::default(),
        RetryPolicy::with_retries(config.read_retries),
    );

    match cli.command {
        Command::Route(args) => run_route(&client, args).await,
        Command::Contracts => {
            print_contracts();
            Ok(())
        }
        Command::Athletes(command) => run_athletes(&client, command).await,
        Command::Teams(command) => run_teams(&client, command).await,
        Command::Coaches(command) => run_coaches(&client, command).await,
        Command::Assessments(command) => run_assessments(&client, config.poll_interval(), command).await,
        Command::Onboarding => print_json(&client.onboarding().status().await?),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_route(client: &QueryClient, args: RouteArgs) -> Result<()> {
    let identity: Arc<dyn IdentityProvider> = if args.anonymous {
        Arc::new(StaticIdentity(Session::Anonymous))
    } else if let Some(role) = args.role.as_deref() {
        let role = (!role.trim().is_empty()).then_some(role);
        Arc::new(StaticIdentity(Session::SignedIn(SessionUser::new("cli", role))))
    } else {
        Arc::new(HttpIdentityProvider::new(client.executor().clone()))
    };

    let router = Router::new(identity, client.onboarding());
    match router.navigate(&args.path).await {
        Decision::Render(view) => println!("render {view}"),
        Decision::Redirect(target) => println!("redirect {target}"),
        Decision::Loading => println!("loading"),
    }
    Ok(())
}

fn print_contracts() {
    for entry in ContractRegistry::global().entries() {
        let statuses = entry
            .responses
            .iter()
            .map(|(status, schema)| format!("{status} {schema}"))
            .collect::<Vec<_>>()
            .join(", ");
        let input = entry.input_schema.map(|schema| schema.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:<22} {:<6} {:<32} in: {:<18} out: {}",
            entry.operation.name(),
            entry.method.as_str(),
            entry.path_template,
            input,
            statuses
        );
    }
}

async fn run_athletes(client: &QueryClient, command: AthleteCommand) -> Result<()> {
    let athletes = client.athletes();
    match command {
        AthleteCommand::List { team } => print_json(&athletes.list(team).await?),
        AthleteCommand::Get { id } => print_json(&athletes.get(id).await?),
        AthleteCommand::Create(fields) => {
            let request = CreateAthleteRequest {
                name: fields.name,
                team_id: fields.team,
                position: fields.position,
                throwing_hand: fields.throwing_hand,
                email: fields.email,
            };
            print_json(&athletes.create(&request).await?)
        }
        AthleteCommand::Update { id, fields } => {
            let patch = UpdateAthleteRequest {
                name: fields.name,
                team_id: fields.team,
                position: fields.position,
                throwing_hand: fields.throwing_hand,
                email: fields.email,
            };
            print_json(&athletes.update(id, &patch).await?)
        }
    }
}

async fn run_teams(client: &QueryClient, command: TeamCommand) -> Result<()> {
    let teams = client.teams();
    match command {
        TeamCommand::List => print_json(&teams.list().await?),
        TeamCommand::Create { name, level } => print_json(&teams.create(&CreateTeamRequest { name, level }).await?),
    }
}

async fn run_coaches(client: &QueryClient, command: CoachCommand) -> Result<()> {
    let coaches = client.coaches();
    match command {
        CoachCommand::Me => match coaches.me().await? {
            Some(coach) => print_json(&coach),
            None => {
                println!("no coach profile yet");
                Ok(())
            }
        },
        CoachCommand::Create {
            name,
            organization,
            specialty,
        } => {
            let request = CreateCoachRequest {
                name,
                organization,
                specialty,
            };
            print_json(&coaches.create(&request).await?)
        }
    }
}

async fn run_assessments(client: &QueryClient, poll_interval: Duration, command: AssessmentCommand) -> Result<()> {
    let assessments = client.assessments();
    let lifecycle = AssessmentLifecycle::new(assessments.clone()).with_poll_interval(poll_interval);
    match command {
        AssessmentCommand::List { athlete } => print_json(&assessments.list(athlete).await?),
        AssessmentCommand::Get { id } => print_json(&assessments.get(id).await?),
        AssessmentCommand::Analyze { id } => print_json(&lifecycle.analyze_assessment(id).await?),
        AssessmentCommand::Watch { id } => follow(&lifecycle, id).await,
        AssessmentCommand::Create {
            athlete,
            video_url,
            notes,
            no_watch,
        } => {
            let request = CreateAssessmentRequest {
                athlete_id: athlete,
                video_url,
                notes,
            };
            let created = lifecycle.create_assessment(&request).await?;
            if no_watch {
                return print_json(&created);
            }
            follow(&lifecycle, created.id).await
        }
    }
}

async fn follow(lifecycle: &AssessmentLifecycle, id: i64) -> Result<()> {
    let mut watch = lifecycle.watch(id);
    while let Some(snapshot) = watch.changed().await {
        if let Some(assessment) = &snapshot.assessment {
            info!(assessment_id = id, reads = snapshot.reads, status = %assessment.status, "assessment status");
        }
        if snapshot.finished {
            break;
        }
    }
    let assessment = watch
        .wait_for_terminal()
        .await
        .with_context(|| format!("assessment {id} did not reach a terminal status"))?;
    print_json(&assessment)
}
