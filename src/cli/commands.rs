//! CLI command definitions for klassiq.
//!
//! `generate` and `batch` produce lesson plans; `grades`, `subjects`,
//! `topics` and `lookup` browse the curriculum document.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::curriculum::{
    find_topic, format_context, list_grades, list_subjects, list_topics, CurriculumDocument,
    LookupResult,
};
use crate::lesson::{GenerationOutcome, LessonGenerator, LessonRequest, PlanCache};
use crate::llm::{LiteLlmClient, LlmProvider, OfflineProvider, OpenRouterProvider};
use crate::prompts::OutputMode;

/// Default number of concurrent generations in `batch`.
const DEFAULT_CONCURRENCY: usize = 2;

/// Curriculum-aligned lesson plan generator for Nigerian classrooms.
#[derive(Parser)]
#[command(name = "klassiq")]
#[command(about = "Generate curriculum-aligned lesson plans for Nigerian classrooms")]
#[command(version)]
#[command(
    long_about = "klassiq looks up a topic in the national curriculum document, builds a lesson-plan prompt around it and asks a language model for a structured plan.\n\nModel access comes from LLM_API_URL / LLM_API_KEY / LLM_MODEL, or OPENROUTER_API_KEY / --api-key. Without credentials an offline sample plan is returned.\n\nExample usage:\n  klassiq generate --grade \"Primary 4\" --subject Math --topic Fractions --teacher-input \"mangoes, cardboard\""
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate one lesson plan and print it as JSON.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Generate lesson plans for every request in a JSON Lines file.
    Batch(BatchArgs),

    /// List the grade bands in the curriculum document.
    Grades(CurriculumArgs),

    /// List the subjects available for a grade.
    Subjects(SubjectsArgs),

    /// List the topics for a grade and subject, in document order.
    Topics(TopicsArgs),

    /// Look up a topic and show the context string sent to the model.
    Lookup(LookupArgs),
}

/// Curriculum document location shared by several commands.
#[derive(Parser, Debug, Clone)]
pub struct CurriculumArgs {
    /// Path to the curriculum JSON document (default: KLASSIQ_CURRICULUM_PATH
    /// or data/curriculum_map.json).
    #[arg(long = "curriculum")]
    pub curriculum: Option<PathBuf>,
}

/// Model provider selection shared by the generation commands.
#[derive(Parser, Debug, Clone)]
pub struct ModelArgs {
    /// OpenRouter API key (can also use OPENROUTER_API_KEY env var).
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model identifier; overrides LLM_MODEL.
    #[arg(short = 'm', long)]
    pub model: Option<String>,
}

/// Arguments for `klassiq generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Grade, e.g. "Primary 4" or "JSS 2".
    #[arg(short = 'g', long)]
    pub grade: String,

    /// Subject, e.g. "Math" or "Basic Science".
    #[arg(short = 's', long)]
    pub subject: String,

    /// Topic to teach.
    #[arg(short = 't', long)]
    pub topic: String,

    /// Materials or notes from the teacher.
    #[arg(long)]
    pub teacher_input: Option<String>,

    /// Language of the plan.
    #[arg(long, default_value = "English")]
    pub language: String,

    /// Classroom setting, e.g. rural or urban.
    #[arg(long, default_value = "rural")]
    pub classroom_context: String,

    /// Ask for a compact plan.
    #[arg(long)]
    pub short: bool,

    /// Use this context instead of looking the topic up.
    #[arg(long)]
    pub context: Option<String>,

    #[command(flatten)]
    pub curriculum: CurriculumArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl GenerateArgs {
    fn to_request(&self) -> LessonRequest {
        let mut request = LessonRequest::new(&self.grade, &self.subject, &self.topic)
            .with_language(&self.language)
            .with_classroom_context(&self.classroom_context)
            .with_output_mode(if self.short {
                OutputMode::Short
            } else {
                OutputMode::Full
            });
        request.teacher_input = self.teacher_input.clone();
        request.curriculum_context = self.context.clone();
        request
    }
}

/// Arguments for `klassiq batch`.
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// JSON Lines file with one request object per line.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Maximum concurrent model calls.
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Disable the in-memory plan cache.
    #[arg(long)]
    pub no_cache: bool,

    #[command(flatten)]
    pub curriculum: CurriculumArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `klassiq subjects`.
#[derive(Parser, Debug)]
pub struct SubjectsArgs {
    #[arg(short = 'g', long)]
    pub grade: String,

    #[command(flatten)]
    pub curriculum: CurriculumArgs,
}

/// Arguments for `klassiq topics`.
#[derive(Parser, Debug)]
pub struct TopicsArgs {
    #[arg(short = 'g', long)]
    pub grade: String,

    #[arg(short = 's', long)]
    pub subject: String,

    #[command(flatten)]
    pub curriculum: CurriculumArgs,
}

/// Arguments for `klassiq lookup`.
#[derive(Parser, Debug)]
pub struct LookupArgs {
    #[arg(short = 'g', long)]
    pub grade: String,

    #[arg(short = 's', long)]
    pub subject: String,

    #[arg(short = 't', long)]
    pub topic: String,

    #[command(flatten)]
    pub curriculum: CurriculumArgs,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parse and run in one step.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::from_env().context("Invalid KLASSIQ_* configuration")?;

    match cli.command {
        Commands::Generate(args) => run_generate_command(args, config).await,
        Commands::Batch(args) => run_batch_command(args, config).await,
        Commands::Grades(args) => {
            let document = load_required_document(&args, &config)?;
            print_json(&list_grades(&document))
        }
        Commands::Subjects(args) => {
            let document = load_required_document(&args.curriculum, &config)?;
            print_json(&list_subjects(&document, &args.grade)?)
        }
        Commands::Topics(args) => {
            let document = load_required_document(&args.curriculum, &config)?;
            print_json(&list_topics(&document, &args.grade, &args.subject)?)
        }
        Commands::Lookup(args) => run_lookup_command(args, config),
    }
}

// ============================================================================
// Generation
// ============================================================================

async fn run_generate_command(args: GenerateArgs, config: GeneratorConfig) -> anyhow::Result<()> {
    let llm = build_llm_client(&args.model);
    let mut generator = LessonGenerator::new(llm, config.clone());

    // A supplied context makes the document unnecessary.
    if args.context.is_none() {
        if let Some(document) = load_optional_document(&args.curriculum, &config)? {
            generator = generator.with_curriculum(Arc::new(document));
        }
    }

    let outcome = generator.generate_lesson_plan(&args.to_request()).await;
    print_json(&outcome)
}

async fn run_batch_command(args: BatchArgs, config: GeneratorConfig) -> anyhow::Result<()> {
    let requests = load_requests(&args.input)?;
    info!(
        count = requests.len(),
        input = %args.input.display(),
        "Loaded lesson requests"
    );

    let llm = build_llm_client(&args.model);
    let mut generator = LessonGenerator::new(llm, config.clone());
    if let Some(document) = load_optional_document(&args.curriculum, &config)? {
        generator = generator.with_curriculum(Arc::new(document));
    }
    let cache = (!args.no_cache).then(|| Arc::new(PlanCache::default()));
    if let Some(cache) = &cache {
        generator = generator.with_cache(Arc::clone(cache));
    }

    let outcomes = generate_all(Arc::new(generator), requests, args.concurrency).await?;
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }

    if let Some(cache) = cache {
        let stats = cache.stats().await;
        info!(
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = format!("{:.2}%", stats.hit_rate() * 100.0),
            "Plan cache stats"
        );
    }
    Ok(())
}

/// Runs every request with at most `concurrency` in flight, returning
/// outcomes in input order.
async fn generate_all(
    generator: Arc<LessonGenerator>,
    requests: Vec<LessonRequest>,
    concurrency: usize,
) -> anyhow::Result<Vec<GenerationOutcome>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, request) in requests.into_iter().enumerate() {
        let generator = Arc::clone(&generator);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, generator.generate_lesson_plan(&request).await)
        });
    }

    let mut outcomes: Vec<Option<GenerationOutcome>> = vec![None; tasks.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.context("Generation task panicked")?;
        outcomes[index] = Some(outcome);
    }
    Ok(outcomes.into_iter().flatten().collect())
}

/// Reads one [`LessonRequest`] per non-blank line.
fn load_requests(path: &Path) -> anyhow::Result<Vec<LessonRequest>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid request", path.display(), number + 1))
        })
        .collect()
}

/// Picks a provider: OpenRouter when a key is given, the generic client when
/// `LLM_API_URL` is set, otherwise the offline sample provider.
fn build_llm_client(args: &ModelArgs) -> Arc<dyn LlmProvider> {
    let model = args
        .model
        .clone()
        .or_else(|| std::env::var("LLM_MODEL").ok().filter(|m| !m.trim().is_empty()));

    if let Some(key) = args.api_key.clone().filter(|k| !k.trim().is_empty()) {
        let provider = match model {
            Some(model) => OpenRouterProvider::with_model(key, model),
            None => OpenRouterProvider::new(key),
        };
        info!(model = %provider.default_model(), "Using OpenRouter provider");
        return Arc::new(provider);
    }

    match LiteLlmClient::from_env() {
        Ok(client) => {
            let client = match model {
                Some(model) => client.with_default_model(model),
                None => client,
            };
            info!(
                endpoint = %client.endpoint(),
                model = %client.default_model(),
                "Using OpenAI-compatible client"
            );
            Arc::new(client)
        }
        Err(err) => {
            warn!(error = %err, "No model credentials configured, using offline mode");
            Arc::new(OfflineProvider::new())
        }
    }
}

// ============================================================================
// Curriculum browsing
// ============================================================================

#[derive(Serialize)]
struct LookupOutput<'a> {
    lookup: &'a LookupResult,
    context: String,
}

fn run_lookup_command(args: LookupArgs, config: GeneratorConfig) -> anyhow::Result<()> {
    let document = load_required_document(&args.curriculum, &config)?;
    let lookup = find_topic(&document, &args.grade, &args.subject, &args.topic);
    let context = format_context(&lookup, &config.limits);
    print_json(&LookupOutput {
        lookup: &lookup,
        context,
    })?;

    match lookup.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

fn document_path(args: &CurriculumArgs, config: &GeneratorConfig) -> PathBuf {
    args.curriculum
        .clone()
        .unwrap_or_else(|| config.curriculum_path.clone())
}

fn load_required_document(
    args: &CurriculumArgs,
    config: &GeneratorConfig,
) -> anyhow::Result<CurriculumDocument> {
    let path = document_path(args, config);
    CurriculumDocument::load(&path)
        .with_context(|| format!("Failed to load curriculum document {}", path.display()))
}

/// Loads the document for generation. A missing default document is not an
/// error; an explicitly requested one is.
fn load_optional_document(
    args: &CurriculumArgs,
    config: &GeneratorConfig,
) -> anyhow::Result<Option<CurriculumDocument>> {
    let path = document_path(args, config);
    if args.curriculum.is_none() && !path.exists() {
        warn!(
            path = %path.display(),
            "Curriculum document not found, generating without curriculum context"
        );
        return Ok(None);
    }
    load_required_document(args, config).map(Some)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
