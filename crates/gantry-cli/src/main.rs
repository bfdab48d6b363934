use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use gantry_core::context::{parse_event_context, ActionEnv};
use gantry_core::modes::registry::ModeRegistry;
use gantry_core::modes::ModeOptions;
use gantry_runtime::branch_setup::ApiBranchPlanner;
use gantry_runtime::data_fetch::ApiEventDataFetcher;
use gantry_runtime::github_api_client::GithubApiClient;
use gantry_runtime::outputs::ActionOutputs;
use gantry_runtime::prompt::FilePromptWriter;
use gantry_runtime::tool_server::McpConfigBuilder;
use gantry_runtime::tracking_comment::ApiTrackingCommentClient;

/// Event gate for the automated coding agent: decides per workflow event
/// whether the agent engages and prepares everything the agent step needs.
#[derive(Debug, Parser)]
#[command(name = "gantry", version)]
struct Cli {
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api_base: String,

    /// Where the rendered agent prompt is written.
    #[arg(long, env = "GANTRY_PROMPT_PATH", default_value = "/tmp/gantry/prompt.txt")]
    prompt_path: PathBuf,

    #[arg(long, default_value_t = 30_000)]
    request_timeout_ms: u64,

    #[arg(long, default_value_t = 3)]
    retry_max_attempts: usize,

    #[arg(long, default_value_t = 500)]
    retry_base_delay_ms: u64,

    /// Stop after the trigger decision without contacting collaborators.
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let env = ActionEnv::from_process()?;
    let context = parse_event_context(&env)?;
    tracing::info!(
        event = %context.event_name,
        entity = context.entity_number,
        is_pr = context.is_pr,
        mode = %context.inputs.mode,
        "normalized event context"
    );

    let mut registry = ModeRegistry::new();
    let mode = registry.get(&context.inputs.mode)?;
    let outputs = ActionOutputs::from_process_env();

    if !mode.should_trigger(&context) {
        tracing::info!(mode = mode.name(), "no trigger detected; skipping run");
        outputs.set_output("contains_trigger", "false")?;
        return Ok(());
    }
    outputs.set_output("contains_trigger", "true")?;
    if cli.dry_run {
        tracing::info!("dry run requested; stopping after trigger decision");
        return Ok(());
    }

    let client = GithubApiClient::new(
        cli.github_api_base.clone(),
        cli.github_token.clone(),
        context.repository.clone(),
        cli.request_timeout_ms,
        cli.retry_max_attempts,
        cli.retry_base_delay_ms,
    )?;
    let comments = ApiTrackingCommentClient::new(client.clone());
    let branches = ApiBranchPlanner::new(client.clone());
    let fetcher = ApiEventDataFetcher::new(client);
    let prompts = FilePromptWriter::new(cli.prompt_path.clone());
    let tool_server = McpConfigBuilder::new(cli.github_token.clone(), cli.github_api_base.clone());

    let result = mode
        .prepare(ModeOptions {
            context: &context,
            comments: &comments,
            branches: &branches,
            fetcher: &fetcher,
            prompts: &prompts,
            tool_server: &tool_server,
        })
        .await
        .context("mode preparation failed")?;

    outputs.set_output("claude_comment_id", &result.comment_id.to_string())?;
    outputs.set_output("base_branch", &result.branch_info.base_branch)?;
    if let Some(branch) = result.branch_info.work_branch.as_deref() {
        outputs.set_output("claude_branch", branch)?;
    }
    outputs.set_output("mcp_config", &result.tool_server_config)?;
    outputs.export_env("INPUT_ALLOWED_TOOLS", &result.allowed_tools.join(","))?;
    outputs.export_env("INPUT_DISALLOWED_TOOLS", &result.disallowed_tools.join(","))?;

    tracing::info!(
        comment_id = result.comment_id,
        branch = %result.branch_info.current_branch,
        "run preparation complete"
    );
    Ok(())
}
