use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use awful_aj::{config, template};
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info, warn};

use vibe_index::cancel::CancellationToken;
use vibe_index::config::EngineConfig;
use vibe_index::context::{ContextSupplier, LlmContext, StaticContext};
use vibe_index::engine::Engine;
use vibe_index::estimators::{ContextualEstimator, PolarityEstimator};
use vibe_index::llm::{AwfulJadeCompletion, Completion};
use vibe_index::render::render_report_markdown;
use vibe_index::sources::{RedditAdapter, SourceAdapter, TwitterAdapter, YouTubeAdapter};
use vibe_index::store::JsonlStore;

/// Vibe Index - weighted public sentiment toward a subject
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Subject to score (person, product, policy, ...)
    subject: String,

    /// Optional category stored with the result (e.g. "politics")
    #[arg(long)]
    category: Option<String>,

    /// Engine config YAML (weights, caps, floors); defaults when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// awful_aj API config for the reasoning service (overrides AJ_CONFIG)
    #[arg(long)]
    llm_config: Option<String>,

    /// Directory for the append-only result store (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Background text about the subject, used instead of asking the model
    #[arg(long)]
    context: Option<String>,

    /// Do not ask the model for subject background
    #[arg(long)]
    no_llm_context: bool,
}

fn resolve_paths() -> Result<(PathBuf, PathBuf, PathBuf)> {
    // 1) Base config dir: prefer env override, else awful_aj::config_dir()
    let base_dir = if let Ok(dir) = std::env::var("AJ_CONFIG_DIR") {
        PathBuf::from(dir)
    } else {
        awful_aj::config_dir().map_err(|e| anyhow!(e.to_string()))?
    };

    // 2) Config file: prefer AJ_CONFIG, else <base>/config.yaml
    let cfg_path = if let Ok(p) = std::env::var("AJ_CONFIG") {
        PathBuf::from(p)
    } else {
        base_dir.join("config.yaml")
    };

    // 3) Template dir: prefer AJ_TEMPLATE_DIR, else <base>/templates
    let tpl_dir = if let Ok(p) = std::env::var("AJ_TEMPLATE_DIR") {
        PathBuf::from(p)
    } else {
        let d = base_dir.join("templates");
        // make it visible to awful_aj::template loader
        std::env::set_var("AJ_TEMPLATE_DIR", &d);
        d
    };

    Ok((base_dir, cfg_path, tpl_dir))
}

async fn load_completion(cfg: &config::AwfulJadeConfig, env_var: &str, default_name: &str) -> Result<Arc<dyn Completion>> {
    let name = std::env::var(env_var).unwrap_or_else(|_| default_name.to_string());
    let tpl = template::load_template(&name)
        .await
        .map_err(|e| anyhow!(e.to_string()))
        .with_context(|| format!("loading template {}", name))?;
    debug!("Template loaded - name={}", name);
    Ok(Arc::new(AwfulJadeCompletion::new(cfg.clone(), tpl)))
}

/// The reasoning service is optional: without a usable config the engine
/// runs on the lexical estimators alone.
async fn reasoning_service(args: &Args) -> Option<(Arc<dyn Completion>, Option<Arc<dyn Completion>>)> {
    let cfg_path = match &args.llm_config {
        Some(p) => PathBuf::from(p),
        None => match resolve_paths() {
            Ok((_base, cfg_path, _tpl)) => cfg_path,
            Err(e) => {
                warn!("No awful_aj config directory, running lexical-only - error={}", e);
                return None;
            }
        },
    };
    if !cfg_path.exists() {
        warn!(
            "awful_aj config not found, running lexical-only - path={}",
            cfg_path.display()
        );
        return None;
    }
    let cfg = match cfg_path.to_str().map(config::load_config) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("awful_aj config unreadable, running lexical-only - path={}, error={}", cfg_path.display(), e);
            return None;
        }
        None => {
            warn!("awful_aj config path is not UTF-8, running lexical-only");
            return None;
        }
    };

    let polarity = match load_completion(&cfg, "VIBE_TEMPLATE_POLARITY", "vibe_polarity_estimator").await {
        Ok(c) => c,
        Err(e) => {
            warn!("Polarity template unavailable, running lexical-only - error={:#}", e);
            return None;
        }
    };
    let context = match load_completion(&cfg, "VIBE_TEMPLATE_CONTEXT", "vibe_subject_context").await {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Context template unavailable, skipping model context - error={:#}", e);
            None
        }
    };
    Some((polarity, context))
}

fn adapters_from_env(client: &Client) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    match (std::env::var("REDDIT_CLIENT_ID"), std::env::var("REDDIT_CLIENT_SECRET")) {
        (Ok(id), Ok(secret)) => adapters.push(Arc::new(RedditAdapter::new(client.clone(), id, secret))),
        _ => warn!("Reddit disabled - REDDIT_CLIENT_ID/REDDIT_CLIENT_SECRET not set"),
    }
    match std::env::var("YOUTUBE_API_KEY") {
        Ok(key) => adapters.push(Arc::new(YouTubeAdapter::new(client.clone(), key))),
        Err(_) => warn!("YouTube disabled - YOUTUBE_API_KEY not set"),
    }
    match std::env::var("TWITTER_BEARER_TOKEN") {
        Ok(token) => adapters.push(Arc::new(TwitterAdapter::new(client.clone(), token))),
        Err(_) => warn!("Twitter disabled - TWITTER_BEARER_TOKEN not set"),
    }

    adapters
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting vibe_index");

    let args = Args::parse();

    let engine_cfg = match &args.config {
        Some(p) => EngineConfig::load(std::path::Path::new(p))?,
        None => {
            debug!("No --config given, using built-in engine defaults");
            EngineConfig::default()
        }
    };

    let client = Client::builder()
        .timeout(engine_cfg.collector.adapter_timeout())
        .build()
        .context("building HTTP client")?;
    let adapters = adapters_from_env(&client);
    if adapters.is_empty() {
        warn!("No source adapters configured; the run will report no data");
    }

    let service = reasoning_service(&args).await;
    let estimate_timeout = engine_cfg.scoring.estimate_timeout();
    let contextual: Option<Arc<dyn PolarityEstimator>> = service.as_ref().map(|(polarity, _)| {
        Arc::new(ContextualEstimator::new(
            polarity.clone(),
            estimate_timeout,
            engine_cfg.scoring.max_prompt_tokens,
        )) as Arc<dyn PolarityEstimator>
    });

    let supplier: Option<Box<dyn ContextSupplier>> = match (&args.context, &service) {
        (Some(text), _) => Some(Box::new(StaticContext(text.clone())) as Box<dyn ContextSupplier>),
        (None, Some((_, Some(ctx)))) if !args.no_llm_context => {
            Some(Box::new(LlmContext::new(ctx.clone(), estimate_timeout)) as Box<dyn ContextSupplier>)
        }
        _ => None,
    };

    let mut engine = Engine::new(engine_cfg, adapters, contextual)
        .with_store(Box::new(JsonlStore::new(&args.output_dir)));
    if let Some(s) = supplier {
        engine = engine.with_context(s);
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received - finishing in-flight work, no new calls");
            on_signal.cancel();
        }
    });

    let report = engine.run(&args.subject, args.category.as_deref(), &cancel).await;
    println!("{}", render_report_markdown(&report));
    Ok(())
}
