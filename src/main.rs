use std::sync::Arc;

use anyhow::Context;

use story_wizard::channels::run_stdio;
use story_wizard::config::WizardConfig;
use story_wizard::llm::{LlmBackend, LlmConfig, LlmProvider, create_provider};
use story_wizard::wizard::{SessionStore, WizardController, spawn_prune_task, wizard_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = WizardConfig::from_env().context("Invalid configuration")?;
    let cli_mode = std::env::args().nth(1).as_deref() == Some("cli");

    eprintln!("📖 Story Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);

    // A missing key is reported, not fatal: the wizard still runs and
    // surfaces the error when a story is requested.
    let llm: Option<Arc<dyn LlmProvider>> = match config.api_key() {
        Ok(api_key) => {
            let llm_config = LlmConfig {
                backend: LlmBackend::Anthropic,
                api_key,
                model: config.model.clone(),
                base_url: config.api_base.clone(),
            };
            Some(create_provider(&llm_config)?)
        }
        Err(e) => {
            tracing::warn!("{}", e);
            eprintln!("   Warning: {}", e);
            None
        }
    };

    let controller = Arc::new(WizardController::new(llm, config.generation.clone()));

    if cli_mode {
        eprintln!("   Type your answers and press Enter. 'quit' to exit.\n");
        run_stdio(&controller).await?;
        return Ok(());
    }

    // ── HTTP server ─────────────────────────────────────────────────────
    let store = SessionStore::new();
    let _prune_handle = spawn_prune_task(Arc::clone(&store), config.session_idle_timeout);

    let app = wizard_routes(store, controller);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    eprintln!("   API: http://0.0.0.0:{}/api/sessions", config.port);
    eprintln!(
        "   Session idle timeout: {}s\n",
        config.session_idle_timeout.as_secs()
    );
    tracing::info!(port = config.port, "Story wizard server started");

    axum::serve(listener, app).await?;
    Ok(())
}
