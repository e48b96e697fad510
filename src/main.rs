use std::sync::Arc;

use anyhow::Context;

use candidate_intake::config::{IntakeConfig, SinkTarget};
use candidate_intake::context::SessionContext;
use candidate_intake::intake::{ConversationOutcome, ProfileCollectionController};
use candidate_intake::logging;
use candidate_intake::routes::{IntakeRouteState, intake_routes};
use candidate_intake::session::{CliTurnSource, IntakeSession, ScriptTurnSource, TurnSource};
use candidate_intake::store::{LibSqlBackend, MemorySink, ProfileSink};
use candidate_intake::tools::ToolRegistry;
use candidate_intake::tools::builtin::InsertUserInformationTool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    let _log_guard = logging::init("candidate-intake", &logging::LogTarget::from_env());
    logging::install_panic_hook();

    let config = IntakeConfig::from_env().context("invalid configuration")?;

    eprintln!("🎙️  Candidate Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Profile: {}", config.variant);
    eprintln!("   Voice: {}", config.voice);

    // ── Sink ─────────────────────────────────────────────────────────────
    let sink: Arc<dyn ProfileSink> = match &config.sink {
        SinkTarget::Memory => {
            eprintln!("   Database: none (dry run)");
            MemorySink::new()
        }
        SinkTarget::Local(path) => {
            let backend = LibSqlBackend::new_local(path)
                .await
                .with_context(|| format!("failed to open database at {}", path.display()))?;
            eprintln!("   Database: {}", path.display());
            Arc::new(backend)
        }
        SinkTarget::Remote { url, token } => {
            let backend = LibSqlBackend::new_remote(url, token)
                .await
                .with_context(|| format!("failed to connect to {url}"))?;
            eprintln!("   Database: {url}");
            Arc::new(backend)
        }
    };

    // ── Controller + tools ───────────────────────────────────────────────
    let controller = Arc::new(ProfileCollectionController::new(config.variant, sink));
    let tools = Arc::new(ToolRegistry::new());
    tools.register_sync(Arc::new(InsertUserInformationTool::new(Arc::clone(
        &controller,
    ))));
    eprintln!("   Tools: {} registered", tools.count());

    // ── Status API ───────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = intake_routes(IntakeRouteState {
            controller: Arc::clone(&controller),
        });
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("failed to bind status port {port}"))?;
        eprintln!("   Status API: http://0.0.0.0:{port}/api/intake/status");
        tokio::spawn(async move {
            tracing::info!(port, "Status server started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Status server stopped");
            }
        });
    }

    // ── Session ──────────────────────────────────────────────────────────
    let ctx = SessionContext::new(controller.conversation_id(), "local")
        .with_participant("local-candidate", config.participant_kind);
    let mut session = IntakeSession::new(Arc::clone(&controller), tools, ctx)
        .persist_on_hangup(config.persist_on_hangup);
    if let Some(after) = config.wrap_up {
        session = session.with_wrap_up(after);
    }

    let options = session.options(&config.voice).await;
    tracing::debug!(
        voice = %options.voice,
        noise_cancellation = ?options.noise_cancellation,
        tools = options.tools.len(),
        "Realtime session options prepared"
    );

    let mut source: Box<dyn TurnSource> = match &config.script {
        Some(path) => {
            eprintln!("   Transcript: {}\n", path.display());
            Box::new(
                ScriptTurnSource::from_path(path)
                    .await
                    .with_context(|| format!("failed to load transcript {}", path.display()))?,
            )
        }
        None => {
            eprintln!("   Type `field = value`, `skip field`, /save or /quit.\n");
            Box::new(CliTurnSource::new())
        }
    };

    let summary = session.run(source.as_mut()).await?;
    match summary.outcome {
        ConversationOutcome::Persisted(id) => eprintln!("Profile saved as {id}"),
        ConversationOutcome::Discarded { missing } => eprintln!(
            "Conversation ended without saving ({} required item(s) missing)",
            missing.len()
        ),
    }

    Ok(())
}
