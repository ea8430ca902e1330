use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use clap::Parser;
use trellis_engine::http::{HttpActivity, ReqwestHttpClient};
use trellis_engine::{
    ActivityWorker, EventSink, ExecutorRegistry, LocalRuntime, NoopEventSink, Orchestrator,
    RunService, WebhookEventSink,
};
use trellis_store::{run_migrations, Domain, PostgresRunStore};

mod handlers;
mod state;

use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "trellis-server", version, about = "Trellis graph-execution engine server")]
struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Maximum connections in the Postgres pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// URL to POST run lifecycle events to. Disabled when absent.
    #[arg(long, env = "TRELLIS_WEBHOOK_URL")]
    webhook: Option<String>,

    /// Skip applying database migrations at startup.
    #[arg(long)]
    skip_migrations: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let pipeline_store =
        match PostgresRunStore::connect(&args.database_url, args.max_connections, Domain::Pipeline)
            .await
        {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "failed to connect to database");
                std::process::exit(1);
            }
        };
    // Both domains share one pool; only the table differs.
    let policy_store = PostgresRunStore::new(pipeline_store.pool().clone(), Domain::Policy);

    if !args.skip_migrations {
        if let Err(e) = run_migrations(pipeline_store.pool()).await {
            tracing::error!(error = %e, "failed to apply migrations");
            std::process::exit(1);
        }
    }

    let http_client = Arc::new(ReqwestHttpClient::default());

    let mut worker = ActivityWorker::new();
    worker.register(Arc::new(HttpActivity::new(http_client.clone())));
    let worker = Arc::new(worker);

    let registry = Arc::new(ExecutorRegistry::with_builtin());
    let orchestrator = Arc::new(Orchestrator::new(registry));
    let runtime = Arc::new(LocalRuntime::new(orchestrator, worker));

    let events: Arc<dyn EventSink> = match &args.webhook {
        Some(url) => {
            tracing::info!(url = %url, "event webhook enabled");
            Arc::new(WebhookEventSink::new(url.clone(), http_client.clone()))
        }
        None => Arc::new(NoopEventSink),
    };

    let pipelines = RunService::new(
        Domain::Pipeline,
        Arc::new(pipeline_store),
        runtime.clone(),
        events.clone(),
    );
    let policies = RunService::new(Domain::Policy, Arc::new(policy_store), runtime, events);

    let app_state = web::Data::new(AppState::new(pipelines, policies));

    tracing::info!(bind = %args.bind, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(handlers::health)
            .service(handlers::submit_run)
            .service(handlers::get_run)
            .service(handlers::list_runs)
    })
    .bind(&args.bind)?
    .run()
    .await
}
