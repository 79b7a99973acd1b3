use crate::cli::ServeArgs;
use crate::infra::{load_applicants, offline_collaborators, AppState};
use crate::routes::with_hiring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_ai::config::AppConfig;
use talent_ai::error::AppError;
use talent_ai::telemetry;
use talent_ai::workflows::hiring::{HiringService, IntakeScheduler};
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let applicants = load_applicants(args.applicants.as_deref())?;
    let hiring_service = Arc::new(HiringService::new(
        config.pipeline_settings(),
        config.intake_settings(),
        offline_collaborators(applicants, &config.intake.inbox_dir),
        config.requirements_artifact(),
    )?);

    let scheduler = args
        .intake
        .then(|| IntakeScheduler::spawn(hiring_service.intake(), config.intake.interval));

    let app = with_hiring_routes(hiring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, intake = args.intake, "hiring orchestrator ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler {
        let ticks = handle.shutdown().await;
        info!(ticks, "intake scheduler drained");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
}
