use std::{process, sync::Arc};

use clap::Parser;
use favella::{
    application::{generator::ArtifactGenerator, lookup::LookupService},
    cache::{AdmissionGate, ArtifactStore, CacheConfig, RemoteStore, RemoteTier},
    config,
    domain::registry::{self, RegistryError},
    infra::{
        error::InfraError,
        http::{self, AppState},
        telemetry,
    },
};
use thiserror::Error;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[derive(Debug, Error)]
enum StartError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::LoadError),
    #[error("failed to load registry: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &StartError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "startup error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "startup error");
    });
}

async fn run() -> Result<(), StartError> {
    let cli = config::CliArgs::parse();
    let settings = config::load(&cli)?;

    telemetry::init(&settings.logging)?;

    let (templates, localization) = match settings.registry.file.as_ref() {
        Some(path) => registry::load_registry_file(path)?,
        None => registry::builtin(),
    };
    info!(
        target = "favella::startup",
        components = ?templates.component_types(),
        languages = ?localization.languages(),
        "registry loaded"
    );

    let cache_config = CacheConfig::from(&settings.cache);
    let local = Arc::new(ArtifactStore::new(
        cache_config.capacity_non_zero(),
        cache_config.local_ttl(),
    ));

    let remote: Option<Arc<dyn RemoteTier>> = if settings.remote.enabled {
        match RemoteStore::connect(&settings.remote.url, cache_config.remote_op_timeout()).await {
            Ok(store) => {
                info!(target = "favella::startup", "remote tier connected");
                Some(Arc::new(store))
            }
            Err(error) => {
                // The service runs fine without the remote tier; it
                // just regenerates more often.
                warn!(
                    target = "favella::startup",
                    error = %error,
                    "remote tier unreachable, continuing with local cache only"
                );
                None
            }
        }
    } else {
        info!(target = "favella::startup", "remote tier disabled by configuration");
        None
    };

    let generator = ArtifactGenerator::new(templates, localization);
    let lookup = Arc::new(LookupService::new(
        generator,
        local,
        remote,
        cache_config.remote_ttl(),
    ));
    let gate = AdmissionGate::new(cache_config.concurrency_limit);

    let router = http::build_router(AppState { lookup, gate });

    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr).await?;
    info!(
        target = "favella::startup",
        addr = %settings.server.listen_addr,
        concurrency_limit = cache_config.concurrency_limit,
        "favella listening"
    );

    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
