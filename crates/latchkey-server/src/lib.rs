//! Latchkey server
//!
//! The production shell around [`latchkey_core`]: configuration, logging,
//! durable audit storage, GPIO backends, the HTTP boundary and the
//! cooperative control loop. All lock logic lives in the core crate; this
//! crate only moves bytes and signals in and out of it.
//!
//! # Components
//!
//! - [`config`]: command line / environment configuration
//! - [`runtime`]: the single control loop and its request inbox
//! - [`http`]: axum routes posting requests into the loop
//! - [`audit_file`]: append-only text file audit store
//! - [`gpio`]: output/input line backends
//! - [`env`]: tokio-backed Environment

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod audit_file;
pub mod config;
pub mod env;
pub mod error;
pub mod gpio;
pub mod http;
pub mod runtime;

use std::net::SocketAddr;

use latchkey_core::{AuditLog, Controller, Environment};
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use audit_file::FileAuditStore;
pub use config::{AdminCredentials, Args, GpioBackend};
pub use env::TokioEnv;
pub use error::ServerError;
pub use http::{AppState, router};
pub use runtime::{ControllerHandle, Request, Runtime};

/// Install the global tracing subscriber.
///
/// An unparsable `filter` falls back to `info` and is reported once the
/// subscriber is up.
pub fn init_tracing(filter: &str) -> Result<(), ServerError> {
    let (env_filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, None),
        Err(error) => (EnvFilter::new("info"), Some(error)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| ServerError::Logging(e.to_string()))?;
    if let Some(error) = invalid {
        warn!(%error, filter, "invalid log filter; using info");
    }
    Ok(())
}

/// Build the controller from `args`, start the control loop and serve HTTP
/// until ctrl-c.
pub async fn run(args: Args) -> Result<(), ServerError> {
    let env = TokioEnv;
    let started = env.now();

    let audit = match FileAuditStore::open(&args.audit_file) {
        Ok(store) => AuditLog::with_store(store, started),
        Err(error) => {
            warn!(%error, path = %args.audit_file.display(), "audit storage unavailable");
            AuditLog::console_only(started)
        },
    };

    let (actuator, button) = gpio::open(&args)?;
    let controller = Controller::new(
        args.controller_config(),
        actuator,
        button,
        args.credential_set()?,
        audit,
    )?;

    let (runtime, handle) = Runtime::new(env, controller, args.inbox_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let control_loop = tokio::spawn(runtime.run(shutdown_rx));

    let app = router(AppState::new(handle, args.admin()));
    let listener = TcpListener::bind(args.listen).await?;
    info!(addr = %args.listen, gpio = ?args.gpio, "latchkey listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                warn!(%error, "ctrl-c handler failed; shutting down");
            }
            info!("shutdown requested");
        })
        .await?;

    // The loop exits on its own if the receiver side is gone.
    let _ = shutdown_tx.send(true);
    control_loop.await.map_err(|e| ServerError::Runtime(e.to_string()))?;
    Ok(())
}
