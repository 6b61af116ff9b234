use hyper::Method;
use serde_json::{json, Value};
use std::sync::Arc;

use dispatchd::server::{shutdown_signal, Server};
use dispatchd::{logger, Config, DispatchOptions, Dispatcher, Registry, Reply, RequestContext};

/// Code returned by `/echo` when `msg` is missing
const CODE_MISSING_PARAMS: i64 = -2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Tokio runtime sized by server.workers (CPU cores when unset)
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(Registry::new());
    register_routes(&registry)?;
    logger::log_routes(&registry.routes());

    let dispatcher = Arc::new(Dispatcher::with_options(
        registry,
        DispatchOptions::from(&cfg),
    ));
    let server = Server::bind(&cfg, dispatcher)?;
    logger::log_server_start(&server.local_addr()?, &cfg);

    server.serve(shutdown_signal()).await;
    Ok(())
}

fn register_routes(registry: &Registry) -> dispatchd::Result<()> {
    registry.register("/ping", Method::GET, |_ctx: &mut RequestContext| {
        Reply::ok(json!({"ok": true}))
    })?;
    registry.register("/echo", Method::GET, echo)?;
    registry.register("/echo", Method::POST, echo)?;
    Ok(())
}

fn echo(ctx: &mut RequestContext) -> Reply<Value> {
    match ctx.validate(["msg"]) {
        Ok(()) => Reply::ok(json!({ "msg": ctx.param("msg") })),
        Err(e) => Reply::error(e.to_string(), CODE_MISSING_PARAMS),
    }
}
