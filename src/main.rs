use std::sync::Arc;

use webengine::config::Config;
use webengine::http::resource::ByteArrayResource;
use webengine::http::router::WebEngine;
use webengine::log::Logger;
use webengine::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let logger = Logger::tracing("WebServer");

    let mut engine = WebEngine::new(logger.scoped("WebServer:WebEngine"));
    engine.add_resource(ByteArrayResource::new("/", "Hello world"));

    let mut server = Server::from_config(&cfg, logger.clone())?;
    server.set_responder(Arc::new(engine));

    tokio::select! {
        res = server.listen_on(&cfg.listen_addr) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tokio::task::spawn_blocking(move || server.shutdown()).await?;
    Ok(())
}
