use std::sync::Arc;
use tokio::signal;
use town_friends::api;
use town_friends::logger::*;
use town_friends::server::*;
use town_friends::settings::*;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let cors = if project_settings.http.cors_allow_any_origin {
        warp::cors()
            .allow_any_origin()
            .allow_methods(vec!["GET", "POST", "PUT"])
            .allow_headers(vec!["content-type"])
    } else {
        warp::cors()
    };

    let app = api::routes(server.clone())
        .recover(api::recover_error)
        .with(cors)
        .with(warp::log("town_friends::http"));

    let (bound, serving) = warp::serve(app).bind_with_graceful_shutdown(address, async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not listen for SIGINT: {}", e);
        }
    });
    info!(%bound, "listening");
    serving.await;

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
