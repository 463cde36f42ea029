use axum::serve;
use news_backend::routes;
use news_backend::utils::config::Config;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    routes::init_tracing();

    let config = Config::init();
    let addr = format!("127.0.0.1:{}", config.port);

    let app = match routes::make_app(config).await {
        Ok(app) => app,
        Err(err) => panic!("Failed to initialize application: {err}"),
    };

    let listener = TcpListener::bind(&addr).await;
    info!("Listening on http://{addr}");

    match listener {
        Ok(res) => serve(res, app).await.unwrap(),
        Err(err) => panic!("{}", err),
    }
}
