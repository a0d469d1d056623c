use review::Registry;
use review_server::{profiles, router};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;

fn host_from_env() -> IpAddr {
    std::env::var("HOST")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn port_from_env() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let profiles = profiles::load_from_env()
        .await
        .expect("persona profile document must load at startup");
    let client = Arc::new(llm::client_from_env().expect("LLM engine configuration"));
    let registry = Registry::build(profiles, client).expect("persona registry");
    info!("registered {} reviewer personas", registry.len());

    let app = router(Arc::new(registry));
    let addr = SocketAddr::from((host_from_env(), port_from_env()));
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
