use axum::handler::Handler;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use campus_core::CampusConfigSnapshot;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Router plus the configuration it was built from.
pub struct AxumApp {
    pub config: CampusConfigSnapshot,
    pub router: Router<()>,
}

impl Clone for AxumApp {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            router: self.router.clone(),
        }
    }
}

impl AxumApp {
    pub fn new(config: CampusConfigSnapshot) -> Self {
        Self {
            config,
            router: Router::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get_string(key)
    }

    /// Merge a router whose paths are already absolute.
    pub fn merge(mut self, router: Router<()>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn use_get<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    /// Allow a browser front end on `origin` to call the API with cookies.
    pub fn with_cors(mut self, origin: &str) -> anyhow::Result<Self> {
        let origin = HeaderValue::from_str(origin)
            .map_err(|e| anyhow::anyhow!("invalid CORS origin '{origin}': {e}"))?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
        self.router = self.router.layer(cors);
        Ok(self)
    }

    /// Request spans and `x-request-id` on every response. Call after all
    /// routes are registered; later routes are not wrapped.
    pub fn with_http_layers(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

pub fn axum(config: CampusConfigSnapshot) -> AxumApp {
    AxumApp::new(config)
}
