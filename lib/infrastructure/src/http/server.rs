use actix_web::*;
use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct HttpServerConfig {
    pub port: u16,
}

impl HttpServerConfig {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Binds the listener eagerly so that a port conflict surfaces before anything else is started.
    pub fn start_server<F>(&self, scopes: F) -> anyhow::Result<dev::Server>
    where
        F: Fn() -> Vec<Scope> + Send + Clone + 'static,
    {
        let http_server = HttpServer::new(move || {
            let mut app = App::new().wrap(tracing_actix_web::TracingLogger::default());

            for scope in scopes() {
                app = app.service(scope);
            }

            app
        })
        .workers(1)
        .disable_signals()
        .bind(("0.0.0.0", self.port))
        .with_context(|| format!("Error binding HTTP server to port {}", self.port))?;

        Ok(http_server.run())
    }
}
