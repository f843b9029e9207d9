use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::{
    config::{ApiConfig, Environment},
    session::SessionStore,
    store::Store,
};

/// Everything the JWT extractor needs
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionStore,
    pub auth: AuthConfig,
    pub cookie_key: Key,
    pub environment: Environment,
    /// Renders `/metrics`; the route is only mounted when set
    pub metrics: Option<PrometheusHandle>,
}

impl ApiState {
    pub fn new(
        config: &ApiConfig,
        store: Arc<dyn Store>,
        sessions: SessionStore,
        metrics: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let cookie_key = Key::try_from(config.cookie_secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid COOKIE_SECRET: {e}"))?;

        Ok(Self {
            store,
            sessions,
            auth: AuthConfig {
                jwt_secret: config.jwt_secret.clone(),
            },
            cookie_key,
            environment: config.env,
            metrics,
        })
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}
