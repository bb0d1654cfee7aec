use crate::{
    config::Config,
    error::{ApiError, Result},
    routes::api_routes,
    services::{
        AniListClient, CatalogClient, LlmClient, OpenAiCompatibleClient, QueryCompiler,
        RecommendationService, SupabaseClient, TokenVerifier, UserStore,
    },
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use std::{net::TcpListener, sync::Arc, time::Duration};

const RETRY_DELAY_MS: u64 = 100;

/// Shared services handed to every handler.
pub struct AppState {
    pub compiler: QueryCompiler,
    pub recommendations: RecommendationService,
    pub catalog: Arc<dyn CatalogClient>,
    pub users: Arc<dyn UserStore>,
    pub llm: Arc<dyn LlmClient>,
    pub tokens: TokenVerifier,
    pub default_model: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn CatalogClient>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let compiler = QueryCompiler::new(
            llm.clone(),
            Duration::from_secs(config.extractor_timeout_secs),
        );
        let recommendations = RecommendationService::new(
            llm.clone(),
            catalog.clone(),
            users.clone(),
            &config.default_model,
            config.recommendation_page_size,
        )
        .with_retry_policy(
            config.llm_retry_attempts,
            Duration::from_millis(RETRY_DELAY_MS),
        );

        Self {
            compiler,
            recommendations,
            catalog,
            users,
            llm,
            tokens: TokenVerifier::new(config.jwt_secret()),
            default_model: config.default_model.clone(),
        }
    }

    /// Wire the production clients described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config
            .llm_endpoint()
            .ok_or_else(|| ApiError::ConfigError("APP_LLM_API_ENDPOINT is not set".to_string()))?;
        let key = config
            .llm_key()
            .ok_or_else(|| ApiError::ConfigError("APP_LLM_API_KEY is not set".to_string()))?;

        let llm = OpenAiCompatibleClient::new(endpoint, key, config.llm_timeout_secs)?;
        let catalog = AniListClient::new(&config.catalog_api_url, config.catalog_timeout_secs)?;
        let users = SupabaseClient::new(&config.supabase_url, &config.supabase_key);

        Ok(Self::new(
            config,
            Arc::new(llm),
            Arc::new(catalog),
            Arc::new(users),
        ))
    }
}

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)
            .with_context(|| format!("Failed to bind {}", bind_address))?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let state = web::Data::new(
            AppState::from_config(&self.config).context("Failed to initialize service clients")?,
        );
        info!(
            "Using catalog {} and default model {}",
            self.config.catalog_api_url, self.config.default_model
        );

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(state.clone())
                .app_data(json_config())
                .service(api_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}

/// Malformed request bodies render through the shared error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into())
}
