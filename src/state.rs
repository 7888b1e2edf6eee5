use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AdminService, AuthService, BiosecurityService, CatalogueService, Envelope, Exporter,
    LoginThrottle, ProductionService, SeaOrmAdminService, SeaOrmAuthService,
    SeaOrmBiosecurityService, SeaOrmCatalogueService, SeaOrmProductionService,
};

/// Shared application state: configuration, the store, and the domain
/// services wired over it. Cloning is cheap; everything is behind an `Arc`.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Arc<Store>,

    pub envelope: Arc<Envelope>,

    pub throttle: Arc<LoginThrottle>,

    pub auth_service: Arc<dyn AuthService>,

    pub catalogue_service: Arc<dyn CatalogueService>,

    pub production_service: Arc<dyn ProductionService>,

    pub biosecurity_service: Arc<dyn BiosecurityService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );

        let envelope = Arc::new(Envelope::new(
            &config.security.envelope_secret,
            config.security.hop_token_seconds,
        ));
        let throttle = Arc::new(LoginThrottle::new(&config.security.auth_throttle));
        let exporter = Arc::new(Exporter::new(&config.export));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            envelope.clone(),
            throttle.clone(),
            config.security.clone(),
        ));
        let catalogue_service = Arc::new(SeaOrmCatalogueService::new(
            store.clone(),
            envelope.clone(),
            exporter.clone(),
        ));
        let production_service = Arc::new(SeaOrmProductionService::new(
            store.clone(),
            envelope.clone(),
            exporter.clone(),
        ));
        let biosecurity_service = Arc::new(SeaOrmBiosecurityService::new(
            store.clone(),
            envelope.clone(),
            exporter,
        ));
        let admin_service = Arc::new(SeaOrmAdminService::new(
            store.clone(),
            envelope.clone(),
            config.security.clone(),
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            envelope,
            throttle,
            auth_service,
            catalogue_service,
            production_service,
            biosecurity_service,
            admin_service,
        })
    }
}
