pub mod admin_service;
pub mod admin_service_impl;
pub mod auth_service;
pub mod auth_service_impl;
pub mod biosecurity_service;
pub mod biosecurity_service_impl;
pub mod catalogue_service;
pub mod catalogue_service_impl;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod exporter;
pub mod policy;
pub mod production_service;
pub mod production_service_impl;
pub mod rate_limit;
pub mod scope;

pub use admin_service::AdminService;
pub use admin_service_impl::SeaOrmAdminService;
pub use auth_service::AuthService;
pub use auth_service_impl::SeaOrmAuthService;
pub use biosecurity_service::BiosecurityService;
pub use biosecurity_service_impl::SeaOrmBiosecurityService;
pub use catalogue_service::CatalogueService;
pub use catalogue_service_impl::SeaOrmCatalogueService;
pub use envelope::Envelope;
pub use error::DomainError;
pub use exporter::Exporter;
pub use production_service::ProductionService;
pub use production_service_impl::SeaOrmProductionService;
pub use rate_limit::LoginThrottle;
