pub mod prelude;

pub mod audit_logs;
pub mod biosecurity_imports;
pub mod catalogues;
pub mod companies;
pub mod farm_areas;
pub mod farmer_companies;
pub mod roles;
pub mod users;
pub mod vegetable_productions;
