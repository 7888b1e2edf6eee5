pub use super::audit_logs::Entity as AuditLogs;
pub use super::biosecurity_imports::Entity as BiosecurityImports;
pub use super::catalogues::Entity as Catalogues;
pub use super::companies::Entity as Companies;
pub use super::farm_areas::Entity as FarmAreas;
pub use super::farmer_companies::Entity as FarmerCompanies;
pub use super::roles::Entity as Roles;
pub use super::users::Entity as Users;
pub use super::vegetable_productions::Entity as VegetableProductions;
