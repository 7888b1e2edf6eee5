pub mod audit;
pub mod biosecurity;
pub mod catalogue;
pub mod company;
pub mod farm_area;
pub mod production;
pub mod role;
pub mod user;
