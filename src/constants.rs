/// Sentinel accepted in `pointOfEntry` filters: lifts the district/control-post
/// restriction for callers entitled to cross-post data.
pub const ALL_POINTS_OF_ENTRY: &str = "All";

pub mod session {

    pub const IDENTITY_KEY: &str = "identity";
}

pub mod registration {

    pub const OFFICER: &str = "officer";

    pub const FARMER: &str = "farmer";
}

pub mod export {

    pub const CATALOGUE_FILENAME: &str = "ProductCatalogue.xlsx";

    pub const VEGETABLE_PRODUCTION_FILENAME: &str = "VegetableProduction.xlsx";

    pub const BIOSECURITY_IMPORT_FILENAME: &str = "BioSecurityImportData.xlsx";
}

pub mod limits {

    pub const DEFAULT_PAGE_SIZE: u64 = 20;

    pub const MAX_PAGE_SIZE: u64 = 500;
}
