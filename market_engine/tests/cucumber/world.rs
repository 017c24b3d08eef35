use std::collections::HashMap;

use cucumber::World;
use log::*;
use market_engine::{
    db_types::Listing,
    matching::ListingMatches,
    test_utils::{prepare_test_env, random_db_path},
    MatchFlowApi,
    ScanReport,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct MarketWorld {
    pub system: Option<MarketSystem>,
}

#[derive(Debug)]
pub struct MarketSystem {
    pub db_path: String,
    pub api: MatchFlowApi<SqliteDatabase>,
    /// Listings by the label the scenario gave them
    pub listings: HashMap<String, Listing>,
    pub last_report: Option<ScanReport>,
    pub preview: Vec<ListingMatches>,
}

impl MarketWorld {
    pub fn system(&mut self) -> &mut MarketSystem {
        self.system.as_mut().expect("Marketplace not initialised")
    }

    pub fn api(&self) -> &MatchFlowApi<SqliteDatabase> {
        &self.system.as_ref().expect("Marketplace not initialised").api
    }

    pub fn listing(&self, label: &str) -> Listing {
        let system = self.system.as_ref().expect("Marketplace not initialised");
        system.listings.get(label).cloned().unwrap_or_else(|| panic!("No listing labelled {label}"))
    }
}

impl MarketSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let api = MatchFlowApi::new(db, Default::default());
        Self { db_path: url, api, listings: HashMap::new(), last_report: None, preview: Vec::new() }
    }
}
