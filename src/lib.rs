pub mod api;
pub mod attachments;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod leave;
pub mod ledger;
pub mod model;
pub mod routes;
pub mod store;

use std::sync::Arc;

use attachments::AttachmentLinker;
use config::Config;
use leave::LeaveService;
use ledger::CompOffLedger;
use store::LeaveStore;

/// Builds the ledger and leave service over `store` using the configured
/// holiday calendar and attachment base URL.
pub fn build_services(store: Arc<dyn LeaveStore>, config: &Config) -> (Arc<CompOffLedger>, LeaveService) {
    let ledger = Arc::new(CompOffLedger::new(store, Arc::new(config.holidays.clone())));
    let leaves = LeaveService::new(
        ledger.clone(),
        AttachmentLinker::new(config.attachment_base_url.clone()),
    );
    (ledger, leaves)
}
