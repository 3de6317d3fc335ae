use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::mail::Mailer;
use crate::otp::OtpSlot;
use crate::storage::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub mailer: Arc<dyn Mailer>,
    pub blobs: Arc<dyn BlobStore>,
    pub otp: Arc<OtpSlot>,
    pub config: Arc<Config>,
}
