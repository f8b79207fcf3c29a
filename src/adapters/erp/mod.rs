//! ERP document endpoint integration
//!
//! - [`ErpSyncClient`] - reqwest-based client for update, delete and probe calls
//! - [`DocumentSync`] - trait seam used by the batch processor

pub mod client;
pub mod models;
pub mod traits;

pub use client::{format_probe_date, ErpSyncClient};
pub use models::{ConnectionTestResult, DeletePayload, SyncPayload, SyncResponse, SyncResult};
pub use traits::DocumentSync;
