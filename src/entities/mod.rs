pub mod mechanic;
pub mod part;
pub mod part_usage_line;
pub mod payment_record;
pub mod service_catalog_entry;
pub mod service_job;

pub use service_job::JobStatus;
