pub mod inventory;
pub mod jobs;
pub mod payroll;
