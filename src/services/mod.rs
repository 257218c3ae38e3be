// Core services
pub mod compensation;
pub mod inventory;
pub mod jobs;
pub mod payroll;
