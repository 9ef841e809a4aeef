pub mod batches;
pub mod delete;
pub mod health;
pub mod home;
pub mod logs;
pub mod upload;
