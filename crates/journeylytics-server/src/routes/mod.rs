pub mod channels;
pub mod cohorts;
pub mod export;
pub mod funnel;
pub mod health;
pub mod reload;
pub mod summary;
