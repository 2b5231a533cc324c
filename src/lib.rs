// Lenient readers for controller JSON
pub mod value;

// Agent metadata cache
pub mod agent;

// Observation store and location estimation
pub mod observation;

// Entity index, paging
pub mod index;

// Monitor alias overlay
pub mod monitor;

// Attack-scan state machine and polling schedule
pub mod scan_state;

// Ingestion gateway
pub mod ingest;

// Push-event contract
pub mod event;

// Controller service client
pub mod client;

// Continuous-scan registry
pub mod continuous;

// Dashboard service object
pub mod dashboard;

// Configuration
pub mod config;

// HTTP APIs
pub mod api;
