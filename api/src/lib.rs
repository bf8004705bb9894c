pub mod adapters;
pub mod configuration;
pub mod domain;
pub mod registration_workflow;
pub mod routes;
pub mod startup;
pub mod utils;
