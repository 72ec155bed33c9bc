pub mod context;
pub mod controller;
pub mod errors;
pub mod outcome;
pub mod services;

pub use controller::{CompletedQuery, DispatchController, DispatchState, RawRequest};
pub use errors::GatewayError;
pub use services::GatewayServices;

#[cfg(test)]
mod controller_test;
