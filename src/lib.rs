pub mod exec;
pub mod frontend;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod query;
pub mod serialize;
pub mod shared;
pub mod trace;
