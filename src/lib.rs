#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

mod error;
pub mod exporter;
pub mod graphite;
pub mod inverter;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod poller;
pub mod protocol;
pub mod settings;

pub use error::Error;
pub use protocol::decode_response;
