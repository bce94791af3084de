pub mod error;
pub mod models;

// DFI domain modules
pub mod branch;
pub mod close_request;
pub mod exec_case;
pub mod rpp_case;
pub mod statistics;

pub use error::*;
pub use models::*;

pub use branch::*;
pub use close_request::*;
pub use exec_case::*;
pub use rpp_case::*;
pub use statistics::*;
