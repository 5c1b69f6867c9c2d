pub mod config;
pub mod error;
pub mod module;
pub mod principal;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use principal::{FixedPrincipal, GatewayHeaders, Principal, PrincipalResolver};
pub use types::{ActiveFilter, new_id, now_rfc3339};
