mod cron_auth;
mod identity;
mod request_id;

pub use cron_auth::cron_auth_middleware;
pub use identity::{CallerIdentity, identity_middleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
