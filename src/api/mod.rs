//! HTTP surface of the gate.
//!
//! A thin axum router: handlers parse the request, call one [`Gate`]
//! operation and map the result to a status code. No business logic lives
//! here.
//!
//! | Route | Method | Gate operation |
//! |-------|--------|----------------|
//! | `/api/adduser/:user/:ttl` | POST | `issue_credential` |
//! | `/api/delete/:user` | DELETE | `revoke_credential` |
//! | `/api/authenticate/:user?password=` | GET | `authenticate` |
//! | `/api/remove-invalid-records` | POST | `trigger_sweep` |
//! | `/api/getcode/:user` | GET | `fetch_artifact` |
//! | `/healthz` | GET | liveness |
//!
//! [`Gate`]: crate::gate::Gate

mod handlers;
mod server;

pub use handlers::ApiError;
pub use server::{router, serve};
