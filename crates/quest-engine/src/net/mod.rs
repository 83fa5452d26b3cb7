pub mod envelope;
pub mod lenient;
pub mod pending;
pub mod request;

pub use envelope::{Envelope, GameResult, Outcome, Reply};
pub use pending::RequestTable;
pub use request::{Endpoints, Expect, Method, Request, CSRF_HEADER};
