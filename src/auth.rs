mod credentials;
mod guards;
mod session;

pub use credentials::token_from_headers;
pub use guards::{Administrator, AuthenticatedUser, Employee};
pub use session::{Session, SessionKeys};
