mod exit_answer;
mod password;
mod role;
mod username;

pub use exit_answer::{ExitAnswer, MAX_ANSWERS};
pub use password::Password;
pub use role::Role;
pub use username::Username;
