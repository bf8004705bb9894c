mod health_check;
mod register;

pub use health_check::{health_check, home};
pub use register::{register, RegisterError};
