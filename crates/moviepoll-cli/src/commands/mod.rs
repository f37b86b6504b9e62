//! Command handlers, one module per subcommand group

pub mod cycle;
pub mod movie;
pub mod setting;
pub mod status;
pub mod user;
