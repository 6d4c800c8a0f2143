mod account;
mod investment;
mod prompt;
mod session;
mod store;

pub use self::{prompt::Console, session::Session, store::Store};
