mod command;
mod event;
mod reply;
mod router;
mod webhook;

pub use command::{args, Command};
pub use event::InboundEvent;
pub use reply::Reply;
pub use router::{CommandRouter, CommandRouterBuilder};
pub use webhook::router;
