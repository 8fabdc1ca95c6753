// ABOUTME: Command module aggregator for the stagehand CLI.
// ABOUTME: Re-exports one handler per subcommand.

mod activate;
mod deploy;
mod deployments;
mod flush;
mod invalidate;
mod session;
mod targets;
mod token;
mod whoami;

pub use activate::activate;
pub use deploy::deploy;
pub use deployments::deployments;
pub use flush::flush;
pub use invalidate::invalidate;
pub use targets::targets;
pub use token::token;
pub use whoami::whoami;
