pub mod directory;
pub mod router;

pub use directory::{StaticDirectory, UserDirectory};
pub use router::{resolve_mentions, resolve_recipients, route, Mention};
