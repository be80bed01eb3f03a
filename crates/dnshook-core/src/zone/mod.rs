//! Zone discovery
//!
//! - [`ZoneResolver`]: hostname → zone apex name, via SOA queries
//! - [`ZoneDirectoryClient`]: zone apex name → provider zone id

pub mod directory;
pub mod resolver;

pub use directory::{ZONE_PAGE_SIZE, ZoneDirectoryClient};
pub use resolver::{Transition, ZoneResolver, ZoneWalk};
