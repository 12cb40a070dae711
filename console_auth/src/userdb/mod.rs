mod directory;
mod errors;
mod types;

pub use directory::UserDirectory;
pub use errors::UserError;
pub use types::{Role, UserRecord, UserStatus};
