mod registry;

pub use registry::CredentialRegistry;
