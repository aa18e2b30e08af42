pub mod paths;
pub mod secret_service;
pub mod secret_storage;

pub use secret_service::FileSecretService;
pub use secret_storage::SecretStorage;
