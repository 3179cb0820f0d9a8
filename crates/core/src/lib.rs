pub mod auth;
pub mod catalog;
pub mod category;
pub mod config;
pub mod jobs;
pub mod resolver;
pub mod search;
pub mod testing;
pub mod transfer;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
