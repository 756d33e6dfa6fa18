mod schema;

pub use schema::{
    Config, ConversationConfig, DatabaseConfig, EnvOverrides, ProviderConfig, ServerConfig,
};
