// Macrokeys Configuration API
// Model types, schema migration and the editing session

pub mod migrate;
pub mod model;
pub mod session;

pub use model::{
    Binding, Config, ConfigError, Edge, Layer, Profile, Program, DEFAULT_PROFILE,
    GLOBAL_PROGRAM, SCHEMA_VERSION,
};
pub use session::{EditError, Session};
