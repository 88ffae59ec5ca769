// Macrokeys Core Library
// Configuration model, validator, and script compiler for per-program
// macro keyboard profiles

pub mod compile;
pub mod config;
pub mod key;
pub mod validate;

pub use compile::{compile, CatchListPayload, CompileOptions, DEFAULT_CATCH_PORT};
pub use config::{
    Binding, Config, ConfigError, Edge, EditError, Layer, Profile, Program, Session,
    DEFAULT_PROFILE, GLOBAL_PROGRAM, SCHEMA_VERSION,
};
pub use key::{name_from_vk, vk_from_name, KeyEntry, KEY_TABLE};
pub use validate::{validate, Conflict};
