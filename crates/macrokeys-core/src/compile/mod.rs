// Macrokeys Compiler
// Lowers the configuration model into a runnable AutoHotkey v2 script

pub mod catchlist;
pub mod emit;
pub mod ident;
mod script;

pub use catchlist::{catch_vks, join_vks, profile_vks, CatchListPayload};
pub use emit::{escape_str, Node};
pub use ident::macro_ident;

use crate::config::Config;

/// Default loopback port the helper listens on for catch-list pushes.
pub const DEFAULT_CATCH_PORT: u16 = 12012;

/// Knobs that vary per installation rather than per configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Raw-input device number whose reports the script acts on.
    /// Reports from any other device are ignored.
    pub device_number: u32,
    /// Loopback TCP port of the helper's catch-list listener.
    pub catch_port: u16,
    /// Interval of the periodic catch-list refresh, in milliseconds.
    pub poll_interval_ms: u32,
    /// Path the script launches the device-discrimination helper from.
    pub helper_exe: String,
    /// Extra `#Include` line placed after the header, if any.
    pub include_path: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            device_number: 1,
            catch_port: DEFAULT_CATCH_PORT,
            poll_interval_ms: 1000,
            helper_exe: "MultiKB_For_AutoHotkey.exe".to_string(),
            include_path: None,
        }
    }
}

/// Compile a configuration into AutoHotkey v2 source.
///
/// The model is assumed validated; compilation itself never fails.
/// Bindings whose key name has no virtual-key code still get a
/// callable but no dispatch slot, so they are inert at runtime.
pub fn compile(config: &Config, opts: &CompileOptions) -> String {
    script::emit_script(config, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Edge, Layer, Session, DEFAULT_PROFILE, GLOBAL_PROGRAM};

    #[test]
    fn test_compile_is_deterministic() {
        let config = Config::default_model();
        let opts = CompileOptions::default();
        assert_eq!(compile(&config, &opts), compile(&config, &opts));
    }

    #[test]
    fn test_bound_key_appears_in_dispatch_table() {
        let mut session = Session::new(Config::default_model());
        session
            .set_binding(
                GLOBAL_PROGRAM,
                DEFAULT_PROFILE,
                Layer::Ctrl,
                "A",
                Edge::Down,
                "Send \"hi\"",
            )
            .unwrap();
        let script = compile(&session.into_config(), &CompileOptions::default());

        assert!(script.contains("Macro_Global_Default_Ctrl_A_Down() {"));
        assert!(script.contains("    Send \"hi\""));
        assert!(script.contains("\"Global|Default|ctrl|65|down\", Macro_Global_Default_Ctrl_A_Down"));
    }

    #[test]
    fn test_layer_vks_table_covers_every_profile() {
        let mut session = Session::new(Config::default_model());
        let notepad = session.add_program("notepad.exe");
        session.add_profile(&notepad, "Work").unwrap();
        let script = compile(&session.into_config(), &CompileOptions::default());

        assert!(script.contains("\"Global|Default\""));
        assert!(script.contains("\"notepad|Default\""));
        assert!(script.contains("\"notepad|Work\""));
    }
}
