// Macrokeys Validator
// Structural conflict checks that gate save and compile

use std::collections::HashMap;

use crate::config::{Config, GLOBAL_PROGRAM};

/// A validation conflict. Conflicts block saving and compiling but
/// never mutate the model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    /// Two programs claim the same (executable, window title)
    /// identity; window matching could only ever reach one of them.
    #[error("\"{display} [{key}]\" conflicts with \"{other_display} [{other_key}]\": both target the same executable and window title")]
    ProgramIdentity {
        display: String,
        key: String,
        other_display: String,
        other_key: String,
    },

    /// A program's cycle hotkey is also bound as a macro key in one
    /// of its profiles, which is ambiguous at dispatch time.
    #[error("cycle hotkey \"{hotkey}\" collides with a key bound in profile \"{profile}\"")]
    CycleHotkey { hotkey: String, profile: String },
}

/// Run all checks and report the first conflict found.
///
/// Program-identity conflicts are reported before cycle-hotkey
/// conflicts; given the same model the same conflict is reported.
/// `editing` names the program currently open in the editor, which
/// scopes the cycle-hotkey check.
pub fn validate(config: &Config, editing: &str) -> Option<Conflict> {
    check_program_identity(config).or_else(|| check_cycle_hotkey(config, editing))
}

/// Detect two non-Global programs with the same case-folded
/// (executable name, window title filter) pair.
pub fn check_program_identity(config: &Config) -> Option<Conflict> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (key, program) in &config.programs {
        if key == GLOBAL_PROGRAM || program.exe_name.is_empty() {
            continue;
        }
        let identity = format!(
            "{}|{}",
            program.exe_name.to_lowercase(),
            program.window_title.to_lowercase()
        );
        if let Some(other_key) = seen.get(&identity) {
            let other = &config.programs[*other_key];
            return Some(Conflict::ProgramIdentity {
                display: display_name(&program.display_name, key),
                key: key.clone(),
                other_display: display_name(&other.display_name, other_key),
                other_key: (*other_key).to_string(),
            });
        }
        seen.insert(identity, key);
    }
    None
}

/// Detect a cycle hotkey that is also bound in any layer of any
/// profile of the program being edited. Comparison is
/// case-insensitive, matching the target interpreter's hotkey rules.
pub fn check_cycle_hotkey(config: &Config, editing: &str) -> Option<Conflict> {
    let program = config.programs.get(editing)?;
    let hotkey = program.cycle_hotkey.trim();
    if hotkey.is_empty() {
        return None;
    }

    for (profile_name, profile) in &program.profiles {
        if profile.binds_key(hotkey) {
            return Some(Conflict::CycleHotkey {
                hotkey: hotkey.to_string(),
                profile: profile_name.clone(),
            });
        }
    }
    None
}

fn display_name(display: &str, key: &str) -> String {
    if display.is_empty() {
        key.to_string()
    } else {
        display.to_string()
    }
}
