// Macrokeys Catch-List Computation
// Virtual-key sets pushed to the device-discrimination helper

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{Config, Layer, Profile, GLOBAL_PROGRAM};
use crate::key;

/// Wire payload of one catch-list push.
///
/// Serialized as a single JSON object terminated by a newline and
/// written to the helper's loopback port; no response is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatchListPayload {
    #[serde(rename = "DeviceNumber")]
    pub device_number: u32,
    #[serde(rename = "CatchVKCodes")]
    pub catch_vk_codes: String,
}

impl CatchListPayload {
    pub fn new(device_number: u32, vks: &[u16]) -> Self {
        Self {
            device_number,
            catch_vk_codes: join_vks(vks),
        }
    }

    /// The newline-terminated wire form.
    pub fn to_wire(&self) -> String {
        let mut line =
            serde_json::to_string(self).expect("payload serialization is infallible");
        line.push('\n');
        line
    }
}

/// Every virtual-key code bound anywhere in one profile's four
/// layers, sorted and deduplicated. Key names with no table entry
/// contribute nothing.
pub fn profile_vks(profile: &Profile) -> Vec<u16> {
    use strum::IntoEnumIterator;
    let mut vks = BTreeSet::new();
    for layer in Layer::iter() {
        for key_name in profile.layer(layer).keys() {
            if let Some(vk) = key::vk_from_name(key_name) {
                vks.insert(vk);
            }
        }
    }
    vks.into_iter().collect()
}

/// The catch list for a resolved context: the union of the context's
/// active-profile keys, Global's active-profile keys, and every
/// configured cycle hotkey across all programs.
pub fn catch_vks(config: &Config, context: &str) -> Vec<u16> {
    let mut vks = BTreeSet::new();

    let mut add_active_profile = |program_key: &str| {
        if let Some(program) = config.programs.get(program_key) {
            if let Some(profile) = program.profiles.get(&program.active_profile) {
                vks.extend(profile_vks(profile));
            }
        }
    };
    add_active_profile(context);
    if context != GLOBAL_PROGRAM {
        add_active_profile(GLOBAL_PROGRAM);
    }

    for program in config.programs.values() {
        if let Some(vk) = key::vk_from_name(&program.cycle_hotkey) {
            vks.insert(vk);
        }
    }

    vks.into_iter().collect()
}

/// Comma-separated rendering used both on the wire and in the
/// emitted `LayerVks` table.
pub fn join_vks(vks: &[u16]) -> String {
    vks.iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Edge, Session, DEFAULT_PROFILE};

    fn sample_config() -> Config {
        let mut session = Session::new(Config::default_model());
        session
            .set_binding(GLOBAL_PROGRAM, DEFAULT_PROFILE, Layer::Base, "A", Edge::Down, "g")
            .unwrap();
        let notepad = session.add_program("C:\\win\\notepad.exe");
        session
            .set_binding(&notepad, DEFAULT_PROFILE, Layer::Base, "A", Edge::Down, "x")
            .unwrap();
        session
            .set_binding(&notepad, DEFAULT_PROFILE, Layer::Shift, "B", Edge::Up, "y")
            .unwrap();
        session.add_profile(&notepad, "Alt").unwrap();
        session
            .set_binding(&notepad, "Alt", Layer::Base, "C", Edge::Down, "z")
            .unwrap();
        session.set_active_profile(&notepad, DEFAULT_PROFILE).unwrap();
        session.set_cycle_hotkey(&notepad, "F9").unwrap();
        session.into_config()
    }

    #[test]
    fn test_profile_vks_unions_all_layers() {
        let config = sample_config();
        let profile = &config.programs["notepad"].profiles[DEFAULT_PROFILE];
        assert_eq!(profile_vks(profile), vec![65, 66]);
    }

    #[test]
    fn test_catch_vks_includes_global_and_cycle_hotkeys() {
        let config = sample_config();
        // A (65, both contexts), B (66, shift layer), F9 (120, cycle)
        assert_eq!(catch_vks(&config, "notepad"), vec![65, 66, 120]);
    }

    #[test]
    fn test_catch_vks_for_global_context() {
        let config = sample_config();
        // Global's own A plus every cycle hotkey
        assert_eq!(catch_vks(&config, GLOBAL_PROGRAM), vec![65, 120]);
    }

    #[test]
    fn test_profile_switch_changes_catch_set() {
        let mut config = sample_config();
        config.programs.get_mut("notepad").unwrap().active_profile = "Alt".to_string();
        // C (67) replaces A/B from the notepad side; Global still
        // contributes A (65), cycle hotkey stays.
        assert_eq!(catch_vks(&config, "notepad"), vec![65, 67, 120]);
    }

    #[test]
    fn test_unresolvable_keys_are_silent() {
        let config = Config::default_model();
        // The default model binds F13, which has no VK entry.
        assert_eq!(catch_vks(&config, GLOBAL_PROGRAM), Vec::<u16>::new());
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = CatchListPayload::new(1, &[65, 66, 120]);
        assert_eq!(
            payload.to_wire(),
            "{\"DeviceNumber\":1,\"CatchVKCodes\":\"65,66,120\"}\n"
        );
    }
}
