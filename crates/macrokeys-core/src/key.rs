// Macrokeys Key-Code Table
// Static mapping between key names and Windows virtual-key codes

use std::collections::HashMap;
use std::sync::OnceLock;

/// One entry of the key-code table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    /// Canonical key name as exposed by the editor keyboard
    pub name: &'static str,
    /// Windows virtual-key code
    pub vk: u16,
}

/// The closed set of bindable physical keys.
///
/// Covers the full layout the editor renders: function row, number
/// row, letters, punctuation, navigation cluster, arrows, numpad and
/// the modifier keys themselves. Names are matched case-insensitively.
pub static KEY_TABLE: &[KeyEntry] = &[
    // Function row
    KeyEntry { name: "Escape", vk: 27 },
    KeyEntry { name: "F1", vk: 112 },
    KeyEntry { name: "F2", vk: 113 },
    KeyEntry { name: "F3", vk: 114 },
    KeyEntry { name: "F4", vk: 115 },
    KeyEntry { name: "F5", vk: 116 },
    KeyEntry { name: "F6", vk: 117 },
    KeyEntry { name: "F7", vk: 118 },
    KeyEntry { name: "F8", vk: 119 },
    KeyEntry { name: "F9", vk: 120 },
    KeyEntry { name: "F10", vk: 121 },
    KeyEntry { name: "F11", vk: 122 },
    KeyEntry { name: "F12", vk: 123 },
    // Number row
    KeyEntry { name: "`", vk: 192 },
    KeyEntry { name: "1", vk: 49 },
    KeyEntry { name: "2", vk: 50 },
    KeyEntry { name: "3", vk: 51 },
    KeyEntry { name: "4", vk: 52 },
    KeyEntry { name: "5", vk: 53 },
    KeyEntry { name: "6", vk: 54 },
    KeyEntry { name: "7", vk: 55 },
    KeyEntry { name: "8", vk: 56 },
    KeyEntry { name: "9", vk: 57 },
    KeyEntry { name: "0", vk: 48 },
    KeyEntry { name: "-", vk: 189 },
    KeyEntry { name: "=", vk: 187 },
    // Top letter row
    KeyEntry { name: "Tab", vk: 9 },
    KeyEntry { name: "Q", vk: 81 },
    KeyEntry { name: "W", vk: 87 },
    KeyEntry { name: "E", vk: 69 },
    KeyEntry { name: "R", vk: 82 },
    KeyEntry { name: "T", vk: 84 },
    KeyEntry { name: "Y", vk: 89 },
    KeyEntry { name: "U", vk: 85 },
    KeyEntry { name: "I", vk: 73 },
    KeyEntry { name: "O", vk: 79 },
    KeyEntry { name: "P", vk: 80 },
    KeyEntry { name: "[", vk: 219 },
    KeyEntry { name: "]", vk: 221 },
    KeyEntry { name: "\\", vk: 220 },
    // Home row
    KeyEntry { name: "CapsLock", vk: 20 },
    KeyEntry { name: "A", vk: 65 },
    KeyEntry { name: "S", vk: 83 },
    KeyEntry { name: "D", vk: 68 },
    KeyEntry { name: "F", vk: 70 },
    KeyEntry { name: "G", vk: 71 },
    KeyEntry { name: "H", vk: 72 },
    KeyEntry { name: "J", vk: 74 },
    KeyEntry { name: "K", vk: 75 },
    KeyEntry { name: "L", vk: 76 },
    KeyEntry { name: ";", vk: 186 },
    KeyEntry { name: "'", vk: 222 },
    KeyEntry { name: "Enter", vk: 13 },
    // Bottom letter row
    KeyEntry { name: "LShift", vk: 160 },
    KeyEntry { name: "Z", vk: 90 },
    KeyEntry { name: "X", vk: 88 },
    KeyEntry { name: "C", vk: 67 },
    KeyEntry { name: "V", vk: 86 },
    KeyEntry { name: "B", vk: 66 },
    KeyEntry { name: "N", vk: 78 },
    KeyEntry { name: "M", vk: 77 },
    KeyEntry { name: ",", vk: 188 },
    KeyEntry { name: ".", vk: 190 },
    KeyEntry { name: "/", vk: 191 },
    KeyEntry { name: "RShift", vk: 161 },
    // Bottom row
    KeyEntry { name: "LControl", vk: 162 },
    KeyEntry { name: "LWin", vk: 91 },
    KeyEntry { name: "LAlt", vk: 164 },
    KeyEntry { name: "Space", vk: 32 },
    KeyEntry { name: "RAlt", vk: 165 },
    KeyEntry { name: "RWin", vk: 92 },
    KeyEntry { name: "AppsKey", vk: 93 },
    KeyEntry { name: "RControl", vk: 163 },
    // Navigation and editing cluster
    KeyEntry { name: "PrintScreen", vk: 44 },
    KeyEntry { name: "ScrollLock", vk: 145 },
    KeyEntry { name: "Pause", vk: 19 },
    KeyEntry { name: "Insert", vk: 45 },
    KeyEntry { name: "Home", vk: 36 },
    KeyEntry { name: "PgUp", vk: 33 },
    KeyEntry { name: "Delete", vk: 46 },
    KeyEntry { name: "End", vk: 35 },
    KeyEntry { name: "PgDn", vk: 34 },
    // Arrow keys
    KeyEntry { name: "Up", vk: 38 },
    KeyEntry { name: "Down", vk: 40 },
    KeyEntry { name: "Left", vk: 37 },
    KeyEntry { name: "Right", vk: 39 },
    // Numpad
    KeyEntry { name: "NumLock", vk: 144 },
    KeyEntry { name: "NumpadDiv", vk: 111 },
    KeyEntry { name: "NumpadMult", vk: 106 },
    KeyEntry { name: "NumpadSub", vk: 109 },
    KeyEntry { name: "Numpad7", vk: 103 },
    KeyEntry { name: "Numpad8", vk: 104 },
    KeyEntry { name: "Numpad9", vk: 105 },
    KeyEntry { name: "NumpadAdd", vk: 107 },
    KeyEntry { name: "Numpad4", vk: 100 },
    KeyEntry { name: "Numpad5", vk: 101 },
    KeyEntry { name: "Numpad6", vk: 102 },
    KeyEntry { name: "Numpad1", vk: 97 },
    KeyEntry { name: "Numpad2", vk: 98 },
    KeyEntry { name: "Numpad3", vk: 99 },
    KeyEntry { name: "NumpadEnter", vk: 13 },
    KeyEntry { name: "Numpad0", vk: 96 },
    KeyEntry { name: "NumpadDot", vk: 110 },
];

fn name_lookup() -> &'static HashMap<String, u16> {
    static BY_NAME: OnceLock<HashMap<String, u16>> = OnceLock::new();
    BY_NAME.get_or_init(|| {
        KEY_TABLE
            .iter()
            .map(|entry| (entry.name.to_ascii_uppercase(), entry.vk))
            .collect()
    })
}

/// Resolve a key name to its virtual-key code, case-insensitively.
///
/// Names outside the table resolve to `None`; callers treat such keys
/// as inert rather than erroring, so a stale configuration can still
/// load and compile.
pub fn vk_from_name(name: &str) -> Option<u16> {
    name_lookup().get(&name.trim().to_ascii_uppercase()).copied()
}

/// Reverse lookup from a virtual-key code to a key name.
///
/// Where two names share a code (Enter and NumpadEnter both emit 13),
/// the earlier table entry wins.
pub fn name_from_vk(vk: u16) -> Option<&'static str> {
    KEY_TABLE
        .iter()
        .find(|entry| entry.vk == vk)
        .map(|entry| entry.name)
}
