// Macrokeys Editing Session
// Single-owner mutation surface over the configuration model

use super::model::{
    Binding, Config, Edge, Layer, Profile, Program, DEFAULT_PROFILE, GLOBAL_PROGRAM,
};

/// Editing operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("the Global program cannot be deleted")]
    CannotDeleteGlobal,

    #[error("the Default profile cannot be deleted")]
    CannotDeleteDefault,

    #[error("no such program: {0}")]
    UnknownProgram(String),

    #[error("no such profile: {0}")]
    UnknownProfile(String),

    #[error("profile \"{0}\" already exists")]
    ProfileExists(String),
}

/// Owns the live configuration for the duration of an edit session.
///
/// All mutation goes through this type; the model itself carries no
/// ambient state. The session is single-threaded by construction.
#[derive(Debug)]
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Add a program for the executable at `exe_path`.
    ///
    /// The program key is derived from the executable base name and
    /// made unique with `_2`, `_3`, ... suffixes on collision; the
    /// key never changes afterwards. Returns the assigned key.
    pub fn add_program(&mut self, exe_path: &str) -> String {
        let exe_name = exe_base_name(exe_path);
        let key = self.unique_program_key(&derive_program_key(&exe_name));

        let mut program = Program::new(&key);
        program.path = exe_path.to_string();
        program.exe_name = exe_name;
        self.config.programs.insert(key.clone(), program);
        key
    }

    pub fn remove_program(&mut self, key: &str) -> Result<(), EditError> {
        if key == GLOBAL_PROGRAM {
            return Err(EditError::CannotDeleteGlobal);
        }
        self.config
            .programs
            .shift_remove(key)
            .map(|_| ())
            .ok_or_else(|| EditError::UnknownProgram(key.to_string()))
    }

    /// Rename sets the display name only; the internal key is stable.
    pub fn rename_program(&mut self, key: &str, display_name: &str) -> Result<(), EditError> {
        self.program_mut(key)?.display_name = display_name.to_string();
        Ok(())
    }

    /// Point a program at a different executable, re-deriving its
    /// matched executable name from the path.
    pub fn set_path(&mut self, key: &str, exe_path: &str) -> Result<(), EditError> {
        let exe_name = exe_base_name(exe_path);
        let program = self.program_mut(key)?;
        program.path = exe_path.to_string();
        program.exe_name = exe_name;
        Ok(())
    }

    pub fn set_window_title(&mut self, key: &str, filter: &str) -> Result<(), EditError> {
        self.program_mut(key)?.window_title = filter.to_string();
        Ok(())
    }

    pub fn add_profile(&mut self, key: &str, name: &str) -> Result<(), EditError> {
        let program = self.program_mut(key)?;
        if program.profiles.contains_key(name) {
            return Err(EditError::ProfileExists(name.to_string()));
        }
        program.profiles.insert(name.to_string(), Profile::default());
        program.active_profile = name.to_string();
        Ok(())
    }

    pub fn remove_profile(&mut self, key: &str, name: &str) -> Result<(), EditError> {
        if name == DEFAULT_PROFILE {
            return Err(EditError::CannotDeleteDefault);
        }
        let program = self.program_mut(key)?;
        if program.profiles.shift_remove(name).is_none() {
            return Err(EditError::UnknownProfile(name.to_string()));
        }
        if program.active_profile == name {
            program.active_profile = DEFAULT_PROFILE.to_string();
        }
        Ok(())
    }

    pub fn set_active_profile(&mut self, key: &str, name: &str) -> Result<(), EditError> {
        let program = self.program_mut(key)?;
        if !program.profiles.contains_key(name) {
            return Err(EditError::UnknownProfile(name.to_string()));
        }
        program.active_profile = name.to_string();
        Ok(())
    }

    /// Set one edge of a binding. Blanking the last non-empty edge
    /// removes the binding from the layer entirely, so an unbound key
    /// is never persisted as an empty pair.
    pub fn set_binding(
        &mut self,
        key: &str,
        profile: &str,
        layer: Layer,
        key_name: &str,
        edge: Edge,
        script: &str,
    ) -> Result<(), EditError> {
        let program = self.program_mut(key)?;
        let profile = program
            .profiles
            .get_mut(profile)
            .ok_or_else(|| EditError::UnknownProfile(profile.to_string()))?;
        let bindings = profile.layer_mut(layer);

        let mut binding = bindings.get(key_name).cloned().unwrap_or_default();
        match edge {
            Edge::Down => binding.down = script.to_string(),
            Edge::Up => binding.up = script.to_string(),
        }
        if binding.is_empty() {
            bindings.shift_remove(key_name);
        } else {
            bindings.insert(key_name.to_string(), binding);
        }
        Ok(())
    }

    pub fn set_cycle_hotkey(&mut self, key: &str, key_name: &str) -> Result<(), EditError> {
        self.program_mut(key)?.cycle_hotkey = key_name.to_string();
        Ok(())
    }

    pub fn clear_cycle_hotkey(&mut self, key: &str) -> Result<(), EditError> {
        self.program_mut(key)?.cycle_hotkey = String::new();
        Ok(())
    }

    fn program_mut(&mut self, key: &str) -> Result<&mut Program, EditError> {
        self.config
            .programs
            .get_mut(key)
            .ok_or_else(|| EditError::UnknownProgram(key.to_string()))
    }

    fn unique_program_key(&self, base: &str) -> String {
        if !self.config.programs.contains_key(base) {
            return base.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}_{counter}");
            if !self.config.programs.contains_key(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Base name of an executable path. Configurations carry Windows
/// paths whatever the host platform, so both separator conventions
/// are split here rather than through `std::path`.
fn exe_base_name(exe_path: &str) -> String {
    exe_path
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(exe_path)
        .to_string()
}

/// Derive a program key from an executable name: strip the `.exe`
/// suffix and any spaces or parentheses, falling back to "Program"
/// when nothing is left.
fn derive_program_key(exe_name: &str) -> String {
    let stem = exe_name
        .strip_suffix(".exe")
        .or_else(|| exe_name.strip_suffix(".EXE"))
        .unwrap_or(exe_name);
    let cleaned: String = stem
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '(' && *ch != ')')
        .collect();
    if cleaned.is_empty() {
        "Program".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Config::default_model())
    }

    #[test]
    fn test_add_program_derives_key() {
        let mut session = session();
        let key = session.add_program("C:\\Apps\\My Tool (x64).exe");
        assert_eq!(key, "MyToolx64");
        let program = &session.config().programs[&key];
        assert_eq!(program.exe_name, "My Tool (x64).exe");
        assert!(program.profiles.contains_key(DEFAULT_PROFILE));
    }

    #[test]
    fn test_add_program_deduplicates_keys() {
        let mut session = session();
        let first = session.add_program("C:\\a\\notepad.exe");
        let second = session.add_program("C:\\b\\notepad.exe");
        let third = session.add_program("C:\\c\\notepad.exe");
        assert_eq!(first, "notepad");
        assert_eq!(second, "notepad_2");
        assert_eq!(third, "notepad_3");
    }

    #[test]
    fn test_global_is_undeletable() {
        let mut session = session();
        assert_eq!(
            session.remove_program(GLOBAL_PROGRAM),
            Err(EditError::CannotDeleteGlobal)
        );
    }

    #[test]
    fn test_default_profile_is_undeletable() {
        let mut session = session();
        assert_eq!(
            session.remove_profile(GLOBAL_PROGRAM, DEFAULT_PROFILE),
            Err(EditError::CannotDeleteDefault)
        );
    }

    #[test]
    fn test_add_profile_selects_it() {
        let mut session = session();
        session.add_profile(GLOBAL_PROGRAM, "Work").unwrap();
        assert_eq!(session.config().programs[GLOBAL_PROGRAM].active_profile, "Work");
        assert_eq!(
            session.add_profile(GLOBAL_PROGRAM, "Work"),
            Err(EditError::ProfileExists("Work".to_string()))
        );
    }

    #[test]
    fn test_remove_active_profile_falls_back_to_default() {
        let mut session = session();
        session.add_profile(GLOBAL_PROGRAM, "Work").unwrap();
        session.remove_profile(GLOBAL_PROGRAM, "Work").unwrap();
        assert_eq!(
            session.config().programs[GLOBAL_PROGRAM].active_profile,
            DEFAULT_PROFILE
        );
    }

    #[test]
    fn test_blanking_both_edges_removes_binding() {
        let mut session = session();
        session
            .set_binding(GLOBAL_PROGRAM, DEFAULT_PROFILE, Layer::Base, "A", Edge::Down, "X")
            .unwrap();
        session
            .set_binding(GLOBAL_PROGRAM, DEFAULT_PROFILE, Layer::Base, "A", Edge::Up, "Y")
            .unwrap();
        session
            .set_binding(GLOBAL_PROGRAM, DEFAULT_PROFILE, Layer::Base, "A", Edge::Down, "")
            .unwrap();
        assert!(session.config().programs[GLOBAL_PROGRAM].profiles[DEFAULT_PROFILE]
            .hotkeys
            .contains_key("A"));
        session
            .set_binding(GLOBAL_PROGRAM, DEFAULT_PROFILE, Layer::Base, "A", Edge::Up, "  ")
            .unwrap();
        assert!(!session.config().programs[GLOBAL_PROGRAM].profiles[DEFAULT_PROFILE]
            .hotkeys
            .contains_key("A"));
    }

    #[test]
    fn test_bindings_land_on_the_requested_layer() {
        let mut session = session();
        session
            .set_binding(GLOBAL_PROGRAM, DEFAULT_PROFILE, Layer::Ctrl, "B", Edge::Down, "X")
            .unwrap();
        let profile = &session.config().programs[GLOBAL_PROGRAM].profiles[DEFAULT_PROFILE];
        assert!(profile.ctrl_hotkeys.contains_key("B"));
        assert!(!profile.hotkeys.contains_key("B"));
    }

    #[test]
    fn test_rename_keeps_key_stable() {
        let mut session = session();
        let key = session.add_program("C:\\a\\notepad.exe");
        session.rename_program(&key, "My Notepad").unwrap();
        let program = &session.config().programs[&key];
        assert_eq!(program.display_name, "My Notepad");
        assert!(session.config().programs.contains_key("notepad"));
    }

    #[test]
    fn test_cycle_hotkey_set_and_clear() {
        let mut session = session();
        session.set_cycle_hotkey(GLOBAL_PROGRAM, "F12").unwrap();
        assert_eq!(session.config().programs[GLOBAL_PROGRAM].cycle_hotkey, "F12");
        session.clear_cycle_hotkey(GLOBAL_PROGRAM).unwrap();
        assert!(session.config().programs[GLOBAL_PROGRAM].cycle_hotkey.is_empty());
    }

    #[test]
    fn test_exe_base_name_splits_both_separators() {
        assert_eq!(exe_base_name("C:\\Apps\\app.exe"), "app.exe");
        assert_eq!(exe_base_name("/opt/apps/app.exe"), "app.exe");
        assert_eq!(exe_base_name("app.exe"), "app.exe");
        assert_eq!(exe_base_name("C:\\Apps\\"), "");
    }

    #[test]
    fn test_set_path_rederives_exe_name_from_windows_path() {
        let mut session = session();
        let key = session.add_program("C:\\a\\notepad.exe");
        session.set_path(&key, "D:\\b\\editor.exe").unwrap();
        let program = &session.config().programs[&key];
        assert_eq!(program.exe_name, "editor.exe");
        assert_eq!(program.path, "D:\\b\\editor.exe");
    }

    #[test]
    fn test_derive_program_key_fallback() {
        assert_eq!(derive_program_key("( ).exe"), "Program");
        assert_eq!(derive_program_key("code.exe"), "code");
    }
}
