use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::workflow::StepId;

/// Localized title and description for one step.
#[derive(Debug, Clone, Deserialize)]
pub struct StepText {
    pub title: String,
    pub description: String,
}

/// On-disk override file shape.
#[derive(Debug, Deserialize)]
struct LocaleFile {
    #[serde(default)]
    steps: HashMap<String, StepText>,
}

/// Text table for the fixed step set.
///
/// Ships with built-in English text; a TOML file can override any subset of
/// steps. A step with no entry at all is possible only for hand-built tables
/// (tests), but the lookup API stays fallible so the view layer has to handle
/// the miss explicitly.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    steps: [Option<StepText>; 7],
}

impl LocaleTable {
    /// Table with no entries. Every lookup misses.
    pub fn empty() -> Self {
        Self {
            steps: std::array::from_fn(|_| None),
        }
    }

    /// The built-in English table.
    pub fn english() -> Self {
        let mut table = Self::empty();
        let texts = [
            (
                StepId::Init,
                "Init",
                "Vault initializing process. Vault is hit with configured number of unseal \
                 key shares, so after getting keys app performs unsealing. In the end - checks \
                 if Vault was initialized and unsealed.",
            ),
            (
                StepId::Up,
                "Vault is up",
                "Checking whether the Vault is running and ready to receive requests.",
            ),
            (
                StepId::Auth,
                "Authentication methods setup",
                "Enabling or disabling HCL configurations with described authentication methods.",
            ),
            (
                StepId::Secret,
                "Enabling secrets engines",
                "Enabling or disabling HCL configurations with described secret engines. Note \
                 that configured secret paths could differ from the standard ones. If you not \
                 sure which paths are used, please double-check your deployment configuration.",
            ),
            (
                StepId::Policy,
                "Policies setup",
                "Enabling or disabling HCL configurations with described policies.",
            ),
            (
                StepId::Role,
                "Roles setup",
                "Enabling or disabling HCL configurations with described roles.",
            ),
            (
                StepId::Clean,
                "Clean up",
                "Getting rid of unused temporary data.",
            ),
        ];
        for (id, title, description) in texts {
            table.set(
                id,
                StepText {
                    title: title.to_string(),
                    description: description.to_string(),
                },
            );
        }
        table
    }

    /// Load the English table with overrides from a TOML file.
    ///
    /// A missing file is not an error; the built-in text is used as is.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut table = Self::english();

        if !path.exists() {
            info!("Locale file not found at {:?}, using built-in text", path);
            return Ok(table);
        }

        let content = std::fs::read_to_string(path)?;
        let file: LocaleFile = toml::from_str(&content)?;
        for (name, text) in file.steps {
            match StepId::parse(&name) {
                Some(id) => table.set(id, text),
                None => warn!("Ignoring locale entry for unknown step '{}'", name),
            }
        }
        info!("Loaded locale overrides from {:?}", path);
        Ok(table)
    }

    pub fn set(&mut self, id: StepId, text: StepText) {
        self.steps[id as usize] = Some(text);
    }

    pub fn title(&self, id: StepId) -> Option<&str> {
        self.steps[id as usize].as_ref().map(|t| t.title.as_str())
    }

    pub fn description(&self, id: StepId) -> Option<&str> {
        self.steps[id as usize]
            .as_ref()
            .map(|t| t.description.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn english_table_covers_every_step() {
        let table = LocaleTable::english();
        for id in StepId::ALL {
            assert!(table.title(id).is_some_and(|t| !t.is_empty()));
            assert!(table.description(id).is_some_and(|d| !d.is_empty()));
        }
    }

    #[test]
    fn missing_file_falls_back_to_builtin_text() {
        let table = LocaleTable::load_from("/nonexistent/locale.toml").unwrap();
        assert_eq!(table.title(StepId::Clean), Some("Clean up"));
    }

    #[test]
    fn override_file_replaces_named_steps_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[steps.init]\ntitle = \"Initialisierung\"\ndescription = \"Vault wird initialisiert.\"\n"
        )
        .unwrap();

        let table = LocaleTable::load_from(file.path()).unwrap();
        assert_eq!(table.title(StepId::Init), Some("Initialisierung"));
        assert_eq!(table.title(StepId::Up), Some("Vault is up"));
    }

    #[test]
    fn unknown_step_entries_are_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[steps.bogus]\ntitle = \"x\"\ndescription = \"y\"\n"
        )
        .unwrap();

        let table = LocaleTable::load_from(file.path()).unwrap();
        assert_eq!(table.title(StepId::Init), Some("Init"));
    }

    #[test]
    fn malformed_override_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "steps = 3").unwrap();
        assert!(LocaleTable::load_from(file.path()).is_err());
    }
}
