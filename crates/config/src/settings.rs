// Editor settings
// Loaded from ~/.config/gamesheets/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gamesheets_engine::heuristics::Heuristics;
use gamesheets_engine::render::{GridRenderer, PresentationKind, RenderOptions};
use gamesheets_engine::sort::SortScope;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Editor
    #[serde(rename = "editor.smartMode")]
    pub smart_mode: bool,

    #[serde(rename = "editor.presentation")]
    pub presentation: PresentationKind,

    // Sorting
    #[serde(rename = "sort.scope")]
    pub sort_scope: SortScope,

    // Classifier and inference thresholds
    #[serde(rename = "heuristics", default)]
    pub heuristics: Heuristics,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            smart_mode: true,
            presentation: PresentationKind::default(),
            sort_scope: SortScope::default(),
            heuristics: Heuristics::default(),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Editor
    // Smart mode: checkboxes, dropdowns and section headers inferred from data
    "editor.smartMode": true,
    // Presentation: "plain", "sticky-header" or "shadow-isolated"
    "editor.presentation": "plain",

    // Sorting: "sections" keeps section header rows in place, "sheet" sorts everything
    "sort.scope": "sections",

    // Heuristic thresholds
    "heuristics": {
        "uniqueValueCap": 12,
        "sectionMaxNonEmpty": 2,
        "sectionRatioMax": 0.3,
        "sparseColumnMax": 2,
        "dropdownMaxOptions": 10,
        "multilineThreshold": 30
    }
}
"#;

/// Drop `//` comment lines so the file can be annotated.
fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gamesheets");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file. Errors are reported, not replaced
    /// by defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("error reading {}: {}", path.display(), e))?;
        serde_json::from_str(&strip_comments(&contents))
            .map_err(|e| format!("error parsing {}: {}", path.display(), e))
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(&path, DEFAULT_CONFIG) {
            log::warn!("error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { smart: self.smart_mode, heuristics: self.heuristics.clone() }
    }

    /// Renderer configured from these settings.
    pub fn renderer(&self) -> GridRenderer {
        GridRenderer::new(self.render_options(), self.presentation.build())
    }
}
