use crate::host::SettingsSource;
use crate::models::ToolFamily;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Setting keys understood by the pipeline.
///
/// The host's settings store is queried with these keys and a default on
/// every save, so the names are part of the crate's public contract.
pub mod keys {
    pub const JS_ENABLED: &str = "minsave.js.enabled";
    pub const JS_SUFFIX: &str = "minsave.js.outputSuffix";
    pub const JS_CONTENT_TYPES: &str = "minsave.js.contentTypes";

    pub const CSS_ENABLED: &str = "minsave.css.enabled";
    pub const CSS_SUFFIX: &str = "minsave.css.outputSuffix";
    pub const CSS_CONTENT_TYPES: &str = "minsave.css.contentTypes";

    pub const TOOL_RUNTIME: &str = "minsave.tool.runtime";
    pub const TOOL_JS_MINIFIER: &str = "minsave.tool.jsMinifier";
    pub const TOOL_CSS_MINIFIER: &str = "minsave.tool.cssMinifier";
}

pub const DEFAULT_JS_SUFFIX: &str = ".min.js";
pub const DEFAULT_CSS_SUFFIX: &str = ".min.css";
pub const DEFAULT_JS_CONTENT_TYPES: &str = "javascript";
pub const DEFAULT_CSS_CONTENT_TYPES: &str = "css";
pub const DEFAULT_RUNTIME: &str = "node";
pub const DEFAULT_JS_MINIFIER: &str = "terser";
pub const DEFAULT_CSS_MINIFIER: &str = "lightningcss";

/// Per-family configuration, assembled fresh from the settings store on
/// every save so changes take effect without a restart.
///
/// Which content types route to a family is itself configuration: the CSS
/// family accepts only `css` by default, and hosts that want `scss`/`less`
/// routed to it extend the content-type setting rather than the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub enabled: bool,
    pub output_suffix: String,
    pub content_types: Vec<String>,
}

impl PipelineConfig {
    /// Read the current configuration for one tool family
    pub fn for_family(settings: &dyn SettingsSource, family: ToolFamily) -> Self {
        let (enabled_key, suffix_key, types_key, suffix_default, types_default) = match family {
            ToolFamily::Js => (
                keys::JS_ENABLED,
                keys::JS_SUFFIX,
                keys::JS_CONTENT_TYPES,
                DEFAULT_JS_SUFFIX,
                DEFAULT_JS_CONTENT_TYPES,
            ),
            ToolFamily::Css => (
                keys::CSS_ENABLED,
                keys::CSS_SUFFIX,
                keys::CSS_CONTENT_TYPES,
                DEFAULT_CSS_SUFFIX,
                DEFAULT_CSS_CONTENT_TYPES,
            ),
        };

        let content_types = settings
            .string_setting(types_key, types_default)
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            enabled: settings.bool_setting(enabled_key, true),
            output_suffix: settings.string_setting(suffix_key, suffix_default),
            content_types,
        }
    }

    /// Check if a document's content-type tag routes to this family
    pub fn matches_content_type(&self, syntax: &str) -> bool {
        self.content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(syntax))
    }
}

/// Paths of the external tools, read from settings at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub runtime: Utf8PathBuf,
    pub js_minifier: Utf8PathBuf,
    pub css_minifier: Utf8PathBuf,
}

impl Toolchain {
    pub fn from_settings(settings: &dyn SettingsSource) -> Self {
        Self {
            runtime: settings
                .string_setting(keys::TOOL_RUNTIME, DEFAULT_RUNTIME)
                .into(),
            js_minifier: settings
                .string_setting(keys::TOOL_JS_MINIFIER, DEFAULT_JS_MINIFIER)
                .into(),
            css_minifier: settings
                .string_setting(keys::TOOL_CSS_MINIFIER, DEFAULT_CSS_MINIFIER)
                .into(),
        }
    }

    pub fn minifier_for(&self, family: ToolFamily) -> &Utf8Path {
        match family {
            ToolFamily::Js => &self.js_minifier,
            ToolFamily::Css => &self.css_minifier,
        }
    }
}

/// On-disk configuration from minsave.yaml
///
/// Backs the standalone [`ConfigManager`](crate::config::ConfigManager);
/// hosts with their own settings store implement
/// [`SettingsSource`](crate::host::SettingsSource) directly instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinsaveConfig {
    #[serde(rename = "Minsave_Settings")]
    pub settings: MinsaveSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinsaveSettings {
    #[serde(rename = "JavaScript", default = "default_js_family")]
    pub javascript: FamilySettings,

    #[serde(rename = "CSS", default = "default_css_family")]
    pub css: FamilySettings,

    #[serde(rename = "Tools", default)]
    pub tools: ToolSettings,

    #[serde(rename = "Install Hints", default = "default_install_hints")]
    pub install_hints: IndexMap<String, String>,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilySettings {
    #[serde(rename = "Enabled", default = "default_true")]
    pub enabled: bool,

    #[serde(rename = "Output Suffix")]
    pub output_suffix: String,

    #[serde(rename = "Content Types")]
    pub content_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(rename = "Runtime", default = "default_runtime")]
    pub runtime: String,

    #[serde(rename = "JS Minifier", default = "default_js_minifier")]
    pub js_minifier: String,

    #[serde(rename = "CSS Minifier", default = "default_css_minifier")]
    pub css_minifier: String,
}

fn default_true() -> bool {
    true
}

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

fn default_js_minifier() -> String {
    DEFAULT_JS_MINIFIER.to_string()
}

fn default_css_minifier() -> String {
    DEFAULT_CSS_MINIFIER.to_string()
}

fn default_js_family() -> FamilySettings {
    FamilySettings {
        enabled: true,
        output_suffix: DEFAULT_JS_SUFFIX.to_string(),
        content_types: vec![DEFAULT_JS_CONTENT_TYPES.to_string()],
    }
}

fn default_css_family() -> FamilySettings {
    FamilySettings {
        enabled: true,
        output_suffix: DEFAULT_CSS_SUFFIX.to_string(),
        content_types: vec![DEFAULT_CSS_CONTENT_TYPES.to_string()],
    }
}

fn default_install_hints() -> IndexMap<String, String> {
    let mut hints = IndexMap::new();
    hints.insert("node".to_string(), "https://nodejs.org/".to_string());
    hints.insert(
        "terser".to_string(),
        "https://www.npmjs.com/package/terser".to_string(),
    );
    hints.insert(
        "lightningcss".to_string(),
        "https://www.npmjs.com/package/lightningcss-cli".to_string(),
    );
    hints
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            js_minifier: default_js_minifier(),
            css_minifier: default_css_minifier(),
        }
    }
}

impl Default for MinsaveSettings {
    fn default() -> Self {
        Self {
            javascript: default_js_family(),
            css: default_css_family(),
            tools: ToolSettings::default(),
            install_hints: default_install_hints(),
            debug_mode: false,
        }
    }
}

impl Default for MinsaveConfig {
    fn default() -> Self {
        Self {
            settings: MinsaveSettings::default(),
        }
    }
}

impl MinsaveConfig {
    fn family_for_key(&self, key: &str) -> Option<&FamilySettings> {
        if key.starts_with("minsave.js.") {
            Some(&self.settings.javascript)
        } else if key.starts_with("minsave.css.") {
            Some(&self.settings.css)
        } else {
            None
        }
    }

    /// Boolean value behind a setting key, if this config carries it
    pub fn bool_value(&self, key: &str) -> Option<bool> {
        match key {
            keys::JS_ENABLED | keys::CSS_ENABLED => self.family_for_key(key).map(|f| f.enabled),
            _ => None,
        }
    }

    /// String value behind a setting key, if this config carries it.
    ///
    /// Content-type lists are flattened to the comma-separated form the
    /// settings contract uses.
    pub fn string_value(&self, key: &str) -> Option<String> {
        match key {
            keys::JS_SUFFIX | keys::CSS_SUFFIX => {
                self.family_for_key(key).map(|f| f.output_suffix.clone())
            }
            keys::JS_CONTENT_TYPES | keys::CSS_CONTENT_TYPES => {
                self.family_for_key(key).map(|f| f.content_types.join(","))
            }
            keys::TOOL_RUNTIME => Some(self.settings.tools.runtime.clone()),
            keys::TOOL_JS_MINIFIER => Some(self.settings.tools.js_minifier.clone()),
            keys::TOOL_CSS_MINIFIER => Some(self.settings.tools.css_minifier.clone()),
            _ => None,
        }
    }

    /// Install-hint URL for a missing tool, used by the startup notification
    pub fn install_hint(&self, tool: &str) -> Option<&str> {
        self.settings.install_hints.get(tool).map(String::as_str)
    }
}
