//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [placeholders]
//! fallback_section = "FILE_PATHS"
//! max_passes = 10
//!
//! [dates]
//! output_format = "%d/%m/%Y"
//!
//! [theme]
//! comment = "#a9a9a9"
//! bool_true = "#0000ff"
//!
//! [run]
//! program = "cwatm"
//! stop_grace_ms = 3000
//! args = ["-lg"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::color::Rgba;
use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::fields::DEFAULT_OUTPUT_FORMAT;
use crate::highlight::{Theme, TokenKind};
use crate::placeholder::{DEFAULT_FALLBACK_SECTION, DEFAULT_MAX_PASSES, PlaceholderResolver};
use crate::runner::{DEFAULT_STOP_GRACE, RunRequest};
use crate::style::Style;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub fallback_section: String,
    pub max_passes: usize,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            fallback_section: DEFAULT_FALLBACK_SECTION.to_string(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DateConfig {
    /// `chrono` strftime pattern used when writing dates.
    pub output_format: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }
}

/// Hex color overrides; unset entries keep the classic theme.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub default: Option<String>,
    pub marker: Option<String>,
    pub header: Option<String>,
    pub comment: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub bool_true: Option<String>,
    pub bool_false: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Model executable; the command line can override it.
    pub program: Option<PathBuf>,
    /// Grace period before an uncooperative model run is abandoned.
    pub stop_grace_ms: u64,
    /// Arguments passed to the model.
    pub args: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            program: None,
            stop_grace_ms: u64::try_from(DEFAULT_STOP_GRACE.as_millis()).unwrap_or(3000),
            args: vec!["-lg".to_string()],
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub placeholders: PlaceholderConfig,
    pub dates: DateConfig,
    pub theme: ThemeConfig,
    pub run: RunConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Reject values that would only fail later.
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.dates.output_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!(
                "invalid date format: {}",
                self.dates.output_format
            )));
        }
        if self.placeholders.max_passes == 0 {
            return Err(Error::Config("placeholders.max_passes must be at least 1".into()));
        }
        self.theme()?;
        Ok(())
    }

    /// Classic theme with the configured overrides applied.
    pub fn theme(&self) -> Result<Theme> {
        let t = &self.theme;
        let mut theme = Theme::classic();
        if let Some(hex) = &t.default {
            theme = theme.with_default_style(Style::fg(parse_color(hex)?));
        }
        let overrides = [
            (&t.marker, TokenKind::Marker),
            (&t.header, TokenKind::SectionHeader),
            (&t.comment, TokenKind::Comment),
            (&t.key, TokenKind::Key),
            (&t.value, TokenKind::Value),
            (&t.bool_true, TokenKind::BoolTrue),
            (&t.bool_false, TokenKind::BoolFalse),
        ];
        for (hex, kind) in overrides {
            if let Some(hex) = hex {
                let style = theme.style_for(kind).with_fg(parse_color(hex)?);
                theme.set_style(kind, style);
            }
        }
        Ok(theme)
    }

    /// How long a stopped model run may take to exit before it is abandoned.
    #[must_use]
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.run.stop_grace_ms)
    }

    /// Model run for `settings_path` with the configured arguments.
    #[must_use]
    pub fn run_request(&self, settings_path: impl Into<PathBuf>) -> RunRequest {
        RunRequest::new(settings_path, self.run.args.clone())
    }

    /// Placeholder resolver over `doc` using these settings.
    #[must_use]
    pub fn resolver<'a>(&self, doc: &'a ConfigDocument) -> PlaceholderResolver<'a> {
        PlaceholderResolver::new(doc)
            .with_fallback_section(self.placeholders.fallback_section.clone())
            .with_max_passes(self.placeholders.max_passes)
    }
}

fn parse_color(hex: &str) -> Result<Rgba> {
    Rgba::from_hex(hex).ok_or_else(|| Error::InvalidColor(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.placeholders.fallback_section, "FILE_PATHS");
        assert_eq!(config.dates.output_format, "%d/%m/%Y");
        assert_eq!(config.stop_grace(), Duration::from_millis(3000));
        assert_eq!(config.run.args, ["-lg"]);
        assert_eq!(config.theme().unwrap(), Theme::classic());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = EngineConfig::from_toml_str(
            "[run]\nstop_grace_ms = 250\n[theme]\nbool_true = \"#00ff00\"\n",
        )
        .unwrap();
        assert_eq!(config.stop_grace(), Duration::from_millis(250));
        assert_eq!(config.run.args, ["-lg"]);
        let style = config.theme().unwrap().style_for(TokenKind::BoolTrue);
        assert_eq!(style.fg, Some(Rgba::rgb(0, 255, 0)));
        assert!(style.attributes.contains(crate::style::TextAttributes::BOLD));
    }

    #[test]
    fn run_section_builds_request() {
        let config = EngineConfig::from_toml_str(
            "[run]\nprogram = \"/opt/cwatm/run\"\nargs = [\"-l\", \"-v\"]\n",
        )
        .unwrap();
        assert_eq!(config.run.program.as_deref(), Some(Path::new("/opt/cwatm/run")));
        let request = config.run_request("settings.ini");
        assert_eq!(request.settings_path, PathBuf::from("settings.ini"));
        assert_eq!(request.args, ["-l", "-v"]);

        let defaults = EngineConfig::default().run_request("settings.ini");
        assert_eq!(defaults.args, ["-lg"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("[theme]\ncomment = \"gray\""),
            Err(Error::InvalidColor(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[dates]\noutput_format = \"%Q\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[placeholders]\nmax_passes = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[unknown]\nx = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[placeholders]\nfallback_section = \"PATHS\"\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();

        let doc = ConfigDocument::parse("[PATHS]\nroot = /r");
        assert_eq!(config.resolver(&doc).resolve("$(root)").path, "/r");
        assert!(matches!(
            EngineConfig::load(dir.path().join("missing.toml")),
            Err(Error::Read { .. })
        ));
    }
}
