//! Widget configuration
//!
//! Every field has a default that reproduces the stock site, so a page
//! can pass `{}` or just the fields it wants to change.

use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;

/// Terminal colors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub foreground: String,
    pub cursor: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#1e1e2e".into(),
            foreground: "#cdd6f4".into(),
            cursor: "#cdd6f4".into(),
        }
    }
}

/// Shell and terminal settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Printed before every command line
    pub prompt: String,
    /// Printed once at startup, one entry per line
    pub banner: Vec<String>,
    pub font_size: u32,
    pub font_family: Option<String>,
    pub cursor_blink: bool,
    pub theme: Theme,
    /// Name shown by `neofetch`
    pub owner: String,
    /// Host name shown by `neofetch`
    pub hostname: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "[0x0c5cbae8 ~]$ ".into(),
            banner: vec![
                "Welcome to my personal website!".into(),
                "Type 'help' to see available commands. Type 'help [command]' for more information on a specific command.".into(),
            ],
            font_size: 24,
            font_family: None,
            cursor_blink: true,
            theme: Theme::default(),
            owner: "Charlie Yang".into(),
            hostname: "0x0c5cbae8".into(),
        }
    }
}

/// Configuration parse failure
#[derive(Debug)]
pub enum ConfigError {
    /// Not valid JSON, or a field has the wrong type
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl ShellConfig {
    /// Parse overrides; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The options object for `new Terminal(...)`
    pub fn xterm_options(&self) -> Value {
        let mut options = json!({
            "cursorBlink": self.cursor_blink,
            "fontSize": self.font_size,
            "theme": {
                "background": self.theme.background,
                "foreground": self.theme.foreground,
                "cursor": self.theme.cursor,
            },
        });
        if let Some(family) = &self.font_family {
            options["fontFamily"] = Value::String(family.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = ShellConfig::from_json("{}").unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ShellConfig::from_json(r##"{"prompt": "$ ", "theme": {"cursor": "#fff"}}"##).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.theme.cursor, "#fff");
        assert_eq!(config.theme.background, Theme::default().background);
        assert_eq!(config.font_size, 24);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let err = ShellConfig::from_json(r#"{"font_size": "big"}"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid config"));
    }

    #[test]
    fn test_xterm_options() {
        let options = ShellConfig::default().xterm_options();
        assert_eq!(options["cursorBlink"], true);
        assert_eq!(options["fontSize"], 24);
        assert_eq!(options["theme"]["background"], "#1e1e2e");
        assert!(options.get("fontFamily").is_none());

        let config = ShellConfig {
            font_family: Some("monospace".into()),
            ..ShellConfig::default()
        };
        assert_eq!(config.xterm_options()["fontFamily"], "monospace");
    }
}
