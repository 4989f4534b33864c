//! Configuration file loading and server resolution for the CLI.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use contentdm_core::{ServerConfig, ServerDescriptor};

use crate::cli::Args;

const DEFAULT_HTTP_PORT: u16 = 80;
const DEFAULT_HTTPS_PORT: u16 = 443;

/// TOML-style file configuration for CLI defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Server hostname.
    pub hostname: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Use HTTPS.
    pub tls: Option<bool>,
    /// Default directory for downloads.
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Validates values the parser accepts syntactically.
    pub fn validate(&self) -> Result<()> {
        if let Some(hostname) = &self.hostname
            && hostname.trim().is_empty()
        {
            bail!("Invalid config value for `hostname`: must not be empty");
        }
        if self.port == Some(0) {
            bail!("Invalid config value for `port`: 0. Expected range: 1..=65535");
        }
        Ok(())
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/contentdm/config.toml`
/// 2. `$HOME/.config/contentdm/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("contentdm")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("contentdm")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;

        match key {
            "hostname" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `hostname` value on line {line_number}")
                })?;
                cfg.hostname = Some(parsed);
            }
            "port" => {
                let parsed = parse_port(value)
                    .with_context(|| format!("Invalid `port` value on line {line_number}"))?;
                cfg.port = Some(parsed);
            }
            "tls" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `tls` value on line {line_number}"))?;
                cfg.tls = Some(parsed);
            }
            "output_dir" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `output_dir` value on line {line_number}")
                })?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_port(raw_value: &str) -> Result<u16> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u32>()?;
    u16::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for a port"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Merges CLI flags over file values into the client's server state.
///
/// Without a hostname from either source the client stays unconfigured.
#[must_use]
pub fn resolve_server(args: &Args, file: Option<&FileConfig>) -> ServerConfig {
    let hostname = args
        .host
        .clone()
        .or_else(|| file.and_then(|cfg| cfg.hostname.clone()));
    let Some(hostname) = hostname else {
        return ServerConfig::Unconfigured;
    };

    let use_tls = args.tls || file.and_then(|cfg| cfg.tls).unwrap_or(false);
    let default_port = if use_tls {
        DEFAULT_HTTPS_PORT
    } else {
        DEFAULT_HTTP_PORT
    };
    let port = args
        .port
        .or_else(|| file.and_then(|cfg| cfg.port))
        .unwrap_or(default_port);

    ServerConfig::Configured(ServerDescriptor::new(hostname, port, use_tls))
}

/// CLI flag, then config file, then the current directory.
#[must_use]
pub fn resolve_output_dir(flag: Option<PathBuf>, file: Option<&FileConfig>) -> PathBuf {
    flag.or_else(|| file.and_then(|cfg| cfg.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["contentdm"];
        argv.extend_from_slice(extra);
        argv.push("collections");
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
hostname = "cdm.example.org"
port = 81
tls = false
output_dir = "/srv/images"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.hostname.as_deref(), Some("cdm.example.org"));
        assert_eq!(cfg.port, Some(81));
        assert_eq!(cfg.tls, Some(false));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/images")));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r##"
hostname = "cdm#1.example.org" # hash inside quotes is kept
port = 8080 # staging
"##,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.hostname.as_deref(), Some("cdm#1.example.org"));
        assert_eq!(cfg.port, Some(8080));
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("hostnme = \"x\"").expect_err("unknown key expected");
        assert!(err.to_string().contains("hostnme"));
    }

    #[test]
    fn test_parse_config_rejects_port_out_of_range() {
        let err = parse_config_str("port = 70000").expect_err("invalid port expected");
        assert!(format!("{err:#}").contains("port"));
        let err = parse_config_str("port = 0").expect_err("zero port expected");
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_hostname() {
        let err = parse_config_str("hostname = cdm.example.org").expect_err("quotes required");
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("tls = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("tls"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("hostname").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_resolve_server_without_hostname_is_unconfigured() {
        assert_eq!(resolve_server(&args(&[]), None), ServerConfig::Unconfigured);
        let file = FileConfig {
            port: Some(81),
            ..FileConfig::default()
        };
        assert_eq!(
            resolve_server(&args(&[]), Some(&file)),
            ServerConfig::Unconfigured
        );
    }

    #[test]
    fn test_resolve_server_from_file() {
        let file = FileConfig {
            hostname: Some("cdm.example.org".to_string()),
            port: Some(81),
            tls: Some(false),
            output_dir: None,
        };
        assert_eq!(
            resolve_server(&args(&[]), Some(&file)),
            ServerConfig::Configured(ServerDescriptor::new("cdm.example.org", 81, false))
        );
    }

    #[test]
    fn test_resolve_server_flags_override_file() {
        let file = FileConfig {
            hostname: Some("cdm.example.org".to_string()),
            port: Some(81),
            tls: Some(false),
            output_dir: None,
        };
        let resolved = resolve_server(
            &args(&["--host", "other.example.org", "--port", "8443", "--tls"]),
            Some(&file),
        );
        assert_eq!(
            resolved,
            ServerConfig::Configured(ServerDescriptor::new("other.example.org", 8443, true))
        );
    }

    #[test]
    fn test_resolve_server_default_ports() {
        assert_eq!(
            resolve_server(&args(&["--host", "h"]), None),
            ServerConfig::Configured(ServerDescriptor::new("h", 80, false))
        );
        assert_eq!(
            resolve_server(&args(&["--host", "h", "--tls"]), None),
            ServerConfig::Configured(ServerDescriptor::new("h", 443, true))
        );
    }

    #[test]
    fn test_resolve_output_dir_priority() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/srv/images")),
            ..FileConfig::default()
        };
        assert_eq!(
            resolve_output_dir(Some(PathBuf::from("here")), Some(&file)),
            PathBuf::from("here")
        );
        assert_eq!(
            resolve_output_dir(None, Some(&file)),
            PathBuf::from("/srv/images")
        );
        assert_eq!(resolve_output_dir(None, None), PathBuf::from("."));
    }
}
