use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "phonebook";
const CONFIG_FILENAME: &str = "config.toml";

pub const ENV_PORT: &str = "PORT";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_ERROR_SINK: &str = "PHONEBOOK_ERROR_SINK";
pub const ENV_ERROR_LOG: &str = "PHONEBOOK_ERROR_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub error_sink: ErrorSinkConfig,
}

impl AppConfig {
    pub fn require_port(&self) -> Result<u16> {
        self.port.ok_or(ConfigError::MissingPort)
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }
}

/// Where unexpected failures get recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorSinkConfig {
    #[default]
    Store,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSinkBackend {
    Store,
    File,
}

impl ErrorSinkBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "store" => Ok(Self::Store),
            "file" => Ok(Self::File),
            _ => Err(ConfigError::InvalidErrorSink(raw.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("listen port is not configured (set PORT or --port)")]
    MissingPort,
    #[error("invalid listen port: {0}")]
    InvalidPort(String),
    #[error("database url is not configured (set DATABASE_URL or --database-url)")]
    MissingDatabaseUrl,
    #[error("invalid error sink backend: {0} (expected store|file)")]
    InvalidErrorSink(String),
    #[error("file error sink requires a log path (set PHONEBOOK_ERROR_LOG or error_sink.path)")]
    MissingErrorLogPath,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    port: Option<u16>,
    database_url: Option<String>,
    error_sink: Option<ErrorSinkFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorSinkFile {
    backend: Option<ErrorSinkBackend>,
    path: Option<PathBuf>,
}

/// Values taken from the process environment. Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub database_url: Option<String>,
    pub error_sink: Option<String>,
    pub error_log: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            port: env_value(ENV_PORT),
            database_url: env_value(ENV_DATABASE_URL),
            error_sink: env_value(ENV_ERROR_SINK),
            error_log: env_value(ENV_ERROR_LOG),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    load_with(config_path, &EnvOverrides::from_env())
}

pub fn load_with(config_path: Option<PathBuf>, env: &EnvOverrides) -> Result<AppConfig> {
    let required = config_path.is_some();
    let parsed = match resolve_config_path(config_path) {
        Ok(path) => read_config_file(&path, required)?,
        Err(ConfigError::MissingHomeDir) if !required => None,
        Err(ConfigError::InvalidConfigPath(_)) if !required => None,
        Err(err) => return Err(err),
    };
    merge_config(parsed.unwrap_or_default(), env)
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn read_config_file(path: &Path, required: bool) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parsed))
}

fn merge_config(parsed: ConfigFile, env: &EnvOverrides) -> Result<AppConfig> {
    let port = match env.port.as_deref() {
        Some(raw) => Some(parse_port(raw)?),
        None => parsed.port,
    };
    if port == Some(0) {
        return Err(ConfigError::InvalidPort("0".to_string()));
    }

    let database_url = env
        .database_url
        .clone()
        .or(parsed.database_url)
        .filter(|url| !url.trim().is_empty());

    let sink_file = parsed.error_sink.unwrap_or_default();
    let backend = match env.error_sink.as_deref() {
        Some(raw) => ErrorSinkBackend::parse(raw)?,
        None => sink_file.backend.unwrap_or(ErrorSinkBackend::Store),
    };
    let log_path = env
        .error_log
        .as_ref()
        .map(PathBuf::from)
        .or(sink_file.path)
        .filter(|path| !path.as_os_str().is_empty());
    let error_sink = match backend {
        ErrorSinkBackend::Store => ErrorSinkConfig::Store,
        ErrorSinkBackend::File => {
            ErrorSinkConfig::File(log_path.ok_or(ConfigError::MissingErrorLogPath)?)
        }
    };

    Ok(AppConfig {
        port,
        database_url,
        error_sink,
    })
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_with, merge_config, ConfigError, ConfigFile, EnvOverrides, ErrorSinkBackend,
        ErrorSinkConfig, ErrorSinkFile,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_file_values() {
        let parsed = ConfigFile {
            port: Some(3000),
            database_url: Some("phonebook.sqlite3".to_string()),
            error_sink: Some(ErrorSinkFile {
                backend: Some(ErrorSinkBackend::File),
                path: Some(PathBuf::from("errors.log")),
            }),
        };
        let merged = merge_config(parsed, &EnvOverrides::default()).expect("merge");
        assert_eq!(merged.port, Some(3000));
        assert_eq!(merged.require_database_url().unwrap(), "phonebook.sqlite3");
        assert_eq!(
            merged.error_sink,
            ErrorSinkConfig::File(PathBuf::from("errors.log"))
        );
    }

    #[test]
    fn environment_overrides_file_values() {
        let parsed = ConfigFile {
            port: Some(3000),
            database_url: Some("file.sqlite3".to_string()),
            error_sink: None,
        };
        let env = EnvOverrides {
            port: Some("8080".to_string()),
            database_url: Some("env.sqlite3".to_string()),
            error_sink: Some("FILE".to_string()),
            error_log: Some("/tmp/phonebook-errors.log".to_string()),
        };
        let merged = merge_config(parsed, &env).expect("merge");
        assert_eq!(merged.require_port().unwrap(), 8080);
        assert_eq!(merged.database_url.as_deref(), Some("env.sqlite3"));
        assert_eq!(
            merged.error_sink,
            ErrorSinkConfig::File(PathBuf::from("/tmp/phonebook-errors.log"))
        );
    }

    #[test]
    fn missing_values_surface_when_required() {
        let merged = merge_config(ConfigFile::default(), &EnvOverrides::default()).unwrap();
        assert_eq!(merged.error_sink, ErrorSinkConfig::Store);
        assert!(matches!(merged.require_port(), Err(ConfigError::MissingPort)));
        assert!(matches!(
            merged.require_database_url(),
            Err(ConfigError::MissingDatabaseUrl)
        ));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let env = EnvOverrides {
            port: Some("http".to_string()),
            ..EnvOverrides::default()
        };
        let err = merge_config(ConfigFile::default(), &env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));

        let parsed = ConfigFile {
            port: Some(0),
            ..ConfigFile::default()
        };
        let err = merge_config(parsed, &EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }

    #[test]
    fn file_sink_requires_path() {
        let env = EnvOverrides {
            error_sink: Some("file".to_string()),
            ..EnvOverrides::default()
        };
        let err = merge_config(ConfigFile::default(), &env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingErrorLogPath));
    }

    #[test]
    fn unknown_sink_backend_is_rejected() {
        let env = EnvOverrides {
            error_sink: Some("syslog".to_string()),
            ..EnvOverrides::default()
        };
        let err = merge_config(ConfigFile::default(), &env).unwrap_err();
        assert!(err.to_string().contains("syslog"));
    }

    #[test]
    fn load_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_with(Some(missing), &EnvOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "port = 4000\ndatabase_url = \"sqlite://phonebook.sqlite3\"\n[error_sink]\nbackend = \"store\"\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_with(Some(path), &EnvOverrides::default()).expect("load");
        assert_eq!(config.port, Some(4000));
        assert_eq!(
            config.database_url.as_deref(),
            Some("sqlite://phonebook.sqlite3")
        );
        assert_eq!(config.error_sink, ErrorSinkConfig::Store);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "listen = 4000\n").expect("write config");
        restrict_permissions(&path);

        let err = load_with(Some(path), &EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
