use crate::core::{DbvizError, Result};
use ini::Ini;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File consulted when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".db.conf";
/// Section consulted when no section name is given.
pub const DEFAULT_SECTION: &str = "test_database";

const FALLBACK_CREDENTIAL: &str = "postgres";

/// Connection parameters resolved from one configuration section.
///
/// `host`, `port` and `user` are required; `password` and `database` fall
/// back to `"postgres"` when the section omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Builds the driver configuration for this section. Parameters go
    /// through the typed builder, never through string interpolation.
    pub fn client_config(&self) -> postgres::Config {
        let mut config = postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database);
        config
    }
}

/// Locates a configuration file by name.
///
/// Explicit paths (absolute, or containing a directory component) are used
/// as given. Bare file names are searched for in the current directory and
/// its ancestors, then in the home directory.
pub fn find_config_file(name: impl AsRef<Path>) -> Result<PathBuf> {
    let name = name.as_ref();

    if name.is_absolute() || name.components().count() > 1 {
        if name.is_file() {
            return Ok(name.to_path_buf());
        }
        return Err(DbvizError::ConfigFileMissing(name.display().to_string()));
    }

    let cwd = std::env::current_dir()?;
    for dir in cwd.ancestors() {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found configuration file");
            return Ok(candidate);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let candidate = home.join(name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found configuration file");
            return Ok(candidate);
        }
    }

    Err(DbvizError::ConfigFileMissing(name.display().to_string()))
}

/// Reads an INI-formatted file and extracts the named section.
///
/// Fails with `ConfigSectionMissing` when the section is absent and with
/// `ConfigFileMissing` when the file cannot be read. No partial state is
/// retained on failure.
pub fn load_config(path: &Path, section: &str) -> Result<DbConfig> {
    let file = Ini::load_from_file(path).map_err(|err| match err {
        ini::Error::Io(io_err) if io_err.kind() == ErrorKind::NotFound => {
            DbvizError::ConfigFileMissing(path.display().to_string())
        }
        ini::Error::Io(io_err) => DbvizError::Io(io_err),
        ini::Error::Parse(parse_err) => {
            DbvizError::Config(format!("{}: {}", path.display(), parse_err))
        }
    })?;

    let props = file
        .section(Some(section))
        .ok_or_else(|| DbvizError::ConfigSectionMissing {
            file: path.display().to_string(),
            section: section.to_string(),
        })?;

    let required = |key: &str| -> Result<String> {
        props
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| DbvizError::ConfigKeyMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    };

    let host = required("host")?;
    let port_raw = required("port")?;
    let port = port_raw.parse::<u16>().map_err(|_| {
        DbvizError::Config(format!("invalid port '{port_raw}' in section '{section}'"))
    })?;
    let user = required("user")?;
    let password = props.get("password").unwrap_or(FALLBACK_CREDENTIAL).to_string();
    let database = props.get("database").unwrap_or(FALLBACK_CREDENTIAL).to_string();

    Ok(DbConfig {
        host,
        port,
        user,
        password,
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_CONFIG: &str = "\
[test_database]
host = localhost
port = 5432
user = postgres
password = secret
database = devdb

[other_database]
host = db.internal
port = 5433
user = reader
";

    fn write_sample() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CONFIG.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_config_matches_file_contents() {
        let file = write_sample();
        let config = load_config(file.path(), "test_database").unwrap();
        assert_eq!(
            config,
            DbConfig {
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: "secret".to_string(),
                database: "devdb".to_string(),
            }
        );
    }

    #[test]
    fn test_load_config_applies_credential_fallbacks() {
        let file = write_sample();
        let config = load_config(file.path(), "other_database").unwrap();
        assert_eq!(config.password, "postgres");
        assert_eq!(config.database, "postgres");
        assert_eq!(config.user, "reader");
    }

    #[test]
    fn test_missing_section_is_a_hard_failure() {
        let file = write_sample();
        let err = load_config(file.path(), "absent").unwrap_err();
        match err {
            DbvizError::ConfigSectionMissing { section, .. } => {
                assert_eq!(section, "absent");
            }
            other => panic!("expected ConfigSectionMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_reported_as_such() {
        let err = load_config(Path::new("/nonexistent/dir/.db.conf"), "test_database")
            .unwrap_err();
        assert!(matches!(err, DbvizError::ConfigFileMissing(_)));
    }

    #[test]
    fn test_missing_required_key() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[test_database]\nhost = localhost\nport = 5432\n")
            .unwrap();
        file.flush().unwrap();
        let err = load_config(file.path(), "test_database").unwrap_err();
        match err {
            DbvizError::ConfigKeyMissing { key, .. } => assert_eq!(key, "user"),
            other => panic!("expected ConfigKeyMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_port_value() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[test_database]\nhost = localhost\nport = not-a-port\nuser = u\n")
            .unwrap();
        file.flush().unwrap();
        let err = load_config(file.path(), "test_database").unwrap_err();
        assert!(matches!(err, DbvizError::Config(_)));
    }

    #[test]
    fn test_find_config_file_accepts_explicit_paths() {
        let file = write_sample();
        let found = find_config_file(file.path()).unwrap();
        assert_eq!(found, file.path());
    }

    #[test]
    fn test_find_config_file_rejects_missing_explicit_path() {
        let err = find_config_file("/nonexistent/dir/.db.conf").unwrap_err();
        assert!(matches!(err, DbvizError::ConfigFileMissing(_)));
    }

    #[test]
    fn test_client_config_carries_section_values() {
        let config = DbConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "secret".to_string(),
            database: "devdb".to_string(),
        };
        let pg = config.client_config();
        assert_eq!(pg.get_ports(), &[5432]);
        assert_eq!(pg.get_user(), Some("postgres"));
        assert_eq!(pg.get_dbname(), Some("devdb"));
    }
}
