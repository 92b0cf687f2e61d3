//! Property-based tests for configuration resolution
//!
//! These tests verify the configuration contract through property-based
//! testing, ensuring that:
//! - Loading a section returns exactly the values written to the file
//! - Absent sections always fail, regardless of what else the file contains

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use dbviz::config::load_config;
    use dbviz::DbvizError;

    fn ident() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_]{0,15}".prop_map(|s: String| s)
    }

    fn write_section(
        section: &str,
        host: &str,
        port: u16,
        user: &str,
        password: &str,
        database: &str,
    ) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[{section}]\nhost = {host}\nport = {port}\nuser = {user}\n\
             password = {password}\ndatabase = {database}\n"
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    proptest! {
        #[test]
        fn load_config_round_trips_section_contents(
            section in ident(),
            host in ident(),
            port in any::<u16>(),
            user in ident(),
            password in ident(),
            database in ident(),
        ) {
            let file = write_section(&section, &host, port, &user, &password, &database);
            let config = load_config(file.path(), &section).unwrap();
            prop_assert_eq!(config.host, host);
            prop_assert_eq!(config.port, port);
            prop_assert_eq!(config.user, user);
            prop_assert_eq!(config.password, password);
            prop_assert_eq!(config.database, database);
        }

        #[test]
        fn absent_sections_always_fail(
            section in ident(),
            requested in ident(),
            host in ident(),
            port in any::<u16>(),
            user in ident(),
        ) {
            prop_assume!(section != requested);
            let file = write_section(&section, &host, port, &user, "pw", "db");
            let err = load_config(file.path(), &requested).unwrap_err();
            let is_section_missing = matches!(err, DbvizError::ConfigSectionMissing { .. });
            prop_assert!(is_section_missing);
        }
    }
}
