//! Resolves the default configuration path when `--config` is omitted, so
//! a bare `watchdogd run` still has somewhere sensible to look instead of
//! requiring every invocation to spell out `-c`.

use std::path::PathBuf;

/// `$XDG_CONFIG_HOME/watchdogd/config.yml` (or the platform equivalent via
/// `dirs::config_dir`), falling back to `/etc/watchdogd/config.yml` if no
/// config directory can be resolved for the current user.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("watchdogd").join("config.yml"))
        .unwrap_or_else(|| PathBuf::from("/etc/watchdogd/config.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_path_ends_in_watchdogd_config_yml() {
        let path = default_config_path();
        assert_eq!(path.file_name().unwrap(), "config.yml");
        assert_eq!(path.parent().unwrap().file_name().unwrap(), "watchdogd");
    }
}
