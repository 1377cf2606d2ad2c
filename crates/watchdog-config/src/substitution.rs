//! `${VAR}` interpolation over raw config text, run before YAML parsing.
//! An unset variable is a load error rather than a silent blank, since the
//! original treats `${VAR}` as shell-like interpolation and a blanked
//! secret would otherwise fail quietly downstream (e.g. an empty bot
//! token that Telegram just rejects).

use regex::Regex;

use crate::error::ConfigError;

pub fn substitute_env(text: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern is valid");

    let mut missing = None;
    let result = pattern.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        match lookup(name) {
            Some(value) => value,
            None => {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                String::new()
            }
        }
    });

    if let Some(name) = missing {
        return Err(ConfigError::MissingEnvVar(name));
    }

    Ok(result.into_owned())
}
