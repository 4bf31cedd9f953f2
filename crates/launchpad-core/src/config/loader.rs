//! Environment variable loading
//!
//! Keeps the fallback chains in one place so callers never repeat `or_else`.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory (existing variables win).
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// Load `<dir>/.env` into the process environment without overriding keys
/// that are already set. A missing file is not an error.
pub fn load_dotenv_from_dir(dir: &Path) {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(key, value);
        }
    }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// unquoted trailing `# comment` is stripped, and matching quotes are removed.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read the primary key or the first set alias; empty values fall back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Like [`env_or`] but returns `None` when unset or blank.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean env var: 0/false/no/off are false, any other value is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_strips_comments_and_quotes() {
        let content = "\
# launcher settings
LAUNCHPAD_ENV_DIR=.venv
LAUNCHPAD_MANIFEST = \"requirements-dev.txt\"
export LAUNCHPAD_PAUSE='never'
LAUNCHPAD_LOG_LEVEL=debug # verbose
not a pair
";
        let pairs = parse_dotenv(content);
        assert_eq!(
            pairs,
            vec![
                ("LAUNCHPAD_ENV_DIR".to_string(), ".venv".to_string()),
                ("LAUNCHPAD_MANIFEST".to_string(), "requirements-dev.txt".to_string()),
                ("LAUNCHPAD_PAUSE".to_string(), "never".to_string()),
                ("LAUNCHPAD_LOG_LEVEL".to_string(), "debug".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_dotenv_does_not_override() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "LAUNCHPAD_TEST_DOTENV_KEEP=from_file\nLAUNCHPAD_TEST_DOTENV_NEW=from_file\n",
        )
        .unwrap();
        env::set_var("LAUNCHPAD_TEST_DOTENV_KEEP", "from_env");

        load_dotenv_from_dir(tmp.path());

        assert_eq!(env::var("LAUNCHPAD_TEST_DOTENV_KEEP").unwrap(), "from_env");
        assert_eq!(env::var("LAUNCHPAD_TEST_DOTENV_NEW").unwrap(), "from_file");
    }

    #[test]
    fn test_env_helpers_fallback_chain() {
        env::set_var("LAUNCHPAD_TEST_ALIAS", "aliased");
        assert_eq!(
            env_or("LAUNCHPAD_TEST_UNSET_PRIMARY", &["LAUNCHPAD_TEST_ALIAS"], || "d".into()),
            "aliased"
        );
        assert_eq!(env_optional("LAUNCHPAD_TEST_UNSET_PRIMARY", &[]), None);

        env::set_var("LAUNCHPAD_TEST_BOOL", "off");
        assert!(!env_bool("LAUNCHPAD_TEST_BOOL", &[], true));
        assert!(env_bool("LAUNCHPAD_TEST_BOOL_UNSET", &[], true));
    }
}
