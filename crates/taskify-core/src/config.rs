use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct Config {
    map: HashMap<String, String>,
    pub loaded_file: Option<PathBuf>,
}

impl Config {
    #[tracing::instrument(skip(rc_override))]
    pub fn load(rc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Config {
            map: HashMap::new(),
            loaded_file: None,
        };

        cfg.map
            .insert("data.location".to_string(), "~/.taskify".to_string());
        cfg.map
            .insert("default.command".to_string(), "list".to_string());
        cfg.map
            .insert("default.category".to_string(), "other".to_string());
        cfg.map.insert("color".to_string(), "on".to_string());
        cfg.map
            .insert("confirmation".to_string(), "on".to_string());

        let rc = resolve_rc_path(rc_override)?;
        if let Some(path) = rc {
            info!(rc = %path.display(), "loading rc file");
            cfg.load_file(&path)?;
        } else {
            debug!("no rc file found; using defaults");
        }

        Ok(cfg)
    }

    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in overrides {
            let key = k.strip_prefix("rc.").unwrap_or(&k).to_string();
            debug!(key = %key, value = %v, "applying override");
            self.map.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).map(|v| parse_bool(v))
    }

    #[tracing::instrument(skip(self))]
    fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        self.loaded_file = Some(path.clone());

        for (line_num, raw_line) in text.lines().enumerate() {
            let mut line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((before, _)) = line.split_once('#') {
                line = before.trim();
            }
            if line.is_empty() {
                continue;
            }

            let (k, v) = line.split_once('=').ok_or_else(|| {
                anyhow!(
                    "invalid config line {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    raw_line
                )
            })?;

            let key = k.trim().to_string();
            let value = v.trim().to_string();
            trace!(key = %key, value = %value, "loaded config key");
            self.map.insert(key, value);
        }

        Ok(())
    }
}

#[tracing::instrument(skip(cfg, override_dir))]
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = if let Some(path) = override_dir {
        path.to_path_buf()
    } else if let Some(cfg_value) = cfg.get("data.location") {
        expand_tilde(Path::new(&cfg_value))
    } else {
        default_data_dir()?
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

#[tracing::instrument(skip(override_path))]
fn resolve_rc_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(rc_env) = std::env::var("TASKIFYRC") {
        if rc_env == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(rc_env)));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    let candidate = home.join(".taskifyrc");
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    warn!("no ~/.taskifyrc present");
    Ok(None)
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(".taskify"))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "true"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicitly_named_missing_rc_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/taskifyrc"))).is_err());
    }

    #[test]
    fn rc_file_overrides_defaults_and_cli_overrides_rc() {
        let mut rc = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(rc, "# taskify rc").expect("write");
        writeln!(rc, "default.category = personal").expect("write");
        writeln!(rc, "color = off  # no ansi").expect("write");
        rc.flush().expect("flush");

        let mut cfg = Config::load(Some(rc.path())).expect("load");
        assert_eq!(cfg.get("default.category").as_deref(), Some("personal"));
        assert_eq!(cfg.get_bool("color"), Some(false));
        assert_eq!(cfg.get("default.command").as_deref(), Some("list"));

        cfg.apply_overrides(vec![("rc.color".to_string(), "on".to_string())]);
        assert_eq!(cfg.get_bool("color"), Some(true));
    }

    #[test]
    fn invalid_line_is_reported_with_position() {
        let mut rc = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(rc, "no equals sign here").expect("write");
        rc.flush().expect("flush");

        let err = Config::load(Some(rc.path())).expect_err("should fail");
        assert!(err.to_string().contains(":1:"));
    }
}
