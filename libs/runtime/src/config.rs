use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

/// Environment overrides: `APP__MODULES__BIRTHDAY_SYNC__WINDOW_DAYS=30`
/// lands on `modules.birthday_sync.window_days`.
const ENV_PREFIX: &str = "APP__";
const ENV_SEPARATOR: &str = "__";

/// Whole-process configuration. Typed sections for what the runtime itself
/// needs; everything module-specific stays as raw values under `modules`
/// until a module asks for its typed view.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    /// `None` means "not configured"; binaries fall back to [`default_logging_config`].
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// State root for caches, snapshots and logs. Absolute after loading.
    #[serde(default)]
    pub home_dir: String,
}

/// Target prefix (crate name) → sinks for that target. `"default"` catches
/// everything no other key claims.
pub type LoggingConfig = HashMap<String, Section>;

/// Sinks of one logging target. Levels are `trace`..`error` or `off`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String,
    /// Log file, relative to the home dir unless absolute; empty = no file.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    /// Rotated files kept next to the active one.
    #[serde(default)]
    pub max_backups: Option<usize>,
    /// Rotation threshold.
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

/// Info on stderr, debug into a small rotating file under the home dir.
pub fn default_logging_config() -> LoggingConfig {
    let catch_all = Section {
        console_level: "info".into(),
        file: "logs/birthday_sync.log".into(),
        file_level: "debug".into(),
        max_backups: Some(3),
        max_size_mb: Some(10),
    };
    HashMap::from([("default".to_owned(), catch_all)])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: Some(default_logging_config()),
            ..Self::unconfigured()
        }
    }
}

impl AppConfig {
    /// Base layer for file loading: every optional section absent.
    fn unconfigured() -> Self {
        Self {
            app: AppSection::default(),
            logging: None,
            modules_dir: None,
            modules: HashMap::new(),
        }
    }

    /// Defaults, then the YAML file, then `APP__*` environment variables.
    /// The home dir is made absolute and created; `modules_dir` files are
    /// merged last.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let mut config: AppConfig = Figment::from(Serialized::defaults(Self::unconfigured()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        normalize_home_dir_inplace(&mut config.app).context("Failed to resolve app.home_dir")?;
        if let Some(dir) = config.modules_dir.as_deref() {
            merge_module_files(&mut config.modules, dir)?;
        }
        Ok(config)
    }

    /// [`load_layered`](Self::load_layered) when a path is given, built-in
    /// defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_layered(path);
        }
        let mut config = Self::default();
        normalize_home_dir_inplace(&mut config.app)
            .context("Failed to resolve default app.home_dir")?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Typed view of a module section; a missing section yields `T::default()`.
    pub fn module_config<T>(&self, module_name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.modules.get(module_name) else {
            return Ok(T::default());
        };
        serde_json::from_value(raw.clone())
            .with_context(|| format!("Invalid configuration for module '{module_name}'"))
    }

    pub fn home_dir(&self) -> PathBuf {
        PathBuf::from(&self.app.home_dir)
    }

    /// `-v` lifts the catch-all console level to debug, `-vv` and more to trace.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(catch_all) = logging.get_mut("default") {
            catch_all.console_level = level.to_owned();
        }
    }
}

/// The subset of command line flags that shapes configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Where state lives when the config leaves `app.home_dir` empty.
const DEFAULT_HOME_SUBDIR: &str = ".birthday_sync";

fn normalize_home_dir_inplace(app: &mut AppSection) -> Result<()> {
    let configured = Some(app.home_dir.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    let resolved = resolve_home_dir(configured, DEFAULT_HOME_SUBDIR, true)?;
    app.home_dir = resolved.display().to_string();
    Ok(())
}

/// `<dir>/<module>.yaml` (or `.yml`) files become `modules.<module>`,
/// replacing any inline section of the same name.
fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(());
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot list modules_dir {}", dir.display()))?;
    for path in entries.filter_map(|e| e.ok().map(|e| e.path())) {
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let Some(module) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|_| is_yaml && path.is_file())
        else {
            continue;
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let section: serde_json::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?;
        bag.insert(module.to_owned(), section);
    }
    Ok(())
}
