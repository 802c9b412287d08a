use crate::library::LibraryFormat;
use crate::process::{Pacing, PacingError};
use config::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

pub const DEFAULT_BASE_URL: &str = "https://rateyourmusic.com/release/album/";
const DEFAULT_USER_AGENT: &str = concat!("musrank/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub library_path: String,
    #[serde(default = "default_library_format")]
    pub library_format: LibraryFormat,
    /// Overrides the database location inside the configuration folder.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub crawl_settings: CrawlSettings,
    #[serde(default)]
    pub server_settings: ServerSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    pub base_url: String,
    pub min_wait_seconds: u64,
    pub max_wait_seconds: u64,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

fn default_library_format() -> LibraryFormat {
    LibraryFormat::Itunes
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_wait_seconds: 150,
            max_wait_seconds: 380,
            request_timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlSettings {
    pub fn pacing(&self) -> Result<Pacing, PacingError> {
        Pacing::from_secs(self.min_wait_seconds, self.max_wait_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Where the outcome database lives.
    pub fn database_path(&self, cfg_folder: &ConfigFolder) -> PathBuf {
        self.database_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| cfg_folder.musrank_db.clone())
    }
}

/// Loads the YAML configuration file, with `MUSRANK__`-prefixed environment variables
/// taking precedence (e.g. `MUSRANK__CRAWL_SETTINGS__MIN_WAIT_SECONDS=60`).
pub fn get_configuration(cfg_file: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::new(cfg_file, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("MUSRANK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub musrank_db: PathBuf,
}

impl ConfigFolder {
    /// The `~/.musrank` folder of the current user.
    pub fn new() -> io::Result<Self> {
        let home_dir = env::var("HOME").map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, "HOME environment variable is not set")
        })?;
        Ok(Self::at(Path::new(&home_dir)))
    }

    pub fn at(home_dir: &Path) -> Self {
        let config_dir = home_dir.join(".musrank");
        Self {
            config_file: config_dir.join("config.yaml"),
            musrank_db: config_dir.join("musrank_db"),
            config_dir,
        }
    }
}

pub fn create_config(cfg_folder: &ConfigFolder) -> io::Result<()> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");
    let config_dir = &cfg_folder.config_dir;

    if config_dir.exists() && !confirm_overwrite()? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    write_config(cfg_folder)?;

    println!("\x1b[32mConfiguration file created at:");
    println!("  -> {}", cfg_folder.config_file.display());
    println!("musrank_db folder created at:");
    println!("  -> {}", cfg_folder.musrank_db.display());
    println!("\x1b[0mPlease edit the configuration file and point library_path at your library.");

    Ok(())
}

fn write_config(cfg_folder: &ConfigFolder) -> io::Result<()> {
    fs::create_dir_all(&cfg_folder.config_dir)?;
    fs::create_dir_all(&cfg_folder.musrank_db)?;
    fs::write(&cfg_folder.config_file, include_str!("config_template.yaml"))
}

fn confirm_overwrite() -> Result<bool, io::Error> {
    println!("\x1b[31mThe configuration folder already exists.");
    println!("Do you want to overwrite the configuration file? Crawl results are kept. (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    /// Held by every test that reads settings, since the environment is process-wide.
    static ENVIRONMENT: Mutex<()> = Mutex::new(());

    fn lock_environment() -> MutexGuard<'static, ()> {
        ENVIRONMENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets an environment variable until dropped.
    struct ScopedVar(&'static str);

    impl ScopedVar {
        fn set(name: &'static str, value: &str) -> Self {
            env::set_var(name, value);
            Self(name)
        }
    }

    impl Drop for ScopedVar {
        fn drop(&mut self) {
            env::remove_var(self.0);
        }
    }

    fn write_yaml(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("config.yaml");
        fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_minimal_configuration_uses_defaults() {
        let _env = lock_environment();
        let dir = TempDir::new().unwrap();
        let path = write_yaml(&dir, "library_path: /music/Library.xml\n");

        let settings = get_configuration(&path).unwrap();

        assert_eq!(settings.library_path, "/music/Library.xml");
        assert_eq!(settings.library_format, LibraryFormat::Itunes);
        assert_eq!(settings.crawl_settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            settings.crawl_settings.pacing().unwrap(),
            Pacing::from_secs(150, 380).unwrap()
        );
        assert_eq!(settings.server_settings.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_full_configuration() {
        let _env = lock_environment();
        let dir = TempDir::new().unwrap();
        let path = write_yaml(
            &dir,
            "library_path: /music\n\
             library_format: folders\n\
             database_path: /var/lib/musrank\n\
             crawl_settings:\n  min_wait_seconds: 60\n  max_wait_seconds: 120\n\
             server_settings:\n  port: 9000\n",
        );

        let settings = get_configuration(&path).unwrap();

        assert_eq!(settings.library_format, LibraryFormat::Folders);
        assert_eq!(settings.crawl_settings.min_wait_seconds, 60);
        assert_eq!(settings.crawl_settings.max_wait_seconds, 120);
        assert_eq!(settings.crawl_settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.server_settings.address(), "0.0.0.0:9000");

        let folder = ConfigFolder::at(dir.path());
        assert_eq!(
            settings.database_path(&folder),
            PathBuf::from("/var/lib/musrank")
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = lock_environment();
        let dir = TempDir::new().unwrap();
        let path = write_yaml(
            &dir,
            "library_path: /music\n\
             crawl_settings:\n  min_wait_seconds: 60\n  max_wait_seconds: 120\n",
        );

        let settings = {
            let _min_wait = ScopedVar::set("MUSRANK__CRAWL_SETTINGS__MIN_WAIT_SECONDS", "42");
            get_configuration(&path).unwrap()
        };

        assert_eq!(settings.crawl_settings.min_wait_seconds, 42);
        assert_eq!(settings.crawl_settings.max_wait_seconds, 120);
        assert_eq!(settings.library_path, "/music");

        let settings = get_configuration(&path).unwrap();
        assert_eq!(settings.crawl_settings.min_wait_seconds, 60);
    }

    #[test]
    fn test_inverted_wait_window_is_rejected() {
        let settings = CrawlSettings {
            min_wait_seconds: 10,
            max_wait_seconds: 5,
            ..CrawlSettings::default()
        };
        assert!(settings.pacing().is_err());
    }

    #[test]
    fn test_missing_library_path_is_an_error() {
        let _env = lock_environment();
        let dir = TempDir::new().unwrap();
        let path = write_yaml(&dir, "library_format: itunes\n");
        assert!(get_configuration(&path).is_err());
    }

    #[test]
    fn test_config_folder_layout() {
        let folder = ConfigFolder::at(Path::new("/home/someone"));
        assert_eq!(folder.config_dir, PathBuf::from("/home/someone/.musrank"));
        assert_eq!(
            folder.config_file,
            PathBuf::from("/home/someone/.musrank/config.yaml")
        );
        assert_eq!(
            folder.musrank_db,
            PathBuf::from("/home/someone/.musrank/musrank_db")
        );
    }

    #[test]
    fn test_written_template_loads() {
        let _env = lock_environment();
        let dir = TempDir::new().unwrap();
        let folder = ConfigFolder::at(dir.path());

        write_config(&folder).unwrap();

        assert!(folder.musrank_db.is_dir());
        let settings = get_configuration(folder.config_file.to_str().unwrap()).unwrap();
        assert!(settings.crawl_settings.pacing().is_ok());
    }
}
