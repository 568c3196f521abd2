use crate::utils::naming::DEFAULT_NAME_LENGTH;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// How uploaded content is checked before it is staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Trust the client-supplied file name suffix
    #[default]
    TrustExtension,
    /// Sniff the leading bytes and require them to match the extension
    VerifyMagicBytes,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trust-extension" => Ok(Self::TrustExtension),
            "verify-magic-bytes" => Ok(Self::VerifyMagicBytes),
            other => Err(format!("unknown validation policy '{}'", other)),
        }
    }
}

/// How staged file names are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingStrategy {
    /// Alphanumeric string of `name_length` characters
    #[default]
    Random,
    /// UUIDv4 in simple (hyphen-less) form
    Uuid,
}

impl FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "uuid" => Ok(Self::Uuid),
            other => Err(format!("unknown naming strategy '{}'", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory uploaded files are staged in (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory served under /static (default: "static")
    pub static_dir: PathBuf,

    /// Maximum upload size in bytes (default: 10 MB)
    pub max_file_size: usize,

    /// Size of each chunk streamed back on download (default: 1024)
    pub chunk_size: usize,

    /// Length of randomly generated names (default: 10)
    pub name_length: usize,

    pub naming_strategy: NamingStrategy,

    pub validation_policy: ValidationPolicy,

    /// Detector type: "probe", "command" or "noop" (default: "probe")
    pub detector_type: String,

    /// Program invoked with the staged path when `detector_type` is "command"
    pub detector_command: Option<String>,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            max_file_size: 10 * 1024 * 1024, // 10 MB
            chunk_size: 1024,
            name_length: DEFAULT_NAME_LENGTH,
            naming_strategy: NamingStrategy::Random,
            validation_policy: ValidationPolicy::TrustExtension,
            detector_type: "probe".to_string(),
            detector_command: None,
            allowed_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            chunk_size: env::var("CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&size: &usize| size > 0)
                .unwrap_or(default.chunk_size),

            name_length: env::var("NAME_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&len: &usize| len > 0)
                .unwrap_or(default.name_length),

            naming_strategy: env::var("NAMING_STRATEGY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.naming_strategy),

            validation_policy: env::var("VALIDATION_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.validation_policy),

            detector_type: env::var("DETECTOR").unwrap_or(default.detector_type),

            detector_command: env::var("DETECTOR_COMMAND").ok(),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (no content sniffing, no-op detector)
    pub fn development() -> Self {
        Self {
            validation_policy: ValidationPolicy::TrustExtension,
            detector_type: "noop".to_string(),
            ..Self::default()
        }
    }

    /// Create config for production (content sniffing, image probe)
    pub fn production() -> Self {
        Self {
            validation_policy: ValidationPolicy::VerifyMagicBytes,
            detector_type: "probe".to_string(),
            ..Self::default()
        }
    }
}
