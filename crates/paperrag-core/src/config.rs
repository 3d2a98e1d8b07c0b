//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`,
//! `config.<env>.toml`, the conventional credential variables
//! (`PINECONE_API_KEY`, `GOOGLE_API_KEY`) and finally `APP_*` variables
//! (`__` nests, e.g. `APP_RETRIEVAL__TOP_K_TEXT=8`). Everything is read once
//! at startup.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::RetrievalDefaults;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Ok(Self { figment: Self::figment_for_env(&env_name) })
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn figment_for_env(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment
            .merge(Env::raw().only(&["PINECONE_API_KEY"]).map(|_| "text_index.api_key".into()))
            .merge(Env::raw().only(&["PINECONE_API_KEY"]).map(|_| "image_index.api_key".into()))
            .merge(Env::raw().only(&["GOOGLE_API_KEY"]).map(|_| "llm.api_key".into()))
            .merge(Env::raw().only(&["APP_USE_FAKE_EMBEDDINGS"]).map(|_| "encoders.fake".into()))
            .merge(Env::prefixed("APP_").split("__"))
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner_lossy(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extract and validate the full typed settings.
    ///
    /// Lossy so flags set from the environment as `1`/`0` read as booleans.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract_lossy()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub retrieval: RetrievalDefaults,
    pub text_index: IndexSettings,
    pub image_index: IndexSettings,
    pub encoders: EncoderSettings,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retrieval: RetrievalDefaults::default(),
            text_index: IndexSettings::named("my-multimodal-rag-text"),
            image_index: IndexSettings::named("my-multimodal-rag-image"),
            encoders: EncoderSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k_text == 0 || self.retrieval.top_k_image == 0 {
            return Err(Error::InvalidConfig("default top_k values must be positive".to_string()));
        }
        self.text_index.validate("text_index")?;
        self.image_index.validate("image_index")?;
        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::InvalidConfig("llm.api_key is required (set GOOGLE_API_KEY)".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Pinecone,
    Lance,
}

/// Connection settings for one vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    pub backend: IndexBackend,
    pub name: String,
    pub api_key: Option<String>,
    /// Data-plane host. Resolved from the control plane by `name` when unset.
    pub host: Option<String>,
    pub namespace: Option<String>,
    pub control_plane_url: String,
    /// LanceDB directory for the `lance` backend.
    pub uri: Option<String>,
    pub timeout_secs: u64,
}

impl IndexSettings {
    pub fn named(name: &str) -> Self {
        Self {
            backend: IndexBackend::Pinecone,
            name: name.to_string(),
            api_key: None,
            host: None,
            namespace: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            uri: None,
            timeout_secs: 30,
        }
    }

    pub fn lance_path(&self) -> Option<PathBuf> {
        self.uri.as_deref().map(expand_path)
    }

    fn validate(&self, section: &str) -> Result<()> {
        match self.backend {
            IndexBackend::Pinecone if self.api_key.as_deref().map_or(true, str::is_empty) => Err(
                Error::InvalidConfig(format!("{section}.api_key is required for the pinecone backend")),
            ),
            IndexBackend::Lance if self.uri.is_none() => Err(Error::InvalidConfig(format!(
                "{section}.uri is required for the lance backend"
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub text_model_dir: String,
    pub image_model_dir: String,
    /// Use deterministic hash encoders instead of loading model weights.
    pub fake: bool,
}

impl EncoderSettings {
    pub fn text_model_path(&self) -> PathBuf {
        expand_path(&self.text_model_dir)
    }

    pub fn image_model_path(&self) -> PathBuf {
        expand_path(&self.image_model_dir)
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            text_model_dir: "models/all-MiniLM-L6-v2".to_string(),
            image_model_dir: "models/clip-vit-base-patch32".to_string(),
            fake: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

