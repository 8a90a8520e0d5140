// src/config.rs

// dependencies
use serde::Deserialize;
use std::borrow::Cow;
use std::path::PathBuf;

// document looked up inside a requested directory
pub const DEFAULT_INDEX_FILE: &str = "index.html";

// which strategy a mount uses to pick the Content-Type of a served file
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeStrategy {
    #[default]
    Extension,
    Sniff,
}

// struct type which represents configuration for a static file mount
#[derive(Clone, Debug, Deserialize)]
pub struct StaticServerConfig {
    #[serde(default)]
    pub mount_path: Cow<'static, str>,
    pub root_dir: PathBuf,
    #[serde(default)]
    pub allow_directory_index: bool,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default)]
    pub content_type: ContentTypeStrategy,
}

fn default_index_file() -> String {
    DEFAULT_INDEX_FILE.to_string()
}

// methods for the StaticServerConfig type
impl StaticServerConfig {
    pub fn new<T, U>(mount_path: T, root_dir: U) -> Self
    where
        T: Into<Cow<'static, str>>,
        U: Into<PathBuf>,
    {
        StaticServerConfig {
            mount_path: mount_path.into(),
            root_dir: root_dir.into(),
            allow_directory_index: false,
            index_file: default_index_file(),
            content_type: ContentTypeStrategy::default(),
        }
    }

    pub fn with_directory_index(mut self, allow: bool) -> Self {
        self.allow_directory_index = allow;
        self
    }

    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    pub fn with_content_type(mut self, strategy: ContentTypeStrategy) -> Self {
        self.content_type = strategy;
        self
    }
}
