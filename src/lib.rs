// src/lib.rs

// module declarations
pub mod config;
pub mod content_type;
pub mod errors;
pub mod fs;
pub mod resolve;
pub mod sniff;
pub mod static_server;

// re-exports
pub use config::*;
pub use content_type::{ContentTypeDetector, Detection, ExtensionDetector, SniffingDetector};
pub use errors::*;
pub use fs::{FileStat, FileSystem, LocalFileSystem, MemoryFileSystem};
pub use resolve::{PathResolver, ResolvedTarget};
pub use static_server::*;
