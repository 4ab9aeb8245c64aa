pub const APP_NAME: &str = "tagdocs";

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE_NAME: &str = "tagdocs.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TAGDOCS_CONFIG";

/// Environment variable overriding the default destination root.
pub const DEST_ROOT_ENV: &str = "TAGDOCS_DEST_ROOT";

/// Placeholder substituted with the package name in configured relative paths.
pub const PACKAGE_PLACEHOLDER: &str = "{package}";

/// Prebuilt CPU wheels for the native compute dependency of the docs requirements.
pub const DEFAULT_FIND_LINKS: &str = "https://download.pytorch.org/whl/cpu/torch_stable.html";

/// Packaging tools upgraded in every fresh environment before anything else.
pub const DEFAULT_CORE_PACKAGES: [&str; 3] = ["pip", "setuptools", "wheel"];

pub const DEFAULT_REQUIREMENTS: &str = "requirements/{package}/docs.txt";
pub const DEFAULT_DOCS_SOURCE_DIR: &str = "docs/source-{package}";
pub const DEFAULT_ARTIFACT_DIR: &str = "docs/build/html";
pub const DEFAULT_DOCS_TARGET: &str = "html";
pub const DEFAULT_ENV_DIR: &str = "venv-docs-{package}";

/// Log file name for one tag's build: `building-<package>_<tag>.log`.
pub fn log_file_name(package: &str, tag: &str) -> String {
  format!("building-{}_{}.log", package, tag)
}
