//! Recording configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::diag::Error;

/// How, and whether, to record.
///
/// Any field missing from a configuration file takes its default.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordConfig {
    /// The directory in which to write frame files.
    pub directory: PathBuf,

    /// Whether to write the `frame_NNNN_limare.c` stream alongside the GL
    /// one.
    pub alternate: bool,

    /// Whether to write each finished texture's base level as a PNG file.
    pub texture_images: bool,

    /// The number of the first frame recorded.
    pub first_frame: u32,
}

impl Default for RecordConfig {
    fn default() -> RecordConfig {
        RecordConfig {
            directory: PathBuf::from("."),
            alternate: true,
            texture_images: false,
            first_frame: 1,
        }
    }
}

impl RecordConfig {
    pub fn from_toml(text: &str) -> Result<RecordConfig, Error> {
        toml::from_str(text).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<RecordConfig, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| Error::Open { path: path.to_owned(), source })?;
        RecordConfig::from_toml(&text)
    }

    /// Build a configuration from the environment, or return `None` if
    /// recording wasn't asked for.
    ///
    /// `QGL_RECORD_CONFIG` names a TOML configuration file, and
    /// `QGL_RECORD_DIR` names the output directory, overriding the file's.
    /// Setting either one turns recording on.
    pub fn from_env() -> Result<Option<RecordConfig>, Error> {
        let mut config = match env::var_os("QGL_RECORD_CONFIG") {
            Some(path) => Some(RecordConfig::load(path)?),
            None => None,
        };
        if let Some(dir) = env::var_os("QGL_RECORD_DIR") {
            config.get_or_insert_with(RecordConfig::default).directory = dir.into();
        }
        Ok(config)
    }
}

#[test]
fn test_from_toml() {
    let config = RecordConfig::from_toml(
        r#"
            directory = "/tmp/frames"
            texture_images = true
        "#,
    )
    .unwrap();
    assert_eq!(config.directory, PathBuf::from("/tmp/frames"));
    assert!(config.texture_images);
    assert!(config.alternate);
    assert_eq!(config.first_frame, 1);

    assert_eq!(RecordConfig::from_toml("").unwrap(), RecordConfig::default());

    match RecordConfig::from_toml("first_frame = \"soon\"") {
        Err(Error::Config(_)) => (),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}
