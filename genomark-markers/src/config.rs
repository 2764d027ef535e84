use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use genomark_core::models::Pos;

use crate::errors::MarkerError;
use crate::frame::FrameType;

pub const DEFAULT_SPLICE_SITE_SIZE: Pos = 2;
pub const DEFAULT_SPLICE_REGION_EXON_SIZE: Pos = 3;
pub const DEFAULT_SPLICE_REGION_INTRON_MIN: Pos = 3;
pub const DEFAULT_SPLICE_REGION_INTRON_MAX: Pos = 8;
pub const DEFAULT_UP_DOWN_LENGTH: Pos = 5000;

///
/// Knobs for building the annotation tree and resolving effects.
///
/// Every field has a default, so a TOML file only needs to list what it
/// changes:
///
/// ```toml
/// splice_site_size = 3
/// frame_type = "ucsc"
/// ```
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Length of acceptor/donor sites, in bases.
    pub splice_site_size: Pos,
    /// Exonic part of a splice region, in bases.
    pub splice_region_exon_size: Pos,
    /// Intronic splice region starts this many bases into the intron...
    pub splice_region_intron_min: Pos,
    /// ...and ends here.
    pub splice_region_intron_max: Pos,
    pub upstream_size: Pos,
    pub downstream_size: Pos,
    /// Resolve coding effects even for transcripts not flagged as protein coding.
    pub treat_all_as_protein_coding: bool,
    pub frame_type: FrameType,
    pub create_utrs_from_cds: bool,
    pub collapse_zero_gap: bool,
    pub remove_redundant: bool,
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            splice_site_size: DEFAULT_SPLICE_SITE_SIZE,
            splice_region_exon_size: DEFAULT_SPLICE_REGION_EXON_SIZE,
            splice_region_intron_min: DEFAULT_SPLICE_REGION_INTRON_MIN,
            splice_region_intron_max: DEFAULT_SPLICE_REGION_INTRON_MAX,
            upstream_size: DEFAULT_UP_DOWN_LENGTH,
            downstream_size: DEFAULT_UP_DOWN_LENGTH,
            treat_all_as_protein_coding: false,
            frame_type: FrameType::Gff,
            create_utrs_from_cds: true,
            collapse_zero_gap: true,
            remove_redundant: true,
        }
    }
}

impl EffectConfig {
    ///
    /// Read a configuration from a TOML file. Missing keys keep their
    /// default values.
    ///
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, MarkerError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: EffectConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MarkerError> {
        if self.splice_site_size < 0
            || self.splice_region_exon_size < 0
            || self.upstream_size < 0
            || self.downstream_size < 0
        {
            return Err(MarkerError::InvalidConfig(
                "sizes must not be negative".to_string(),
            ));
        }
        if self.splice_region_intron_min < 1
            || self.splice_region_intron_min > self.splice_region_intron_max
        {
            return Err(MarkerError::InvalidConfig(format!(
                "intron splice region [{}, {}] is empty",
                self.splice_region_intron_min, self.splice_region_intron_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[rstest]
    fn test_default_config() {
        let config = EffectConfig::default();
        assert_eq!(config.splice_site_size, 2);
        assert_eq!(config.splice_region_exon_size, 3);
        assert_eq!(config.splice_region_intron_min, 3);
        assert_eq!(config.splice_region_intron_max, 8);
        assert_eq!(config.frame_type, FrameType::Gff);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn test_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "splice_site_size = 3\nframe_type = \"ucsc\"").unwrap();

        let config = EffectConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.splice_site_size, 3);
        assert_eq!(config.frame_type, FrameType::Ucsc);
        assert_eq!(config.upstream_size, DEFAULT_UP_DOWN_LENGTH);
    }

    #[rstest]
    fn test_invalid_intron_region() {
        let config = EffectConfig {
            splice_region_intron_min: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[rstest]
    fn test_missing_file() {
        assert!(EffectConfig::from_toml_file("/definitely/not/here.toml").is_err());
    }
}
