use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Block code reserved for empty space.
pub const AIR: u8 = 0;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read block table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse block table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Block {code}: light attenuation must be at least 1")]
    ZeroAttenuation { code: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProps {
    pub solid: bool,
    /// Light lost per step through this cell. Only meaningful for
    /// transparent codes.
    #[serde(default = "default_attenuation")]
    pub attenuation: u8,
}

fn default_attenuation() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBlockDef {
    code: u8,
    solid: bool,
    #[serde(default = "default_attenuation")]
    attenuation: u8,
}

/// Static table mapping an 8-bit block code to its physical properties.
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    props: Box<[BlockProps; 256]>,
}

impl Default for BlockCatalog {
    fn default() -> Self {
        let mut props = Box::new([BlockProps {
            solid: true,
            attenuation: 1,
        }; 256]);
        props[AIR as usize] = BlockProps {
            solid: false,
            attenuation: 1,
        };
        Self { props }
    }
}

impl BlockCatalog {
    pub fn define(&mut self, code: u8, props: BlockProps) -> Result<(), CatalogError> {
        if !props.solid && props.attenuation == 0 {
            return Err(CatalogError::ZeroAttenuation { code });
        }
        self.props[code as usize] = props;
        Ok(())
    }

    pub fn is_solid(&self, code: u8) -> bool {
        self.props[code as usize].solid
    }

    pub fn is_transparent(&self, code: u8) -> bool {
        !self.is_solid(code)
    }

    pub fn attenuation(&self, code: u8) -> u8 {
        self.props[code as usize].attenuation.max(1)
    }

    /// Builds a catalog from a JSON array of block definitions. Codes not
    /// listed keep the defaults (0 = air, everything else solid).
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawBlockDef> = serde_json::from_str(text)?;
        let mut catalog = Self::default();
        for def in raw {
            catalog.define(
                def.code,
                BlockProps {
                    solid: def.solid,
                    attenuation: def.attenuation,
                },
            )?;
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = BlockCatalog::default();
        assert!(catalog.is_transparent(AIR));
        assert!(catalog.is_solid(1));
        assert_eq!(catalog.attenuation(AIR), 1);
    }

    #[test]
    fn test_from_json() {
        let catalog = BlockCatalog::from_json(
            r#"[
                {"code": 5, "solid": false, "attenuation": 3},
                {"code": 6, "solid": true}
            ]"#,
        )
        .unwrap();
        assert!(catalog.is_transparent(5));
        assert_eq!(catalog.attenuation(5), 3);
        assert!(catalog.is_solid(6));
    }

    #[test]
    fn test_zero_attenuation_rejected() {
        let result = BlockCatalog::from_json(r#"[{"code": 2, "solid": false, "attenuation": 0}]"#);
        assert!(matches!(
            result,
            Err(CatalogError::ZeroAttenuation { code: 2 })
        ));
    }
}
