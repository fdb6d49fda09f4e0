// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use byte_unit::Byte;
use hopmesh_routing::forwarding::ForwardingStrategy;
use serde::{Deserialize, de};
use serde_yaml::Value;

/// Parse a value which could be an integer or a string and return u64 value
///
/// The string can be a hex string with underscores or a Byte string that
/// specifies units. Some examples are:
///  0x100000000
///  0x1_0000_0000
///  4GiB, 4096MiB
pub fn parse_byte_str<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: de::Deserializer<'de>,
{
    // Go through a generic `Value` so that plain integers are accepted too.
    let value: Value = Deserialize::deserialize(deserializer)?;

    if let Some(number) = value.as_u64() {
        return Ok(number);
    }

    let Some(s) = value.as_str() else {
        return Err(de::Error::custom(format!(
            "'{value:?}': Unsupported type for Deserialize (should be u64 or String)"
        )));
    };

    // Convert to lowercase in order to standardise any 0x prefix
    let lowercase = s.to_lowercase();

    if lowercase.starts_with("0x") {
        let without_underscore = lowercase.replace('_', "");
        let without_0x = without_underscore.trim_start_matches("0x");
        u64::from_str_radix(without_0x, 16)
            .map_err(|e| de::Error::custom(format!("Unable to parse {s} as hex string: {e}")))
    } else {
        let ignore_case = false;
        let num_bytes = Byte::parse_str(s, ignore_case)
            .map_err(|e| de::Error::custom(format!("Unable to parse {s} as Byte string: {e}")))?;
        Ok(num_bytes.as_u64())
    }
}

pub fn parse_optional_byte_str<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: de::Deserializer<'de>,
{
    Ok(Some(parse_byte_str(deserializer)?))
}

#[derive(Debug, Deserialize)]
pub struct PlatformConfig {
    pub mesh: MeshSection,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MeshSection {
    pub name: Option<String>,
    pub columns: usize,
    pub rows: usize,
    /// Signed so that a negative budget is reported by the platform rather
    /// than rejected by the parser.
    pub max_num_hops: i64,
    #[serde(default, deserialize_with = "parse_optional_byte_str")]
    pub node_memory_bytes: Option<u64>,
    pub forwarding: Option<ForwardingStrategy>,
    pub seed: Option<u64>,
    pub port_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> MeshSection {
        let cfg: PlatformConfig = serde_yaml::from_str(s).unwrap();
        cfg.mesh
    }

    #[test]
    fn minimal_section() {
        let mesh = parse(
            "
mesh:
  columns: 3
  rows: 4
  max_num_hops: 2
",
        );
        assert_eq!(mesh.columns, 3);
        assert_eq!(mesh.rows, 4);
        assert_eq!(mesh.max_num_hops, 2);
        assert!(mesh.name.is_none());
        assert!(mesh.node_memory_bytes.is_none());
        assert!(mesh.forwarding.is_none());
    }

    #[test]
    fn byte_strings() {
        for (text, expected) in [
            ("4GiB", 4 * 1024 * 1024 * 1024),
            ("0x1_0000_0000", 0x1_0000_0000),
            ("4096", 4096),
            ("1MB", 1_000_000),
        ] {
            let mesh = parse(&format!(
                "
mesh:
  columns: 3
  rows: 3
  max_num_hops: 1
  node_memory_bytes: {text}
"
            ));
            assert_eq!(mesh.node_memory_bytes, Some(expected));
        }
    }

    #[test]
    fn forwarding_names() {
        let mesh = parse(
            "
mesh:
  columns: 3
  rows: 3
  max_num_hops: -1
  forwarding: nearest-boundary
",
        );
        assert_eq!(mesh.forwarding, Some(ForwardingStrategy::NearestBoundary));
        assert_eq!(mesh.max_num_hops, -1);
    }

    #[test]
    fn bad_byte_string() {
        let result: Result<PlatformConfig, _> = serde_yaml::from_str(
            "
mesh:
  columns: 3
  rows: 3
  max_num_hops: 1
  node_memory_bytes: lots
",
        );
        assert!(result.is_err());
    }
}
