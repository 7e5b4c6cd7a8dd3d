use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Geographic extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

impl FromStr for BoundingBox {
    type Err = FetchError;

    /// Parses `min_lon,min_lat,max_lon,max_lat`.
    fn from_str(input: &str) -> Result<Self> {
        let invalid = |reason: String| FetchError::InvalidBoundingBox {
            input: input.to_string(),
            reason,
        };

        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(invalid(format!(
                "expected 4 comma-separated values (min_lon,min_lat,max_lon,max_lat), got {}",
                parts.len()
            )));
        }

        let mut coords = [0.0f64; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            let value: f64 = part
                .parse()
                .map_err(|_| invalid(format!("'{}' is not a number", part)))?;
            if !value.is_finite() {
                return Err(invalid(format!("'{}' is not a finite number", part)));
            }
            *slot = value;
        }

        let [west, south, east, north] = coords;
        Ok(Self::new(west, south, east, north))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

impl Validate for BoundingBox {
    fn validate(&self) -> Result<()> {
        validate_range("bbox.west", self.west, -180.0, 180.0)?;
        validate_range("bbox.east", self.east, -180.0, 180.0)?;
        validate_range("bbox.south", self.south, -90.0, 90.0)?;
        validate_range("bbox.north", self.north, -90.0, 90.0)?;

        if self.west >= self.east {
            return Err(FetchError::InvalidBoundingBox {
                input: self.to_string(),
                reason: "west edge must be less than east edge".to_string(),
            });
        }
        if self.south >= self.north {
            return Err(FetchError::InvalidBoundingBox {
                input: self.to_string(),
                reason: "south edge must be less than north edge".to_string(),
            });
        }
        Ok(())
    }
}

/// Global DEM datasets served by the OpenTopography `globaldem` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DemType {
    #[default]
    #[serde(rename = "SRTMGL3")]
    Srtmgl3,
    #[serde(rename = "SRTMGL1")]
    Srtmgl1,
    #[serde(rename = "SRTMGL1_E")]
    Srtmgl1Ellipsoidal,
    #[serde(rename = "AW3D30")]
    Aw3d30,
    #[serde(rename = "AW3D30_E")]
    Aw3d30Ellipsoidal,
    #[serde(rename = "SRTM15Plus")]
    Srtm15Plus,
    #[serde(rename = "NASADEM")]
    Nasadem,
    #[serde(rename = "COP30")]
    Cop30,
    #[serde(rename = "COP90")]
    Cop90,
    #[serde(rename = "EU_DTM")]
    EuDtm,
    #[serde(rename = "GEDI_L3")]
    GediL3,
    #[serde(rename = "GEBCOIceTopo")]
    GebcoIceTopo,
    #[serde(rename = "GEBCOSubIceTopo")]
    GebcoSubIceTopo,
}

impl DemType {
    pub const ALL: [DemType; 13] = [
        DemType::Srtmgl3,
        DemType::Srtmgl1,
        DemType::Srtmgl1Ellipsoidal,
        DemType::Aw3d30,
        DemType::Aw3d30Ellipsoidal,
        DemType::Srtm15Plus,
        DemType::Nasadem,
        DemType::Cop30,
        DemType::Cop90,
        DemType::EuDtm,
        DemType::GediL3,
        DemType::GebcoIceTopo,
        DemType::GebcoSubIceTopo,
    ];

    /// Identifier sent as the `demtype` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            DemType::Srtmgl3 => "SRTMGL3",
            DemType::Srtmgl1 => "SRTMGL1",
            DemType::Srtmgl1Ellipsoidal => "SRTMGL1_E",
            DemType::Aw3d30 => "AW3D30",
            DemType::Aw3d30Ellipsoidal => "AW3D30_E",
            DemType::Srtm15Plus => "SRTM15Plus",
            DemType::Nasadem => "NASADEM",
            DemType::Cop30 => "COP30",
            DemType::Cop90 => "COP90",
            DemType::EuDtm => "EU_DTM",
            DemType::GediL3 => "GEDI_L3",
            DemType::GebcoIceTopo => "GEBCOIceTopo",
            DemType::GebcoSubIceTopo => "GEBCOSubIceTopo",
        }
    }
}

impl fmt::Display for DemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemType {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        DemType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FetchError::InvalidConfigValueError {
                field: "dem_type".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unknown dataset. Valid types: {}",
                    DemType::ALL
                        .iter()
                        .map(DemType::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

/// A single download job: who is asking, for what area, and where it goes.
#[derive(Clone)]
pub struct FetchRequest {
    pub api_key: String,
    pub bbox: BoundingBox,
    pub output_path: PathBuf,
}

impl FetchRequest {
    pub fn new(api_key: impl Into<String>, bbox: BoundingBox, output_path: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            bbox,
            output_path: output_path.into(),
        }
    }
}

impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("api_key", &"<redacted>")
            .field("bbox", &self.bbox)
            .field("output_path", &self.output_path)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub output_path: PathBuf,
    pub bytes_written: u64,
    pub attempts: u32,
    pub content_type: String,
    pub elapsed: Duration,
}
