//! TOML draft files.
//!
//! A draft is the editable part of an estimate written by hand:
//!
//! ```toml
//! project_name = "Bathroom"
//! client_name = "Dana"
//! tax_rate = 20
//!
//! [[materials]]
//! name = "Tiles"
//! price_per_unit = "10"
//! quantity = 2
//! unit = "m2"
//!
//! [labor]
//! rate_type = "hourly"
//! rate = 20
//! hours = "4"
//!
//! [dimensions]
//! length = 250
//! ```
//!
//! | Field | Missing value |
//! |-------|---------------|
//! | `tax_rate` | `[defaults] default_tax_rate` |
//! | `labor` | hourly at `[defaults] default_labor_rate`, 0 hours |
//! | `labor.rate` | `[defaults] default_labor_rate` |
//! | `materials[].id` | generated |
//! | `materials[].unit` | `piece` |
//! | `materials[].price_per_unit`, `quantity` | 0 |
//!
//! Numbers may be written as TOML numbers or as strings. Either way they go
//! through [`parse_or_zero`], so `"1,250.00"` is accepted, `"3 m2"` reads as
//! 3 and `"n/a"` counts as 0.

use std::path::{Path, PathBuf};

use estimate_core::input::parse_or_zero;
use estimate_core::{DEFAULT_UNIT, Dimensions, EstimateFormData, Labor, Material, RateType};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Defaults;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("cannot read draft '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid draft: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown labor rate type '{0}' (expected 'hourly' or 'fixed')")]
    UnknownRateType(String),
}

/// A number as it appears in a draft file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericInput {
    pub fn to_decimal(&self) -> Decimal {
        match self {
            Self::Integer(i) => Decimal::from(*i),
            Self::Float(f) => parse_or_zero(&f.to_string()),
            Self::Text(s) => parse_or_zero(s),
        }
    }
}

fn decimal_or(
    input: Option<&NumericInput>,
    fallback: Decimal,
) -> Decimal {
    input.map_or(fallback, NumericInput::to_decimal)
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftMaterial {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub price_per_unit: Option<NumericInput>,
    pub quantity: Option<NumericInput>,
    pub unit: Option<String>,
}

impl DraftMaterial {
    fn into_material(self) -> Material {
        Material {
            id: non_blank(self.id).unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            name: self.name,
            price_per_unit: decimal_or(self.price_per_unit.as_ref(), Decimal::ZERO),
            quantity: decimal_or(self.quantity.as_ref(), Decimal::ZERO),
            unit: non_blank(self.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftLabor {
    pub rate_type: Option<String>,
    pub rate: Option<NumericInput>,
    pub hours: Option<NumericInput>,
}

impl DraftLabor {
    fn into_labor(
        self,
        defaults: &Defaults,
    ) -> Result<Labor, DraftError> {
        let rate_type = match self.rate_type.as_deref() {
            None => RateType::default(),
            Some(s) => RateType::parse(s).ok_or_else(|| DraftError::UnknownRateType(s.to_string()))?,
        };
        Ok(Labor {
            rate_type,
            rate: decimal_or(self.rate.as_ref(), defaults.default_labor_rate),
            hours: self.hours.as_ref().map(NumericInput::to_decimal),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftDimensions {
    pub length: Option<NumericInput>,
    pub width: Option<NumericInput>,
    pub height: Option<NumericInput>,
}

impl DraftDimensions {
    /// `None` when no measurement is given at all.
    fn into_dimensions(self) -> Option<Dimensions> {
        let dims = Dimensions {
            length: self.length.as_ref().map(NumericInput::to_decimal),
            width: self.width.as_ref().map(NumericInput::to_decimal),
            height: self.height.as_ref().map(NumericInput::to_decimal),
        };
        (dims != Dimensions::default()).then_some(dims)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftFile {
    pub project_name: String,
    pub client_name: Option<String>,
    #[serde(default)]
    pub materials: Vec<DraftMaterial>,
    pub labor: Option<DraftLabor>,
    pub dimensions: Option<DraftDimensions>,
    pub tax_rate: Option<NumericInput>,
    pub notes: Option<String>,
}

impl DraftFile {
    pub fn from_toml_str(contents: &str) -> Result<Self, DraftError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DraftError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Fills the gaps from `defaults` and produces a form ready for pricing.
    pub fn into_form(
        self,
        defaults: &Defaults,
    ) -> Result<EstimateFormData, DraftError> {
        let labor = match self.labor {
            Some(labor) => labor.into_labor(defaults)?,
            None => Labor::hourly(defaults.default_labor_rate, Decimal::ZERO),
        };

        Ok(EstimateFormData {
            project_name: self.project_name,
            client_name: non_blank(self.client_name),
            materials: self
                .materials
                .into_iter()
                .map(DraftMaterial::into_material)
                .collect(),
            labor,
            dimensions: self.dimensions.and_then(DraftDimensions::into_dimensions),
            tax_rate: decimal_or(self.tax_rate.as_ref(), defaults.default_tax_rate),
            notes: non_blank(self.notes),
        })
    }
}
