use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::calculations::compute_total;

use super::{Dimensions, Labor, Material};

/// Appended to the project name of a duplicated estimate.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Reasons a draft cannot become an estimate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("material id '{0}' appears more than once")]
    DuplicateMaterialId(String),

    /// Pricing overflowed; names the step that did.
    #[error("{0} is too large to price")]
    AmountOutOfRange(&'static str),
}

/// The editable shape of an estimate. Carries no derived values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateFormData {
    pub project_name: String,
    pub client_name: Option<String>,
    /// Display order is insertion order.
    pub materials: Vec<Material>,
    pub labor: Labor,
    pub dimensions: Option<Dimensions>,
    /// Percentage, e.g. `20` for 20 %.
    pub tax_rate: Decimal,
    pub notes: Option<String>,
}

impl EstimateFormData {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    /// Checks that material ids are unique and that the form can be priced.
    pub fn validate(&self) -> Result<(), FormError> {
        self.priced_total().map(|_| ())
    }

    /// Validates and prices in one pass.
    fn priced_total(&self) -> Result<Decimal, FormError> {
        let mut seen = HashSet::with_capacity(self.materials.len());
        for material in &self.materials {
            if !seen.insert(material.id.as_str()) {
                return Err(FormError::DuplicateMaterialId(material.id.clone()));
            }
        }
        compute_total(self)
    }
}

/// A persisted, priced estimate.
///
/// The id, total cost and timestamps are derived and can only be read. New
/// values come from [`Estimate::new`], [`Estimate::replace_form`] and
/// [`Estimate::duplicate`], which keep `total_cost` in step with the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    id: Uuid,
    #[serde(flatten)]
    form: EstimateFormData,
    total_cost: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Estimate {
    /// Prices `form` and stamps both timestamps with `now`.
    pub fn new(
        form: EstimateFormData,
        now: DateTime<Utc>,
    ) -> Result<Self, FormError> {
        let total_cost = form.priced_total()?;
        Ok(Self {
            id: Uuid::now_v7(),
            total_cost,
            form,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an estimate from stored values without repricing it.
    ///
    /// Meant for storage backends reading back rows they wrote. A duplicate
    /// keeps the total of its source, so recomputing here would be wrong.
    pub fn from_parts(
        id: Uuid,
        form: EstimateFormData,
        total_cost: Decimal,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            form,
            total_cost,
            created_at,
            updated_at,
        }
    }

    /// Replaces every form field, reprices and refreshes `updated_at`.
    /// The id and `created_at` are kept.
    pub fn replace_form(
        &mut self,
        form: EstimateFormData,
        now: DateTime<Utc>,
    ) -> Result<(), FormError> {
        self.total_cost = form.priced_total()?;
        self.form = form;
        // updated_at never precedes created_at, even if the clock stepped back
        self.updated_at = now.max(self.created_at);
        Ok(())
    }

    /// Copy under a new id with [`COPY_SUFFIX`] appended to the project name.
    ///
    /// The total is copied as is; the line items are identical.
    pub fn duplicate(
        &self,
        now: DateTime<Utc>,
    ) -> Self {
        let mut form = self.form.clone();
        form.project_name.push_str(COPY_SUFFIX);
        Self {
            id: Uuid::now_v7(),
            form,
            total_cost: self.total_cost,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn form(&self) -> &EstimateFormData {
        &self.form
    }

    pub fn project_name(&self) -> &str {
        &self.form.project_name
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
