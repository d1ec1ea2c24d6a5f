use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unit label given to materials that do not name one.
pub const DEFAULT_UNIT: &str = "piece";

/// A single line item of an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub price_per_unit: Decimal,
    pub quantity: Decimal,
    pub unit: String,
}

impl Material {
    /// Creates a material with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        price_per_unit: Decimal,
        quantity: Decimal,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: name.into(),
            price_per_unit,
            quantity,
            unit: unit.into(),
        }
    }

    /// Price per unit times quantity, unrounded. `None` on overflow.
    pub fn line_cost(&self) -> Option<Decimal> {
        self.price_per_unit.checked_mul(self.quantity)
    }
}
