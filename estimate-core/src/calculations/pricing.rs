//! Estimate pricing.
//!
//! Turns the line items of a draft into a total cost.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Materials cost: Σ price per unit × quantity (0 when there are no materials) |
//! | 2    | Labor cost: hours × rate when hourly (missing hours count as 0), rate when fixed |
//! | 3    | Subtotal: Step 1 + Step 2 |
//! | 4    | Tax: Step 3 × tax rate / 100 when the tax rate is above 0, otherwise 0 |
//! | 5    | Total: Step 3 + Step 4, rounded half-up to 2 decimal places |
//!
//! Rounding happens once, at step 5. Dimensions never affect the price.
//! Every step uses checked arithmetic; an amount too large for a [`Decimal`]
//! is reported as [`FormError::AmountOutOfRange`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use estimate_core::calculations::compute_total;
//! use estimate_core::{EstimateFormData, Labor, Material};
//!
//! let form = EstimateFormData {
//!     materials: vec![
//!         Material::new("Tiles", dec!(10), dec!(2), "m2"),
//!         Material::new("Grout", dec!(5), dec!(3), "bag"),
//!     ],
//!     labor: Labor::hourly(dec!(20), dec!(4)),
//!     tax_rate: dec!(20),
//!     ..EstimateFormData::new("Bathroom")
//! };
//!
//! assert_eq!(compute_total(&form).unwrap(), dec!(138.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::models::{EstimateFormData, FormError};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Intermediate values of a pricing run.
///
/// Only `total` is rounded; the other amounts are exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub materials_cost: Decimal,
    pub labor_cost: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Total cost of `form`, rounded to two decimal places.
///
/// # Errors
/// [`FormError::AmountOutOfRange`] when an amount does not fit a [`Decimal`].
pub fn compute_total(form: &EstimateFormData) -> Result<Decimal, FormError> {
    price_breakdown(form).map(|breakdown| breakdown.total)
}

/// Prices `form` and keeps every intermediate amount.
///
/// # Errors
/// [`FormError::AmountOutOfRange`] when an amount does not fit a [`Decimal`].
pub fn price_breakdown(form: &EstimateFormData) -> Result<PriceBreakdown, FormError> {
    let materials_cost = materials_cost(form)?;
    let labor_cost = form
        .labor
        .cost()
        .ok_or(FormError::AmountOutOfRange("labor cost"))?;
    let subtotal = materials_cost
        .checked_add(labor_cost)
        .ok_or(FormError::AmountOutOfRange("subtotal"))?;
    let tax = tax(subtotal, form.tax_rate).ok_or(FormError::AmountOutOfRange("tax"))?;
    let total = subtotal
        .checked_add(tax)
        .ok_or(FormError::AmountOutOfRange("total"))?;

    Ok(PriceBreakdown {
        materials_cost,
        labor_cost,
        subtotal,
        tax,
        total: round_half_up(total),
    })
}

fn materials_cost(form: &EstimateFormData) -> Result<Decimal, FormError> {
    form.materials.iter().try_fold(Decimal::ZERO, |sum, material| {
        material
            .line_cost()
            .and_then(|line| sum.checked_add(line))
            .ok_or(FormError::AmountOutOfRange("materials cost"))
    })
}

/// Zero and negative rates both produce no tax. `None` on overflow.
fn tax(
    subtotal: Decimal,
    tax_rate: Decimal,
) -> Option<Decimal> {
    if tax_rate > Decimal::ZERO {
        subtotal.checked_mul(tax_rate.checked_div(ONE_HUNDRED)?)
    } else {
        Some(Decimal::ZERO)
    }
}
