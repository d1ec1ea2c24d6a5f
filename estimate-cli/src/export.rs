//! Plain-text quote documents.

use std::fmt::Write;

use chrono::Local;
use estimate_core::calculations::common::round_half_up;
use estimate_core::input::opt_decimal_display;
use estimate_core::{Estimate, EstimateExporter, ExportError, RateType};
use rust_decimal::Decimal;

use crate::config::{BusinessInfo, Settings};

/// `€12.50` style amount, always with two decimal places.
pub fn format_money(
    currency_symbol: &str,
    amount: Decimal,
) -> String {
    format!("{currency_symbol}{}", round_half_up(amount))
}

/// Renders an estimate as a quote a client can read.
#[derive(Debug, Clone)]
pub struct TextQuoteExporter {
    business: BusinessInfo,
    currency_symbol: String,
}

impl TextQuoteExporter {
    pub fn new(
        business: BusinessInfo,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            business,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.business.clone(),
            settings.defaults.currency_symbol.as_str(),
        )
    }

    fn money(
        &self,
        amount: Decimal,
    ) -> String {
        format_money(&self.currency_symbol, amount)
    }

    /// The quote body without the business header.
    pub fn render_body(
        &self,
        out: &mut String,
        estimate: &Estimate,
    ) -> std::fmt::Result {
        let form = estimate.form();

        writeln!(out, "Project: {}", form.project_name)?;
        if let Some(client) = &form.client_name {
            writeln!(out, "Client: {client}")?;
        }
        writeln!(
            out,
            "Date: {}",
            estimate.created_at().with_timezone(&Local).format("%Y-%m-%d")
        )?;

        if !form.materials.is_empty() {
            writeln!(out)?;
            writeln!(out, "Materials")?;
            for material in &form.materials {
                writeln!(
                    out,
                    "  {}: {} {} x {} = {}",
                    material.name,
                    material.quantity,
                    material.unit,
                    self.money(material.price_per_unit),
                    self.money(material.line_cost().ok_or(std::fmt::Error)?),
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Labor")?;
        let labor = &form.labor;
        let labor_cost = labor.cost().ok_or(std::fmt::Error)?;
        match labor.rate_type {
            RateType::Hourly => writeln!(
                out,
                "  {}: {}/hour x {} hours = {}",
                labor.rate_type.to_long_str(),
                self.money(labor.rate),
                labor.hours.unwrap_or(Decimal::ZERO),
                self.money(labor_cost),
            )?,
            RateType::Fixed => writeln!(
                out,
                "  {}: {}",
                labor.rate_type.to_long_str(),
                self.money(labor_cost),
            )?,
        }

        if let Some(dims) = &form.dimensions {
            writeln!(out)?;
            writeln!(
                out,
                "Dimensions: {} x {} x {} cm",
                opt_decimal_display(&dims.length),
                opt_decimal_display(&dims.width),
                opt_decimal_display(&dims.height),
            )?;
        }

        if let Some(notes) = &form.notes {
            writeln!(out)?;
            writeln!(out, "Notes")?;
            for line in notes.lines() {
                writeln!(out, "  {line}")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Total: {}", self.money(estimate.total_cost()))?;
        writeln!(out, "Including {}% tax", form.tax_rate.normalize())
    }

    pub fn render(
        &self,
        estimate: &Estimate,
    ) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let header = self.business.header_lines();
        for line in &header {
            writeln!(out, "{line}")?;
        }
        if !header.is_empty() {
            writeln!(out)?;
        }
        writeln!(out, "ESTIMATE")?;
        writeln!(out)?;
        self.render_body(&mut out, estimate)?;
        Ok(out)
    }
}

impl EstimateExporter for TextQuoteExporter {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn export(
        &self,
        estimate: &Estimate,
    ) -> Result<Vec<u8>, ExportError> {
        self.render(estimate)
            .map(String::into_bytes)
            .map_err(|e| ExportError::Render {
                estimate_id: estimate.id(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use estimate_core::{Dimensions, EstimateFormData, Labor, Material};

    use super::*;

    fn bathroom() -> Estimate {
        let form = EstimateFormData {
            client_name: Some("Dana".to_string()),
            materials: vec![
                Material::new("Tiles", dec!(10), dec!(2), "m2"),
                Material::new("Grout", dec!(5), dec!(3), "bag"),
            ],
            labor: Labor::hourly(dec!(20), dec!(4)),
            dimensions: Some(Dimensions {
                length: Some(dec!(250)),
                width: Some(dec!(180)),
                height: None,
            }),
            tax_rate: dec!(20),
            notes: Some("Grey grout".to_string()),
            ..EstimateFormData::new("Bathroom")
        };
        Estimate::new(form, Utc::now()).unwrap()
    }

    fn exporter() -> TextQuoteExporter {
        TextQuoteExporter::new(
            BusinessInfo {
                name: Some("Smith Carpentry".to_string()),
                email: None,
                phone: Some("0123 456".to_string()),
            },
            "€",
        )
    }

    #[test]
    fn format_money_always_has_two_places() {
        assert_eq!(format_money("€", dec!(500)), "€500.00");
        assert_eq!(format_money("$", dec!(12.345)), "$12.35");
    }

    #[test]
    fn quote_starts_with_business_header() {
        let text = exporter().render(&bathroom()).unwrap();
        assert!(text.starts_with("Smith Carpentry\n0123 456\n\nESTIMATE\n"));
    }

    #[test]
    fn quote_without_business_info_starts_with_title() {
        let exporter = TextQuoteExporter::new(BusinessInfo::default(), "€");
        let text = exporter.render(&bathroom()).unwrap();
        assert!(text.starts_with("ESTIMATE\n"));
    }

    #[test]
    fn quote_lists_line_totals_labor_and_tax() {
        let text = exporter().render(&bathroom()).unwrap();

        assert!(text.contains("Client: Dana"));
        assert!(text.contains("  Tiles: 2 m2 x €10.00 = €20.00"));
        assert!(text.contains("  Grout: 3 bag x €5.00 = €15.00"));
        assert!(text.contains("  Hourly Rate: €20.00/hour x 4 hours = €80.00"));
        assert!(text.contains("Dimensions: 250 x 180 x — cm"));
        assert!(text.contains("  Grey grout"));
        assert!(text.contains("Total: €138.00"));
        assert!(text.ends_with("Including 20% tax\n"));
    }

    #[test]
    fn fixed_labor_shows_price_only() {
        let form = EstimateFormData {
            labor: Labor {
                hours: Some(dec!(10)),
                ..Labor::fixed(dec!(500))
            },
            tax_rate: Decimal::ZERO,
            ..EstimateFormData::new("Mural")
        };
        let estimate = Estimate::new(form, Utc::now()).unwrap();

        let text = exporter().render(&estimate).unwrap();

        assert!(text.contains("  Fixed Price: €500.00"));
        assert!(!text.contains("hours"));
        assert!(!text.contains("Materials"));
        assert!(text.contains("Total: €500.00"));
        assert!(text.ends_with("Including 0% tax\n"));
    }

    #[test]
    fn export_returns_utf8_text() {
        let exporter = exporter();
        let estimate = bathroom();

        let bytes = exporter.export(&estimate).unwrap();

        assert_eq!(exporter.file_extension(), "txt");
        assert!(exporter.content_type().starts_with("text/plain"));
        assert_eq!(String::from_utf8(bytes).unwrap(), exporter.render(&estimate).unwrap());
    }
}
