use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use estimate_core::calculations::{PriceBreakdown, price_breakdown};
use estimate_core::db::{MemoryRepositoryFactory, RepositoryRegistry};
use estimate_core::{Estimate, EstimateExporter, EstimateFormData, EstimateRepository};
use estimate_db_sqlite::SqliteRepositoryFactory;

use crate::config::Settings;
use crate::draft::DraftFile;
use crate::export::{TextQuoteExporter, format_money};

/// Every backend the binary can talk to.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryRepositoryFactory));
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Save a new estimate from a TOML draft.
    New { draft: PathBuf },

    /// Price a TOML draft without saving it.
    Price { draft: PathBuf },

    /// List saved estimates, newest first.
    List {
        /// Only show estimates whose project name contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one estimate with its price breakdown.
    Show { id: Uuid },

    /// Replace an estimate's contents with a TOML draft.
    Edit { id: Uuid, draft: PathBuf },

    /// Delete an estimate. Deleting an unknown id does nothing.
    Delete { id: Uuid },

    /// Save a copy of an estimate under "<name> (Copy)".
    Duplicate { id: Uuid },

    /// Write a quote document for an estimate.
    Export {
        id: Uuid,
        /// Defaults to `<id>.<extension>` in the working directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn load_form(
    path: &Path,
    settings: &Settings,
) -> anyhow::Result<EstimateFormData> {
    let form = DraftFile::load(path)?.into_form(&settings.defaults)?;
    debug!(path = %path.display(), materials = form.materials.len(), "loaded draft");
    Ok(form)
}

/// Runs one command and returns what should be printed on stdout.
pub async fn run(
    command: Command,
    repo: &dyn EstimateRepository,
    settings: &Settings,
) -> anyhow::Result<String> {
    let currency = settings.defaults.currency_symbol.as_str();

    match command {
        Command::New { draft } => {
            let form = load_form(&draft, settings)?;
            let estimate = repo.create_estimate(form).await?;
            info!(estimate_id = %estimate.id(), "created estimate");
            render_detail(&estimate, settings)
        }
        Command::Price { draft } => {
            let form = load_form(&draft, settings)?;
            form.validate()?;
            render_price_preview(&form, currency)
        }
        Command::List { search } => {
            let estimates = match search.as_deref() {
                Some(query) => repo.search_estimates(query).await?,
                None => repo.list_estimates().await?,
            };
            render_list(&estimates, currency)
        }
        Command::Show { id } => {
            let estimate = repo.get_estimate(id).await?;
            render_detail(&estimate, settings)
        }
        Command::Edit { id, draft } => {
            let form = load_form(&draft, settings)?;
            let estimate = repo.update_estimate(id, form).await?;
            info!(estimate_id = %id, "updated estimate");
            render_detail(&estimate, settings)
        }
        Command::Delete { id } => {
            if repo.delete_estimate(id).await? {
                info!(estimate_id = %id, "deleted estimate");
                Ok(format!("Deleted estimate {id}\n"))
            } else {
                Ok(format!("No estimate with id {id}; nothing deleted\n"))
            }
        }
        Command::Duplicate { id } => {
            let copy = repo.duplicate_estimate(id).await?;
            info!(source_id = %id, estimate_id = %copy.id(), "duplicated estimate");
            render_detail(&copy, settings)
        }
        Command::Export { id, output } => {
            let estimate = repo.get_estimate(id).await?;
            let exporter = TextQuoteExporter::from_settings(settings);
            let path = output
                .unwrap_or_else(|| PathBuf::from(format!("{id}.{}", exporter.file_extension())));
            export_to_file(&exporter, &estimate, &path)?;
            Ok(format!("Exported estimate {id} to {}\n", path.display()))
        }
    }
}

/// Runs `exporter` and writes its payload to `path`.
pub fn export_to_file(
    exporter: &dyn EstimateExporter,
    estimate: &Estimate,
    path: &Path,
) -> anyhow::Result<()> {
    let bytes = exporter.export(estimate)?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("cannot write export to '{}'", path.display()))?;
    info!(
        estimate_id = %estimate.id(),
        path = %path.display(),
        content_type = exporter.content_type(),
        bytes = bytes.len(),
        "exported estimate"
    );
    Ok(())
}

// ─── rendering ───────────────────────────────────────────────────────────────

fn write_breakdown(
    out: &mut String,
    breakdown: &PriceBreakdown,
    tax_rate: Decimal,
    currency: &str,
) -> std::fmt::Result {
    writeln!(out, "Materials: {:>12}", format_money(currency, breakdown.materials_cost))?;
    writeln!(out, "Labor:     {:>12}", format_money(currency, breakdown.labor_cost))?;
    writeln!(out, "Subtotal:  {:>12}", format_money(currency, breakdown.subtotal))?;
    writeln!(
        out,
        "Tax ({}%): {:>12}",
        tax_rate.normalize(),
        format_money(currency, breakdown.tax)
    )?;
    writeln!(out, "Total:     {:>12}", format_money(currency, breakdown.total))
}

pub fn render_price_preview(
    form: &EstimateFormData,
    currency: &str,
) -> anyhow::Result<String> {
    let breakdown = price_breakdown(form)?;
    let mut out = String::new();
    writeln!(out, "Price preview for {} (not saved)", form.project_name)?;
    write_breakdown(&mut out, &breakdown, form.tax_rate, currency)?;
    Ok(out)
}

pub fn render_list(
    estimates: &[Estimate],
    currency: &str,
) -> anyhow::Result<String> {
    if estimates.is_empty() {
        return Ok("No estimates found\n".to_string());
    }

    let mut out = String::new();
    for estimate in estimates {
        let client = estimate
            .form()
            .client_name
            .as_deref()
            .unwrap_or("—");
        writeln!(
            out,
            "{}  {}  {:<24}  {:<16}  {:>12}",
            estimate.id(),
            estimate.created_at().with_timezone(&Local).format("%Y-%m-%d"),
            estimate.project_name(),
            client,
            format_money(currency, estimate.total_cost()),
        )?;
    }
    Ok(out)
}

pub fn render_detail(
    estimate: &Estimate,
    settings: &Settings,
) -> anyhow::Result<String> {
    let mut out = String::new();
    let exporter = TextQuoteExporter::from_settings(settings);
    let form = estimate.form();

    writeln!(out, "Estimate {}", estimate.id())?;
    writeln!(
        out,
        "Updated: {}",
        estimate.updated_at().with_timezone(&Local).format("%Y-%m-%d %H:%M")
    )?;
    writeln!(out)?;
    exporter.render_body(&mut out, estimate)?;
    writeln!(out)?;
    write_breakdown(
        &mut out,
        &price_breakdown(form)?,
        form.tax_rate,
        &settings.defaults.currency_symbol,
    )?;
    Ok(out)
}
