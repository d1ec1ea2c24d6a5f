use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use estimate_core::{
    Dimensions, Estimate, EstimateFormData, EstimateRepository, Labor, Material, RateType,
    RepositoryError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

const SELECT_ESTIMATE: &str = "SELECT id, project_name, client_name,
        labor_rate_type, labor_rate, labor_hours,
        has_dimensions, dim_length, dim_width, dim_height,
        tax_rate, notes, total_cost, created_at, updated_at
     FROM estimate";

const SELECT_MATERIAL: &str =
    "SELECT estimate_id, id, name, price_per_unit, quantity, unit FROM estimate_material";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `connection_string`.
    ///
    /// * `":memory:"` opens a private in-memory database held by a single
    ///   connection, so every query sees the same data.
    /// * A `sqlite:` URL is used as given.
    /// * Anything else is a file path; the file is created if missing.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let connected = if connection_string == ":memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect("sqlite::memory:")
                .await
        } else {
            let options = if connection_string.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(connection_string)
                    .with_context(|| format!("Invalid SQLite URL: {}", connection_string))?
            } else {
                SqliteConnectOptions::new()
                    .filename(connection_string)
                    .create_if_missing(true)
            };
            SqlitePool::connect_with(options.foreign_keys(true)).await
        };
        let pool = connected
            .with_context(|| format!("Failed to connect to database: {}", connection_string))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn connection(
        &self,
    ) -> Result<sqlx::pool::PoolConnection<Sqlite>, RepositoryError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn parse_uuid(text: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(text)
        .map_err(|e| RepositoryError::Database(format!("Invalid estimate id '{}': {}", text, e)))
}

fn row_to_material(row: &SqliteRow) -> Result<Material, RepositoryError> {
    Ok(Material {
        id: column(row, "id")?,
        name: column(row, "name")?,
        price_per_unit: get_decimal(row, "price_per_unit")?,
        quantity: get_decimal(row, "quantity")?,
        unit: column(row, "unit")?,
    })
}

fn row_to_estimate(
    row: &SqliteRow,
    materials: Vec<Material>,
) -> Result<Estimate, RepositoryError> {
    let id = parse_uuid(&column::<String>(row, "id")?)?;

    let rate_type_str: String = column(row, "labor_rate_type")?;
    let rate_type = RateType::parse(&rate_type_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid labor rate type: {}", rate_type_str))
    })?;

    let dimensions = if column::<bool>(row, "has_dimensions")? {
        Some(Dimensions {
            length: get_optional_decimal(row, "dim_length")?,
            width: get_optional_decimal(row, "dim_width")?,
            height: get_optional_decimal(row, "dim_height")?,
        })
    } else {
        None
    };

    let form = EstimateFormData {
        project_name: column(row, "project_name")?,
        client_name: column(row, "client_name")?,
        materials,
        labor: Labor {
            rate_type,
            rate: get_decimal(row, "labor_rate")?,
            hours: get_optional_decimal(row, "labor_hours")?,
        },
        dimensions,
        tax_rate: get_decimal(row, "tax_rate")?,
        notes: column(row, "notes")?,
    };

    Ok(Estimate::from_parts(
        id,
        form,
        get_decimal(row, "total_cost")?,
        column::<DateTime<Utc>>(row, "created_at")?,
        column::<DateTime<Utc>>(row, "updated_at")?,
    ))
}

async fn fetch_materials(
    conn: &mut SqliteConnection,
    estimate_id: Uuid,
) -> Result<Vec<Material>, RepositoryError> {
    let rows = sqlx::query(&format!(
        "{} WHERE estimate_id = ? ORDER BY position",
        SELECT_MATERIAL
    ))
    .bind(estimate_id.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    rows.iter().map(row_to_material).collect()
}

async fn fetch_estimate(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<Estimate>, RepositoryError> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ESTIMATE))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;

    let Some(row) = row else {
        return Ok(None);
    };
    let materials = fetch_materials(conn, id).await?;
    row_to_estimate(&row, materials).map(Some)
}

async fn fetch_all_estimates(
    conn: &mut SqliteConnection
) -> Result<Vec<Estimate>, RepositoryError> {
    let material_rows = sqlx::query(&format!("{} ORDER BY estimate_id, position", SELECT_MATERIAL))
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

    let mut materials: HashMap<String, Vec<Material>> = HashMap::new();
    for row in &material_rows {
        materials
            .entry(column(row, "estimate_id")?)
            .or_default()
            .push(row_to_material(row)?);
    }

    let rows = sqlx::query(&format!("{} ORDER BY seq DESC", SELECT_ESTIMATE))
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

    rows.iter()
        .map(|row| {
            let id: String = column(row, "id")?;
            row_to_estimate(row, materials.remove(&id).unwrap_or_default())
        })
        .collect()
}

async fn insert_materials(
    conn: &mut SqliteConnection,
    estimate_id: Uuid,
    materials: &[Material],
) -> Result<(), RepositoryError> {
    for (position, material) in materials.iter().enumerate() {
        sqlx::query(
            "INSERT INTO estimate_material (
                estimate_id, position, id, name, price_per_unit, quantity, unit
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(estimate_id.to_string())
        .bind(position as i64)
        .bind(&material.id)
        .bind(&material.name)
        .bind(decimal_to_text(material.price_per_unit))
        .bind(decimal_to_text(material.quantity))
        .bind(&material.unit)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

async fn insert_estimate(
    conn: &mut SqliteConnection,
    estimate: &Estimate,
) -> Result<(), RepositoryError> {
    let form = estimate.form();
    let dimensions = form.dimensions.clone().unwrap_or_default();

    sqlx::query(
        "INSERT INTO estimate (
            id, project_name, client_name,
            labor_rate_type, labor_rate, labor_hours,
            has_dimensions, dim_length, dim_width, dim_height,
            tax_rate, notes, total_cost, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(estimate.id().to_string())
    .bind(&form.project_name)
    .bind(&form.client_name)
    .bind(form.labor.rate_type.as_str())
    .bind(decimal_to_text(form.labor.rate))
    .bind(form.labor.hours.map(decimal_to_text))
    .bind(form.dimensions.is_some())
    .bind(dimensions.length.map(decimal_to_text))
    .bind(dimensions.width.map(decimal_to_text))
    .bind(dimensions.height.map(decimal_to_text))
    .bind(decimal_to_text(form.tax_rate))
    .bind(&form.notes)
    .bind(decimal_to_text(estimate.total_cost()))
    .bind(estimate.created_at())
    .bind(estimate.updated_at())
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    insert_materials(conn, estimate.id(), &form.materials).await
}

async fn update_row(
    conn: &mut SqliteConnection,
    estimate: &Estimate,
) -> Result<(), RepositoryError> {
    let form = estimate.form();
    let dimensions = form.dimensions.clone().unwrap_or_default();

    sqlx::query(
        "UPDATE estimate SET
            project_name = ?, client_name = ?,
            labor_rate_type = ?, labor_rate = ?, labor_hours = ?,
            has_dimensions = ?, dim_length = ?, dim_width = ?, dim_height = ?,
            tax_rate = ?, notes = ?, total_cost = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&form.project_name)
    .bind(&form.client_name)
    .bind(form.labor.rate_type.as_str())
    .bind(decimal_to_text(form.labor.rate))
    .bind(form.labor.hours.map(decimal_to_text))
    .bind(form.dimensions.is_some())
    .bind(dimensions.length.map(decimal_to_text))
    .bind(dimensions.width.map(decimal_to_text))
    .bind(dimensions.height.map(decimal_to_text))
    .bind(decimal_to_text(form.tax_rate))
    .bind(&form.notes)
    .bind(decimal_to_text(estimate.total_cost()))
    .bind(estimate.updated_at())
    .bind(estimate.id().to_string())
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    sqlx::query("DELETE FROM estimate_material WHERE estimate_id = ?")
        .bind(estimate.id().to_string())
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;

    insert_materials(conn, estimate.id(), &form.materials).await
}

#[async_trait]
impl EstimateRepository for SqliteRepository {
    async fn create_estimate(
        &self,
        form: EstimateFormData,
    ) -> Result<Estimate, RepositoryError> {
        let estimate = Estimate::new(form, Utc::now())?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        insert_estimate(&mut tx, &estimate).await?;
        tx.commit().await.map_err(db_err)?;

        info!(estimate_id = %estimate.id(), total = %estimate.total_cost(), "Created estimate");
        Ok(estimate)
    }

    async fn get_estimate(
        &self,
        id: Uuid,
    ) -> Result<Estimate, RepositoryError> {
        let mut conn = self.connection().await?;
        fetch_estimate(&mut conn, id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn update_estimate(
        &self,
        id: Uuid,
        form: EstimateFormData,
    ) -> Result<Estimate, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut estimate = fetch_estimate(&mut tx, id)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;
        estimate.replace_form(form, Utc::now())?;
        update_row(&mut tx, &estimate).await?;

        tx.commit().await.map_err(db_err)?;

        info!(estimate_id = %id, total = %estimate.total_cost(), "Updated estimate");
        Ok(estimate)
    }

    async fn delete_estimate(
        &self,
        id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM estimate_material WHERE estimate_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let result = sqlx::query("DELETE FROM estimate WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(estimate_id = %id, "Deleted estimate");
        } else {
            debug!(estimate_id = %id, "Delete of unknown estimate ignored");
        }
        Ok(removed)
    }

    async fn duplicate_estimate(
        &self,
        id: Uuid,
    ) -> Result<Estimate, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let copy = fetch_estimate(&mut tx, id)
            .await?
            .ok_or(RepositoryError::NotFound(id))?
            .duplicate(Utc::now());
        insert_estimate(&mut tx, &copy).await?;

        tx.commit().await.map_err(db_err)?;

        info!(source_id = %id, estimate_id = %copy.id(), "Duplicated estimate");
        Ok(copy)
    }

    async fn list_estimates(&self) -> Result<Vec<Estimate>, RepositoryError> {
        let mut conn = self.connection().await?;
        fetch_all_estimates(&mut conn).await
    }

    async fn search_estimates(
        &self,
        query: &str,
    ) -> Result<Vec<Estimate>, RepositoryError> {
        // SQLite's lower() only folds ASCII, so filter here to match the
        // memory backend for every script.
        let needle = query.to_lowercase();
        Ok(self
            .list_estimates()
            .await?
            .into_iter()
            .filter(|e| e.project_name().to_lowercase().contains(&needle))
            .collect())
    }
}
