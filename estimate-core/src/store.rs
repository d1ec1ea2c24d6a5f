//! In-memory estimate ledger.
//!
//! [`EstimateStore`] owns every [`Estimate`] of a session and is the only
//! writer of ids, totals and timestamps. Records are kept newest first:
//! creating or duplicating puts the new record at the front, updating keeps
//! it where it is.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Estimate, EstimateFormData, FormError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("estimate {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    InvalidForm(#[from] FormError),
}

#[derive(Debug, Clone, Default)]
pub struct EstimateStore {
    estimates: Vec<Estimate>,
}

impl EstimateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a store from records already in newest-first order.
    pub fn from_estimates(estimates: Vec<Estimate>) -> Self {
        Self { estimates }
    }

    /// Prices `form`, stores it at the front and returns the new record.
    pub fn create(
        &mut self,
        form: EstimateFormData,
    ) -> Result<Estimate, StoreError> {
        let estimate = Estimate::new(form, Utc::now())?;
        self.estimates.insert(0, estimate.clone());

        info!(estimate_id = %estimate.id(), total = %estimate.total_cost(), "Created estimate");
        Ok(estimate)
    }

    pub fn get(
        &self,
        id: Uuid,
    ) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.id() == id)
    }

    /// Replaces the form of `id` and reprices it.
    ///
    /// # Errors
    /// * [`StoreError::NotFound`]: nothing was changed.
    /// * [`StoreError::InvalidForm`]: the stored record is left as it was.
    pub fn update(
        &mut self,
        id: Uuid,
        form: EstimateFormData,
    ) -> Result<Estimate, StoreError> {
        let estimate = self
            .estimates
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or(StoreError::NotFound(id))?;

        estimate.replace_form(form, Utc::now())?;

        info!(estimate_id = %id, total = %estimate.total_cost(), "Updated estimate");
        Ok(estimate.clone())
    }

    /// Removes `id`. Removing an unknown id is a no-op; the return value
    /// tells whether anything was removed.
    pub fn delete(
        &mut self,
        id: Uuid,
    ) -> bool {
        let before = self.estimates.len();
        self.estimates.retain(|e| e.id() != id);
        let removed = self.estimates.len() != before;

        if removed {
            info!(estimate_id = %id, "Deleted estimate");
        } else {
            debug!(estimate_id = %id, "Delete of unknown estimate ignored");
        }
        removed
    }

    /// Stores a copy of `id` at the front and returns it.
    pub fn duplicate(
        &mut self,
        id: Uuid,
    ) -> Result<Estimate, StoreError> {
        let copy = self
            .get(id)
            .ok_or(StoreError::NotFound(id))?
            .duplicate(Utc::now());
        self.estimates.insert(0, copy.clone());

        info!(source_id = %id, estimate_id = %copy.id(), "Duplicated estimate");
        Ok(copy)
    }

    /// All records, newest first.
    pub fn list(&self) -> &[Estimate] {
        &self.estimates
    }

    /// Records whose project name contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn find_by_project_name(
        &self,
        query: &str,
    ) -> Vec<&Estimate> {
        let needle = query.to_lowercase();
        self.estimates
            .iter()
            .filter(|e| e.project_name().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{COPY_SUFFIX, Labor, Material};

    fn kitchen_form() -> EstimateFormData {
        EstimateFormData {
            materials: vec![
                Material::new("Cabinet", dec!(10), dec!(2), "piece"),
                Material::new("Worktop", dec!(5), dec!(3), "m"),
            ],
            labor: Labor::hourly(dec!(20), dec!(4)),
            tax_rate: dec!(20),
            ..EstimateFormData::new("Kitchen refit")
        }
    }

    fn named(name: &str) -> EstimateFormData {
        EstimateFormData {
            labor: Labor::fixed(dec!(100)),
            ..EstimateFormData::new(name)
        }
    }

    // =========================================================================
    // create
    // =========================================================================

    #[test]
    fn create_prices_and_returns_the_record() {
        let mut store = EstimateStore::new();

        let created = store.create(kitchen_form()).unwrap();

        assert_eq!(created.total_cost(), dec!(138.00));
        assert_eq!(created.created_at(), created.updated_at());
        assert_eq!(store.get(created.id()), Some(&created));
    }

    #[test]
    fn create_puts_newest_first() {
        let mut store = EstimateStore::new();

        let first = store.create(named("First")).unwrap();
        let second = store.create(named("Second")).unwrap();

        let ids: Vec<_> = store.list().iter().map(Estimate::id).collect();
        assert_eq!(ids, vec![second.id(), first.id()]);
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut store = EstimateStore::new();

        let ids: std::collections::HashSet<_> = (0..100)
            .map(|i| store.create(named(&format!("P{i}"))).unwrap().id())
            .collect();

        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn create_rejects_duplicate_material_ids() {
        let mut store = EstimateStore::new();
        let mut form = kitchen_form();
        form.materials[1].id = form.materials[0].id.clone();

        let result = store.create(form);

        assert!(matches!(
            result,
            Err(StoreError::InvalidForm(FormError::DuplicateMaterialId(_)))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_forms_too_large_to_price() {
        let mut store = EstimateStore::new();
        let form = EstimateFormData {
            materials: vec![Material::new(
                "Marble",
                dec!(1000000000000000),
                dec!(1000000000000000),
                "slab",
            )],
            ..kitchen_form()
        };

        let result = store.create(form);

        assert_eq!(
            result,
            Err(StoreError::InvalidForm(FormError::AmountOutOfRange("materials cost")))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn update_with_form_too_large_to_price_keeps_stored_record() {
        let mut store = EstimateStore::new();
        let created = store.create(kitchen_form()).unwrap();
        let form = EstimateFormData {
            labor: Labor::hourly(Decimal::MAX, dec!(10)),
            ..kitchen_form()
        };

        let result = store.update(created.id(), form);

        assert_eq!(
            result,
            Err(StoreError::InvalidForm(FormError::AmountOutOfRange("labor cost")))
        );
        assert_eq!(store.get(created.id()), Some(&created));
    }

    // =========================================================================
    // update
    // =========================================================================

    #[test]
    fn update_replaces_form_and_reprices() {
        let mut store = EstimateStore::new();
        let created = store.create(kitchen_form()).unwrap();

        let updated = store
            .update(created.id(), EstimateFormData {
                materials: vec![],
                labor: Labor::fixed(dec!(500)),
                tax_rate: Decimal::ZERO,
                ..EstimateFormData::new("Kitchen refit v2")
            })
            .unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.project_name(), "Kitchen refit v2");
        assert_eq!(updated.total_cost(), dec!(500.00));
        assert_eq!(updated.created_at(), created.created_at());
        assert!(updated.updated_at() >= created.updated_at());
        assert_eq!(store.get(created.id()), Some(&updated));
    }

    #[test]
    fn update_keeps_position() {
        let mut store = EstimateStore::new();
        let older = store.create(named("Older")).unwrap();
        let newer = store.create(named("Newer")).unwrap();

        store.update(older.id(), named("Older, edited")).unwrap();

        let ids: Vec<_> = store.list().iter().map(Estimate::id).collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
    }

    #[test]
    fn update_unknown_id_reports_not_found_and_changes_nothing() {
        let mut store = EstimateStore::new();
        store.create(kitchen_form()).unwrap();
        store.create(named("Porch")).unwrap();
        let before = store.list().to_vec();
        let missing = Uuid::now_v7();

        let result = store.update(missing, named("Ghost"));

        assert_eq!(result, Err(StoreError::NotFound(missing)));
        assert_eq!(store.list(), before.as_slice());
    }

    // =========================================================================
    // delete
    // =========================================================================

    #[test]
    fn delete_removes_the_record() {
        let mut store = EstimateStore::new();
        let created = store.create(kitchen_form()).unwrap();

        assert!(store.delete(created.id()));
        assert!(store.get(created.id()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn delete_unknown_id_is_a_no_op() {
        let mut store = EstimateStore::new();
        store.create(kitchen_form()).unwrap();

        assert!(!store.delete(Uuid::now_v7()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_twice_is_idempotent() {
        let mut store = EstimateStore::new();
        let created = store.create(kitchen_form()).unwrap();

        assert!(store.delete(created.id()));
        assert!(!store.delete(created.id()));
    }

    // =========================================================================
    // duplicate
    // =========================================================================

    #[test]
    fn duplicate_then_delete_original_leaves_the_copy() {
        let mut store = EstimateStore::new();
        let original = store.create(kitchen_form()).unwrap();

        store.duplicate(original.id()).unwrap();
        store.delete(original.id());

        assert_eq!(store.len(), 1);
        let remaining = &store.list()[0];
        assert!(remaining.project_name().ends_with(COPY_SUFFIX));
        assert_eq!(remaining.total_cost(), original.total_cost());
    }

    #[test]
    fn duplicate_puts_copy_first_with_fresh_timestamps() {
        let mut store = EstimateStore::new();
        let original = store.create(kitchen_form()).unwrap();

        let copy = store.duplicate(original.id()).unwrap();

        assert_eq!(store.list()[0].id(), copy.id());
        assert_eq!(copy.project_name(), "Kitchen refit (Copy)");
        assert_eq!(copy.created_at(), copy.updated_at());
        assert!(copy.created_at() >= original.created_at());
        assert_eq!(copy.form().materials, original.form().materials);
    }

    #[test]
    fn duplicate_unknown_id_reports_not_found() {
        let mut store = EstimateStore::new();
        store.create(kitchen_form()).unwrap();
        let missing = Uuid::now_v7();

        let result = store.duplicate(missing);

        assert_eq!(result, Err(StoreError::NotFound(missing)));
        assert_eq!(store.len(), 1);
    }

    // =========================================================================
    // find_by_project_name
    // =========================================================================

    #[test]
    fn find_matches_case_insensitive_substrings() {
        let mut store = EstimateStore::new();
        store.create(named("Garden Shed")).unwrap();
        store.create(named("Kitchen")).unwrap();
        store.create(named("shed roof")).unwrap();

        let names: Vec<_> = store
            .find_by_project_name("SHED")
            .into_iter()
            .map(Estimate::project_name)
            .collect();

        assert_eq!(names, vec!["shed roof", "Garden Shed"]);
    }

    #[test]
    fn find_with_empty_query_matches_all() {
        let mut store = EstimateStore::new();
        store.create(named("A")).unwrap();
        store.create(named("B")).unwrap();

        assert_eq!(store.find_by_project_name("").len(), 2);
    }

    #[test]
    fn find_without_match_is_empty() {
        let mut store = EstimateStore::new();
        store.create(named("Deck")).unwrap();

        assert!(store.find_by_project_name("fence").is_empty());
    }
}
