use crate::error::DomainError;
use crate::model::{ParcelInput, ReconciliationInputs, ReconciliationResult, ResultRow};
use crate::tolerance::{exceeds_limit, permissible_error};

/// Reconcile sub-parcel areas against the registered total.
///
/// Within tolerance every valid parcel is scaled by `registered / calculated`;
/// beyond it the areas pass through unchanged. Rows with an empty label or a
/// non-positive/invalid area are dropped from both `rows` and the totals.
pub fn reconcile(
    registered_area: f64,
    calculated_area: f64,
    parcels: &[ParcelInput],
) -> Result<ReconciliationResult, DomainError> {
    if !is_positive_area(registered_area) {
        return Err(DomainError::InvalidRegisteredArea(registered_area));
    }
    if !is_positive_area(calculated_area) {
        return Err(DomainError::InvalidCalculatedArea(calculated_area));
    }

    let absolute_difference = (registered_area - calculated_area).abs();
    let permissible_error = permissible_error(registered_area);
    let exceeds_limit = exceeds_limit(absolute_difference, permissible_error);

    let scale_factor = if exceeds_limit {
        1.0
    } else {
        registered_area / calculated_area
    };

    let mut rows = Vec::with_capacity(parcels.len());
    let mut total_adjusted_area = 0.0;
    let mut total_rounded_area = 0i64;

    for parcel in parcels {
        let Some((label, raw_area)) = parcel.included() else {
            log::debug!("skipping parcel {:?}: empty label or invalid area", parcel.label);
            continue;
        };

        let adjusted_area = raw_area * scale_factor;
        // f64::round is half-away-from-zero; areas here are always positive.
        let rounded_area = round_to_whole(adjusted_area).ok_or_else(|| DomainError::AreaOutOfRange {
            label: label.to_string(),
            area: adjusted_area,
        })?;

        total_adjusted_area += adjusted_area;
        total_rounded_area = total_rounded_area
            .checked_add(rounded_area)
            .ok_or(DomainError::TotalOutOfRange)?;

        rows.push(ResultRow {
            label: label.to_string(),
            adjusted_area,
            rounded_area,
        });
    }

    log::debug!(
        "reconciled {} of {} parcel(s): diff={absolute_difference:.4} permissible={permissible_error:.4} exceeds={exceeds_limit}",
        rows.len(),
        parcels.len(),
    );

    Ok(ReconciliationResult {
        absolute_difference,
        permissible_error,
        exceeds_limit,
        scale_factor,
        rows,
        total_adjusted_area,
        total_rounded_area,
    })
}

/// [`reconcile`] over a bundled input record.
pub fn reconcile_inputs(inputs: &ReconciliationInputs) -> Result<ReconciliationResult, DomainError> {
    reconcile(inputs.registered_area, inputs.calculated_area, &inputs.parcels)
}

fn is_positive_area(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// `None` when the rounded value does not fit in an `i64`.
fn round_to_whole(area: f64) -> Option<i64> {
    let rounded = area.round();
    // i64::MAX as f64 is 2^63, itself out of range.
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}
