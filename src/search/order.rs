//! Visit order of neighbour dates around the anchor night.

use crate::config::SearchOrder;
use chrono::{Days, NaiveDate};

/// Dates to inspect after the anchor, nearest first.
///
/// For each offset `1..=days_to_check` both `anchor - offset` and
/// `anchor + offset` are produced, past first unless `order` says otherwise.
/// Dates outside the representable calendar are dropped. Dates are produced
/// lazily, so a search that stops early never builds the full range.
pub fn neighbour_dates(
    anchor: NaiveDate,
    days_to_check: i64,
    order: SearchOrder,
) -> impl Iterator<Item = NaiveDate> {
    let days = u64::try_from(days_to_check).unwrap_or(0);

    (1..=days)
        .map(move |offset| {
            (
                anchor.checked_sub_days(Days::new(offset)),
                anchor.checked_add_days(Days::new(offset)),
            )
        })
        .take_while(|(past, future)| past.is_some() || future.is_some())
        .flat_map(move |(past, future)| {
            let pair = match order {
                SearchOrder::PastFirst => [past, future],
                SearchOrder::FutureFirst => [future, past],
            };
            pair.into_iter().flatten()
        })
}
