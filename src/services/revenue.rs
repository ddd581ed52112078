use crate::services::dataset::{
    Dataset, Value, COL_DESK, COL_GROSS, COL_NET, COL_OFFICE, COL_TOTAL_REVENUE,
};

const NET_FACTOR: f64 = 0.95;
const OFFICE_SHARE: f64 = 0.75;
const DESK_SHARE: f64 = 0.20;

/// Appends the revenue-sharing chain to every brokerage row: gross equals
/// total revenue, net is gross × 0.95, office revenue is net × 0.75 and desk
/// revenue is office × 0.20. Runs exactly once per upload, before any
/// filtering, so filtered views always carry the derived totals.
pub fn append_derived_columns(dataset: &mut Dataset) {
    let revenue_idx = dataset.column_index(COL_TOTAL_REVENUE);
    dataset
        .columns
        .extend([COL_GROSS, COL_NET, COL_OFFICE, COL_DESK].map(String::from));

    for row in &mut dataset.rows {
        let total = revenue_idx
            .and_then(|idx| row.get(idx))
            .and_then(Value::as_number)
            .unwrap_or(0.0);
        let gross = total;
        let net = gross * NET_FACTOR;
        let office = net * OFFICE_SHARE;
        let desk = office * DESK_SHARE;
        row.extend([gross, net, office, desk].map(Value::Number));
    }
}
