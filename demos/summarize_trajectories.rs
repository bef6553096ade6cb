// Example usage of the trajectory reader and filter

use std::collections::BTreeMap;

use trajdash::{filter, HourSelection, Result, Selection, TrajectoryReader};
use tracing::{info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/demo.csv".to_string());

    // Load and annotate every row
    let table = TrajectoryReader::open(&path)?.read_table()?;

    let summary = table.summary();
    info!(
        "{} rows, {} trajectories, days {:?} .. {:?}",
        summary.rows, summary.instances, summary.min_date, summary.max_date
    );

    // Rows per (day, hour)
    let mut buckets: BTreeMap<(i32, u32, u32, u32), usize> = BTreeMap::new();
    for s in table.samples() {
        *buckets.entry((s.year, s.month, s.day, s.hour)).or_default() += 1;
    }
    for ((y, m, d, h), n) in &buckets {
        info!("  {:04}-{:02}-{:02} {:02}:00  {} samples", y, m, d, h, n);
    }

    // Trajectories on the latest day
    if let Some(date) = summary.default_date {
        let rows = filter(table.samples(), &Selection::new(date, HourSelection::NoFilter));
        info!("\nTrajectories on {}:", date);
        for group in rows.groups() {
            let clusters: Vec<i64> = group.samples.iter().map(|s| s.cluster).collect();
            info!(
                "  {}: {} samples, clusters {:?}",
                group.instance.trip_label(),
                group.samples.len(),
                clusters
            );
            if let Some(interp) = table.interpretation(group.instance) {
                info!("      {}", interp);
            }
        }
    }

    Ok(())
}
