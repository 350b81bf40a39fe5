pub mod breakdown;
pub mod buckets;
pub mod reports;

pub use breakdown::CategoricalAggregator;
pub use buckets::TimeBucketAggregator;
pub use reports::{render_csv, PeriodReportService};
