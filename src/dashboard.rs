//! Process-wide entry point: loads the observation store once and hands out
//! isolated sessions over it.

use crate::error::WindfieldError;
use crate::filter::state::ThresholdBounds;
use crate::observations::csv_source::{read_observations_csv, CsvLayout};
use crate::observations::error::RejectedRecord;
use crate::observations::store::ObservationStore;
use crate::session::Session;
use crate::stations::reference::ReferenceSet;
use crate::types::observation::RawObservation;
use bon::Builder;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Startup configuration for a [`Dashboard`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use windfield::DashboardSettings;
///
/// let settings = DashboardSettings::default();
/// assert_eq!(settings.references.len(), 5);
/// assert_eq!(settings.threshold_bounds.initial(), 5.0);
/// assert_eq!(settings.max_rejected_fraction, 0.5);
///
/// let strict = DashboardSettings::builder()
///     .max_rejected_fraction(0.0)
///     .recompute_budget(Duration::from_millis(50))
///     .build();
/// assert_eq!(strict.recompute_budget, Some(Duration::from_millis(50)));
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct DashboardSettings {
    /// Stations observations are classified against. Defaults to the five
    /// Hawaiian airfields.
    #[builder(default)]
    pub references: ReferenceSet,
    /// Wind-threshold slider range and starting value, in knots.
    #[builder(default)]
    pub threshold_bounds: ThresholdBounds,
    /// Largest share of malformed rows a load may contain before it is
    /// refused, within `[0, 1]`.
    #[builder(default = 0.5)]
    pub max_rejected_fraction: f64,
    /// Time limit for a single view recomputation in every session.
    pub recompute_budget: Option<Duration>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The loaded observation store plus the settings sessions are created with.
///
/// The store is immutable and shared by every session; each
/// [`Session`] owns its own filter state and view cache.
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: Arc<ObservationStore>,
    settings: DashboardSettings,
    rejected: Vec<RejectedRecord>,
}

impl Dashboard {
    /// Validates and classifies `raw_records` into the shared store.
    ///
    /// # Errors
    ///
    /// Returns [`WindfieldError::InvalidRejectedFraction`] if the configured
    /// fraction is outside `[0, 1]`, and [`WindfieldError::MostlyMalformed`] if
    /// the share of rejected rows exceeds it.
    pub fn load<I>(raw_records: I, settings: DashboardSettings) -> Result<Self, WindfieldError>
    where
        I: IntoIterator<Item = RawObservation>,
    {
        let max_fraction = settings.max_rejected_fraction;
        if !(0.0..=1.0).contains(&max_fraction) {
            return Err(WindfieldError::InvalidRejectedFraction(max_fraction));
        }

        let report = ObservationStore::load(raw_records, &settings.references);
        if report.rejected_fraction() > max_fraction {
            warn!(
                "Refusing observation load: {} of {} rows rejected",
                report.rejected_count(),
                report.total_count()
            );
            return Err(WindfieldError::MostlyMalformed {
                rejected: report.rejected_count(),
                total: report.total_count(),
                max_fraction,
            });
        }

        Ok(Self {
            store: Arc::new(report.store),
            settings,
            rejected: report.rejected,
        })
    }

    /// Reads an observation CSV export and loads it.
    ///
    /// # Errors
    ///
    /// [`WindfieldError::Ingest`] for file-level read failures, otherwise as
    /// [`Dashboard::load`].
    pub fn from_csv(
        path: impl AsRef<Path>,
        layout: &CsvLayout,
        settings: DashboardSettings,
    ) -> Result<Self, WindfieldError> {
        let path = path.as_ref();
        let raw_records = read_observations_csv(path, layout)?;
        info!("Read {} rows from {}", raw_records.len(), path.display());
        Self::load(raw_records, settings)
    }

    /// A new session starting from the initial selection.
    pub fn session(&self) -> Session {
        let mut session = Session::new(Arc::clone(&self.store), self.settings.threshold_bounds);
        session.set_recompute_budget(self.settings.recompute_budget);
        session
    }

    pub fn store(&self) -> &ObservationStore {
        &self.store
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.settings.references
    }

    /// Rows excluded during loading, with the reason for each.
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::error::MalformedRecord;
    use crate::stations::reference::ReferenceLocation;
    use crate::views::view_name::ViewName;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn raw_rows() -> Vec<RawObservation> {
        vec![
            RawObservation::new("2024-01-01T12:00:00Z", 21.30, -157.90, 75.0, 12.0),
            RawObservation::new("2024-01-01T13:00:00Z", 20.90, -156.43, 77.0, 4.0),
            RawObservation {
                wind_speed: None,
                ..RawObservation::new("2024-01-01T14:00:00Z", 21.98, -159.34, 73.0, 0.0)
            },
        ]
    }

    #[test]
    fn test_load_reports_rejected_rows() {
        let dashboard = Dashboard::load(raw_rows(), DashboardSettings::default()).unwrap();
        assert_eq!(dashboard.store().len(), 2);
        assert_eq!(
            dashboard.rejected(),
            &[RejectedRecord {
                index: 2,
                reason: MalformedRecord::MissingField("wind_speed"),
            }]
        );
    }

    #[test]
    fn test_mostly_malformed_load_is_refused() {
        let settings = DashboardSettings::builder()
            .max_rejected_fraction(0.2)
            .build();
        match Dashboard::load(raw_rows(), settings) {
            Err(WindfieldError::MostlyMalformed {
                rejected, total, ..
            }) => {
                assert_eq!(rejected, 1);
                assert_eq!(total, 3);
            }
            other => panic!("expected MostlyMalformed, got {other:?}"),
        }

        let settings = DashboardSettings::builder()
            .max_rejected_fraction(1.5)
            .build();
        assert!(matches!(
            Dashboard::load(raw_rows(), settings),
            Err(WindfieldError::InvalidRejectedFraction(_))
        ));
    }

    #[test]
    fn test_custom_references_and_bounds() {
        let references = ReferenceSet::new(vec![
            ReferenceLocation::new("WEST", 21.0, -158.5),
            ReferenceLocation::new("EAST", 21.0, -156.0),
        ])
        .unwrap();
        let settings = DashboardSettings::builder()
            .references(references)
            .threshold_bounds(ThresholdBounds::new(0.0, 50.0, 12.0).unwrap())
            .build();

        let dashboard = Dashboard::load(raw_rows().into_iter().take(2), settings).unwrap();
        let session = dashboard.session();
        assert_eq!(session.list_stations(), &["WEST", "EAST"]);
        assert_eq!(session.filter().wind_threshold(), 12.0);
        assert_eq!(session.read(ViewName::AboveThreshold).unwrap().len(), 1);
    }

    #[test]
    fn test_sessions_share_the_store() {
        let settings = DashboardSettings::builder()
            .recompute_budget(Duration::from_secs(5))
            .build();
        let dashboard = Dashboard::load(raw_rows(), settings).unwrap();

        let mut first = dashboard.session();
        let second = dashboard.session();
        assert!(std::ptr::eq(first.store(), second.store()));
        assert_eq!(first.recompute_budget(), Some(Duration::from_secs(5)));

        first.set_stations(["OGG"]).unwrap();
        assert_eq!(first.read(ViewName::DateStationFilter).unwrap().len(), 1);
        assert_eq!(second.read(ViewName::DateStationFilter).unwrap().len(), 2);
    }

    #[test]
    fn test_from_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "validdate;lat;lon;t_2m:F;wind_speed_10m:kn").unwrap();
        writeln!(file, "2024-01-01T12:00:00Z;21.30;-157.90;75.2;12.1").unwrap();
        writeln!(file, "2024-01-01T12:00:00Z;19.72;-155.05;71.0;3.4").unwrap();
        writeln!(file, "2024-01-02T12:00:00Z;21.98;-159.34;73.5;8.0").unwrap();

        let dashboard =
            Dashboard::from_csv(file.path(), &CsvLayout::default(), DashboardSettings::default())
                .unwrap();
        assert!(dashboard.rejected().is_empty());

        let session = dashboard.session();
        assert_eq!(session.list_dates(), &["Mon-Jan-01", "Tue-Jan-02"]);
        assert_eq!(session.list_stations(), &["HNL", "ITO", "LIH"]);

        let above = session.read(ViewName::AboveThreshold).unwrap();
        let stations: Vec<_> = above.iter().map(|o| o.station.as_str()).collect();
        assert_eq!(stations, vec!["HNL"]);
    }

    #[test]
    fn test_from_csv_missing_file() {
        let result = Dashboard::from_csv(
            "does/not/exist.csv",
            &CsvLayout::default(),
            DashboardSettings::default(),
        );
        assert!(matches!(result, Err(WindfieldError::Ingest(_))));
    }
}
