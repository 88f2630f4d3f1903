use std::env;
use windfield::{
    CsvLayout, Dashboard, DashboardSettings, LatLon, RawObservation, ViewName, WindfieldError,
};

// Usage: cargo run --example hawaii_dashboard [path/to/meteomatics_export.csv]
fn main() -> Result<(), WindfieldError> {
    let settings = DashboardSettings::default();
    let dashboard = match env::args().nth(1) {
        Some(path) => Dashboard::from_csv(path, &CsvLayout::default(), settings)?,
        None => Dashboard::load(sample_rows(), settings)?,
    };

    println!(
        "Loaded {} observations, rejected {}",
        dashboard.store().len(),
        dashboard.rejected().len()
    );
    for rejected in dashboard.rejected() {
        println!("  row {}: {}", rejected.index, rejected.reason);
    }

    let mut session = dashboard.session();
    println!("Dates: {:?}", session.list_dates());
    println!("Stations: {:?}", session.list_stations());

    let date = session.list_dates().first().cloned();
    let epoch = session
        .on_filter_changed()
        .maybe_date(date)
        .threshold(10.0)
        .call()?;
    println!("Filter applied at epoch {epoch}");

    for view in ViewName::ALL {
        let snapshot = session.read(view)?;
        println!("\n{view} ({} rows)", snapshot.len());
        for observation in snapshot.iter() {
            println!(
                "  {} {} wind {:>5.1} kn temp {:>5.1} F",
                observation.timestamp.format("%H:%M"),
                observation.station,
                observation.wind_speed,
                observation.temperature
            );
        }
    }

    let geo = session.geo_subset()?;
    if let Some(bounds) = geo.bounds(1.0) {
        println!("\nMap bounds: {:?}", bounds.corners());
    }
    if let Some((point, distance_km)) = geo.nearest(LatLon(21.3187, -157.9225), 1).first() {
        println!(
            "Closest point to HNL: {} ({:.1} km, {} marker)",
            point.station,
            distance_km,
            point.marker.as_str()
        );
    }
    println!("{}", geo.to_geojson());

    Ok(())
}

fn sample_rows() -> Vec<RawObservation> {
    vec![
        RawObservation::new("2024-01-01T12:00:00Z", 21.30, -157.90, 75.2, 12.4),
        RawObservation::new("2024-01-01T12:00:00Z", 20.90, -156.43, 77.0, 6.1),
        RawObservation::new("2024-01-01T12:00:00Z", 21.98, -159.34, 73.5, 17.8),
        RawObservation::new("2024-01-01T12:00:00Z", 19.74, -156.05, 80.1, 4.3),
        RawObservation::new("2024-01-01T12:00:00Z", 19.72, -155.05, 71.6, 9.9),
        RawObservation::new("2024-01-02T12:00:00Z", 21.30, -157.90, 76.0, 8.2),
        RawObservation::new("not-a-date", 21.30, -157.90, 76.0, 8.2),
    ]
}
