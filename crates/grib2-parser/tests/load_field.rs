//! Loading the total cloud cover field from synthetic GRIB2 files.

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use grib2_parser::{load_field, read_field, Grib2Error};
use test_utils::grib2::{Grib2Builder, GridSpec};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, create_grid_with_missing, create_tcc_grid};

fn two_message_file(tcdc: Vec<f32>, ni: u32, nj: u32) -> Vec<u8> {
    let mut file = Grib2Builder::new_tcdc(ni, nj)
        .with_parameter(0, 0) // TMP first
        .with_level(103, 2)
        .with_data(vec![288.15; (ni * nj) as usize])
        .build();
    file.extend(Grib2Builder::new_tcdc(ni, nj).with_data(tcdc).build());
    file
}

#[test]
fn test_selects_cloud_cover_after_other_fields() {
    let values = create_tcc_grid(4, 3);
    let data = two_message_file(values.clone(), 4, 3);

    let field = read_field(Bytes::from(data), "TCDC").unwrap();

    assert_eq!(field.parameter, "TCDC");
    assert_eq!((field.ni, field.nj), (4, 3));
    assert_eq!(field.forecast_hour, 136);
    assert_eq!(
        field.reference_time,
        Utc.with_ymd_and_hms(2024, 4, 3, 2, 0, 0).unwrap()
    );
    for (decoded, expected) in field.values.iter().zip(values.iter()) {
        assert_approx_eq!(*decoded, *expected, 0.01);
    }
}

#[test]
fn test_select_by_full_name() {
    let data = two_message_file(create_tcc_grid(2, 2), 2, 2);

    let field = read_field(Bytes::from(data), "Total Cloud Cover").unwrap();
    assert_eq!(field.parameter, "TCDC");
}

#[test]
fn test_coordinates_follow_scan_order() {
    let data = Grib2Builder::new_tcdc(3, 2)
        .with_data(create_tcc_grid(3, 2))
        .build();

    let field = read_field(Bytes::from(data), "TCDC").unwrap();

    // First row is the southern one, longitudes wrapped to [-180, 180)
    assert_coords_approx_eq!((field.lons[0], field.lats[0]), (-100.0, 29.0), 1e-9);
    assert_coords_approx_eq!((field.lons[2], field.lats[2]), (-98.0, 29.0), 1e-9);
    assert_coords_approx_eq!((field.lons[3], field.lats[3]), (-100.0, 30.0), 1e-9);
}

#[test]
fn test_north_to_south_scan() {
    let data = Grib2Builder::new_tcdc(2, 2)
        .with_grid(GridSpec::LatLon {
            la1: 36.0,
            lo1: -97.0,
            di: 0.5,
            dj: 0.5,
        })
        .with_scanning_mode(0)
        .build();

    let field = read_field(Bytes::from(data), "TCDC").unwrap();

    assert_eq!(field.lats, vec![36.0, 36.0, 35.5, 35.5]);
    assert_eq!(field.lons, vec![-97.0, -96.5, -97.0, -96.5]);
}

#[test]
fn test_bitmap_holes_are_dropped_from_samples() {
    let values = create_grid_with_missing(3, 3, &[(0, 0), (2, 1)]);
    let data = Grib2Builder::new_tcdc(3, 3).with_data(values).build();

    let field = read_field(Bytes::from(data), "TCDC").unwrap();
    assert_eq!(field.values.len(), 9);
    assert_eq!(field.missing_count(), 2);

    let samples = field.samples();
    assert_eq!(samples.len(), 7);
    assert!(samples.iter().all(|s| !s.tcc.is_nan()));
    // (1, 0) is the first surviving point
    assert_approx_eq!(samples[0].lon, -99.0, 1e-9);
    assert_approx_eq!(samples[0].tcc, 10.0, 0.01);
}

#[test]
fn test_lambert_grid_starts_at_first_point() {
    let data = Grib2Builder::new_nbm_lambert(5, 4)
        .with_data(create_tcc_grid(5, 4))
        .build();

    let field = read_field(Bytes::from(data), "TCDC").unwrap();

    assert_coords_approx_eq!(
        (field.lons[0], field.lats[0]),
        (-126.276552, 19.228976),
        1e-5
    );
    // One 2.5 km step east and north stays close to the corner
    assert!(field.lons[1] > field.lons[0]);
    assert!(field.lats[5] > field.lats[0]);
    assert!((field.lats[5] - field.lats[0]) < 0.05);
}

#[test]
fn test_missing_parameter() {
    let data = Grib2Builder::new_tcdc(2, 2).with_parameter(0, 0).build();

    let err = read_field(Bytes::from(data), "TCDC").unwrap_err();
    assert!(matches!(err, Grib2Error::FieldNotFound(ref name) if name == "TCDC"));
}

#[test]
fn test_truncated_file_is_rejected() {
    let mut data = Grib2Builder::new_tcdc(3, 3).build();
    data.truncate(data.len() - 10);

    let err = read_field(Bytes::from(data), "TCDC").unwrap_err();
    assert!(matches!(err, Grib2Error::InvalidFormat(_)));
}

#[test]
fn test_load_field_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latest_forecast.grib2");
    std::fs::write(&path, two_message_file(create_tcc_grid(2, 2), 2, 2)).unwrap();

    let field = load_field(&path, "TCDC").unwrap();
    assert_eq!(field.samples().len(), 4);

    let err = load_field(&dir.path().join("missing.grib2"), "TCDC").unwrap_err();
    assert!(matches!(err, Grib2Error::Io { .. }));
}

/// Decodes a real NBM core file when one has been downloaded.
#[test]
fn test_real_blend_file() {
    let path = test_utils::require_test_file!("latest_forecast.grib2");

    let field = load_field(&path, "TCDC").unwrap();
    assert_eq!(field.values.len(), field.ni * field.nj);
    let samples = field.samples();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| (-0.5..=100.5).contains(&s.tcc)));
    assert!(samples.iter().all(|s| (-180.0..180.0).contains(&s.lon)));
}
