//! Structural validation of GRIB2 messages and section parsing.
//!
//! Run with: cargo test --package grib2-parser --test validate_grib2 -- --nocapture

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, Timelike};
use grib2_parser::{GridProjection, Grib2Reader, Grib2Tables};
use test_utils::create_grid_with_missing;
use test_utils::grib2::Grib2Builder;

/// Verify the builder output is laid out the way the reader expects
#[test]
fn test_grib2_structure_validity() {
    let grib_bytes = Grib2Builder::new_tcdc(5, 5).build();

    assert_eq!(&grib_bytes[0..4], b"GRIB", "Should start with GRIB magic");
    assert_eq!(grib_bytes[7], 2, "Edition should be 2");

    let msg_len = u64::from_be_bytes(grib_bytes[8..16].try_into().unwrap());
    assert_eq!(msg_len as usize, grib_bytes.len(), "Message length should match actual length");
    assert_eq!(&grib_bytes[grib_bytes.len() - 4..], b"7777", "Should end with 7777");

    let mut offset = 16; // After Section 0
    let mut section_nums = vec![];
    while &grib_bytes[offset..offset + 4] != b"7777" {
        let section_len =
            u32::from_be_bytes(grib_bytes[offset..offset + 4].try_into().unwrap()) as usize;
        section_nums.push(grib_bytes[offset + 4]);
        offset += section_len;
    }

    assert_eq!(section_nums, vec![1, 3, 4, 5, 6, 7]);
}

/// Every section of a cloud cover message is parsed
#[test]
fn test_sections_of_cloud_cover_message() {
    let data = Grib2Builder::new_tcdc(4, 3)
        .with_reference_time(2024, 4, 3, 2)
        .with_data(create_grid_with_missing(4, 3, &[(3, 2)]))
        .build();

    let mut reader = Grib2Reader::new(Bytes::from(data), Arc::new(Grib2Tables::nbm()));
    let msg = reader
        .next_message()
        .expect("Should parse without error")
        .expect("Should have a message");

    assert_eq!(msg.indicator.discipline, 0, "Discipline should be meteorological");
    assert_eq!(msg.identification.center, 7, "Center should be NCEP");
    assert_eq!(msg.identification.reference_time.year(), 2024);
    assert_eq!(msg.identification.reference_time.day(), 3);
    assert_eq!(msg.identification.reference_time.hour(), 2);

    assert_eq!(msg.grid_dims(), (3, 4));
    assert_eq!(msg.grid_definition.template_number, 0);
    assert_eq!(msg.grid_definition.earth_radius, 6_371_229.0);
    match msg.grid_definition.projection {
        GridProjection::LatLon { la1, lo1, di, .. } => {
            assert_eq!(la1, 29.0);
            assert_eq!(lo1, 260.0);
            assert_eq!(di, 1.0);
        }
        ref other => panic!("Expected lat/lon grid, got {:?}", other),
    }

    assert_eq!(msg.parameter(), "TCDC");
    assert_eq!(msg.product_definition.level_description, "entire atmosphere");
    assert_eq!(msg.product_definition.forecast_hour, 136);

    // One hole in the bitmap: 11 packed values for 12 points
    assert_eq!(msg.data_representation.num_data_points, 11);
    assert_eq!(msg.data_representation.template_number, 0);
    assert!(msg.bitmap.is_some());

    let values = msg.unpack_data().unwrap();
    assert_eq!(values.len(), 12);
    assert!(values[11].is_nan());

    assert!(reader.next_message().unwrap().is_none());
}

/// Negative scale factors and western longitudes survive sign-magnitude encoding
#[test]
fn test_lambert_section_parameters() {
    let data = Grib2Builder::new_nbm_lambert(3, 3).build();
    let mut reader = Grib2Reader::new(Bytes::from(data), Arc::new(Grib2Tables::nbm()));
    let msg = reader.next_message().unwrap().unwrap();

    assert_eq!(msg.grid_definition.template_number, 30);
    assert_eq!(msg.grid_definition.earth_radius, 6_371_200.0);
    match msg.grid_definition.projection {
        GridProjection::Lambert {
            lov, dx, latin1, latin2, ..
        } => {
            assert_eq!(lov, 265.0);
            assert_eq!(dx, 2539.703);
            assert_eq!(latin1, 25.0);
            assert_eq!(latin2, 25.0);
        }
        ref other => panic!("Expected Lambert grid, got {:?}", other),
    }
}
