//! Messages that are not simply packed go through the `grib` crate.

use std::sync::Arc;

use bytes::Bytes;
use grib2_parser::unpacking::decode_with_grib_crate;
use grib2_parser::{read_field, Grib2Error, Grib2Reader, Grib2Tables};
use test_utils::grib2::Grib2Builder;
use test_utils::{assert_approx_eq, create_tcc_grid};

fn first_message(data: Vec<u8>) -> grib2_parser::Grib2Message {
    let mut reader = Grib2Reader::new(Bytes::from(data), Arc::new(Grib2Tables::nbm()));
    reader.next_message().unwrap().unwrap()
}

#[test]
fn test_grib_crate_agrees_with_simple_unpacking() {
    let values = create_tcc_grid(4, 3);
    let data = Grib2Builder::new_tcdc(4, 3).with_data(values.clone()).build();

    let decoded = decode_with_grib_crate(&data).unwrap();
    let unpacked = first_message(data).unpack_data().unwrap();

    assert_eq!(decoded.len(), 12);
    for ((a, b), expected) in decoded.iter().zip(unpacked.iter()).zip(values.iter()) {
        assert_approx_eq!(*a, *b, 0.01);
        assert_approx_eq!(*a, *expected, 0.01);
    }
}

#[test]
fn test_corrupt_png_packing_is_an_error() {
    // Template 5.41 header over a body that is not a PNG stream
    let data = Grib2Builder::new_tcdc(3, 3)
        .with_packing_template(41)
        .with_data(create_tcc_grid(3, 3))
        .build();

    let msg = first_message(data.clone());
    assert_eq!(msg.data_representation.template_number, 41);
    let err = msg.unpack_data().unwrap_err();
    assert!(matches!(err, Grib2Error::UnpackingError(_)));

    let err = read_field(Bytes::from(data), "TCDC").unwrap_err();
    assert!(matches!(err, Grib2Error::UnpackingError(_)));
}

#[test]
fn test_unknown_packing_template_is_an_error() {
    let data = Grib2Builder::new_tcdc(2, 2)
        .with_packing_template(999)
        .build();

    let err = first_message(data).unpack_data().unwrap_err();
    assert!(matches!(err, Grib2Error::UnpackingError(_)));
}

#[test]
fn test_grib_crate_rejects_damaged_bytes() {
    let mut data = Grib2Builder::new_tcdc(3, 3).build();
    data.truncate(40);

    assert!(matches!(
        decode_with_grib_crate(&data),
        Err(Grib2Error::UnpackingError(_))
    ));
    assert!(matches!(
        decode_with_grib_crate(b"not a grib file"),
        Err(Grib2Error::UnpackingError(_))
    ));
}
