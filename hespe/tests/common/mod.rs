//! Fixtures shaped like the files and JSON the HESPE server hands out

#![allow(dead_code)]

use fitsio::bintable::{
    build_binary_table_cards, serialize_binary_table, BinaryColumnData, BinaryColumnDescriptor,
    BinaryColumnType,
};
use fitsio::header::{serialize_header, Card};
use fitsio::image::serialize_image_f64;
use fitsio::primary::build_primary_header;
use fitsio::value::Value;
use serde_json::{json, Value as Json};

pub const FLARE_ID: u64 = 2021213;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Files written by an independent FITS writer
pub fn data_file(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

fn card(keyword: &str, value: Value) -> Card {
    let mut name = [b' '; 8];
    name[..keyword.len()].copy_from_slice(keyword.as_bytes());
    Card {
        keyword: name,
        value: Some(value),
        comment: None,
    }
}

fn column(name: &str, repeat: usize, col_type: BinaryColumnType) -> BinaryColumnDescriptor {
    let width = match col_type {
        BinaryColumnType::Ascii => 1,
        _ => 4,
    };
    BinaryColumnDescriptor {
        name: Some(name.to_string()),
        repeat,
        col_type,
        byte_width: repeat * width,
    }
}

fn primary(bitpix: i64, axes: &[usize]) -> Vec<u8> {
    serialize_header(&build_primary_header(bitpix, axes).unwrap())
}

/// Map file as served: empty primary HDU plus a one-row image table
pub fn map_fits(width: usize, height: usize, xc: f64) -> Vec<u8> {
    let float = |name: &str| column(name, 1, BinaryColumnType::Float);
    let columns = vec![
        column("IMAGE", width * height, BinaryColumnType::Float),
        float("XC"),
        float("YC"),
        float("DX"),
        float("DY"),
        column("XUNITS", 6, BinaryColumnType::Ascii),
        column("YUNITS", 6, BinaryColumnType::Ascii),
        float("ROLL_ANGLE"),
    ];
    let scalar = |v: f32| BinaryColumnData::Float(vec![v]);
    let text = || BinaryColumnData::Ascii(vec!["arcsec".to_string()]);
    let data = vec![
        BinaryColumnData::Float((0..width * height).map(|v| v as f32 * 0.5).collect()),
        scalar(xc as f32),
        scalar(-250.0),
        scalar(2.0),
        scalar(2.0),
        text(),
        text(),
        scalar(0.0),
    ];

    let mut cards = build_binary_table_cards(&columns, 1, 0).unwrap();
    cards.push(card("TDIM1", Value::String(format!("({width},{height})"))));
    cards.push(card("ORIGIN", Value::String("HESPE".to_string())));
    cards.push(card("EXTNAME", Value::String("IMAGES".to_string())));

    let mut bytes = primary(8, &[]);
    bytes.extend(serialize_header(&cards));
    bytes.extend(serialize_binary_table(&columns, &data, 1).unwrap());
    bytes
}

fn image_extension(axes: &[usize], values: &[f64]) -> Vec<u8> {
    let mut cards = vec![
        card("XTENSION", Value::String("IMAGE".to_string())),
        card("BITPIX", Value::Integer(-64)),
        card("NAXIS", Value::Integer(axes.len() as i64)),
    ];
    for (i, n) in axes.iter().enumerate() {
        cards.push(card(&format!("NAXIS{}", i + 1), Value::Integer(*n as i64)));
    }
    cards.push(card("PCOUNT", Value::Integer(0)));
    cards.push(card("GCOUNT", Value::Integer(1)));
    let mut bytes = serialize_header(&cards);
    bytes.extend(serialize_image_f64(values));
    bytes
}

/// Light curve file: counts image, sample times, band edges.
///
/// Images are stored row-major, so a 4 x 2 count table has NAXIS1 = 2.
pub fn lightcurve_fits() -> Vec<u8> {
    let counts = [120.0, 15.0, 180.0, 22.0, 150.0, 18.0, 90.0, 9.0];
    let times = [1_052_841_480.0, 1_052_841_484.0, 1_052_841_488.0, 1_052_841_492.0];
    let edges = [6.0, 12.0, 12.0, 25.0];

    let mut bytes = primary(-64, &[2, 4]);
    bytes.extend(serialize_image_f64(&counts));
    bytes.extend(image_extension(&[4], &times));
    bytes.extend(image_extension(&[2, 2], &edges));
    bytes
}

pub fn descriptor(low: f64, high: f64, name: &str) -> Json {
    json!({
        "lowerEnergy": low,
        "upperEnergy": high,
        "quicklook": format!("2003/05/13/{name}_uv.png"),
        "quicklook_visclean": format!("2003/05/13/{name}_vc.png"),
        "quicklook_memnjit": format!("2003/05/13/{name}_mem.png"),
    })
}

/// Response of getEventAllData for a flare with one coarse and one fine record
pub fn flare_records(photon: Vec<Json>, electron: Vec<Json>) -> Json {
    json!([
        {
            "ivsType": "fine",
            "visBags": [],
            "electron_visBags": [],
        },
        {
            "ivsType": "coarse",
            "flareId": FLARE_ID,
            "visBags": photon,
            "electron_visBags": electron,
            "lightcurves": "2003/05/13/hsi_1052841480_lc.png",
        }
    ])
}
