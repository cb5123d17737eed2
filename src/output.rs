use crate::models::ListingRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADER: [&str; 7] = [
    "captured_at",
    "category",
    "title",
    "price",
    "rating",
    "image_url",
    "listing_url",
];

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ListingCsv<'a> {
    captured_at: String,
    category: &'a str,
    title: &'a str,
    price: &'a str,
    rating: Option<f64>,
    image_url: &'a str,
    listing_url: &'a str,
}

impl<'a> From<&'a ListingRecord> for ListingCsv<'a> {
    fn from(record: &'a ListingRecord) -> Self {
        Self {
            captured_at: record.captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            category: &record.category,
            title: &record.title,
            price: &record.price,
            rating: record.rating,
            image_url: &record.image_url,
            listing_url: &record.listing_url,
        }
    }
}

/// Write the listing table: BOM, header, one row per record
pub fn write_csv_to<W: Write>(mut out: W, records: &[ListingRecord]) -> Result<(), OutputError> {
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(ListingCsv::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, records: &[ListingRecord]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    write_csv_to(file, records)
}

pub fn write_json(path: &Path, records: &[ListingRecord]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}
