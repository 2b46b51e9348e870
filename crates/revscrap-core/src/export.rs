use csv::{QuoteStyle, Terminator, WriterBuilder};
use revscrap_models::{AppRef, ReviewRecord, Store};
use std::io::Write;
use thiserror::Error;
use crate::fetcher::FetchedReviews;

/// Column order of every exported file. Changing it breaks downstream spreadsheets.
pub const CSV_HEADER: [&str; 7] = [
    "Datetime",
    "Username",
    "Review",
    "Rating",
    "Reply",
    "Reply Datetime",
    "Thumbs Up",
];

/// Day-first calendar date, as both review and reply dates are written
pub const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the header and one row per record. Missing values become empty cells.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a ReviewRecord>,
{
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(CSV_HEADER)?;
    for record in records {
        csv.write_record(&row(record))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn to_csv_bytes<'a, I>(records: I) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = &'a ReviewRecord>,
{
    let mut buffer = Vec::new();
    write_csv(&mut buffer, records)?;
    Ok(buffer)
}

fn row(record: &ReviewRecord) -> [String; 7] {
    [
        record.datetime().format(DATE_FORMAT).to_string(),
        record.username().to_string(),
        record.review_text().to_string(),
        record.rating().to_string(),
        record.reply_text().to_string(),
        record
            .reply_datetime()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        record.thumbs_up().map(|n| n.to_string()).unwrap_or_default(),
    ]
}

/// Suggested download name, e.g. `playstore_com_example_app_reviews.csv`
pub fn suggested_filename(store: Store, app: &AppRef, app_name: Option<&str>) -> String {
    let stem = match store {
        Store::GooglePlay => app.app_id.replace('.', "_"),
        Store::AppStore => app
            .slug
            .clone()
            .or_else(|| app_name.map(slugify).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| app.app_id.clone()),
    };
    format!("{}_{}_reviews.csv", store.file_prefix(), sanitize(&stem))
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// A finished CSV download, built in memory so a failure never yields a partial file
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
    pub review_count: usize,
}

impl CsvExport {
    pub fn from_reviews(fetched: &FetchedReviews) -> Result<Self, ExportError> {
        Ok(Self {
            filename: suggested_filename(fetched.store, &fetched.app, fetched.app_name.as_deref()),
            content: to_csv_bytes(fetched.iter())?,
            review_count: fetched.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use revscrap_models::Rating;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_review_matches_expected_csv() {
        let records = vec![ReviewRecord::new(date(2024, 3, 5), "alice", "Great app", Rating::new(5).unwrap())];
        let bytes = to_csv_bytes(&records).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Datetime,Username,Review,Rating,Reply,Reply Datetime,Thumbs Up\n05/03/2024,alice,Great app,5,,,\n"
        );
    }

    #[test]
    fn test_no_reviews_yields_header_only() {
        let bytes = to_csv_bytes(&Vec::<ReviewRecord>::new()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Datetime,Username,Review,Rating,Reply,Reply Datetime,Thumbs Up\n"
        );
    }

    #[test]
    fn test_reader_round_trip_with_comma_and_quote() {
        let records = vec![
            ReviewRecord::new(date(2024, 3, 5), "alice", "Fast, simple and \"free\"", Rating::new(5).unwrap())
                .with_reply("Thanks, Alice!", Some(date(2024, 3, 6)))
                .with_thumbs_up(Some(7)),
            ReviewRecord::new(date(2023, 12, 31), "bob", "Crashes on start", Rating::new(1).unwrap()),
        ];
        let bytes = to_csv_bytes(&records).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADER);

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec!["05/03/2024", "alice", "Fast, simple and \"free\"", "5", "Thanks, Alice!", "06/03/2024", "7"]
        );
        assert_eq!(rows[1], vec!["31/12/2023", "bob", "Crashes on start", "1", "", "", ""]);
    }

    #[test]
    fn test_suggested_filenames() {
        assert_eq!(
            suggested_filename(Store::GooglePlay, &AppRef::new("com.example.app"), None),
            "playstore_com_example_app_reviews.csv"
        );
        let slugged = AppRef::new("1377291789").with_slug(Some("enel-x-way".to_string()));
        assert_eq!(
            suggested_filename(Store::AppStore, &slugged, Some("Enel X Way")),
            "appstore_enel-x-way_reviews.csv"
        );
        assert_eq!(
            suggested_filename(Store::AppStore, &AppRef::new("284882215"), Some("Facebook: Connect")),
            "appstore_facebook-connect_reviews.csv"
        );
        assert_eq!(
            suggested_filename(Store::AppStore, &AppRef::new("284882215"), None),
            "appstore_284882215_reviews.csv"
        );
        let odd = AppRef::new("1").with_slug(Some("caffè\"x".to_string()));
        assert_eq!(suggested_filename(Store::AppStore, &odd, None), "appstore_caff__x_reviews.csv");
    }
}
