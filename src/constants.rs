/// Column layout of every airbnb listing CSV, in order.
pub const EXPECTED_COLUMNS: [&str; 16] = [
    "id",
    "name",
    "host_id",
    "host_name",
    "neighbourhood_group",
    "neighbourhood",
    "latitude",
    "longitude",
    "room_type",
    "price",
    "minimum_nights",
    "number_of_reviews",
    "last_review",
    "reviews_per_month",
    "calculated_host_listings_count",
    "availability_365",
];

pub const PRICE_COLUMN: &str = "price";
pub const NEIGHBOURHOOD_GROUP_COLUMN: &str = "neighbourhood_group";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

/// The five boroughs.
pub const KNOWN_NEIGHBOURHOOD_GROUPS: [&str; 5] =
    ["Bronx", "Brooklyn", "Manhattan", "Queens", "Staten Island"];

// NYC bounding box, inclusive
pub const MIN_LONGITUDE: f64 = -74.25;
pub const MAX_LONGITUDE: f64 = -73.50;
pub const MIN_LATITUDE: f64 = 40.5;
pub const MAX_LATITUDE: f64 = 41.2;

// Row count must fall strictly inside this interval
pub const MIN_ROW_COUNT: usize = 15_000;
pub const MAX_ROW_COUNT: usize = 1_000_000;

/// File name the cleaning stage writes before republishing.
pub const CLEAN_OUTPUT_FILE: &str = "clean_data.csv";

/// Serialized model file inside a model artifact directory.
pub const MODEL_FILE: &str = "model.json";

/// Summary key the evaluate stage records.
pub const TEST_MAE_KEY: &str = "test_mae";

// Job types recorded on runs
pub const JOB_DOWNLOAD: &str = "download";
pub const JOB_BASIC_CLEANING: &str = "basic_cleaning";
pub const JOB_DATA_CHECK: &str = "data_check";
pub const JOB_TEST_MODEL: &str = "test_model";
pub const JOB_UPLOAD_ARTIFACT: &str = "upload_artifact";
