/// Configuration default values
///
/// All defaults live here so they can be changed in one place.
// Listings service defaults
pub const DEFAULT_BASE_URL: &str = "https://json.schedulesdirect.org/20141201";
pub const DEFAULT_USERNAME: &str = "";
pub const DEFAULT_COUNTRY: &str = "USA";
pub const DEFAULT_POSTAL_CODE: &str = "02138";
pub const DEFAULT_LINEUP: &str = "USA-MA02317-X";
pub const DEFAULT_VERBOSE_MAP: bool = true;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Fetch defaults
pub const DEFAULT_DAYS: u32 = 15;
pub const DEFAULT_MAX_STATION_IDS_PER_REQUEST: usize = 5000;
pub const DEFAULT_MAX_PROGRAM_IDS_PER_REQUEST: usize = 500;

// Output defaults
pub const DEFAULT_XMLTV_FILE: &str = "xmltv.xml";
pub const DEFAULT_CACHE_KEYWORD_PREFIX: &str = "sd-md5-";

// Environment variable prefix for figment overrides
pub const ENV_PREFIX: &str = "SD_XMLTV_";
