pub mod cookies;
pub mod payload;
pub mod search;

pub use cookies::parse_cookie_string;
pub use payload::{parse_search_payload, parse_timestamp, NoteSummary};
pub use search::{FetchSettings, XhsFetcher};

/// Platform constants shared by the fetcher and its tests.
pub const XHS_BASE_URL: &str = "https://www.xiaohongshu.com";
pub const EXPLORE_PREFIX: &str = "/explore/";
pub const ANCHOR_SELECTOR: &str = "a[href^='/explore/']";
pub const SEARCH_NOTES_PATTERN: &str = "/api/sns/web/v1/search/notes";
pub const COOKIE_DOMAIN: &str = ".xiaohongshu.com";
