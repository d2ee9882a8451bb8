pub type Result<T> = std::result::Result<T, TabError>;

/// Everything that can go wrong between a URL and a CSV on disk.
///
/// The split matters to callers: `UnsupportedSite` and the parse variants are
/// fatal for a single scrape call, `Fetch` is recovered per tournament by the
/// batch loop, and an empty-but-valid page is not an error at all.
#[derive(Debug, thiserror::Error)]
pub enum TabError {
    /// URL matches no known hosting platform. Never an empty success.
    #[error("unsupported site: {0}")]
    UnsupportedSite(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Profile matched but the page has no tab table.
    #[error("no tab table found at {0}")]
    MissingTable(String),

    /// A table row missing a declared column; the row never partially
    /// populates.
    #[error("malformed row {index} at {url}: {reason}")]
    MalformedRow {
        url: String,
        index: usize,
        reason: String,
    },

    /// A round card without a name is a profile mismatch, not an empty record.
    #[error("round block {index} at {url} has no round name")]
    MissingRoundName { url: String, index: usize },

    #[error("unrecognized position code: {0}")]
    UnknownPosition(String),

    #[error("malformed ranking string {input:?}: {reason}")]
    MalformedRanking { input: String, reason: String },

    /// Finals-style scoring (e.g. 2-1-1-1) and partial outround tables are an
    /// unsupported input shape.
    #[error("non-standard scoring in room {room:?}: scores {scores:?}")]
    NonStandardScoring { room: String, scores: Vec<i64> },

    /// Normalizing an empty position bucket. Bad input data, not a zero.
    #[error("no scores accumulated for {0}")]
    NoScores(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
