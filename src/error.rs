use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum SymbolError {
    #[display("failed to read symbol table")]
    ReadTable,
    #[display("failed to parse symbol table record {record}")]
    ParseRecord { record: usize },
    #[display("symbol table contains no usable rows")]
    EmptyTable,
    #[display("no ticker found for \"{name}\"")]
    NotFound { name: String },
}

#[derive(Debug, Display, Error)]
pub enum SeriesError {
    #[display("price series has no bars")]
    Empty,
    #[display("bar {index}: dates must be strictly increasing")]
    UnorderedDates { index: usize },
    #[display("bar {index}: {column} must be a non-negative finite number")]
    InvalidValue { column: &'static str, index: usize },
}

#[derive(Debug, Display, Error)]
pub enum FetchError {
    #[display("price history request for {ticker} failed")]
    Request { ticker: String },
    #[display("unknown ticker {ticker}")]
    UnknownTicker { ticker: String },
    #[display("failed to parse price history response for {ticker}")]
    ResponseParse { ticker: String },
    #[display("no daily bars for {ticker} in the requested range")]
    EmptyRange { ticker: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ForecastError {
    #[display("invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Error context for a full dashboard run. Each variant maps to one
/// HTTP status class in the API layer.
#[derive(Debug, Display, Error)]
pub enum SnapshotError {
    #[display("invalid request: {reason}")]
    InvalidRequest { reason: String },
    #[display("symbol resolution failed")]
    Symbol,
    #[display("price history fetch failed")]
    Fetch,
    #[display("indicator computation failed")]
    Indicator,
    #[display("forecast failed")]
    Forecast,
}
