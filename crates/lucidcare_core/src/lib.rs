pub mod comparison;
pub mod domain;
pub mod history;
pub mod ports;

pub use comparison::{ComparisonDraft, ComparisonError, HighlightDraft};
pub use domain::{
    ComparisonEntry, ComparisonResult, Language, MetricHighlight, NewUser, Summary, Trend, User,
    UserCredentials,
};
pub use history::{group_by_recency, HistoryEntry, SummaryGroup};
pub use ports::{
    ComparisonService, DatabaseService, DocumentTextExtractor, PortError, PortResult,
    ReportAnalysisService,
};
