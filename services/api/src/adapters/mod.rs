pub mod compare_llm;
pub mod db;
pub mod pdf;
pub mod summary_llm;

pub use compare_llm::OpenAiComparisonAdapter;
pub use db::DbAdapter;
pub use pdf::PdfTextExtractor;
pub use summary_llm::OpenAiSummaryAdapter;
