//! HTTP request handlers organized by functionality

pub mod api;
pub mod pages;

// Re-export handler functions
pub use api::{
    AnalysisRequest, CompanyQuery, FinanceQuery, NewsSummaryRequest, SearchQuery, api_company,
    api_finance, api_generate_analysis, api_news_summary, api_search, not_found,
};
pub use pages::home_page;
