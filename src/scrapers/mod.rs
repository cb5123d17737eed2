pub mod browser;
pub mod extract;
pub mod http;
pub mod runner;
pub mod traits;
pub mod types;

pub use browser::{BrowserOptions, ChromePageSource};
pub use extract::CardExtractor;
pub use http::HttpPageSource;
pub use runner::ListingScraper;
pub use traits::PageSource;
