//! Page logic independent of any particular frontend.

pub mod fetch;
pub mod filter;
pub mod mvi;
pub mod navigation;
pub mod page;
pub mod render;
pub mod search;

pub use fetch::{FetchIntent, FetchReducer, FetchStatus, PageState};
pub use filter::{RevelationFilter, SurahFilter};
pub use page::{ContentQuery, PageController, SearchQuery, SurahListQuery, SurahQuery, VerseQuery};
pub use render::Layout;
pub use search::SearchController;
