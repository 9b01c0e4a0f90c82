//! Archive of Our Own work pages
//!
//! - `index` resolves work ids and downloads the metadata-only work page
//! - `page` pulls the title and engagement stats out of that HTML

pub mod index;
pub mod page;
