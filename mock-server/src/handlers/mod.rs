pub mod artifacts;
pub mod chromadb;
pub mod config;
pub mod search;
pub mod sqlite;
pub mod system;

use serde::Deserialize;

/// `page` from 1, `size` from 1.
#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default = "default_size")]
    pub size: usize,
}

fn first_page() -> usize {
    1
}

fn default_size() -> usize {
    20
}

impl Paging {
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let start = self.page.saturating_sub(1).saturating_mul(self.size);
        items.into_iter().skip(start).take(self.size).collect()
    }
}
