use serde::{Deserialize, Serialize};

use crate::models::CategoryRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub color: Option<String>,
}

impl From<Category> for CategoryRef {
    fn from(c: Category) -> Self {
        CategoryRef {
            id: c.id,
            title: c.title,
            color: c.color,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub title: Option<String>,
    pub color: Option<Option<String>>,
}
