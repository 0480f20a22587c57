use stockledger_core::{AreaId, CategoryId, UserId};

/// Who is operating, and where.
///
/// Requests that omit an area or category fall back to these values; every journaled
/// movement is stamped with the user and area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorContext {
    pub user_id: Option<UserId>,
    pub area_id: AreaId,
    pub categoria_id: Option<CategoryId>,
}

impl OperatorContext {
    pub fn new(area_id: AreaId) -> Self {
        Self {
            user_id: None,
            area_id,
            categoria_id: None,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_category(mut self, categoria_id: CategoryId) -> Self {
        self.categoria_id = Some(categoria_id);
        self
    }

    pub fn area_or_default(&self, requested: Option<&AreaId>) -> AreaId {
        requested.cloned().unwrap_or_else(|| self.area_id.clone())
    }

    pub fn category_or_default(&self, requested: Option<&CategoryId>) -> Option<CategoryId> {
        requested.cloned().or_else(|| self.categoria_id.clone())
    }
}
