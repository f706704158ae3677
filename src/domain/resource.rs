/// Tri-state wrapper around fetched data, plus `Idle` for a query never issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Resource<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }
}
