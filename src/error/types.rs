use thiserror::Error;

/// Unified result type for the region layout crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the region tree, codec and editors.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("region `{0}` not found")]
    RegionNotFound(String),
    #[error("widget `{0}` not found")]
    WidgetNotFound(String),
    /// The tree and the caller disagree about where a region lives.
    #[error("region `{child}` is not a child of `{parent}`")]
    PositionNotFound { parent: String, child: String },
    #[error("edit rejected: {0}")]
    Rejected(Rejection),
    #[error("duplicate region id `{0}`")]
    DuplicateRegionId(String),
    #[error("invalid region markup for `{region}`: {reason}")]
    InvalidMarkup { region: String, reason: String },
    #[error("no pending conversion for widget `{0}`")]
    NoPendingConversion(String),
    #[error("service failure: {0}")]
    Service(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(rejection) => Some(*rejection),
            _ => None,
        }
    }
}

impl From<Rejection> for LayoutError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

/// Structural limits that block an edit without touching the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the root region cannot be edited directly")]
    RootRegion,
    #[error("the last region of the layout cannot be removed")]
    LastRootChild,
    #[error("regions with sub-regions cannot hold widgets")]
    RegionHasChildren,
    #[error("the row already holds twelve columns")]
    GridFull,
    #[error("widgets cannot be dropped on a row")]
    WidgetOnRow,
}

impl Rejection {
    /// Title and body for the warning dialog shown to the user.
    pub fn warning(&self) -> (&'static str, &'static str) {
        match self {
            Self::RootRegion => (
                "Region Warning",
                "The outer layout container cannot hold widgets or be removed.",
            ),
            Self::LastRootChild => (
                "Region Warning",
                "The layout must keep at least one region.",
            ),
            Self::RegionHasChildren => (
                "Widget Warning",
                "Widgets can only be added to regions that have no sub-regions.",
            ),
            Self::GridFull => (
                "Column Warning",
                "A row can hold at most 12 columns. Remove a column before adding another.",
            ),
            Self::WidgetOnRow => (
                "Widget Warning",
                "Widgets cannot be added to a row. Add a column to the row first.",
            ),
        }
    }
}
