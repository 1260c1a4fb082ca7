//! User intents emitted by the presentation layer

use crate::SwipeDirection;

/// One user action against the navigator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectPhoto(usize),
    Keep,
    Delete,
    Swipe(SwipeDirection),
    MoveToAlbum(String),
    RepeatLastMove,
    Rename(String),
    ToggleFavorite,
    CreateAlbum(String),
    SetDeleteDirection(SwipeDirection),
    Back,
}

impl Intent {
    // Grid
    pub const GRID_SELECT: &'static str = "grid.select";

    // Swipe session
    pub const SWIPE_KEEP: &'static str = "swipe.keep";
    pub const SWIPE_DELETE: &'static str = "swipe.delete";
    pub const SWIPE_GESTURE: &'static str = "swipe.gesture";
    pub const SWIPE_MOVE: &'static str = "swipe.move";
    pub const SWIPE_REPEAT_MOVE: &'static str = "swipe.repeat_move";
    pub const SWIPE_RENAME: &'static str = "swipe.rename";
    pub const SWIPE_FAVORITE: &'static str = "swipe.favorite";

    // Albums & settings
    pub const ALBUM_CREATE: &'static str = "album.create";
    pub const SETTINGS_DIRECTION: &'static str = "settings.delete_direction";

    pub const NAV_BACK: &'static str = "nav.back";

    /// Stable identifier, used in logs
    pub fn id(&self) -> &'static str {
        match self {
            Intent::SelectPhoto(_) => Self::GRID_SELECT,
            Intent::Keep => Self::SWIPE_KEEP,
            Intent::Delete => Self::SWIPE_DELETE,
            Intent::Swipe(_) => Self::SWIPE_GESTURE,
            Intent::MoveToAlbum(_) => Self::SWIPE_MOVE,
            Intent::RepeatLastMove => Self::SWIPE_REPEAT_MOVE,
            Intent::Rename(_) => Self::SWIPE_RENAME,
            Intent::ToggleFavorite => Self::SWIPE_FAVORITE,
            Intent::CreateAlbum(_) => Self::ALBUM_CREATE,
            Intent::SetDeleteDirection(_) => Self::SETTINGS_DIRECTION,
            Intent::Back => Self::NAV_BACK,
        }
    }

    /// Whether the intent may call into a backing store
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Intent::Delete
                | Intent::Swipe(_)
                | Intent::MoveToAlbum(_)
                | Intent::RepeatLastMove
                | Intent::Rename(_)
                | Intent::ToggleFavorite
        )
    }
}
