pub mod alert;
pub mod level;
pub mod manage;
pub mod preview;
pub mod share;
pub mod trail;

pub use alert::{close_alert, open_alert};
pub use level::{GameInfo, LevelPopup, LevelState};
pub use manage::{ManageListForm, ManageListPopup};
pub use preview::{Anchor, Phase, PreviewPopup, PreviewRequest};
pub use share::SharePopup;
pub use trail::TrailPopup;
