pub mod api;
pub mod core;
pub mod bridge;
pub mod input;
pub mod net;
pub mod extensions;
pub mod session;
pub mod popup;
pub mod optimistic;
pub mod lives;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::page::{Page, PageConfig, PageContext};
pub use api::manifest::{PageManifest, LivesManifest, StatusCheck};
pub use api::types::{RequestId, WakeKind};
pub use core::time::{FixedTimestep, Countdown, CountdownStep};
pub use core::timeline::Timeline;
pub use core::rng::Rng;
pub use input::queue::{PageEvent, InputQueue};
pub use bridge::protocol::{Command, Binding, BindEvent, ClickTarget, encode_commands, PROTOCOL_VERSION};
pub use bridge::bindings::BindingTable;
pub use net::{Envelope, GameResult, Outcome, Reply, Request, Endpoints};
pub use error::{Error, Result};

pub use session::{
    SessionController, SessionTimer, StatusOutcome, EndGameSummary, EndButton, Verdict,
    IntroCountdown, ActionRelay, GameAction, ActionOutcome,
};
pub use popup::{
    TrailPopup, LevelPopup, LevelState, GameInfo, PreviewPopup, PreviewRequest, Anchor,
    ManageListPopup, ManageListForm, SharePopup,
};
pub use optimistic::{Optimistic, LikeButtons};
pub use lives::LivesClock;

// Extensions: counters and easing
pub use extensions::{Easing, CounterTweens, CounterTween, TweenId};
