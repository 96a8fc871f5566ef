//! # Avatar State Controller
//!
//! Owns the avatar's media source and decides which clip it plays.
//!
//! ```text
//!            transition(Talking)              5000ms
//!   Walking ───────────────────▶ Talking ──────────────▶ Walking
//!      ▲                                                    │
//!      └──────────── Greeting ◀─── transition(Greeting) ────┘
//!                      2000ms
//! ```
//!
//! Each timed state schedules exactly one reversion to `Walking`. The pending
//! reversion is identified by a [`ReversionToken`]; a new transition replaces
//! it, so a stale reversion can never fire after a later transition.
//!
//! Time is passed in explicitly. The UI loop calls [`AvatarController::tick`]
//! once per iteration and wakes itself no later than
//! [`AvatarController::next_deadline`].

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::core::media::{MediaSource, PlaybackFlags};

pub const WALK_URL: &str = "video/walk.mp4";
pub const GREETING_URL: &str = "video/hello.mp4";
pub const TALK_URL: &str = "video/talk.mp4";
/// Greeting variant played once when the avatar first appears.
pub const INITIAL_GREETING_URL: &str = "video/hello1.mp4";

pub const GREETING_DURATION: Duration = Duration::from_millis(2000);
pub const TALKING_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// Idle loop. Never times out.
    Walking,
    Greeting,
    Talking,
}

impl AnimationState {
    pub fn url(self) -> &'static str {
        match self {
            AnimationState::Walking => WALK_URL,
            AnimationState::Greeting => GREETING_URL,
            AnimationState::Talking => TALK_URL,
        }
    }

    /// How long the state lasts before reverting to `Walking`.
    pub fn reversion_delay(self) -> Option<Duration> {
        match self {
            AnimationState::Walking => None,
            AnimationState::Greeting => Some(GREETING_DURATION),
            AnimationState::Talking => Some(TALKING_DURATION),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnimationState::Walking => "walking",
            AnimationState::Greeting => "greeting",
            AnimationState::Talking => "talking",
        }
    }
}

/// Identifies one scheduled reversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReversionToken(u64);

#[derive(Debug, Clone, Copy)]
struct PendingReversion {
    token: ReversionToken,
    due: Instant,
}

pub struct AvatarController {
    media: Box<dyn MediaSource>,
    state: AnimationState,
    pending: Option<PendingReversion>,
    next_token: u64,
}

impl AvatarController {
    /// Takes ownership of `media`, starts the one-off greeting and schedules
    /// the switch to walking.
    pub fn new(mut media: Box<dyn MediaSource>, now: Instant) -> Self {
        media.set_flags(PlaybackFlags::AVATAR);
        media.set_source(INITIAL_GREETING_URL);
        media.play(now);

        let mut controller = Self {
            media,
            state: AnimationState::Greeting,
            pending: None,
            next_token: 0,
        };
        controller.schedule_reversion(GREETING_DURATION, now);
        info!("Avatar greeting with {}", INITIAL_GREETING_URL);
        controller
    }

    /// Switch to `state` immediately and (re)schedule its reversion.
    ///
    /// Returns the token of the newly scheduled reversion, or `None` for
    /// `Walking`, which cancels any pending reversion instead.
    pub fn transition(&mut self, state: AnimationState, now: Instant) -> Option<ReversionToken> {
        if let Some(stale) = self.cancel_reversion() {
            debug!("Superseded pending reversion {:?}", stale);
        }

        self.state = state;
        self.media.set_source(state.url());
        self.media.play(now);
        info!("Avatar -> {} ({})", state.label(), state.url());

        state
            .reversion_delay()
            .map(|delay| self.schedule_reversion(delay, now))
    }

    /// Drop the pending reversion, if any. The state stays as it is.
    pub fn cancel_reversion(&mut self) -> Option<ReversionToken> {
        self.pending.take().map(|p| p.token)
    }

    /// Fire the pending reversion if it is due. Returns true if the avatar
    /// went back to walking.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(pending) if now >= pending.due => self.revert(pending.token, now),
            _ => false,
        }
    }

    /// Revert to walking if `token` is still the pending reversion. Stale
    /// tokens are ignored.
    pub fn revert(&mut self, token: ReversionToken, now: Instant) -> bool {
        if self.pending.map(|p| p.token) != Some(token) {
            debug!("Ignoring stale reversion {:?}", token);
            return false;
        }
        self.pending = None;
        self.state = AnimationState::Walking;
        self.media.set_source(WALK_URL);
        self.media.play(now);
        info!("Avatar reverted to walking");
        true
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn pending_reversion(&self) -> Option<ReversionToken> {
        self.pending.map(|p| p.token)
    }

    /// When the pending reversion is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn media(&self) -> &dyn MediaSource {
        self.media.as_ref()
    }

    fn schedule_reversion(&mut self, delay: Duration, now: Instant) -> ReversionToken {
        let token = ReversionToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(PendingReversion {
            token,
            due: now + delay,
        });
        token
    }
}
