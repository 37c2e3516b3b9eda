//! Subscriber link state machine.
//!
//! The Bluetooth stack runs its callbacks on its own task and only flips
//! an atomic flag.  The main loop samples that flag once per poll and
//! feeds it to [`LinkTracker::observe`], which turns level changes into
//! the two edge transitions:
//!
//! ```text
//!   Disconnected ──(flag=true)──▶ Connected
//!   Connected   ──(flag=false)──▶ Disconnected  [arm re-advertise deadline]
//! ```
//!
//! A disconnect arms a settle deadline; advertising restarts once it
//! elapses, without blocking the loop.  A reconnect before the deadline
//! disarms it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTransition {
    Connected,
    Disconnected,
}

pub struct LinkTracker {
    state: LinkState,
    settle_ms: u32,
    readvertise_at: Option<u64>,
}

impl LinkTracker {
    pub fn new(settle_ms: u32) -> Self {
        Self {
            state: LinkState::Disconnected,
            settle_ms,
            readvertise_at: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Feed the current flag level.  Returns the edge, if one occurred.
    pub fn observe(&mut self, connected: bool, now_ms: u64) -> Option<LinkTransition> {
        match (self.state, connected) {
            (LinkState::Disconnected, true) => {
                self.state = LinkState::Connected;
                self.readvertise_at = None;
                Some(LinkTransition::Connected)
            }
            (LinkState::Connected, false) => {
                self.state = LinkState::Disconnected;
                self.readvertise_at = Some(now_ms.saturating_add(u64::from(self.settle_ms)));
                Some(LinkTransition::Disconnected)
            }
            _ => None,
        }
    }

    /// `true` exactly once per disconnect, when the settle deadline passes.
    pub fn take_readvertise_due(&mut self, now_ms: u64) -> bool {
        match self.readvertise_at {
            Some(deadline) if now_ms >= deadline => {
                self.readvertise_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn readvertise_pending(&self) -> bool {
        self.readvertise_at.is_some()
    }
}
