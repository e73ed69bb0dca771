use tokio::time::Instant;

use kalam_stt_interface::ThrottleConfig;

/// Rate limiter for enrichment of in-progress interim text.
///
/// Two-edged policy:
/// - **Leading edge**: a content change fires immediately when the throttle
///   interval since the last leading fire has elapsed; otherwise it is
///   absorbed.
/// - **Trailing edge**: every accepted change (re)arms a settle timer; when
///   it elapses the settled text is fired as the authoritative pass, unless
///   a previous trailing pass already covered that exact text. This
///   guarantees the final word of a pause is always translated even when it
///   arrived inside the throttle window.
///
/// The struct is a pure state machine: the owner drives time by passing
/// `Instant`s and sleeping until [`InterimThrottle::trailing_deadline`].
#[derive(Debug)]
pub struct InterimThrottle {
    config: ThrottleConfig,
    last_fire: Instant,
    last_seen: String,
    last_trailing: String,
    trailing_deadline: Option<Instant>,
}

impl InterimThrottle {
    /// `now` is the session epoch: the first change inside the initial
    /// throttle window is deferred to the trailing pass, not fired eagerly.
    pub fn new(config: ThrottleConfig, now: Instant) -> Self {
        Self {
            config,
            last_fire: now,
            last_seen: String::new(),
            last_trailing: String::new(),
            trailing_deadline: None,
        }
    }

    /// Observe the current interim text. Returns the text to enrich right
    /// now, if the leading edge fires.
    pub fn on_text(&mut self, text: &str, now: Instant) -> Option<String> {
        // Debounce to actual content changes.
        if text == self.last_seen {
            return None;
        }
        self.last_seen = text.to_string();

        // Noise/false starts are skipped outright.
        if text.chars().count() < self.config.min_chars {
            return None;
        }

        self.trailing_deadline = Some(now + self.config.settle);

        if now.duration_since(self.last_fire) > self.config.interval {
            self.last_fire = now;
            return Some(self.last_seen.clone());
        }
        None
    }

    /// When the armed trailing timer should fire, if any.
    pub fn trailing_deadline(&self) -> Option<Instant> {
        self.trailing_deadline
    }

    /// The settle timer elapsed. Returns the settled text to enrich, or
    /// `None` when it is too short or already confirmed by a trailing pass.
    pub fn on_settle(&mut self, now: Instant) -> Option<String> {
        self.trailing_deadline = None;

        if self.last_seen.chars().count() < self.config.min_chars {
            return None;
        }
        if self.last_seen == self.last_trailing {
            return None;
        }

        self.last_trailing = self.last_seen.clone();
        self.last_fire = now;
        Some(self.last_seen.clone())
    }

    /// The interim text was cleared (utterance boundary): cancel the pending
    /// trailing call and forget the per-utterance text state.
    pub fn clear(&mut self) {
        self.last_seen.clear();
        self.last_trailing.clear();
        self.trailing_deadline = None;
    }
}
