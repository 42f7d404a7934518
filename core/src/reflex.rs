use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflexConfig {
    /// How long the target stays hidden, in ms.
    pub hidden_ms: (Millis, Millis),
    /// How long the target stays visible before any easing, in ms.
    pub visible_ms: (Millis, Millis),
    /// Misses needed for each easing step.
    pub ease_every: u32,
    /// Visible window growth per easing step, in thousandths.
    pub ease_step_permille: u32,
    /// Target height range, in viewport-height percent.
    pub target_height: (u32, u32),
}

impl Default for ReflexConfig {
    fn default() -> Self {
        Self {
            hidden_ms: (1300, 3000),
            visible_ms: (350, 600),
            ease_every: 5,
            ease_step_permille: 100,
            target_height: (8, 15),
        }
    }
}

impl ReflexConfig {
    pub fn validate(&self) -> Result<()> {
        let (min_height, max_height) = self.target_height;
        if self.ease_every == 0
            || self.hidden_ms.0 > self.hidden_ms.1
            || self.visible_ms.0 > self.visible_ms.1
            || min_height == 0
            || min_height > max_height
            || max_height >= 100
        {
            return Err(GameError::UnsatisfiableConfig);
        }
        Ok(())
    }

    /// Exact easing factor in thousandths: every `ease_every` misses add one step.
    pub fn ease_permille(&self, failures: u32) -> u32 {
        let steps = failures / self.ease_every.max(1);
        steps
            .saturating_mul(self.ease_step_permille)
            .saturating_add(1000)
    }

    pub fn ease_factor(&self, failures: u32) -> f64 {
        f64::from(self.ease_permille(failures)) / 1000.0
    }

    /// Visible window bounds after easing for `failures` misses.
    pub fn visible_bounds(&self, failures: u32) -> (Millis, Millis) {
        let permille = u64::from(self.ease_permille(failures));
        let scale = |ms: Millis| {
            (u64::from(ms) * permille / 1000)
                .try_into()
                .unwrap_or(Millis::MAX)
        };
        (scale(self.visible_ms.0), scale(self.visible_ms.1))
    }
}

/// Browser viewport size, only its aspect ratio matters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn ratio(self) -> f64 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(16.0, 9.0)
    }
}

/// Where the target sits, in viewport percentages (`vh` for vertical values, `vw` for horizontal ones).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub height_vh: f64,
    pub width_vw: f64,
    pub top_vh: f64,
    pub left_vw: f64,
}

impl Placement {
    /// Picks a random size keeping a square shape on screen, then a position keeping it fully visible.
    pub fn random(rng: &mut SmallRng, config: &ReflexConfig, viewport: Viewport) -> Self {
        let (min_height, max_height) = config.target_height;
        let height = random_between(rng, min_height, max_height);
        let width = f64::from(height) / viewport.ratio();

        let top = random_between(rng, 0, 100u32.saturating_sub(height));
        // truncation keeps left + width within the viewport
        let max_left = if width >= 100.0 {
            0
        } else {
            (100.0 - width) as u32
        };
        let left = random_between(rng, 0, max_left);

        Self {
            height_vh: f64::from(height),
            width_vw: width,
            top_vh: f64::from(top),
            left_vw: f64::from(left),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReflexTimer {
    Visibility,
}

/// Outcome of a click during the reflex game
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    Ignored,
    Missed,
    Hit,
}

impl ClickOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Missed => true,
            Self::Hit => true,
        }
    }
}

/// Catch a target that pops up at random places for short random durations.
#[derive(Debug)]
pub struct ReflexGame {
    config: ReflexConfig,
    viewport: Viewport,
    lifecycle: Lifecycle,
    target_visible: bool,
    placement: Option<Placement>,
    failures: u32,
    rng: SmallRng,
    timers: TimerSet<ReflexTimer>,
}

impl ReflexGame {
    pub fn new(config: ReflexConfig, viewport: Viewport, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            viewport,
            lifecycle: Lifecycle::default(),
            target_visible: false,
            placement: None,
            failures: 0,
            rng: seeded_rng(seed),
            timers: TimerSet::new(),
        })
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn target_visible(&self) -> bool {
        self.target_visible
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Applies to the next placement, the current one is kept.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// A click anywhere in the play area that did not land on the target.
    pub fn click_area(&mut self) -> ClickOutcome {
        if !self.lifecycle.state().is_playing() {
            return ClickOutcome::Ignored;
        }

        self.failures = self.failures.saturating_add(1);
        if self.failures % self.config.ease_every == 0 {
            log::debug!(
                "{} misses, visible window eased to {:?}",
                self.failures,
                self.config.visible_bounds(self.failures)
            );
        }
        ClickOutcome::Missed
    }

    pub fn click_target(&mut self) -> ClickOutcome {
        if !self.lifecycle.state().is_playing() {
            return ClickOutcome::Ignored;
        }
        if !self.target_visible {
            return self.click_area();
        }

        self.lifecycle.win();
        self.timers.cancel_all();
        log::debug!("reflex target caught after {} misses", self.failures);
        ClickOutcome::Hit
    }

    fn schedule_show(&mut self) {
        let (min, max) = self.config.hidden_ms;
        let delay = random_between(&mut self.rng, min, max);
        self.timers.schedule(ReflexTimer::Visibility, delay);
    }

    fn schedule_hide(&mut self) {
        let (min, max) = self.config.visible_bounds(self.failures);
        let delay = random_between(&mut self.rng, min, max);
        self.timers.schedule(ReflexTimer::Visibility, delay);
    }
}

impl MiniGame for ReflexGame {
    type Timer = ReflexTimer;

    const STAGE: Stage = Stage::Reflex;

    fn state(&self) -> GameState {
        self.lifecycle.state()
    }

    fn start(&mut self) -> Result<()> {
        self.lifecycle.start()?;
        log::debug!("reflex game started");
        self.schedule_show();
        Ok(())
    }

    fn on_timer(&mut self, fired: Fired<ReflexTimer>) -> bool {
        if !self.timers.claim(fired) || !self.lifecycle.state().is_playing() {
            return false;
        }

        match fired.key {
            ReflexTimer::Visibility if self.target_visible => {
                self.target_visible = false;
                self.schedule_show();
            }
            ReflexTimer::Visibility => {
                self.placement = Some(Placement::random(
                    &mut self.rng,
                    &self.config,
                    self.viewport,
                ));
                self.target_visible = true;
                self.schedule_hide();
            }
        }
        true
    }

    fn timers(&mut self) -> &mut TimerSet<ReflexTimer> {
        &mut self.timers
    }

    fn mistakes(&self) -> u32 {
        self.failures
    }

    fn proceed(&mut self) -> Result<Completion> {
        self.lifecycle.complete(Self::STAGE, self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u64) -> (ReflexGame, VirtualClock<ReflexTimer>) {
        let mut game = ReflexGame::new(ReflexConfig::default(), Viewport::default(), seed).unwrap();
        game.start().unwrap();
        (game, VirtualClock::new())
    }

    #[test]
    fn easing_grows_every_five_failures() {
        let config = ReflexConfig::default();

        assert_eq!(config.ease_factor(0), 1.0);
        assert_eq!(config.ease_factor(4), 1.0);
        assert_eq!(config.ease_factor(5), 1.1);
        assert_eq!(config.ease_factor(12), 1.2);
        assert_eq!(config.visible_bounds(0), (350, 600));
        assert_eq!(config.visible_bounds(5), (385, 660));
        assert_eq!(config.visible_bounds(12), (420, 720));
    }

    #[test]
    fn placement_stays_on_screen() {
        let config = ReflexConfig::default();
        let mut rng = seeded_rng(11);

        for viewport in [Viewport::new(1920.0, 1080.0), Viewport::new(390.0, 844.0)] {
            for _ in 0..500 {
                let placement = Placement::random(&mut rng, &config, viewport);
                assert!((8.0..=15.0).contains(&placement.height_vh));
                assert!(placement.top_vh + placement.height_vh <= 100.0);
                assert!(placement.left_vw + placement.width_vw <= 100.0);
                assert!(placement.left_vw >= 0.0 && placement.top_vh >= 0.0);
            }
        }
    }

    #[test]
    fn clicks_before_start_are_ignored() {
        let mut game = ReflexGame::new(ReflexConfig::default(), Viewport::default(), 0).unwrap();

        assert_eq!(game.click_area(), ClickOutcome::Ignored);
        assert_eq!(game.click_target(), ClickOutcome::Ignored);
        assert_eq!(game.failures(), 0);
        assert_eq!(game.timers().take_requests().len(), 0);
    }

    #[test]
    fn target_alternates_within_configured_delays() {
        let (mut game, mut clock) = started(5);

        assert!(!game.target_visible());
        clock.advance(&mut game, 1299);
        assert!(!game.target_visible());

        assert_eq!(clock.fire_next(&mut game), Some(ReflexTimer::Visibility));
        assert!((1300..=3000).contains(&clock.now()));
        assert!(game.target_visible());
        assert!(game.placement().is_some());

        let shown_at = clock.now();
        assert_eq!(clock.fire_next(&mut game), Some(ReflexTimer::Visibility));
        let visible_for = clock.now() - shown_at;
        assert!((350..=600).contains(&visible_for));
        assert!(!game.target_visible());
    }

    #[test]
    fn hidden_target_click_counts_as_miss() {
        let (mut game, _clock) = started(1);

        assert_eq!(game.click_target(), ClickOutcome::Missed);
        assert_eq!(game.click_area(), ClickOutcome::Missed);
        assert_eq!(game.failures(), 2);
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn hitting_target_wins_and_cancels_visibility_timer() {
        let (mut game, mut clock) = started(9);
        game.click_area();
        clock.fire_next(&mut game);
        assert!(game.target_visible());

        assert_eq!(game.click_target(), ClickOutcome::Hit);
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.timers().pending_count(), 0);

        clock.advance(&mut game, 10_000);
        assert_eq!(clock.pending(), 0);
        assert!(game.target_visible());
        assert_eq!(game.click_area(), ClickOutcome::Ignored);

        assert_eq!(
            game.proceed(),
            Ok(Completion {
                stage: Stage::Reflex,
                mistakes: 1
            })
        );
        assert_eq!(game.proceed(), Err(GameError::AlreadyCompleted));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ReflexConfig {
            target_height: (8, 120),
            ..Default::default()
        };
        assert_eq!(
            ReflexGame::new(config, Viewport::default(), 0).err(),
            Some(GameError::UnsatisfiableConfig)
        );
    }
}
