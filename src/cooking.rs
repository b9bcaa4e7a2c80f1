use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::adjustment::{compute_display_quantity, DisplayIngredient};
use crate::detail::{ordered_steps, relevant_ingredients};
use crate::recipe::{RecipeAdjustment, RecipeIngredient, RecipeStep, RecipeTemplate};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum CookingError {
    #[error("recipe '{recipe}' has no steps to cook")]
    NoSteps { recipe: String },
}

/// Timer length for a step duration given in minutes. Saturates instead of overflowing.
pub fn step_seconds(minutes: u32) -> u32 {
    minutes.saturating_mul(60)
}

/// "m:ss", minutes unpadded.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Seconds left on a step timer. Counts down one second per tick and stops at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

/// A countdown ticking on its own task. The task is aborted when the timer is stopped or
/// dropped; the last published value stays readable after a stop.
struct StepTimer {
    remaining: watch::Receiver<u32>,
    task: JoinHandle<()>,
}

impl StepTimer {
    /// Must be called from within a tokio runtime.
    fn start(countdown: Countdown) -> Self {
        let (tx, remaining) = watch::channel(countdown.remaining());
        let task = tokio::spawn(async move {
            let mut countdown = countdown;
            let mut interval = time::interval_at(Instant::now() + TICK, TICK);
            while !countdown.is_finished() {
                interval.tick().await;
                countdown.tick();
                if tx.send(countdown.remaining()).is_err() {
                    break;
                }
            }
        });
        Self { remaining, task }
    }

    fn stop(&self) {
        self.task.abort();
    }

    fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for StepTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Step-by-step walk through one recipe.
pub struct CookingSession {
    recipe_id: String,
    steps: Vec<RecipeStep>,
    ingredients: Vec<RecipeIngredient>,
    base_servings: u32,
    adjustment: Option<RecipeAdjustment>,
    current: usize,
    completed: HashSet<String>,
    timer: Option<StepTimer>,
}

impl CookingSession {
    pub fn new(recipe: &RecipeTemplate, adjustment: Option<RecipeAdjustment>) -> Result<Self, CookingError> {
        let steps: Vec<RecipeStep> = ordered_steps(recipe).into_iter().cloned().collect();
        if steps.is_empty() {
            return Err(CookingError::NoSteps {
                recipe: recipe.id.clone(),
            });
        }
        Ok(Self {
            recipe_id: recipe.id.clone(),
            steps,
            ingredients: recipe.ingredients.clone(),
            base_servings: recipe.servings,
            adjustment,
            current: 0,
            completed: HashSet::new(),
            timer: None,
        })
    }

    pub fn current_step(&self) -> &RecipeStep {
        &self.steps[self.current]
    }

    /// 1-based index of the current step and the step count.
    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.steps.len())
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// Marks the current step completed and moves on, unless this is the last step.
    pub fn next_step(&mut self) {
        self.mark_current_completed();
        if !self.is_last_step() {
            self.current += 1;
            self.timer = None;
        }
    }

    pub fn previous_step(&mut self) {
        if self.current > 0 {
            self.current -= 1;
            self.timer = None;
        }
    }

    pub fn finish(&mut self) {
        self.mark_current_completed();
        self.timer = None;
        debug!(recipe = %self.recipe_id, progress = self.progress_percent(), "finished cooking");
    }

    /// Whether the current step has been completed.
    pub fn is_completed(&self) -> bool {
        self.completed.contains(&self.current_step().id)
    }

    pub fn progress_percent(&self) -> u32 {
        (self.completed.len() as f32 / self.steps.len() as f32 * 100.0).round() as u32
    }

    /// Ingredients the current step mentions, scaled like the recipe screen.
    pub fn relevant_ingredients(&self) -> Vec<DisplayIngredient> {
        let adjustment = self.adjustment.as_ref();
        relevant_ingredients(self.current_step(), &self.ingredients, adjustment)
            .into_iter()
            .map(|ingredient| DisplayIngredient::Scaled {
                id: ingredient.id.clone(),
                name: ingredient.name.clone(),
                quantity: compute_display_quantity(ingredient, adjustment, self.base_servings),
                unit: ingredient.unit.clone(),
                optional: ingredient.optional,
            })
            .collect()
    }

    /// Starts (or restarts) the current step's timer. Returns false when the step has no
    /// duration.
    pub fn start_timer(&mut self) -> bool {
        match self.current_step().duration {
            Some(minutes) if minutes > 0 => {
                self.timer = Some(StepTimer::start(Countdown::new(step_seconds(minutes))));
                true
            }
            _ => false,
        }
    }

    /// Pauses the countdown; the remaining time stays visible.
    pub fn stop_timer(&mut self) {
        if let Some(timer) = &self.timer {
            timer.stop();
        }
    }

    /// None when no timer was started on this step.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.timer.as_ref().map(StepTimer::remaining)
    }

    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().map_or(false, StepTimer::is_running)
    }

    fn mark_current_completed(&mut self) {
        let id = self.current_step().id.clone();
        self.completed.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use anyhow::Result;

    fn curry_session(adjustment: Option<RecipeAdjustment>) -> Result<CookingSession> {
        let catalog = Catalog::builtin()?;
        let recipe = catalog.lookup("poulet-curry-riz").recipe().unwrap();
        Ok(CookingSession::new(recipe, adjustment)?)
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(900), "15:00");
    }

    #[test]
    fn test_step_seconds_saturates() {
        assert_eq!(step_seconds(5), 300);
        assert_eq!(step_seconds(u32::MAX), u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_step_duration_starts_timer() -> Result<()> {
        let catalog = Catalog::builtin()?;
        let mut recipe = catalog.lookup("poulet-curry-riz").recipe().unwrap().clone();
        recipe.steps[0].duration = Some(u32::MAX);
        let mut session = CookingSession::new(&recipe, None)?;
        assert!(session.start_timer());
        assert_eq!(session.remaining_seconds(), Some(u32::MAX));
        Ok(())
    }

    #[test]
    fn test_countdown_stops_at_zero() {
        let mut countdown = Countdown::new(2);
        countdown.tick();
        assert_eq!(countdown.remaining(), 1);
        countdown.tick();
        countdown.tick();
        assert!(countdown.is_finished());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_recipe_without_steps_is_rejected() -> Result<()> {
        let catalog = Catalog::builtin()?;
        let mut recipe = catalog.lookup("poulet-curry-riz").recipe().unwrap().clone();
        recipe.steps.clear();
        assert!(matches!(
            CookingSession::new(&recipe, None),
            Err(CookingError::NoSteps { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_navigation_and_progress() -> Result<()> {
        let mut session = curry_session(None)?;
        assert_eq!(session.position(), (1, 4));
        assert!(!session.is_completed());

        session.previous_step();
        assert_eq!(session.position(), (1, 4));

        session.next_step();
        assert_eq!(session.position(), (2, 4));
        assert_eq!(session.progress_percent(), 25);

        session.previous_step();
        assert!(session.is_completed());

        for _ in 0..5 {
            session.next_step();
        }
        assert_eq!(session.position(), (4, 4));
        assert_eq!(session.progress_percent(), 100);
        session.finish();
        assert_eq!(session.progress_percent(), 100);
        Ok(())
    }

    #[test]
    fn test_relevant_ingredients_are_scaled() -> Result<()> {
        let session = curry_session(Some(RecipeAdjustment::new("poulet-curry-riz", 4)))?;
        let lines = session.relevant_ingredients();
        assert!(lines.iter().any(|line| matches!(
            line,
            DisplayIngredient::Scaled { name, quantity, .. } if name == "Poulet" && *quantity == 600.0
        )));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_counts_down_and_stops() -> Result<()> {
        let mut session = curry_session(None)?;
        assert_eq!(session.remaining_seconds(), None);
        assert!(session.start_timer());
        assert_eq!(session.remaining_seconds(), Some(300));

        time::sleep(Duration::from_millis(3500)).await;
        let remaining = session.remaining_seconds().unwrap();
        assert!((296..300).contains(&remaining), "remaining = {}", remaining);

        session.stop_timer();
        tokio::task::yield_now().await;
        let paused = session.remaining_seconds().unwrap();
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.remaining_seconds(), Some(paused));
        assert!(!session.timer_running());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_aborts_timer_task() -> Result<()> {
        let mut session = curry_session(None)?;
        assert!(session.start_timer());
        let mut ticks = session.timer.as_ref().unwrap().remaining.clone();
        drop(session);
        // The sender lives in the tick task; it goes away only if the task was aborted.
        assert!(ticks.changed().await.is_err());
        assert_eq!(*ticks.borrow(), 300);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_changing_step_releases_timer() -> Result<()> {
        let mut session = curry_session(None)?;
        session.start_timer();
        session.next_step();
        assert_eq!(session.remaining_seconds(), None);
        assert!(!session.timer_running());
        Ok(())
    }
}
