use std::{sync::Arc, time::Duration};

use api_types::{category::Category, expense::SortOrder};
use chrono::Utc;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use expenses::{
    DraftField, FilterChange, HttpApi, SubmitStart, Tracker, TrackerSettings,
};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

/// Which widget receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Amount,
    Category,
    Description,
    Date,
    FilterCategory,
    FilterSort,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Amount,
        Focus::Category,
        Focus::Description,
        Focus::Date,
        Focus::FilterCategory,
        Focus::FilterSort,
    ];

    pub fn next(self) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(index + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(index + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// The form field behind this focus, if it is one.
    pub fn draft_field(self) -> Option<DraftField> {
        match self {
            Self::Amount => Some(DraftField::Amount),
            Self::Category => Some(DraftField::Category),
            Self::Description => Some(DraftField::Description),
            Self::Date => Some(DraftField::Date),
            Self::FilterCategory | Self::FilterSort => None,
        }
    }
}

pub struct AppState {
    pub tracker: Tracker<HttpApi>,
    pub focus: Focus,
    pub base_url: String,
}

pub struct App {
    config: AppConfig,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = HttpApi::new(&config.base_url, config.request_timeout())?;
        let tz = config.tz()?;
        let settings = TrackerSettings {
            request_timeout: config.request_timeout(),
            notice_ttl: config.notice_ttl(),
            today: Arc::new(move || Utc::now().with_timezone(&tz).date_naive()),
        };
        let state = AppState {
            tracker: Tracker::new(Arc::new(api), settings),
            focus: Focus::Amount,
            base_url: config.base_url.clone(),
        };

        Ok(Self {
            config,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        self.draw(terminal)?;
        self.state.tracker.start().await;
        tracing::info!(
            timezone = %self.config.timezone,
            connection = ?self.state.tracker.connection(),
            "tracker started"
        );

        while !self.should_quit {
            self.draw(terminal)?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                    _ => {}
                }
            }
            self.state.tracker.pump();
        }

        Ok(())
    }

    fn draw(&self, terminal: &mut ui::Terminal) -> Result<()> {
        terminal
            .draw(|frame| ui::render(frame, &self.state))
            .map_err(|err| AppError::Terminal(err.to_string()))?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match map_key(key) {
            AppAction::Quit => self.should_quit = true,
            AppAction::Refresh => self.state.tracker.refresh(),
            AppAction::Dismiss => self.state.tracker.dismiss(),
            AppAction::NextField => self.state.focus = self.state.focus.next(),
            AppAction::PrevField => self.state.focus = self.state.focus.prev(),
            AppAction::Submit => self.submit(),
            AppAction::Backspace => self.edit_text(|text| {
                text.pop();
            }),
            AppAction::Input(ch) => self.edit_text(|text| text.push(ch)),
            AppAction::Left => self.cycle(false),
            AppAction::Right => self.cycle(true),
            AppAction::None => {}
        }
    }

    fn submit(&mut self) {
        match self.state.tracker.submit() {
            SubmitStart::Started { idempotency_key } => {
                tracing::debug!(%idempotency_key, "submitting expense");
            }
            SubmitStart::Invalid => {
                // Jump to the first field that needs fixing.
                let errors = self.state.tracker.submitter().errors();
                if let Some(focus) = Focus::ORDER
                    .into_iter()
                    .find(|f| f.draft_field().is_some_and(|d| errors.contains_key(&d)))
                {
                    self.state.focus = focus;
                }
            }
            SubmitStart::Busy => {}
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        let field = match self.state.focus {
            Focus::Amount => DraftField::Amount,
            Focus::Description => DraftField::Description,
            Focus::Date => DraftField::Date,
            _ => return,
        };
        let draft = self.state.tracker.submitter().draft();
        let mut text = match field {
            DraftField::Amount => draft.amount.clone(),
            DraftField::Description => draft.description.clone(),
            _ => draft.date.clone(),
        };
        edit(&mut text);
        self.state.tracker.submitter_mut().update(field, &text);
    }

    fn cycle(&mut self, forward: bool) {
        match self.state.focus {
            Focus::Category => {
                let current = self.state.tracker.submitter().draft().category;
                let next = cycle_category(current, forward);
                self.state.tracker.submitter_mut().set_category(next);
            }
            Focus::FilterCategory => {
                let current = self.state.tracker.filter().category;
                let next = if forward { current.next() } else { current.prev() };
                self.state.tracker.set_filter(FilterChange::Category(next));
            }
            Focus::FilterSort => {
                let next = match self.state.tracker.filter().sort {
                    SortOrder::DateDesc => SortOrder::DateAsc,
                    SortOrder::DateAsc => SortOrder::DateDesc,
                };
                self.state.tracker.set_filter(FilterChange::Sort(next));
            }
            Focus::Amount | Focus::Description | Focus::Date => {}
        }
    }
}

fn cycle_category(current: Option<Category>, forward: bool) -> Category {
    let all = Category::ALL;
    let Some(current) = current else {
        return Category::default();
    };
    let index = all.iter().position(|c| *c == current).unwrap_or(0);
    if forward {
        all[(index + 1) % all.len()]
    } else {
        all[(index + all.len() - 1) % all.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_wraps_both_ways() {
        assert_eq!(Focus::FilterSort.next(), Focus::Amount);
        assert_eq!(Focus::Amount.prev(), Focus::FilterSort);
        assert_eq!(Focus::Category.next(), Focus::Description);
    }

    #[test]
    fn only_form_focus_maps_to_draft_fields() {
        assert_eq!(Focus::Date.draft_field(), Some(DraftField::Date));
        assert_eq!(Focus::FilterCategory.draft_field(), None);
    }

    #[test]
    fn category_cycle_wraps() {
        assert_eq!(cycle_category(Some(Category::Food), true), Category::Transport);
        assert_eq!(cycle_category(Some(Category::Food), false), Category::Other);
        assert_eq!(cycle_category(Some(Category::Other), true), Category::Food);
        assert_eq!(cycle_category(None, true), Category::Other);
    }
}
