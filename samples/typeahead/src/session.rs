//! A search box wired through fnadapt adapters.
//!
//! Every keystroke updates the query. Searches are debounced so only the
//! final query of a typing burst is searched. Draft saves are throttled so
//! the draft store is written at most once per window.

use std::cell::RefCell;
use std::rc::Rc;

use fnadapt::Error;
use fnadapt::guard::once;
use fnadapt::timer::Scheduler;
use fnadapt::value::{Function, Object, Value};

use crate::config::AppConfig;

/// What the session has done so far.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Queries that were actually searched, in order.
    pub searches: Vec<String>,
    /// Drafts that were actually saved, in order.
    pub saves: Vec<String>,
    /// Whether the one-time welcome hint has been shown.
    pub greeted: bool,
}

/// A typing session backed by rate-limited adapters.
pub struct Session {
    search: Function,
    autosave: Function,
    greet: Function,
    activity: Rc<RefCell<Activity>>,
}

impl Session {
    /// Builds the session's adapters on `scheduler`.
    ///
    /// # Errors
    ///
    /// Propagates adapter construction failures.
    pub fn new<S>(config: &AppConfig, scheduler: &S) -> Result<Self, Error>
    where
        S: Scheduler + Clone + 'static,
    {
        let activity = Rc::new(RefCell::new(Activity::default()));

        // The store is the receiver; the adapters forward it untouched.
        let search_log = Rc::clone(&activity);
        let search = Function::native("search", 1, move |this, arguments| {
            let query = arguments.first().cloned().unwrap_or_default().to_string();
            tracing::info!(%query, index = %this.get("name"), "searching");
            search_log.borrow_mut().searches.push(query);
            Ok(Value::Undefined)
        });

        let save_log = Rc::clone(&activity);
        let save = Function::native("saveDraft", 1, move |_, arguments| {
            let draft = arguments.first().cloned().unwrap_or_default().to_string();
            tracing::info!(%draft, "draft saved");
            save_log.borrow_mut().saves.push(draft);
            Ok(Value::Undefined)
        });

        let greet_log = Rc::clone(&activity);
        let greet = Function::arrow("greet", 0, move |_| {
            tracing::info!("tip: results appear once you pause typing");
            greet_log.borrow_mut().greeted = true;
            Ok(Value::Undefined)
        });

        let index = Object::new();
        index.set("name", "products");
        let search = search.bind(Value::from(index), Vec::new());

        Ok(Self {
            search: config.search.debounce(&Value::from(search), scheduler.clone())?,
            autosave: config.autosave.throttle(&Value::from(save), scheduler.clone())?,
            greet: once(&Value::from(greet))?,
            activity,
        })
    }

    /// Records that the query box now contains `text`.
    ///
    /// # Errors
    ///
    /// Propagates failures raised synchronously by the adapters.
    pub fn keystroke(&self, text: &str) -> Result<(), Error> {
        tracing::debug!(%text, "keystroke");
        self.greet.invoke(&[])?;
        self.search.invoke(&[Value::from(text)])?;
        self.autosave.invoke(&[Value::from(text)])?;
        Ok(())
    }

    /// Returns a snapshot of what has happened so far.
    pub fn activity(&self) -> Activity {
        self.activity.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnadapt::rate::Edge;
    use fnadapt::timer::VirtualClock;
    use rstest::rstest;
    use std::time::Duration;

    fn type_word(session: &Session, clock: &VirtualClock, word: &str, gap: Duration) {
        for end in 1..=word.len() {
            session.keystroke(&word[..end]).unwrap();
            clock.advance(gap);
        }
    }

    #[rstest]
    fn fast_typing_searches_final_query_once() {
        let clock = VirtualClock::new();
        let session = Session::new(&AppConfig::default(), &clock).unwrap();

        type_word(&session, &clock, "rust", Duration::from_millis(50));
        clock.run_until_idle();

        let activity = session.activity();
        assert_eq!(activity.searches, vec!["rust".to_string()]);
        assert_eq!(activity.saves, vec!["r".to_string()]);
        assert!(activity.greeted);
    }

    #[rstest]
    fn pauses_trigger_intermediate_searches() {
        let clock = VirtualClock::new();
        let session = Session::new(&AppConfig::default(), &clock).unwrap();

        type_word(&session, &clock, "ab", Duration::from_millis(400));
        clock.run_until_idle();

        assert_eq!(session.activity().searches, vec!["a".to_string(), "ab".to_string()]);
    }

    #[rstest]
    fn leading_autosave_saves_first_keystroke_immediately() {
        let clock = VirtualClock::new();
        let mut config = AppConfig::default();
        config.autosave.edge = Edge::Leading;
        let session = Session::new(&config, &clock).unwrap();

        session.keystroke("h").unwrap();
        assert_eq!(session.activity().saves, vec!["h".to_string()]);
    }
}
