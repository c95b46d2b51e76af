//! Scripted session against the portal page

use std::time::Duration;

use civic_a11y::{
    AnnounceOutcome, DomLiveRegion, LiveRegionSink, PreferencesPanel, SpeechOutput,
};
use civic_dom::SharedDocument;

use crate::page::MAIN_ID;
use crate::script::Command;

/// Whether to keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A mounted panel plus the page it controls
pub struct Session<V: SpeechOutput> {
    panel: PreferencesPanel<DomLiveRegion, V>,
    document: SharedDocument,
    sleep: Box<dyn FnMut(Duration)>,
}

impl<V: SpeechOutput> Session<V> {
    /// Mount `panel` and start a session
    pub fn new(mut panel: PreferencesPanel<DomLiveRegion, V>, document: SharedDocument) -> Self {
        panel.mount();
        Self {
            panel,
            document,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace how `wait` passes time
    pub fn with_sleep(mut self, sleep: impl FnMut(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn panel(&self) -> &PreferencesPanel<DomLiveRegion, V> {
        &self.panel
    }

    /// Current live region text
    pub fn announcement(&self) -> Option<String> {
        self.panel.coordinator().sink().content()
    }

    pub fn execute(&mut self, command: &Command) -> Flow {
        let outcome = match command {
            Command::FontSize(percent) => self.panel.set_font_size(*percent),
            Command::Preset(name) => self.panel.apply_preset(name),
            Command::Theme(theme) => self.panel.set_color_theme(*theme),
            Command::ScreenReader(on) => {
                self.panel.toggle_screen_reader(*on);
                None
            }
            Command::HighContrast(on) => self.panel.set_high_contrast(*on),
            Command::ReduceMotion(on) => self.panel.set_reduce_motion(*on),
            Command::FocusIndicators(on) => self.panel.set_focus_indicators(*on),
            Command::Focus(id) => self.focus(id),
            Command::Insert(text) => {
                self.insert(text);
                None
            }
            Command::Announce(text) => {
                let on = self.panel.coordinator().is_enabled();
                Some(self.panel.coordinator_mut().announce(text, on))
            }
            Command::Wait(ms) => {
                let spoken = self.wait(*ms);
                tracing::debug!(ms, spoken, "waited");
                None
            }
            Command::Open => Some(self.panel.open_announcement()),
            Command::Reset => {
                self.panel.reset();
                None
            }
            Command::Status => {
                match serde_json::to_string_pretty(self.panel.preferences()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!(error = %e, "cannot render preferences"),
                }
                None
            }
            Command::Quit => return Flow::Stop,
        };

        if let Some(outcome) = outcome {
            tracing::info!(?command, ?outcome, "announcement");
        }
        Flow::Continue
    }

    /// Run commands until one says stop
    pub fn run<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            if self.execute(command) == Flow::Stop {
                break;
            }
        }
    }

    /// Close the panel, silencing everything
    pub fn close(&mut self) {
        self.panel.close();
    }

    /// Let `ms` pass, waking early whenever speech falls due
    fn wait(&mut self, ms: u64) -> usize {
        let mut spoken = self.panel.tick();
        let mut remaining = ms;
        while remaining > 0 {
            let step = match self.panel.coordinator().time_until_next_speech() {
                Some(next) if next < remaining => next.max(1),
                _ => remaining,
            };
            (self.sleep)(Duration::from_millis(step));
            remaining -= step;
            spoken += self.panel.tick();
        }
        spoken
    }

    fn focus(&mut self, id: &str) -> Option<AnnounceOutcome> {
        let node = self.document.borrow().get_element_by_id(id);
        let Some(node) = node else {
            tracing::warn!(id, "no element with that id");
            return None;
        };
        self.panel.coordinator_mut().focus(node)
    }

    fn insert(&mut self, text: &str) {
        let Ok(mut doc) = self.document.try_borrow_mut() else {
            tracing::warn!("document busy; nothing inserted");
            return;
        };
        let Some(main) = doc.get_element_by_id(MAIN_ID) else {
            tracing::warn!("page has no main region");
            return;
        };
        let p = doc.create_element("p");
        let result = doc
            .set_text_content(p, text)
            .and_then(|()| doc.append_child(main, p));
        if let Err(e) = result {
            tracing::warn!(error = %e, "insert failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::page::feedback_page;
    use crate::script::parse;
    use civic_a11y::preferences::KEY_SCREEN_READER;
    use civic_a11y::{
        AnnouncementCoordinator, CoordinatorConfig, ManualClock, RecordingSpeech, Storage,
    };

    fn session(reader: bool) -> Session<RecordingSpeech> {
        let (session, clock) = session_with_clock(reader);
        session.with_sleep(move |d| clock.advance(d.as_millis() as u64))
    }

    fn session_with_clock(reader: bool) -> (Session<RecordingSpeech>, ManualClock) {
        let storage = Storage::session().into_shared();
        storage
            .borrow_mut()
            .set_item(KEY_SCREEN_READER, if reader { "true" } else { "false" })
            .unwrap();
        let document = feedback_page().unwrap().into_shared();
        let clock = ManualClock::new(0);
        let coordinator = AnnouncementCoordinator::for_document(
            CoordinatorConfig::default(),
            document.clone(),
            RecordingSpeech::new(),
            storage.clone(),
        )
        .with_clock(clock.clone());
        let panel = PreferencesPanel::new(coordinator, Some(document.clone()), storage);
        (Session::new(panel, document), clock)
    }

    #[test]
    fn test_script_drives_announcements() {
        let mut s = session(false);
        let script = parse(
            "reader on\nwait 300\nfocus submit\nwait 300\ninsert Your report was received, thank you\nwait 10\n",
        )
        .unwrap();
        s.run(&script);

        assert_eq!(
            s.announcement().as_deref(),
            Some("Your report was received, thank you")
        );
        let spoken = s.panel().coordinator().speech().spoken();
        assert_eq!(
            spoken,
            vec![
                "Screen reader activated",
                "Button: Submit feedback",
                "Your report was received, thank you",
            ]
        );
    }

    #[test]
    fn test_wait_wakes_for_due_speech() {
        let (s, clock) = session_with_clock(true);
        let steps = Rc::new(RefCell::new(Vec::new()));
        let recorded = steps.clone();
        let mut s = s.with_sleep(move |d| {
            let ms = d.as_millis() as u64;
            recorded.borrow_mut().push(ms);
            clock.advance(ms);
        });
        assert_eq!(s.panel().coordinator().time_until_next_speech(), Some(10));

        s.run(&parse("wait 300\n").unwrap());
        assert_eq!(*steps.borrow(), vec![10, 290]);
        assert_eq!(
            s.panel().coordinator().speech().spoken(),
            vec!["Screen reader activated"]
        );
        assert_eq!(s.panel().coordinator().time_until_next_speech(), None);
    }

    #[test]
    fn test_quit_stops_the_script() {
        let mut s = session(true);
        let script = parse("wait 300\nquit\nsay never spoken\n").unwrap();
        s.run(&script);
        assert_eq!(s.announcement().as_deref(), Some("Screen reader activated"));
    }

    #[test]
    fn test_unknown_focus_target() {
        let mut s = session(true);
        assert_eq!(s.execute(&Command::Focus("missing".into())), Flow::Continue);
    }
}
