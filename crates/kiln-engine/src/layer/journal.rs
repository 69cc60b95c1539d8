//! Test layer that journals every hook it receives.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::FrameCtx;
use crate::event::Event;

use super::Layer;

pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

/// Records every hook into a shared journal and optionally claims events.
pub(crate) struct JournalLayer {
    pub name: &'static str,
    pub journal: Journal,
    pub claims: bool,
}

impl JournalLayer {
    pub fn boxed(name: &'static str, journal: &Journal) -> Box<Self> {
        Box::new(Self { name, journal: journal.clone(), claims: false })
    }

    pub fn claiming(name: &'static str, journal: &Journal) -> Box<Self> {
        Box::new(Self { name, journal: journal.clone(), claims: true })
    }

    fn log(&self, what: &str) {
        self.journal.borrow_mut().push(format!("{}:{what}", self.name));
    }
}

impl Layer for JournalLayer {
    fn name(&self) -> &str {
        self.name
    }

    fn on_attach(&mut self) {
        self.log("attach");
    }

    fn on_detach(&mut self) {
        self.log("detach");
    }

    fn on_update(&mut self, _ctx: &mut FrameCtx<'_>) {
        self.log("update");
    }

    fn on_event(&mut self, event: &mut Event) {
        self.log("event");
        if self.claims {
            event.handled = true;
        }
    }

    fn on_ui_render(&mut self, _ctx: &mut FrameCtx<'_>) {
        self.log("ui");
    }
}

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn take(j: &Journal) -> Vec<String> {
    std::mem::take(&mut *j.borrow_mut())
}
