use std::time::Duration;

use chrono::Local;
use greenearth_core::{
    contact::{ContactForm, FormField, Notification},
    document::MemoryDocument,
    routes::{Navigator, Route},
    scene::ScrollScene,
    service::ContactService,
};

use crate::pages::{ROW_PX, SitePages};

const NOTIFICATION_TTL_SECS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Page,
    Menu,
    Form,
}

pub(crate) struct App {
    pub service: ContactService,

    pub scene: ScrollScene<MemoryDocument>,
    pub navigator: Navigator,
    pub pages: SitePages,

    pub screen: Screen,
    pub menu_index: usize,

    pub form: ContactForm,
    pub focus: FormField,
    pub is_submitting: bool,
    pub notification: Option<Notification>,

    viewport_rows: u16,
}

impl App {
    pub(crate) fn new(service: ContactService, route: Route, viewport_rows: u16) -> Self {
        let mut app = Self {
            service,
            scene: ScrollScene::new(MemoryDocument::new(), f32::from(viewport_rows) * ROW_PX),
            navigator: Navigator::new(),
            pages: SitePages::new(),
            screen: Screen::Page,
            menu_index: 0,
            form: ContactForm::default(),
            focus: FormField::Name,
            is_submitting: false,
            notification: None,
            viewport_rows,
        };
        app.navigate(route);
        app
    }

    pub(crate) fn route(&self) -> Route {
        self.navigator.current().unwrap_or(Route::Home)
    }

    pub(crate) fn navigate(&mut self, route: Route) {
        self.navigator
            .navigate(&mut self.scene, &mut self.pages, route);
        self.screen = Screen::Page;
    }

    pub(crate) fn open_menu(&mut self) {
        let route = self.route();
        self.menu_index = Route::ALL
            .iter()
            .position(|candidate| *candidate == route)
            .unwrap_or(0);
        self.screen = Screen::Menu;
    }

    pub(crate) fn select_menu_entry(&mut self) {
        if let Some(route) = Route::ALL.get(self.menu_index).copied() {
            self.navigate(route);
        }
    }

    pub(crate) fn viewport_rows(&self) -> u16 {
        self.viewport_rows
    }

    pub(crate) fn set_viewport_rows(&mut self, rows: u16) {
        if rows != self.viewport_rows {
            self.viewport_rows = rows;
            self.scene.resize(f32::from(rows) * ROW_PX);
        }
    }

    /// Scroll by whole rows, kept within the page; the last line may reach the top row.
    pub(crate) fn scroll_rows(&mut self, rows: i16) {
        let max = (self.scene.document().height() - ROW_PX).max(0.0);
        let target = self.scene.snapshot().scroll_y + f32::from(rows) * ROW_PX;
        self.scene.scroll_to(target.clamp(0.0, max));
    }

    pub(crate) fn tick(&mut self, elapsed: Duration) {
        self.scene.tick(elapsed);
        if self
            .notification
            .as_ref()
            .is_some_and(|notification| {
                (Local::now() - notification.raised_at).num_seconds() >= NOTIFICATION_TTL_SECS
            })
        {
            self.notification = None;
        }
    }
}
