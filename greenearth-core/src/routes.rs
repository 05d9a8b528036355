//! Client-side routing table and the navigator that swaps page scopes.

use std::fmt;

use tracing::info;

use crate::lifecycle::{Scope, TeardownHandle};
use crate::ports::Document;
use crate::scene::ScrollScene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Every page the site can show.
pub enum Route {
    /// Landing page.
    Home,
    /// Overview of all facilities.
    Facilities,
    /// Autoclaved aerated concrete plant.
    Aac,
    /// Anaerobic gas lift reactor.
    Agr,
    /// Pyrolysis unit.
    Pyrolysis,
    /// Dry waste recycling facility.
    Recycling,
    /// End-to-end process.
    Process,
    /// Environmental impact figures.
    Impact,
    /// Sustainability reports.
    Reports,
    /// Client ecosystem.
    Clients,
    /// Blog index.
    Blogs,
    /// Single blog post on zero-waste science.
    ZeroWasteScience,
    /// Contact form.
    Contact,
}

impl Route {
    /// Every route, in menu order.
    pub const ALL: [Route; 13] = [
        Route::Home,
        Route::Facilities,
        Route::Aac,
        Route::Agr,
        Route::Pyrolysis,
        Route::Recycling,
        Route::Process,
        Route::Impact,
        Route::Reports,
        Route::Clients,
        Route::Blogs,
        Route::ZeroWasteScience,
        Route::Contact,
    ];

    /// URL path of the route.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Facilities => "/facilities",
            Route::Aac => "/facilities/aac",
            Route::Agr => "/facilities/agr",
            Route::Pyrolysis => "/facilities/pyrolysis",
            Route::Recycling => "/facilities/recycling",
            Route::Process => "/process",
            Route::Impact => "/impact",
            Route::Reports => "/reports",
            Route::Clients => "/clients",
            Route::Blogs => "/blogs",
            Route::ZeroWasteScience => "/blogs/zero-waste-science",
            Route::Contact => "/contact",
        }
    }

    /// Human-readable menu title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Facilities => "Facilities",
            Route::Aac => "AAC Blocks",
            Route::Agr => "AGR Biogas",
            Route::Pyrolysis => "Pyrolysis",
            Route::Recycling => "Recycling",
            Route::Process => "Process",
            Route::Impact => "Impact",
            Route::Reports => "Reports",
            Route::Clients => "Clients",
            Route::Blogs => "Blogs",
            Route::ZeroWasteScience => "The Science Behind Zero-Waste",
            Route::Contact => "Contact",
        }
    }

    /// Look up a route by path. A single trailing slash is ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(stripped) => stripped,
        };
        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

/// Builds and removes the elements of a page.
///
/// `mount` creates the page's elements in the scope's document and registers
/// their animations through the scope. `unmount` runs after the scope was torn
/// down and removes the elements again.
pub trait PageHost<D: Document> {
    /// Create the page and register its animations.
    fn mount(&mut self, route: Route, scope: &mut Scope<'_, D>);

    /// Remove the page's elements from the document.
    fn unmount(&mut self, route: Route, document: &mut D);
}

#[derive(Debug, Default)]
/// Tracks the mounted page and swaps it on navigation.
pub struct Navigator {
    current: Option<(Route, TeardownHandle)>,
}

impl Navigator {
    /// Nothing mounted yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently mounted route.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.current.map(|(route, _)| route)
    }

    /// Show `route`: tear the current page down, reset scroll, then mount the new page.
    ///
    /// Navigating to the mounted route remounts it.
    pub fn navigate<D, H>(&mut self, scene: &mut ScrollScene<D>, host: &mut H, route: Route)
    where
        D: Document,
        H: PageHost<D> + ?Sized,
    {
        self.leave(scene, host);
        scene.scroll_to(0.0);
        let handle = scene.bind(|scope| host.mount(route, scope));
        info!(%route, "navigated");
        self.current = Some((route, handle));
    }

    /// Tear down and unmount the current page, if any.
    pub fn leave<D, H>(&mut self, scene: &mut ScrollScene<D>, host: &mut H)
    where
        D: Document,
        H: PageHost<D> + ?Sized,
    {
        if let Some((route, handle)) = self.current.take() {
            scene.teardown(handle);
            host.unmount(route, scene.document_mut());
        }
    }
}
