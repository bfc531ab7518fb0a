//! The questionnaire application's route tables.
//!
//! `ROUTES` is the live table. `snapshot` keeps every earlier revision so the
//! dev server and CLI can serve an older build of the client.

use crate::routing::{RouteSpec, RouteTable, TableError, ViewRef};

/// View handles. Rendering happens in the client; these are only carried through.
pub mod views {
    use crate::routing::ViewRef;

    pub const HOME: ViewRef = ViewRef::new("Home");
    pub const QUESTIONNAIRE: ViewRef = ViewRef::new("Questionnaire");
    pub const RESULTS: ViewRef = ViewRef::new("Results");
    pub const COMBINED_FEEDBACK: ViewRef = ViewRef::new("CombinedFeedback");
    pub const THANK_YOU_PAGE: ViewRef = ViewRef::new("ThankYouPage");
}

const fn route(name: &'static str, path: &'static str, view: ViewRef, props: bool) -> RouteSpec {
    RouteSpec {
        name,
        path,
        view,
        props,
    }
}

const SNAPSHOT_1: &[RouteSpec] = &[
    route("Home", "/", views::HOME, false),
    route("Questionnaire", "/questionnaire", views::QUESTIONNAIRE, false),
    route("Results", "/results", views::RESULTS, false),
];

const SNAPSHOT_2: &[RouteSpec] = &[
    route("Home", "/", views::HOME, false),
    route("Questionnaire", "/questionnaire", views::QUESTIONNAIRE, false),
    route("Results", "/results", views::RESULTS, false),
    route("Feedback", "/feedback", views::COMBINED_FEEDBACK, false),
];

const SNAPSHOT_3: &[RouteSpec] = &[
    route("Home", "/", views::HOME, false),
    route("Questionnaire", "/questionnaire/:slug", views::QUESTIONNAIRE, true),
    route("Results", "/results", views::RESULTS, false),
    route("Feedback", "/feedback/:slug", views::COMBINED_FEEDBACK, true),
];

/// Current table.
pub const ROUTES: &[RouteSpec] = &[
    route("Home", "/", views::HOME, false),
    route("Questionnaire", "/questionnaire/:exerciseId", views::QUESTIONNAIRE, true),
    route("Results", "/results", views::RESULTS, false),
    route("Feedback", "/feedback/:exerciseId", views::COMBINED_FEEDBACK, true),
    route("ThankYou", "/thank-you", views::THANK_YOU_PAGE, false),
];

/// Latest table revision.
pub const LATEST_SNAPSHOT: u8 = 4;

/// Literal table for a revision, `1..=LATEST_SNAPSHOT`.
pub fn snapshot(revision: u8) -> Option<&'static [RouteSpec]> {
    match revision {
        1 => Some(SNAPSHOT_1),
        2 => Some(SNAPSHOT_2),
        3 => Some(SNAPSHOT_3),
        4 => Some(ROUTES),
        _ => None,
    }
}

/// Build the current table.
pub fn app_routes() -> Result<RouteTable, TableError> {
    RouteTable::from_specs(ROUTES)
}
