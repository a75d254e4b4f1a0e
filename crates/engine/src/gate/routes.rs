//! Role resolution and the per-role route tables.

use std::fmt;

use bullpen_types::Role;

use crate::session::Session;

pub const LANDING_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ONBOARDING_PATH: &str = "/player/onboarding";
/// Server endpoint that starts the login flow.
pub const LOGIN_PATH: &str = "/api/login";

/// The route table a session is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteSet {
    Unauthenticated,
    NoRole,
    Player,
    TeamCoach,
    PitchingCoach,
    DefaultCoach,
}

/// Something the client can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Landing,
    Register,
    /// Hand off to the server login flow at [`LOGIN_PATH`].
    LoginRedirect,
    RoleSelection,
    Dashboard,
    Athletes,
    Teams,
    Roster,
    Assessments,
    AssessmentDetail { id: String },
    Drills,
    TrainBrain,
    Onboarding,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landing => write!(f, "landing"),
            Self::Register => write!(f, "register"),
            Self::LoginRedirect => write!(f, "login redirect ({LOGIN_PATH})"),
            Self::RoleSelection => write!(f, "role selection"),
            Self::Dashboard => write!(f, "dashboard"),
            Self::Athletes => write!(f, "athletes"),
            Self::Teams => write!(f, "teams"),
            Self::Roster => write!(f, "roster"),
            Self::Assessments => write!(f, "assessments"),
            Self::AssessmentDetail { id } => write!(f, "assessment {id}"),
            Self::Drills => write!(f, "drills"),
            Self::TrainBrain => write!(f, "train brain"),
            Self::Onboarding => write!(f, "onboarding"),
        }
    }
}

/// A matched route. `gated` routes sit behind the onboarding gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub view: View,
    pub gated: bool,
}

/// Layer one outcome for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Exact(&'static str),
    /// `/assessments/{id}`
    AssessmentItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Landing,
    Register,
    LoginRedirect,
    Dashboard,
    Athletes,
    Teams,
    Roster,
    Assessments,
    AssessmentDetail,
    Drills,
    TrainBrain,
    Onboarding,
}

struct RouteRule {
    pattern: Pattern,
    screen: Screen,
    gated: bool,
}

const fn rule(path: &'static str, screen: Screen) -> RouteRule {
    RouteRule {
        pattern: Pattern::Exact(path),
        screen,
        gated: false,
    }
}

const fn gated(path: &'static str, screen: Screen) -> RouteRule {
    RouteRule {
        pattern: Pattern::Exact(path),
        screen,
        gated: true,
    }
}

const ASSESSMENT_ITEM: RouteRule = RouteRule {
    pattern: Pattern::AssessmentItem,
    screen: Screen::AssessmentDetail,
    gated: false,
};

const PUBLIC_ROUTES: &[RouteRule] = &[
    rule("/", Screen::Landing),
    rule("/register", Screen::Register),
    rule("/auth", Screen::LoginRedirect),
];

const PLAYER_ROUTES: &[RouteRule] = &[
    gated("/", Screen::Dashboard),
    gated("/dashboard", Screen::Dashboard),
    gated("/assessments", Screen::Assessments),
    RouteRule {
        gated: true,
        ..ASSESSMENT_ITEM
    },
    gated("/drills", Screen::Drills),
    rule("/player/onboarding", Screen::Onboarding),
    rule("/register", Screen::Register),
];

const TEAM_COACH_ROUTES: &[RouteRule] = &[
    rule("/", Screen::Dashboard),
    rule("/dashboard", Screen::Dashboard),
    rule("/athletes", Screen::Athletes),
    rule("/teams", Screen::Teams),
    rule("/assessments", Screen::Assessments),
    ASSESSMENT_ITEM,
    rule("/drills", Screen::Drills),
    rule("/admin/train-brain", Screen::TrainBrain),
];

const PITCHING_COACH_ROUTES: &[RouteRule] = &[
    rule("/", Screen::Dashboard),
    rule("/dashboard", Screen::Dashboard),
    rule("/roster", Screen::Roster),
    rule("/athletes", Screen::Athletes),
    rule("/assessments", Screen::Assessments),
    ASSESSMENT_ITEM,
    rule("/drills", Screen::Drills),
    rule("/admin/train-brain", Screen::TrainBrain),
];

const DEFAULT_COACH_ROUTES: &[RouteRule] = &[
    rule("/", Screen::Dashboard),
    rule("/dashboard", Screen::Dashboard),
    rule("/athletes", Screen::Athletes),
    rule("/teams", Screen::Teams),
    rule("/assessments", Screen::Assessments),
    ASSESSMENT_ITEM,
    rule("/drills", Screen::Drills),
];

/// Pure role resolution; re-run it on every navigation and auth change.
pub fn resolve_route_set(session: &Session) -> RouteSet {
    match session {
        Session::Anonymous => RouteSet::Unauthenticated,
        Session::SignedIn(user) => match user.role() {
            None => RouteSet::NoRole,
            Some(Role::Player) => RouteSet::Player,
            Some(Role::TeamCoach) => RouteSet::TeamCoach,
            Some(Role::PitchingCoach) => RouteSet::PitchingCoach,
            Some(Role::Coach) => RouteSet::DefaultCoach,
        },
    }
}

impl RouteSet {
    /// Where unmatched paths are sent.
    pub fn home(&self) -> &'static str {
        match self {
            Self::Unauthenticated => LANDING_PATH,
            _ => DASHBOARD_PATH,
        }
    }

    fn rules(&self) -> &'static [RouteRule] {
        match self {
            Self::Unauthenticated => PUBLIC_ROUTES,
            Self::NoRole => &[],
            Self::Player => PLAYER_ROUTES,
            Self::TeamCoach => TEAM_COACH_ROUTES,
            Self::PitchingCoach => PITCHING_COACH_ROUTES,
            Self::DefaultCoach => DEFAULT_COACH_ROUTES,
        }
    }

    /// Match `path` against this route table.
    pub fn match_path(&self, path: &str) -> Option<Route> {
        if *self == Self::NoRole {
            return Some(Route {
                view: View::RoleSelection,
                gated: false,
            });
        }
        let path = normalize_path(path);
        self.rules().iter().find_map(|rule| {
            let id = match rule.pattern {
                Pattern::Exact(expected) if expected == path => None,
                Pattern::AssessmentItem => Some(assessment_id(&path)?),
                Pattern::Exact(_) => return None,
            };
            Some(Route {
                view: view_for(rule.screen, id),
                gated: rule.gated,
            })
        })
    }

    pub fn resolve_navigation(&self, path: &str) -> Navigation {
        match self.match_path(path) {
            Some(route) => Navigation::Render(route),
            None => Navigation::Redirect(self.home().to_string()),
        }
    }
}

fn view_for(screen: Screen, id: Option<String>) -> View {
    match screen {
        Screen::Landing => View::Landing,
        Screen::Register => View::Register,
        Screen::LoginRedirect => View::LoginRedirect,
        Screen::Dashboard => View::Dashboard,
        Screen::Athletes => View::Athletes,
        Screen::Teams => View::Teams,
        Screen::Roster => View::Roster,
        Screen::Assessments => View::Assessments,
        Screen::AssessmentDetail => View::AssessmentDetail { id: id.unwrap_or_default() },
        Screen::Drills => View::Drills,
        Screen::TrainBrain => View::TrainBrain,
        Screen::Onboarding => View::Onboarding,
    }
}

fn assessment_id(path: &str) -> Option<String> {
    let id = path.strip_prefix("/assessments/")?;
    (!id.is_empty() && !id.contains('/')).then(|| id.to_string())
}

/// Drop any query string or fragment and trailing slashes; `""` becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        LANDING_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
