// ============================================================================
// Syndic Client - Navigation Gate
// File: crates/syndic-client/src/navigation.rs
// Description: Typed routes and the auth/onboarding/home guard
// ============================================================================

use tracing::{debug, info, warn};

use syndic_core::domain::{JoinCode, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeTab {
    Dashboard,
    Residents,
    Expenses,
    Meetings,
    Issues,
    Settings,
}

const MANAGER_TABS: &[HomeTab] = &[
    HomeTab::Dashboard,
    HomeTab::Residents,
    HomeTab::Expenses,
    HomeTab::Meetings,
    HomeTab::Issues,
    HomeTab::Settings,
];

const RESIDENT_TABS: &[HomeTab] = &[
    HomeTab::Dashboard,
    HomeTab::Expenses,
    HomeTab::Meetings,
    HomeTab::Issues,
    HomeTab::Settings,
];

impl HomeTab {
    pub fn for_role(role: Role) -> &'static [HomeTab] {
        if role.manages_building() {
            MANAGER_TABS
        } else {
            RESIDENT_TABS
        }
    }
}

/// Every screen the client can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Splash,

    Login,
    Register,

    ChooseRole,
    CreateApartment,
    JoinApartment,
    SelectResident { apartment_id: String },
    OnboardingSuccess { join_code: JoinCode },

    Home(HomeTab),
    ResidentDetail { resident_id: String },
    AddResident,
    AddExpense,
    EditExpense { expense_id: String },
    AddMeeting,
    EditMeeting { meeting_id: String },
    ReportIssue,
    IssueDetail { issue_id: String },
    EditProfile,
    Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    Splash,
    Auth,
    Onboarding,
    Home,
}

impl Route {
    pub fn group(&self) -> RouteGroup {
        match self {
            Route::Splash => RouteGroup::Splash,
            Route::Login | Route::Register => RouteGroup::Auth,
            Route::ChooseRole
            | Route::CreateApartment
            | Route::JoinApartment
            | Route::SelectResident { .. }
            | Route::OnboardingSuccess { .. } => RouteGroup::Onboarding,
            _ => RouteGroup::Home,
        }
    }

    /// Screens that write building data.
    fn requires_manager(&self) -> bool {
        matches!(
            self,
            Route::Home(HomeTab::Residents)
                | Route::ResidentDetail { .. }
                | Route::AddResident
                | Route::AddExpense
                | Route::EditExpense { .. }
                | Route::AddMeeting
                | Route::EditMeeting { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    OnboardingUnknown,
    OnboardingIncomplete,
    OnboardingComplete { role: Role, apartment_id: String },
}

impl GateState {
    fn root(&self) -> Route {
        match self {
            GateState::Unauthenticated => Route::Login,
            GateState::OnboardingUnknown => Route::Splash,
            GateState::OnboardingIncomplete => Route::ChooseRole,
            GateState::OnboardingComplete { .. } => Route::Home(HomeTab::Dashboard),
        }
    }

    fn allows(&self, route: &Route) -> bool {
        match (self, route.group()) {
            (GateState::Unauthenticated, RouteGroup::Auth) => true,
            (GateState::OnboardingUnknown, RouteGroup::Splash) => true,
            (GateState::OnboardingIncomplete, RouteGroup::Onboarding) => true,
            (GateState::OnboardingComplete { role, .. }, RouteGroup::Home) => {
                let tab_allowed = match route {
                    Route::Home(tab) => HomeTab::for_role(*role).contains(tab),
                    _ => true,
                };
                tab_allowed && (role.manages_building() || !route.requires_manager())
            }
            _ => false,
        }
    }
}

/// Screen stack guarded by the session/onboarding state. Every state change
/// replaces the whole stack.
#[derive(Debug)]
pub struct NavigationGate {
    state: GateState,
    stack: Vec<Route>,
    redirects: u64,
}

impl Default for NavigationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationGate {
    pub fn new() -> Self {
        let state = GateState::Unauthenticated;
        Self {
            stack: vec![state.root()],
            state,
            redirects: 0,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn stack(&self) -> &[Route] {
        &self.stack
    }

    pub fn current(&self) -> &Route {
        // The stack always holds at least the root.
        &self.stack[self.stack.len() - 1]
    }

    /// Number of stack replacements so far.
    pub fn redirects(&self) -> u64 {
        self.redirects
    }

    pub fn tabs(&self) -> &'static [HomeTab] {
        match &self.state {
            GateState::OnboardingComplete { role, .. } => HomeTab::for_role(*role),
            _ => &[],
        }
    }

    /// Move to `state`. Re-entering the current state is a no-op.
    pub fn transition(&mut self, state: GateState) -> bool {
        if state == self.state {
            debug!("Navigation state unchanged: {:?}", state);
            return false;
        }
        info!("Navigation {:?} -> {:?}", self.state, state);
        self.state = state;
        self.replace_stack();
        true
    }

    /// Open `route`, or fall back to the state's root stack if the
    /// current state does not allow it.
    pub fn navigate(&mut self, route: Route) -> &Route {
        if !self.state.allows(&route) {
            warn!("Route {:?} not allowed in {:?}, redirecting", route, self.state);
            if self.stack.len() != 1 || self.stack[0] != self.state.root() {
                self.replace_stack();
            }
            return self.current();
        }

        match route {
            // Tabs sit at the root of the home stack.
            Route::Home(_) => self.stack = vec![route],
            route if self.current() == &route => {}
            route => self.stack.push(route),
        }
        self.current()
    }

    /// Pop within the current stack; never below its root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    fn replace_stack(&mut self) {
        self.stack = vec![self.state.root()];
        self.redirects += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(role: Role) -> GateState {
        GateState::OnboardingComplete {
            role,
            apartment_id: "apt-1".to_string(),
        }
    }

    #[test]
    fn test_starts_on_login() {
        let gate = NavigationGate::new();
        assert_eq!(gate.stack(), &[Route::Login]);
        assert!(gate.tabs().is_empty());
    }

    #[test]
    fn test_auth_stack_push_and_back() {
        let mut gate = NavigationGate::new();
        gate.navigate(Route::Register);
        assert_eq!(gate.stack(), &[Route::Login, Route::Register]);
        assert!(gate.back());
        assert!(!gate.back());
        assert_eq!(gate.current(), &Route::Login);
    }

    #[test]
    fn test_deep_link_into_home_redirects_to_choose_role() {
        let mut gate = NavigationGate::new();
        gate.transition(GateState::OnboardingUnknown);
        gate.transition(GateState::OnboardingIncomplete);
        gate.navigate(Route::CreateApartment);

        let landed = gate.navigate(Route::Home(HomeTab::Expenses)).clone();
        assert_eq!(landed, Route::ChooseRole);
        assert_eq!(gate.stack(), &[Route::ChooseRole]);
    }

    #[test]
    fn test_transitions_replace_stack_and_are_idempotent() {
        let mut gate = NavigationGate::new();
        gate.navigate(Route::Register);

        assert!(gate.transition(GateState::OnboardingUnknown));
        assert_eq!(gate.stack(), &[Route::Splash]);
        let redirects = gate.redirects();

        assert!(!gate.transition(GateState::OnboardingUnknown));
        assert_eq!(gate.redirects(), redirects);

        gate.transition(complete(Role::Syndic));
        assert_eq!(gate.stack(), &[Route::Home(HomeTab::Dashboard)]);
        assert!(!gate.back());

        gate.transition(GateState::Unauthenticated);
        assert_eq!(gate.stack(), &[Route::Login]);
    }

    #[test]
    fn test_role_specific_tabs() {
        let mut gate = NavigationGate::new();
        gate.transition(complete(Role::Resident));
        assert!(!gate.tabs().contains(&HomeTab::Residents));

        gate.navigate(Route::Home(HomeTab::Meetings));
        assert_eq!(gate.current(), &Route::Home(HomeTab::Meetings));

        gate.navigate(Route::AddExpense);
        assert_eq!(gate.stack(), &[Route::Home(HomeTab::Dashboard)]);

        gate.navigate(Route::ReportIssue);
        assert_eq!(gate.current(), &Route::ReportIssue);

        let mut manager = NavigationGate::new();
        manager.transition(complete(Role::SyndicResident));
        assert_eq!(manager.tabs().len(), 6);
        manager.navigate(Route::Home(HomeTab::Residents));
        manager.navigate(Route::AddResident);
        assert_eq!(manager.stack(), &[Route::Home(HomeTab::Residents), Route::AddResident]);
    }

    #[test]
    fn test_redirect_when_already_at_root_does_not_count() {
        let mut gate = NavigationGate::new();
        let before = gate.redirects();
        gate.navigate(Route::Home(HomeTab::Dashboard));
        assert_eq!(gate.redirects(), before);
        assert_eq!(gate.stack(), &[Route::Login]);
    }
}
