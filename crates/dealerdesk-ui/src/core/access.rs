//! Role gating for screens and navigation.
//!
//! # Design
//! - Screens are described by [`Section`] so gating is testable without a router.
//! - Guards redirect instead of rendering errors: anonymous users go to login,
//!   users without the role go to their landing page.

use dealerdesk_api_models::Role;

/// Gated areas of the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// Sign-in screen.
    Login,
    /// Company group list.
    CompanyGroups,
    /// Single company group.
    CompanyGroupDetails,
    /// Company list.
    Companies,
    /// Single company.
    CompanyDetails,
    /// Single assistant of a company.
    AssistantDetails,
    /// Entries of a data collection.
    DataCollectionEntries,
    /// Assistants of the admin's own company.
    Assistants,
    /// Voice catalogue.
    Voices,
    /// Package catalogue.
    Packages,
    /// Feature catalogue.
    Features,
    /// Audit log.
    EventLogs,
    /// Admin's own company profile.
    Settings,
}

const ROOT: &[Role] = &[Role::Root];
const ROOT_AND_GROUP: &[Role] = &[Role::Root, Role::GroupAdmin];
const ADMIN: &[Role] = &[Role::Admin];
const EVERYONE: &[Role] = &[Role::Root, Role::GroupAdmin, Role::Admin];

impl Section {
    /// Roles allowed to open the section; `None` for public sections.
    #[must_use]
    pub const fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Login => None,
            Self::CompanyGroups
            | Self::CompanyGroupDetails
            | Self::AssistantDetails
            | Self::Voices
            | Self::Packages
            | Self::Features
            | Self::EventLogs => Some(ROOT),
            Self::Companies | Self::CompanyDetails => Some(ROOT_AND_GROUP),
            Self::DataCollectionEntries => Some(EVERYONE),
            Self::Assistants | Self::Settings => Some(ADMIN),
        }
    }

    /// Whether `role` may open the section.
    #[must_use]
    pub fn allows(self, role: Role) -> bool {
        self.allowed_roles()
            .is_none_or(|roles| roles.contains(&role))
    }
}

/// Path a role lands on after sign-in.
#[must_use]
pub const fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Root => "/company-groups",
        Role::GroupAdmin => "/companies",
        Role::Admin => "/assistants",
    }
}

/// Outcome of a route guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The stored session is still being restored.
    Pending,
    /// Render the section.
    Granted,
    /// Send the visitor to the login screen.
    RedirectToLogin,
    /// Send the user to their landing page.
    RedirectTo(&'static str),
}

/// Decide whether a visitor may see `section`.
#[must_use]
pub fn check_access(section: Section, role: Option<Role>, auth_checked: bool) -> Access {
    if section == Section::Login {
        return role.map_or(Access::Granted, |role| Access::RedirectTo(landing_path(role)));
    }
    match role {
        None if !auth_checked => Access::Pending,
        None => Access::RedirectToLogin,
        Some(role) if section.allows(role) => Access::Granted,
        Some(role) => Access::RedirectTo(landing_path(role)),
    }
}

/// Sidebar entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    /// Target path.
    pub path: &'static str,
    /// Visible label.
    pub label: &'static str,
}

const ROOT_NAV: &[NavItem] = &[
    NavItem {
        path: "/company-groups",
        label: "Auto House Groups",
    },
    NavItem {
        path: "/companies",
        label: "Auto Houses",
    },
    NavItem {
        path: "/voices",
        label: "Voices",
    },
    NavItem {
        path: "/packages",
        label: "Packages",
    },
    NavItem {
        path: "/features",
        label: "Features",
    },
    NavItem {
        path: "/event-logs",
        label: "Event Logs",
    },
];

const GROUP_ADMIN_NAV: &[NavItem] = &[NavItem {
    path: "/companies",
    label: "Auto Houses",
}];

const ADMIN_NAV: &[NavItem] = &[
    NavItem {
        path: "/assistants",
        label: "Assistants",
    },
    NavItem {
        path: "/settings",
        label: "Settings",
    },
];

/// Sidebar entries for a role.
#[must_use]
pub const fn nav_items(role: Role) -> &'static [NavItem] {
    match role {
        Role::Root => ROOT_NAV,
        Role::GroupAdmin => GROUP_ADMIN_NAV,
        Role::Admin => ADMIN_NAV,
    }
}

/// Whether a nav entry should render as active for `current_path`.
#[must_use]
pub fn is_active(item: &NavItem, current_path: &str) -> bool {
    current_path == item.path
        || current_path
            .strip_prefix(item.path)
            .is_some_and(|rest| rest.starts_with('/'))
}
