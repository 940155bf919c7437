//! Role-gated navigation entries for the console sidebar.

use shared::domain::AccountType;

/// A route in the protected area of the console.
pub struct RouteEntry {
    pub title: &'static str,
    pub path: &'static str,
    pub order: u8,
    allowed: &'static [AccountType],
}

impl RouteEntry {
    fn allows(&self, account_type: AccountType) -> bool {
        self.allowed.contains(&account_type)
    }
}

const ALL: &[AccountType] = &[AccountType::Admin, AccountType::Staff];
const ADMIN_ONLY: &[AccountType] = &[AccountType::Admin];

/// Route table for the protected area. Visibility is a plain membership
/// check against the account type.
pub const PROTECTED_ROUTES: &[RouteEntry] = &[
    RouteEntry {
        title: "Home",
        path: "/",
        order: 1,
        allowed: ALL,
    },
    RouteEntry {
        title: "Manage User",
        path: "/users",
        order: 2,
        allowed: ADMIN_ONLY,
    },
    RouteEntry {
        title: "Manage Asset",
        path: "/assets",
        order: 3,
        allowed: ADMIN_ONLY,
    },
    RouteEntry {
        title: "Manage Assignment",
        path: "/assignments",
        order: 4,
        allowed: ADMIN_ONLY,
    },
    RouteEntry {
        title: "Request for Returning",
        path: "/returning-requests",
        order: 5,
        allowed: ADMIN_ONLY,
    },
    RouteEntry {
        title: "Report",
        path: "/report",
        order: 6,
        allowed: ADMIN_ONLY,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub title: &'static str,
    pub path: &'static str,
}

/// Navigation entries visible to the given account type, in sidebar order.
pub fn navigation_for(account_type: AccountType) -> Vec<NavEntry> {
    let mut routes: Vec<&RouteEntry> = PROTECTED_ROUTES
        .iter()
        .filter(|route| route.allows(account_type))
        .collect();
    routes.sort_by_key(|route| route.order);
    routes
        .into_iter()
        .map(|route| NavEntry {
            title: route.title,
            path: route.path,
        })
        .collect()
}
