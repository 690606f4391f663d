use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    AdminDashboard,
    TechDashboard,
    UserDashboard,
}

impl Route {
    pub fn match_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/admin-dashboard" => Self::AdminDashboard,
            "/tech-dashboard" => Self::TechDashboard,
            "/user-dashboard" => Self::UserDashboard,
            _ => Self::Login,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::AdminDashboard => "/admin-dashboard",
            Self::TechDashboard => "/tech-dashboard",
            Self::UserDashboard => "/user-dashboard",
        }
    }

    pub fn required_role(self) -> Option<Role> {
        match self {
            Self::Login => None,
            Self::AdminDashboard => Some(Role::Admin),
            Self::TechDashboard => Some(Role::Technician),
            Self::UserDashboard => Some(Role::User),
        }
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Technician => Self::TechDashboard,
            Role::User => Self::UserDashboard,
        }
    }
}
