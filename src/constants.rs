pub const LOGIN_PATH: &str = "/login/";
pub const ME_PATH: &str = "/me/";
pub const USERS_PATH: &str = "/users/";
pub const INCIDENTS_PATH: &str = "/incidents/";
pub const OFFICES_PATH: &str = "/offices/";
pub const USER_ROLES_PATH: &str = "/user-roles/";
pub const INCIDENT_STATUSES_PATH: &str = "/incident-statuses/";
pub const DEVICE_TYPES_PATH: &str = "/device-types/";

pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const DEFAULT_NEW_USER_ROLE_ID: i64 = 3;
pub const DEFAULT_NEW_INCIDENT_STATUS_ID: i64 = 1;
pub const OPEN_STATUS_ID: i64 = 1;
pub const RESOLVED_STATUS_ID: i64 = 3;

pub const SESSION_FILE_NAME: &str = "session.json";

pub const NOTICE_LOGIN_FAILED: &str = "login failed: check email and password";
pub const NOTICE_SERVER_UNREACHABLE: &str = "could not reach the Incidens server";
pub const NOTICE_SESSION_REJECTED: &str = "session expired or was rejected; sign in again";
pub const NOTICE_NOT_AUTHORIZED: &str = "not authorized for that view";
pub const NOTICE_PARTIAL_REFRESH: &str = "some collections failed to refresh and may be stale";

pub const CONFIRM_DELETE_USER: &str = "Delete this user? This cannot be undone.";
pub const CONFIRM_DELETE_INCIDENT: &str = "Delete this incident? This cannot be undone.";
