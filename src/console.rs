use crate::{
    api::ApiClient,
    constants::{
        NOTICE_LOGIN_FAILED, NOTICE_NOT_AUTHORIZED, NOTICE_PARTIAL_REFRESH,
        NOTICE_SERVER_UNREACHABLE, NOTICE_SESSION_REJECTED,
    },
    dashboard::{
        Caches, ConfirmPrompt, Dashboard, FormState, IncidentDraft, Overview, UserDraft, UsersPage,
    },
    error::ConsoleError,
    gate::{AccessGate, GateStatus},
    models::{Identity, IncidentStatus, Role},
    routes::Route,
};
use async_trait::async_trait;
use std::io::Write as _;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
};
use tracing::{debug, warn};

const ADMIN_HELP: &str = "commands:
  overview                  totals for users and incidents
  users                     current page of the user table
  incidents                 incident listing
  next | prev | page <n>    move through the user table
  add user|incident         open a blank form
  edit user <id>            prefill the user form
  edit incident <id>        prefill the incident form
  delete user <id>          delete after confirmation
  delete incident <id>      delete after confirmation
  set <field> <value>       change the open form draft
  submit | cancel           close the open form
  refresh                   reload every collection
  logout | quit";

const TECH_HELP: &str = "commands:
  incidents       incident listing with status labels
  refresh         reload the board
  logout | quit";

const USER_HELP: &str = "commands:
  profile         the signed-in profile
  refresh         recount reported incidents
  logout | quit";

pub struct Console {
    api: ApiClient,
    gate: AccessGate,
    page_size: usize,
}

impl Console {
    pub fn new(api: ApiClient, page_size: usize) -> Self {
        let gate = AccessGate::new(api.clone());
        Self {
            api,
            gate,
            page_size,
        }
    }

    pub async fn run(&self) -> Result<(), ConsoleError> {
        let prompt = StdinPrompt::new();
        let mut route = Route::Login;
        let mut resume = true;
        loop {
            debug!(route = route.path(), "entering view");
            let next = match route.required_role() {
                None => {
                    let outcome = self.entry_view(&prompt, resume).await;
                    resume = false;
                    outcome
                }
                Some(required) => {
                    let had_session = self.api.session().has_token().await;
                    match self.gate.verify(Some(required)).await {
                        GateStatus::Authorized(identity) => {
                            self.protected_view(&prompt, required, identity).await?
                        }
                        GateStatus::Pending | GateStatus::Unauthorized => {
                            if had_session {
                                if self.api.session().has_token().await {
                                    println!("{NOTICE_NOT_AUTHORIZED}");
                                } else {
                                    println!("{NOTICE_SESSION_REJECTED}");
                                }
                            }
                            Some(Route::Login)
                        }
                    }
                }
            };
            match next {
                Some(destination) => route = destination,
                None => return Ok(()),
            }
        }
    }

    async fn entry_view(&self, prompt: &StdinPrompt, resume: bool) -> Option<Route> {
        if resume
            && self.api.session().has_token().await
            && let Ok(identity) = self.api.me().await
            && let Some(role) = identity.role()
        {
            debug!(role_id = identity.role_id, "resuming persisted session");
            return Some(Route::for_role(role));
        }

        println!("incidens console - sign in (or quit)");
        loop {
            let email = match prompt.ask("email: ").await {
                Some(line) => line.trim().to_string(),
                None => return None,
            };
            if email.eq_ignore_ascii_case("quit") || email.eq_ignore_ascii_case("exit") {
                return None;
            }
            if email.is_empty() {
                continue;
            }
            let password = match prompt.ask("password: ").await {
                Some(line) => line,
                None => return None,
            };
            if password.is_empty() {
                println!("{NOTICE_LOGIN_FAILED}");
                continue;
            }

            match self.api.login(&email, &password).await {
                Ok(()) => match self.api.me().await {
                    Ok(identity) => match identity.role() {
                        Some(role) => return Some(Route::for_role(role)),
                        None => {
                            warn!(role_id = identity.role_id, "no view for this role");
                            println!("{NOTICE_NOT_AUTHORIZED}");
                        }
                    },
                    Err(err) if err.is_auth() => println!("{NOTICE_SESSION_REJECTED}"),
                    Err(_) => println!("{NOTICE_SERVER_UNREACHABLE}"),
                },
                Err(ConsoleError::Auth) => println!("{NOTICE_LOGIN_FAILED}"),
                Err(_) => println!("{NOTICE_SERVER_UNREACHABLE}"),
            }
        }
    }

    async fn protected_view(
        &self,
        prompt: &StdinPrompt,
        role: Role,
        identity: Identity,
    ) -> Result<Option<Route>, ConsoleError> {
        match role {
            Role::Admin => self.admin_view(prompt, identity).await,
            Role::Technician => self.tech_view(prompt, identity).await,
            Role::User => Ok(self.user_view(prompt, identity).await),
        }
    }

    async fn admin_view(
        &self,
        prompt: &StdinPrompt,
        identity: Identity,
    ) -> Result<Option<Route>, ConsoleError> {
        let dashboard = Dashboard::new(self.api.clone(), self.page_size);
        match dashboard.load_all().await {
            Ok(report) if !report.is_complete() => println!("{NOTICE_PARTIAL_REFRESH}"),
            Ok(_) => {}
            Err(_) => {
                println!("{NOTICE_SESSION_REJECTED}");
                return Ok(Some(Route::Login));
            }
        }

        println!(
            "signed in as {} ({})",
            identity.display_name(),
            role_label(Role::Admin)
        );
        println!("{}", render_overview(dashboard.overview().await));
        println!("type help for commands");

        loop {
            let Some(line) = prompt.ask("incidens> ").await else {
                return Ok(None);
            };
            match parse_command(&line) {
                Command::Help => println!("{ADMIN_HELP}"),
                Command::Overview => println!("{}", render_overview(dashboard.overview().await)),
                Command::Users => {
                    let page = dashboard.users_page().await;
                    println!("{}", render_users_page(&page, &dashboard.caches().await));
                }
                Command::Incidents => {
                    println!("{}", render_incidents(&dashboard.caches().await));
                }
                Command::NextPage => {
                    dashboard.next_page().await;
                    let page = dashboard.users_page().await;
                    println!("{}", render_users_page(&page, &dashboard.caches().await));
                }
                Command::PreviousPage => {
                    dashboard.previous_page().await;
                    let page = dashboard.users_page().await;
                    println!("{}", render_users_page(&page, &dashboard.caches().await));
                }
                Command::GoToPage(target) => {
                    dashboard.go_to_page(target).await;
                    let page = dashboard.users_page().await;
                    println!("{}", render_users_page(&page, &dashboard.caches().await));
                }
                Command::AddUser => {
                    dashboard.open_user_create().await;
                    let form = dashboard.user_form().await;
                    println!("{}", render_user_form(&form, &dashboard.caches().await));
                }
                Command::EditUser(user_id) => match dashboard.open_user_edit(user_id).await {
                    Ok(()) => {
                        let form = dashboard.user_form().await;
                        println!("{}", render_user_form(&form, &dashboard.caches().await));
                    }
                    Err(err) => println!("{err}"),
                },
                Command::AddIncident => {
                    dashboard.open_incident_create().await;
                    let form = dashboard.incident_form().await;
                    println!("{}", render_incident_form(&form, &dashboard.caches().await));
                }
                Command::EditIncident(incident_id) => {
                    match dashboard.open_incident_edit(incident_id).await {
                        Ok(()) => {
                            let form = dashboard.incident_form().await;
                            println!("{}", render_incident_form(&form, &dashboard.caches().await));
                        }
                        Err(err) => println!("{err}"),
                    }
                }
                Command::Set { field, value } => {
                    if dashboard.user_form().await.open {
                        let mut outcome = Ok(());
                        dashboard
                            .edit_user_draft(|draft| {
                                outcome = apply_user_field(draft, &field, &value);
                            })
                            .await;
                        match outcome {
                            Ok(()) => {
                                let form = dashboard.user_form().await;
                                println!("{}", render_user_form(&form, &dashboard.caches().await));
                            }
                            Err(message) => println!("{message}"),
                        }
                    } else if dashboard.incident_form().await.open {
                        let mut outcome = Ok(());
                        dashboard
                            .edit_incident_draft(|draft| {
                                outcome = apply_incident_field(draft, &field, &value);
                            })
                            .await;
                        match outcome {
                            Ok(()) => {
                                let form = dashboard.incident_form().await;
                                println!(
                                    "{}",
                                    render_incident_form(&form, &dashboard.caches().await)
                                );
                            }
                            Err(message) => println!("{message}"),
                        }
                    } else {
                        println!("no form open");
                    }
                }
                Command::Submit => {
                    if dashboard.user_form().await.open {
                        match dashboard.submit_user_form().await {
                            Ok(()) => {
                                println!("saved");
                                let page = dashboard.users_page().await;
                                println!("{}", render_users_page(&page, &dashboard.caches().await));
                            }
                            Err(ConsoleError::Auth) => {
                                println!("{NOTICE_SESSION_REJECTED}");
                                return Ok(Some(Route::Login));
                            }
                            Err(err) => println!("{err}"),
                        }
                    } else if dashboard.incident_form().await.open {
                        match dashboard.submit_incident_form().await {
                            Ok(()) => {
                                println!("saved");
                                println!("{}", render_incidents(&dashboard.caches().await));
                            }
                            Err(ConsoleError::Auth) => {
                                println!("{NOTICE_SESSION_REJECTED}");
                                return Ok(Some(Route::Login));
                            }
                            Err(err) => println!("{err}"),
                        }
                    } else {
                        println!("no form open");
                    }
                }
                Command::Cancel => {
                    if dashboard.user_form().await.open {
                        dashboard.cancel_user_form().await;
                        println!("cancelled");
                    } else if dashboard.incident_form().await.open {
                        dashboard.cancel_incident_form().await;
                        println!("cancelled");
                    } else {
                        println!("no form open");
                    }
                }
                Command::DeleteUser(user_id) => {
                    match dashboard.delete_user(user_id, prompt).await {
                        Ok(()) => {
                            println!("deleted");
                            let page = dashboard.users_page().await;
                            println!("{}", render_users_page(&page, &dashboard.caches().await));
                        }
                        Err(ConsoleError::Auth) => {
                            println!("{NOTICE_SESSION_REJECTED}");
                            return Ok(Some(Route::Login));
                        }
                        Err(err) => println!("{err}"),
                    }
                }
                Command::DeleteIncident(incident_id) => {
                    match dashboard.delete_incident(incident_id, prompt).await {
                        Ok(()) => {
                            println!("deleted");
                            println!("{}", render_incidents(&dashboard.caches().await));
                        }
                        Err(ConsoleError::Auth) => {
                            println!("{NOTICE_SESSION_REJECTED}");
                            return Ok(Some(Route::Login));
                        }
                        Err(err) => println!("{err}"),
                    }
                }
                Command::Refresh => match dashboard.load_all().await {
                    Ok(report) if !report.is_complete() => println!("{NOTICE_PARTIAL_REFRESH}"),
                    Ok(_) => println!("{}", render_overview(dashboard.overview().await)),
                    Err(_) => {
                        println!("{NOTICE_SESSION_REJECTED}");
                        return Ok(Some(Route::Login));
                    }
                },
                Command::Profile => println!("{}", render_profile(&identity, None)),
                Command::Logout => return Ok(self.logout().await),
                Command::Quit => return Ok(None),
                Command::Unknown(text) => println!("unknown command {text:?}; type help"),
            }
        }
    }

    async fn tech_view(
        &self,
        prompt: &StdinPrompt,
        identity: Identity,
    ) -> Result<Option<Route>, ConsoleError> {
        let mut board = match self.load_incident_board().await {
            Ok(board) => board,
            Err(err) if err.is_auth() => {
                println!("{NOTICE_SESSION_REJECTED}");
                return Ok(Some(Route::Login));
            }
            Err(_) => {
                println!("{NOTICE_SERVER_UNREACHABLE}");
                Caches::default()
            }
        };

        println!(
            "signed in as {} ({})",
            identity.display_name(),
            role_label(Role::Technician)
        );
        println!("{}", render_incidents(&board));

        loop {
            let Some(line) = prompt.ask("incidens> ").await else {
                return Ok(None);
            };
            match parse_command(&line) {
                Command::Help => println!("{TECH_HELP}"),
                Command::Incidents => println!("{}", render_incidents(&board)),
                Command::Refresh => match self.load_incident_board().await {
                    Ok(fresh) => {
                        board = fresh;
                        println!("{}", render_incidents(&board));
                    }
                    Err(err) if err.is_auth() => {
                        println!("{NOTICE_SESSION_REJECTED}");
                        return Ok(Some(Route::Login));
                    }
                    Err(_) => println!("{NOTICE_SERVER_UNREACHABLE}"),
                },
                Command::Profile => println!("{}", render_profile(&identity, None)),
                Command::Logout => return Ok(self.logout().await),
                Command::Quit => return Ok(None),
                _ => println!("read-only view; type help"),
            }
        }
    }

    async fn user_view(&self, prompt: &StdinPrompt, identity: Identity) -> Option<Route> {
        let mut reported = self.count_reported(&identity).await;
        println!(
            "signed in as {} ({})",
            identity.display_name(),
            role_label(Role::User)
        );
        println!("{}", render_profile(&identity, reported));

        loop {
            let Some(line) = prompt.ask("incidens> ").await else {
                return None;
            };
            match parse_command(&line) {
                Command::Help => println!("{USER_HELP}"),
                Command::Profile => println!("{}", render_profile(&identity, reported)),
                Command::Refresh => {
                    reported = self.count_reported(&identity).await;
                    println!("{}", render_profile(&identity, reported));
                }
                Command::Logout => return self.logout().await,
                Command::Quit => return None,
                _ => println!("type help for commands"),
            }
        }
    }

    async fn load_incident_board(&self) -> Result<Caches, ConsoleError> {
        let (incidents, statuses) = tokio::join!(self.api.list_incidents(), self.api.list_statuses());
        let incidents = incidents?;
        let statuses = match statuses {
            Ok(rows) => rows,
            Err(err) if err.is_auth() => return Err(err),
            Err(err) => {
                warn!(error = %err, "status labels unavailable");
                Vec::<IncidentStatus>::new()
            }
        };
        Ok(Caches {
            incidents,
            statuses,
            ..Caches::default()
        })
    }

    async fn count_reported(&self, identity: &Identity) -> Option<usize> {
        let user_id = identity.user_id?;
        match self.api.list_incidents().await {
            Ok(rows) => Some(
                rows.iter()
                    .filter(|incident| incident.reporter_id == Some(user_id))
                    .count(),
            ),
            Err(err) => {
                warn!(error = %err, "reported-incident count unavailable");
                None
            }
        }
    }

    async fn logout(&self) -> Option<Route> {
        if let Err(err) = self.api.session().clear().await {
            warn!(error = %err, "failed to remove session on logout");
        }
        println!("signed out");
        Some(Route::Login)
    }
}

pub struct StdinPrompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    pub async fn ask(&self, question: &str) -> Option<String> {
        print!("{question}");
        let _ = std::io::stdout().flush();
        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "stdin read failed");
                None
            }
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmPrompt for StdinPrompt {
    async fn confirm(&self, message: &str) -> bool {
        match self.ask(&format!("{message} [y/N] ")).await {
            Some(line) => {
                let line = line.trim();
                line.eq_ignore_ascii_case("y") || line.eq_ignore_ascii_case("yes")
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Overview,
    Users,
    Incidents,
    Profile,
    NextPage,
    PreviousPage,
    GoToPage(usize),
    AddUser,
    EditUser(i64),
    DeleteUser(i64),
    AddIncident,
    EditIncident(i64),
    DeleteIncident(i64),
    Set { field: String, value: String },
    Submit,
    Cancel,
    Refresh,
    Logout,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let mut parts = trimmed.split_whitespace();
    let Some(head) = parts.next() else {
        return Command::Unknown(String::new());
    };
    match head.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "overview" | "stats" => Command::Overview,
        "users" => Command::Users,
        "incidents" => Command::Incidents,
        "profile" => Command::Profile,
        "next" => Command::NextPage,
        "prev" | "previous" => Command::PreviousPage,
        "page" => match parts.next().and_then(|raw| raw.parse().ok()) {
            Some(page) => Command::GoToPage(page),
            None => Command::Unknown(trimmed.to_string()),
        },
        "add" => match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("user") => Command::AddUser,
            Some("incident") => Command::AddIncident,
            _ => Command::Unknown(trimmed.to_string()),
        },
        "edit" => match (
            parts.next().map(str::to_ascii_lowercase).as_deref(),
            parts.next().and_then(|raw| raw.parse().ok()),
        ) {
            (Some("user"), Some(id)) => Command::EditUser(id),
            (Some("incident"), Some(id)) => Command::EditIncident(id),
            _ => Command::Unknown(trimmed.to_string()),
        },
        "delete" => match (
            parts.next().map(str::to_ascii_lowercase).as_deref(),
            parts.next().and_then(|raw| raw.parse().ok()),
        ) {
            (Some("user"), Some(id)) => Command::DeleteUser(id),
            (Some("incident"), Some(id)) => Command::DeleteIncident(id),
            _ => Command::Unknown(trimmed.to_string()),
        },
        "set" => {
            let rest = trimmed
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim_start())
                .unwrap_or("");
            match rest.split_once(char::is_whitespace) {
                Some((field, value)) => Command::Set {
                    field: field.to_ascii_lowercase(),
                    value: value.trim().to_string(),
                },
                None if !rest.is_empty() => Command::Set {
                    field: rest.to_ascii_lowercase(),
                    value: String::new(),
                },
                None => Command::Unknown(trimmed.to_string()),
            }
        }
        "submit" | "save" => Command::Submit,
        "cancel" => Command::Cancel,
        "refresh" | "reload" => Command::Refresh,
        "logout" => Command::Logout,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn apply_user_field(draft: &mut UserDraft, field: &str, value: &str) -> Result<(), String> {
    match field {
        "first_name" => draft.first_name = value.to_string(),
        "last_name" => draft.last_name = value.to_string(),
        "email" => draft.email = value.to_string(),
        "password" => draft.password = value.to_string(),
        "role" | "role_id" => match value.parse() {
            Ok(id) => draft.role_id = id,
            Err(_) => return Err(format!("{field} expects a numeric id")),
        },
        "office" | "office_id" => {
            draft.office_id = match parse_optional_id(value) {
                Ok(id) => id,
                Err(()) => return Err(format!("{field} expects a numeric id or -")),
            }
        }
        _ => return Err(format!("unknown field {field}")),
    }
    Ok(())
}

fn apply_incident_field(draft: &mut IncidentDraft, field: &str, value: &str) -> Result<(), String> {
    match field {
        "description" => draft.description = value.to_string(),
        "status" | "status_id" => match value.parse() {
            Ok(id) => draft.status_id = id,
            Err(_) => return Err(format!("{field} expects a numeric id")),
        },
        "reporter" | "reporter_id" => {
            draft.reporter_id = match parse_optional_id(value) {
                Ok(id) => id,
                Err(()) => return Err(format!("{field} expects a numeric id or -")),
            }
        }
        "office" | "office_id" => {
            draft.office_id = match parse_optional_id(value) {
                Ok(id) => id,
                Err(()) => return Err(format!("{field} expects a numeric id or -")),
            }
        }
        "device" | "device_id" => {
            draft.device_id = match parse_optional_id(value) {
                Ok(id) => id,
                Err(()) => return Err(format!("{field} expects a numeric id or -")),
            }
        }
        _ => return Err(format!("unknown field {field}")),
    }
    Ok(())
}

fn parse_optional_id(value: &str) -> Result<Option<i64>, ()> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| ())
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "administrator",
        Role::Technician => "technician",
        Role::User => "user",
    }
}

fn render_overview(overview: Overview) -> String {
    format!(
        "users: {} | incidents: {} (open {}, resolved {})",
        overview.total_users,
        overview.total_incidents,
        overview.open_incidents,
        overview.resolved_incidents
    )
}

fn render_users_page(page: &UsersPage, caches: &Caches) -> String {
    if page.total == 0 {
        return "no users".to_string();
    }
    let mut out = format!(
        "{:<5} {:<22} {:<28} {:<15} {}\n",
        "ID", "NAME", "EMAIL", "ROLE", "OFFICE"
    );
    for user in &page.rows {
        out.push_str(&format!(
            "{:<5} {:<22} {:<28} {:<15} {}\n",
            user.user_id,
            user.display_name(),
            user.email,
            caches.role_name(user.role_id),
            user.office_id
                .map(|office_id| caches.office_city(office_id))
                .unwrap_or_default(),
        ));
    }
    out.push_str(&format!(
        "page {} of {} ({} users)",
        page.page, page.total_pages, page.total
    ));
    out
}

fn render_incidents(caches: &Caches) -> String {
    if caches.incidents.is_empty() {
        return "no incidents".to_string();
    }
    let mut out = format!(
        "{:<5} {:<12} {:<17} {:<20} {:<12} {}\n",
        "ID", "STATUS", "OPENED", "REPORTER", "OFFICE", "DESCRIPTION"
    );
    for incident in &caches.incidents {
        out.push_str(&format!(
            "{:<5} {:<12} {:<17} {:<20} {:<12} {}\n",
            incident.incident_id,
            caches.status_name(incident.status_id),
            incident.opened_at.format("%Y-%m-%d %H:%M"),
            incident
                .reporter_id
                .map(|reporter_id| caches.user_display_name(reporter_id))
                .unwrap_or_default(),
            caches.office_city(incident.office_id),
            incident.description,
        ));
    }
    out.push_str(&format!("{} incidents", caches.incidents.len()));
    out
}

fn render_user_form(form: &FormState<UserDraft>, caches: &Caches) -> String {
    let mut out = match form.editing {
        Some(user_id) => format!("user form (editing #{user_id})\n"),
        None => "user form (new)\n".to_string(),
    };
    out.push_str(&format!("  first_name: {}\n", form.draft.first_name));
    out.push_str(&format!("  last_name:  {}\n", form.draft.last_name));
    out.push_str(&format!("  email:      {}\n", form.draft.email));
    let password = if form.draft.password.is_empty() {
        if form.editing.is_some() {
            "(blank keeps current)"
        } else {
            "(not set)"
        }
    } else {
        "*****"
    };
    out.push_str(&format!("  password:   {password}\n"));
    out.push_str(&format!(
        "  role_id:    {} {}\n",
        form.draft.role_id,
        caches.role_name(form.draft.role_id)
    ));
    out.push_str(&format!(
        "  office_id:  {}\n",
        form.draft
            .office_id
            .map(|office_id| format!("{office_id} {}", caches.office_city(office_id)))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str("set <field> <value>, then submit or cancel");
    out
}

fn render_incident_form(form: &FormState<IncidentDraft>, caches: &Caches) -> String {
    let mut out = match form.editing {
        Some(incident_id) => format!("incident form (editing #{incident_id})\n"),
        None => "incident form (new)\n".to_string(),
    };
    out.push_str(&format!("  description: {}\n", form.draft.description));
    out.push_str(&format!(
        "  status_id:   {} {}\n",
        form.draft.status_id,
        caches.status_name(form.draft.status_id)
    ));
    out.push_str(&format!(
        "  reporter_id: {}\n",
        form.draft
            .reporter_id
            .map(|reporter_id| format!("{reporter_id} {}", caches.user_display_name(reporter_id)))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  office_id:   {}\n",
        form.draft
            .office_id
            .map(|office_id| format!("{office_id} {}", caches.office_city(office_id)))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  device_id:   {}\n",
        form.draft
            .device_id
            .map(|device_id| format!("{device_id} {}", caches.device_type_name(device_id)))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str("set <field> <value>, then submit or cancel");
    out
}

fn render_profile(identity: &Identity, reported: Option<usize>) -> String {
    let mut out = "profile\n".to_string();
    out.push_str(&format!("  name:   {}\n", identity.display_name()));
    out.push_str(&format!("  email:  {}\n", identity.email));
    out.push_str(&format!(
        "  role:   {}\n",
        identity.role().map(role_label).unwrap_or_default()
    ));
    out.push_str(&format!(
        "  office: {}\n",
        identity
            .office_id
            .map(|office_id| office_id.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  reported incidents: {}",
        reported
            .map(|count| count.to_string())
            .unwrap_or_else(|| "unavailable".to_string())
    ));
    out
}
