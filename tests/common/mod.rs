//! Fake school portal for integration tests
//!
//! A wiremock server answering every endpoint from fixed account tables.
//! Tokens are derived from the account id so a restarted client can reuse
//! them against a fresh server.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use portal_client::api::Envelope;
use portal_client::types::{
    Dashboard, ExamResults, FeeItem, FeeKind, FeeStatement, FeeStatus, Notification,
    NotificationKind, ResultStatus, SubjectResult, User, UserRole,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const STUDENT_PASSWORD: &str = "student123";
pub const PARENT_PASSWORD: &str = "parent123";

/// An account known to the fake portal
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: &'static str,
}

fn student(id: &str, email: &str, name: &str, class: &str, roll_no: &str, attendance: f64, gpa: f64) -> Account {
    Account {
        user: User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: UserRole::Student,
            class: Some(class.to_string()),
            roll_no: Some(roll_no.to_string()),
            phone: None,
            children: Vec::new(),
            avatar: None,
            attendance: Some(attendance),
            gpa: Some(gpa),
        },
        password: STUDENT_PASSWORD,
    }
}

fn parent(id: &str, email: &str, name: &str, children: &[&str]) -> Account {
    Account {
        user: User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: UserRole::Parent,
            class: None,
            roll_no: None,
            phone: None,
            children: children.iter().map(|c| c.to_string()).collect(),
            avatar: None,
            attendance: None,
            gpa: None,
        },
        password: PARENT_PASSWORD,
    }
}

/// Every account the fake portal accepts
pub fn accounts() -> Vec<Account> {
    vec![
        student("STU001", "alex@school.com", "Alex Johnson", "10-B", "15", 85.0, 3.8),
        student("STU002", "emma@school.com", "Emma Johnson", "8-A", "08", 92.0, 3.5),
        student("STU003", "michael@school.com", "Michael Johnson", "5-C", "12", 78.0, 3.2),
        parent("PAR001", "parent@school.com", "Robert Johnson", &["STU001", "STU002", "STU003"]),
        parent("PAR002", "mary@school.com", "Mary Williams", &["STU002"]),
    ]
}

pub fn account(id: &str) -> Account {
    accounts()
        .into_iter()
        .find(|a| a.user.id == id)
        .unwrap_or_else(|| panic!("no fixture account {}", id))
}

fn token_for(user_id: &str) -> String {
    format!("token-{}", user_id)
}

pub fn fee_statement(student_id: &str) -> FeeStatement {
    let due = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
    FeeStatement {
        student_id: student_id.to_string(),
        fees: vec![
            FeeItem {
                id: format!("{}-F1", student_id),
                kind: FeeKind::Tuition,
                title: "Tuition Fee".to_string(),
                amount_usd: 450.0,
                due_date: due(11, 15),
                status: FeeStatus::DueSoon,
                description: Some("Term 2 tuition".to_string()),
            },
            FeeItem {
                id: format!("{}-F2", student_id),
                kind: FeeKind::Library,
                title: "Library Fee".to_string(),
                amount_usd: 25.0,
                due_date: due(10, 20),
                status: FeeStatus::Overdue,
                description: None,
            },
        ],
        history: vec![FeeItem {
            id: format!("{}-H1", student_id),
            kind: FeeKind::Transport,
            title: "Transport Fee".to_string(),
            amount_usd: 80.0,
            due_date: due(9, 1),
            status: FeeStatus::Paid,
            description: None,
        }],
    }
}

pub fn exam_results(student_id: &str, exam: Option<&str>) -> ExamResults {
    let subject = |name: &str, score: f64, grade: &str, status| SubjectResult {
        subject: name.to_string(),
        teacher: "Staff".to_string(),
        score,
        max_score: 100.0,
        grade: grade.to_string(),
        status,
    };

    ExamResults {
        student_id: student_id.to_string(),
        exam: exam.unwrap_or("Mid-Term").to_string(),
        available_exams: vec!["Mid-Term".to_string(), "Unit Test 1".to_string()],
        results: vec![
            subject("Mathematics", 92.0, "A", ResultStatus::Pass),
            subject("Physics", 88.0, "B+", ResultStatus::Pass),
            subject("History", 45.0, "D", ResultStatus::Fail),
        ],
        gpa: Some(3.4),
    }
}

pub fn notifications() -> Vec<Notification> {
    let at = |h| Utc.with_ymd_and_hms(2024, 11, 1, h, 0, 0).unwrap();
    vec![
        Notification {
            id: "N1".to_string(),
            kind: NotificationKind::Grade,
            title: "New Grade Posted".to_string(),
            message: "Mathematics mid-term results are out".to_string(),
            created_at: at(10),
            is_read: false,
            child: None,
            action_label: Some("View Results".to_string()),
        },
        Notification {
            id: "N2".to_string(),
            kind: NotificationKind::Fee,
            title: "Fee Reminder".to_string(),
            message: "Tuition fee is due soon".to_string(),
            created_at: at(8),
            is_read: true,
            child: None,
            action_label: None,
        },
    ]
}

/// Shared state of one fake portal
#[derive(Debug, Default)]
pub struct PortalState {
    pub revoked: HashSet<String>,
    pub logins: usize,
    pub logouts: usize,
    pub marked_read: Vec<String>,
}

/// wiremock responder serving the whole portal API
#[derive(Clone)]
pub struct FakePortal {
    accounts: Vec<Account>,
    state: Arc<Mutex<PortalState>>,
}

fn reply<T: Serialize>(status: u16, body: Envelope<T>) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

fn fail(status: u16, message: &str) -> ResponseTemplate {
    reply::<()>(status, Envelope::failure(message))
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            accounts: accounts(),
            state: Arc::new(Mutex::new(PortalState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<PortalState>> {
        self.state.clone()
    }

    fn caller(&self, request: &Request) -> Option<&User> {
        let token = request
            .headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .to_string();

        if self.state.lock().unwrap().revoked.contains(&token) {
            return None;
        }

        self.accounts
            .iter()
            .map(|a| &a.user)
            .find(|u| token_for(&u.id) == token)
    }

    fn login(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return fail(400, "Malformed request"),
        };
        let identifier = body["identifier"].as_str().unwrap_or_default().trim().to_lowercase();
        let password = body["password"].as_str().unwrap_or_default();

        let account = self.accounts.iter().find(|a| {
            (a.user.email == identifier || a.user.id.to_lowercase() == identifier) && a.password == password
        });

        match account {
            Some(account) => {
                let token = token_for(&account.user.id);
                let mut state = self.state.lock().unwrap();
                state.logins += 1;
                state.revoked.remove(&token);
                reply(
                    200,
                    Envelope::ok(serde_json::json!({ "token": token, "user": account.user })),
                )
            }
            None => fail(401, "Invalid email/ID or password"),
        }
    }

    fn may_view(user: &User, student_id: &str) -> bool {
        match user.role {
            UserRole::Student => user.id == student_id,
            UserRole::Parent => user.children.iter().any(|c| c == student_id),
        }
    }

    fn query(request: &Request, key: &str) -> Option<String> {
        request
            .url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

impl Respond for FakePortal {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method = request.method.as_str().to_string();
        let path = request.url.path().trim_start_matches("/api").to_string();

        if method == "POST" && path == "/auth/login" {
            return self.login(request);
        }

        let user = match self.caller(request) {
            Some(user) => user.clone(),
            None => return fail(401, "Session expired"),
        };

        match (method.as_str(), path.as_str()) {
            ("GET", "/auth/verify") | ("GET", "/profile") => reply(200, Envelope::ok(user)),
            ("POST", "/auth/logout") => {
                let mut state = self.state.lock().unwrap();
                state.logouts += 1;
                state.revoked.insert(token_for(&user.id));
                reply::<()>(200, Envelope { success: true, message: Some("Logged out".to_string()), data: None })
            }
            ("GET", "/dashboard") => {
                let children: Vec<User> = self
                    .accounts
                    .iter()
                    .filter(|a| user.children.contains(&a.user.id))
                    .map(|a| a.user.clone())
                    .collect();
                let pending_fees = fee_statement(&user.id).fees;
                reply(
                    200,
                    Envelope::ok(Dashboard {
                        user,
                        children,
                        pending_fees,
                        notifications: notifications(),
                    }),
                )
            }
            ("GET", "/fees") => match Self::query(request, "childId") {
                Some(id) if Self::may_view(&user, &id) => reply(200, Envelope::ok(fee_statement(&id))),
                _ => fail(403, "Not allowed"),
            },
            ("GET", "/results") => match Self::query(request, "studentId") {
                Some(id) if Self::may_view(&user, &id) => {
                    let exam = Self::query(request, "exam");
                    reply(200, Envelope::ok(exam_results(&id, exam.as_deref())))
                }
                _ => fail(403, "Not allowed"),
            },
            ("GET", "/notifications") => reply(200, Envelope::ok(notifications())),
            ("POST", p) if p.starts_with("/notifications/") && p.ends_with("/read") => {
                let id = p.trim_start_matches("/notifications/").trim_end_matches("/read");
                self.state.lock().unwrap().marked_read.push(id.to_string());
                reply::<()>(200, Envelope { success: true, message: None, data: None })
            }
            _ => fail(404, "Not found"),
        }
    }
}

/// Start a fake portal; returns the server, the API base URL and its state
pub async fn start_portal() -> (MockServer, String, Arc<Mutex<PortalState>>) {
    let server = MockServer::start().await;
    let portal = FakePortal::new();
    let state = portal.state();

    Mock::given(any()).respond_with(portal).mount(&server).await;

    let base_url = format!("{}/api", server.uri());
    (server, base_url, state)
}
