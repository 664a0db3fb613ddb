//! Portal data types
//!
//! Wire types shared by the API client, the session manager and the
//! application core. Field names follow the portal's camelCase JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Users
// =============================================================================

/// Role a user signs in as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A student viewing their own records
    Student,
    /// A parent viewing one or more children's records
    Parent,
}

impl UserRole {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Parent => "parent",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "parent" => Ok(UserRole::Parent),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Profile of the signed-in user
///
/// Student-only attributes (`class`, `roll_no`, `attendance`, `gpa`) and the
/// parent-only `children` list are optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Portal identifier (e.g. "STU001")
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Role of the account
    pub role: UserRole,
    /// Class/section, students only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Roll number, students only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Identifiers of linked children, parents only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Attendance percentage, students only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<f64>,
    /// Grade point average, students only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
}

impl User {
    /// Whether this is a student account
    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }

    /// Whether this is a parent account
    pub fn is_parent(&self) -> bool {
        self.role == UserRole::Parent
    }

    /// First word of the display name, used in greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

// =============================================================================
// Device registration
// =============================================================================

/// Platform the client runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS
    Ios,
    /// Android
    Android,
    /// Desktop builds
    #[default]
    Desktop,
    /// Web builds
    Web,
}

impl Platform {
    /// Platform of the current build target
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Desktop
        }
    }
}

/// Push-notification registration sent along with a login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    /// Stable identifier of this installation
    pub device_id: String,
    /// Push token issued by the platform, if notifications were granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    /// Client platform
    pub platform: Platform,
}

// =============================================================================
// Fees
// =============================================================================

/// Category of a fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    /// Tuition
    Tuition,
    /// School bus
    Transport,
    /// Library fines and fees
    Library,
    /// Examination fees
    Exam,
    /// Sports activities
    Sports,
    /// Laboratory fees
    Lab,
}

/// Payment status of a fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    /// Past its due date
    Overdue,
    /// Due within the next few days
    DueSoon,
    /// Due later
    Upcoming,
    /// Settled
    Paid,
}

impl FeeStatus {
    /// Label shown next to a fee
    pub fn label(&self) -> &'static str {
        match self {
            FeeStatus::Overdue => "Overdue",
            FeeStatus::DueSoon => "Due Soon",
            FeeStatus::Upcoming => "Upcoming",
            FeeStatus::Paid => "Paid",
        }
    }
}

/// A single fee, amounts always in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeItem {
    /// Fee identifier
    pub id: String,
    /// Category
    pub kind: FeeKind,
    /// Short title
    pub title: String,
    /// Amount in USD
    pub amount_usd: f64,
    /// Due date
    pub due_date: NaiveDate,
    /// Payment status
    pub status: FeeStatus,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fees for one child
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatement {
    /// Student the statement belongs to
    pub student_id: String,
    /// Fees not yet paid (may also contain paid items; callers filter)
    #[serde(default)]
    pub fees: Vec<FeeItem>,
    /// Past payments
    #[serde(default)]
    pub history: Vec<FeeItem>,
}

// =============================================================================
// Results
// =============================================================================

/// Pass/fail outcome of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Passed
    Pass,
    /// Failed
    Fail,
}

/// Result of one subject in an exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    /// Subject name
    pub subject: String,
    /// Teacher name
    pub teacher: String,
    /// Score obtained
    pub score: f64,
    /// Maximum score
    pub max_score: f64,
    /// Letter grade (e.g. "A-", "B+")
    pub grade: String,
    /// Pass/fail
    pub status: ResultStatus,
}

/// Results of a student for one exam
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResults {
    /// Student the results belong to
    pub student_id: String,
    /// Exam these results are for
    pub exam: String,
    /// All exams available for selection
    #[serde(default)]
    pub available_exams: Vec<String>,
    /// Per-subject results
    #[serde(default)]
    pub results: Vec<SubjectResult>,
    /// Overall grade point average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A grade was posted
    Grade,
    /// Attendance update
    Attendance,
    /// Fee due or payment received
    Fee,
    /// School event
    Event,
    /// General announcement
    Announcement,
    /// Report card available
    Report,
    /// Anything the client does not know about
    #[serde(other)]
    Other,
}

/// A notification shown in the inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification identifier
    pub id: String,
    /// Category
    pub kind: NotificationKind,
    /// Title
    pub title: String,
    /// Body text
    pub message: String,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
    /// Whether the user has read it
    #[serde(default)]
    pub is_read: bool,
    /// Child the notification concerns, parents only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,
    /// Label of the call-to-action button
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Home screen summary for the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Signed-in user
    pub user: User,
    /// Linked children, parents only
    #[serde(default)]
    pub children: Vec<User>,
    /// Fees awaiting payment
    #[serde(default)]
    pub pending_fees: Vec<FeeItem>,
    /// Most recent notifications
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_str() {
        assert_eq!("student".parse::<UserRole>().unwrap(), UserRole::Student);
        assert_eq!("PARENT".parse::<UserRole>().unwrap(), UserRole::Parent);
        assert!("teacher".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Parent.to_string(), "parent");
    }

    #[test]
    fn test_user_deserializes_student_profile() {
        let json = r#"{
            "id": "STU001",
            "email": "alex@school.com",
            "name": "Alex Johnson",
            "role": "student",
            "class": "10-B",
            "rollNo": "15",
            "attendance": 85,
            "gpa": 3.8
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_student());
        assert_eq!(user.roll_no.as_deref(), Some("15"));
        assert_eq!(user.gpa, Some(3.8));
        assert!(user.children.is_empty());
        assert_eq!(user.first_name(), "Alex");
    }

    #[test]
    fn test_user_serialization_omits_empty_fields() {
        let user = User {
            id: "PAR002".to_string(),
            email: "mary@school.com".to_string(),
            name: "Mary Williams".to_string(),
            role: UserRole::Parent,
            class: None,
            roll_no: None,
            phone: None,
            children: vec!["STU002".to_string()],
            avatar: None,
            attendance: None,
            gpa: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "parent");
        assert_eq!(json["children"][0], "STU002");
        assert!(json.get("gpa").is_none());
        assert!(json.get("rollNo").is_none());
    }

    #[test]
    fn test_fee_status_wire_names() {
        let status: FeeStatus = serde_json::from_str("\"due_soon\"").unwrap();
        assert_eq!(status, FeeStatus::DueSoon);
        assert_eq!(status.label(), "Due Soon");
    }

    #[test]
    fn test_unknown_notification_kind_is_tolerated() {
        let kind: NotificationKind = serde_json::from_str("\"survey\"").unwrap();
        assert_eq!(kind, NotificationKind::Other);
    }

    #[test]
    fn test_device_registration_serialization() {
        let registration = DeviceRegistration {
            device_id: "device-1".to_string(),
            push_token: None,
            platform: Platform::Android,
        };

        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["deviceId"], "device-1");
        assert_eq!(json["platform"], "android");
        assert!(json.get("pushToken").is_none());
    }
}
