//! Request/response shapes shared by the lending API and its web frontend.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Analyst,
    Borrower,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Analyst => "analyst",
            Self::Borrower => "borrower",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "analyst" => Some(Self::Analyst),
            "borrower" => Some(Self::Borrower),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: None,
        }
    }

    pub fn with_code(detail: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: Some(code.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanMetrics {
    pub total_active_loans: u32,
    pub total_loan_amount: f64,
    pub average_loan_size: f64,
    pub default_rate: f64,
    pub monthly_originations: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Paid,
    Default,
    Pending,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paid => "paid",
            Self::Default => "default",
            Self::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "paid" => Some(Self::Paid),
            "default" => Some(Self::Default),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub id: String,
    pub amount: f64,
    pub status: LoanStatus,
    pub origination_date: String,
    pub maturity_date: String,
    pub interest_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorrowerProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub loan_history: Vec<LoanSummary>,
}

impl BorrowerProfile {
    /// Most recently originated loan that is still active.
    pub fn current_loan(&self) -> Option<&LoanSummary> {
        self.loan_history
            .iter()
            .filter(|loan| loan.status == LoanStatus::Active)
            .max_by(|a, b| a.origination_date.cmp(&b.origination_date))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_amount: f64,
    pub max_amount: f64,
    pub interest_rate: f64,
    pub term_length: u32,
    pub is_active: bool,
    #[serde(default)]
    pub business_types: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl LoanProduct {
    pub fn to_draft(&self) -> LoanProductDraft {
        LoanProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            interest_rate: self.interest_rate,
            term_length: self.term_length,
            is_active: self.is_active,
            business_types: self.business_types.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProductDraft {
    pub name: String,
    pub description: String,
    pub min_amount: f64,
    pub max_amount: f64,
    pub interest_rate: f64,
    pub term_length: u32,
    pub is_active: bool,
    #[serde(default)]
    pub business_types: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusRequest {
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Disbursed,
}

impl ApplicationStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
        Self::Disbursed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Disbursed => "disbursed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Disbursed => "Disbursed",
        }
    }

    /// Approval or rejection stamps the decision date.
    pub fn is_decision(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Still waiting on staff.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::UnderReview)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl ApplicationPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// A borrower's request for financing, worked through the analyst queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: String,
    pub borrower_id: String,
    pub business_name: String,
    pub business_type: String,
    pub loan_amount: f64,
    pub loan_purpose: String,
    pub status: ApplicationStatus,
    pub priority: ApplicationPriority,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub analyst_notes: Option<String>,
    pub application_date: String,
    #[serde(default)]
    pub decision_date: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewApplicationRequest {
    pub business_name: String,
    pub business_type: String,
    pub loan_amount: f64,
    pub loan_purpose: String,
    #[serde(default)]
    pub priority: ApplicationPriority,
}

/// Staff decision on an application. Absent fields keep their stored value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStatusUpdate {
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ApplicationPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyst_notes: Option<String>,
}

/// Query string accepted by the application list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ApplicationPriority>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub organization: Option<String>,
}

/// A document picked in the browser. Local to the UI, never sent to the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size: String,
    pub progress: u8,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size: impl Into<String>, progress: u32) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            progress: progress.min(100) as u8,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress == 100
    }
}

pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{:.1} MB", value / MB)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("email '{0}' is not a valid address")]
    InvalidEmail(String),
    #[error("minimum amount {min} must be between 0 and maximum amount {max}")]
    AmountRange { min: f64, max: f64 },
    #[error("interest rate {0} must be between 0 and 100")]
    InterestRate(f64),
    #[error("term length must be at least one month")]
    TermLength,
    #[error("loan amount {0} must be greater than 0")]
    LoanAmount(f64),
    #[error("risk score {0} must be between 0 and 100")]
    RiskScore(f64),
    #[error("password must be at least 6 characters")]
    PasswordLength,
}

pub const MIN_PASSWORD_LEN: usize = 6;

fn require(value: &str, field: &'static str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::Missing { field });
    }
    Ok(())
}

pub fn validate_login(request: &LoginRequest) -> Result<(), ContractError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ContractError::Missing { field: "email" });
    }
    if !email.contains('@') {
        return Err(ContractError::InvalidEmail(email.to_string()));
    }
    if request.password.is_empty() {
        return Err(ContractError::Missing { field: "password" });
    }
    Ok(())
}

pub fn validate_product_draft(draft: &LoanProductDraft) -> Result<(), ContractError> {
    if draft.name.trim().is_empty() {
        return Err(ContractError::Missing { field: "name" });
    }
    if draft.description.trim().is_empty() {
        return Err(ContractError::Missing {
            field: "description",
        });
    }
    if draft.min_amount < 0.0 || draft.min_amount > draft.max_amount {
        return Err(ContractError::AmountRange {
            min: draft.min_amount,
            max: draft.max_amount,
        });
    }
    if !(0.0..=100.0).contains(&draft.interest_rate) {
        return Err(ContractError::InterestRate(draft.interest_rate));
    }
    if draft.term_length == 0 {
        return Err(ContractError::TermLength);
    }
    Ok(())
}

pub fn validate_application(request: &NewApplicationRequest) -> Result<(), ContractError> {
    require(&request.business_name, "business_name")?;
    require(&request.business_type, "business_type")?;
    require(&request.loan_purpose, "loan_purpose")?;
    if request.loan_amount.is_nan() || request.loan_amount <= 0.0 {
        return Err(ContractError::LoanAmount(request.loan_amount));
    }
    Ok(())
}

pub fn validate_status_update(update: &ApplicationStatusUpdate) -> Result<(), ContractError> {
    match update.risk_score {
        Some(score) if !(0.0..=100.0).contains(&score) => Err(ContractError::RiskScore(score)),
        _ => Ok(()),
    }
}

pub fn validate_register(request: &RegisterRequest) -> Result<(), ContractError> {
    validate_login(&LoginRequest {
        email: request.email.clone(),
        password: request.password.clone(),
    })?;
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ContractError::PasswordLength);
    }
    require(&request.name, "name")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> LoanProductDraft {
        LoanProductDraft {
            name: "Equipment Loan".into(),
            description: "Financing for equipment purchases".into(),
            min_amount: 5_000.0,
            max_amount: 50_000.0,
            interest_rate: 6.5,
            term_length: 36,
            is_active: true,
            business_types: vec!["retail".into()],
        }
    }

    #[test]
    fn validates_product_draft() {
        assert!(validate_product_draft(&draft()).is_ok());
    }

    #[test]
    fn rejects_inverted_amount_range() {
        let mut d = draft();
        d.min_amount = 60_000.0;
        assert_eq!(
            validate_product_draft(&d),
            Err(ContractError::AmountRange {
                min: 60_000.0,
                max: 50_000.0
            })
        );
    }

    #[test]
    fn rejects_blank_name_and_zero_term() {
        let mut d = draft();
        d.name = "  ".into();
        assert_eq!(
            validate_product_draft(&d),
            Err(ContractError::Missing { field: "name" })
        );

        let mut d = draft();
        d.term_length = 0;
        assert_eq!(validate_product_draft(&d), Err(ContractError::TermLength));
    }

    #[test]
    fn login_requires_address_and_password() {
        let ok = LoginRequest {
            email: "sarah@withcaelo.ai".into(),
            password: "demo123".into(),
        };
        assert!(validate_login(&ok).is_ok());

        let bad = LoginRequest {
            email: "sarah".into(),
            password: "demo123".into(),
        };
        assert!(matches!(
            validate_login(&bad),
            Err(ContractError::InvalidEmail(_))
        ));
    }

    #[test]
    fn product_uses_camel_case_on_the_wire() {
        let value = serde_json::to_value(ToggleStatusRequest { is_active: false }).expect("json");
        assert_eq!(value, serde_json::json!({ "isActive": false }));

        let product: LoanProduct = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Working Capital",
            "description": "Short term",
            "minAmount": 1000.0,
            "maxAmount": 20000.0,
            "interestRate": 8.0,
            "termLength": 12,
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .expect("product");
        assert!(product.business_types.is_empty());
        assert_eq!(product.updated_at, None);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed: Result<UserRole, _> = serde_json::from_str("\"superuser\"");
        assert!(parsed.is_err());
        assert_eq!(
            serde_json::from_str::<LoanStatus>("\"default\"").expect("status"),
            LoanStatus::Default
        );
    }

    #[test]
    fn uploaded_file_progress_is_clamped() {
        let file = UploadedFile::new("statement.pdf", human_size(2_621_440), 140);
        assert_eq!(file.progress, 100);
        assert!(file.is_complete());
        assert_eq!(file.size, "2.5 MB");
        assert!(!UploadedFile::new("a.png", "1 B", 99).is_complete());
    }

    #[test]
    fn application_status_uses_snake_case() {
        let value = serde_json::to_value(ApplicationStatus::UnderReview).expect("json");
        assert_eq!(value, serde_json::json!("under_review"));
        assert_eq!(
            ApplicationStatus::parse("disbursed"),
            Some(ApplicationStatus::Disbursed)
        );
        assert_eq!(ApplicationStatus::parse("Approved"), None);
        assert!(ApplicationStatus::Rejected.is_decision());
        assert!(!ApplicationStatus::Disbursed.is_open());
    }

    #[test]
    fn new_application_defaults_to_medium_priority() {
        let request: NewApplicationRequest = serde_json::from_value(serde_json::json!({
            "business_name": "Sunrise Bakery",
            "business_type": "food_service",
            "loan_amount": 30000.0,
            "loan_purpose": "Second oven"
        }))
        .expect("request");
        assert_eq!(request.priority, ApplicationPriority::Medium);
        assert!(validate_application(&request).is_ok());
    }

    #[test]
    fn application_needs_positive_amount_and_purpose() {
        let mut request = NewApplicationRequest {
            business_name: "Sunrise Bakery".into(),
            business_type: "food_service".into(),
            loan_amount: 0.0,
            loan_purpose: "Second oven".into(),
            priority: ApplicationPriority::High,
        };
        assert_eq!(
            validate_application(&request),
            Err(ContractError::LoanAmount(0.0))
        );
        request.loan_amount = 5000.0;
        request.loan_purpose = " ".into();
        assert_eq!(
            validate_application(&request),
            Err(ContractError::Missing {
                field: "loan_purpose"
            })
        );
    }

    #[test]
    fn risk_score_is_bounded() {
        let mut update = ApplicationStatusUpdate {
            status: ApplicationStatus::Approved,
            priority: None,
            risk_score: Some(101.0),
            analyst_notes: None,
        };
        assert_eq!(
            validate_status_update(&update),
            Err(ContractError::RiskScore(101.0))
        );
        update.risk_score = None;
        assert!(validate_status_update(&update).is_ok());
    }

    #[test]
    fn register_requires_six_character_password() {
        let mut request = RegisterRequest {
            email: "new@shop.example".into(),
            password: "abc".into(),
            name: "Dana Lee".into(),
            role: UserRole::Borrower,
            organization: None,
        };
        assert_eq!(
            validate_register(&request),
            Err(ContractError::PasswordLength)
        );
        request.password = "abcdef".into();
        assert!(validate_register(&request).is_ok());
        request.name = String::new();
        assert_eq!(
            validate_register(&request),
            Err(ContractError::Missing { field: "name" })
        );
    }

    #[test]
    fn human_size_picks_unit() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
    }

    #[test]
    fn current_loan_prefers_latest_active() {
        let loan = |id: &str, status, date: &str| LoanSummary {
            id: id.into(),
            amount: 1000.0,
            status,
            origination_date: date.into(),
            maturity_date: "2030-01-01".into(),
            interest_rate: 5.0,
        };
        let profile = BorrowerProfile {
            id: "b1".into(),
            name: "Jessica Williams".into(),
            business_name: None,
            email: "jessica@smallbiz.com".into(),
            phone: None,
            address: None,
            loan_history: vec![
                loan("l1", LoanStatus::Active, "2022-03-01"),
                loan("l2", LoanStatus::Paid, "2023-01-01"),
                loan("l3", LoanStatus::Active, "2023-06-01"),
            ],
        };
        assert_eq!(profile.current_loan().map(|l| l.id.as_str()), Some("l3"));
    }
}
