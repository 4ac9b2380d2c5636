use chrono::{DateTime, Utc};
use lending_contracts::{
    ApplicationPriority, ApplicationStatus, ApplicationStatusUpdate, BorrowerProfile,
    LoanApplication, LoanProduct, LoanProductDraft, LoanStatus, LoanSummary,
    NewApplicationRequest, User, UserRole,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to prepare database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// A user row together with its stored password hash.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: String,
    pub organization: Option<String>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NewBorrower {
    pub user_id: Option<String>,
    pub name: String,
    pub business_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewLoan {
    pub borrower_id: String,
    pub amount: f64,
    pub status: LoanStatus,
    pub origination_date: String,
    pub maturity_date: String,
    pub interest_rate: f64,
}

#[derive(Clone, Debug)]
pub struct NewApplication {
    pub borrower_id: String,
    pub request: NewApplicationRequest,
    pub status: ApplicationStatus,
    pub risk_score: Option<f64>,
    pub application_date: String,
    pub decision_date: Option<String>,
}

impl NewApplication {
    /// A fresh submission: pending, unscored, dated now.
    pub fn submitted(borrower_id: impl Into<String>, request: NewApplicationRequest) -> Self {
        Self {
            borrower_id: borrower_id.into(),
            request,
            status: ApplicationStatus::Pending,
            risk_score: None,
            application_date: now_string(),
            decision_date: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub priority: Option<ApplicationPriority>,
    pub borrower_id: Option<String>,
}

/// SQLite-backed persistence for users, sessions, loan products, loans and
/// loan applications.
///
/// Every operation opens its own connection, so the handle is cheap to clone
/// and safe to move onto blocking worker threads.
#[derive(Clone, Debug)]
pub struct Store {
    db_path: Arc<PathBuf>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                name TEXT NOT NULL,
                organization TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS loan_products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                min_amount REAL NOT NULL,
                max_amount REAL NOT NULL,
                interest_rate REAL NOT NULL,
                term_length INTEGER NOT NULL,
                is_active INTEGER NOT NULL,
                business_types TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            CREATE TABLE IF NOT EXISTS borrowers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                name TEXT NOT NULL,
                business_name TEXT,
                email TEXT NOT NULL,
                phone TEXT,
                address TEXT
            );
            CREATE TABLE IF NOT EXISTS loans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                borrower_id INTEGER NOT NULL REFERENCES borrowers(id) ON DELETE CASCADE,
                amount REAL NOT NULL,
                status TEXT NOT NULL,
                origination_date TEXT NOT NULL,
                maturity_date TEXT NOT NULL,
                interest_rate REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS loan_applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                borrower_id INTEGER NOT NULL REFERENCES borrowers(id) ON DELETE CASCADE,
                business_name TEXT NOT NULL,
                business_type TEXT NOT NULL,
                loan_amount REAL NOT NULL,
                loan_purpose TEXT NOT NULL,
                status TEXT NOT NULL,
                priority TEXT NOT NULL,
                risk_score REAL,
                analyst_notes TEXT,
                application_date TEXT NOT NULL,
                decision_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_loans_borrower ON loans(borrower_id);
            CREATE INDEX IF NOT EXISTS idx_applications_status ON loan_applications(status);
            CREATE INDEX IF NOT EXISTS idx_applications_borrower ON loan_applications(borrower_id);
            ",
        )?;

        tracing::debug!(path = %db_path.display(), "opened lending store");
        Ok(Self {
            db_path: Arc::new(db_path),
        })
    }

    fn conn(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&*self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(conn)
    }

    /// Runs `work` in one immediate transaction. Any error it returns rolls
    /// back everything it wrote.
    pub(crate) fn transaction<T>(
        &self,
        work: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = work(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn user_count(&self) -> Result<i64, StoreError> {
        user_count(&self.conn()?)
    }

    pub fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        insert_user(&self.conn()?, user)
    }

    /// Creates the account and, for borrowers, the borrower record linked to
    /// it, so a new borrower can load their profile right away.
    pub fn register_user(&self, user: &NewUser) -> Result<User, StoreError> {
        self.transaction(|conn| {
            let created = insert_user(conn, user)?;
            if created.role == UserRole::Borrower {
                insert_borrower(
                    conn,
                    &NewBorrower {
                        user_id: Some(created.id.clone()),
                        name: created.name.clone(),
                        business_name: created.organization.clone(),
                        email: created.email.clone(),
                        ..NewBorrower::default()
                    },
                )?;
            }
            Ok(created)
        })
    }

    pub fn credentials_by_email(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("{USER_COLUMNS} WHERE email = ?1"),
                params![email],
                |row| {
                    Ok(Credentials {
                        user: map_user(row)?,
                        password_hash: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("{USER_COLUMNS} WHERE id = ?1"),
                params![id],
                map_user,
            )
            .optional()?)
    }

    pub fn insert_session(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, expires_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Resolves a session token to its user, ignoring sessions that expired
    /// before `now`.
    pub fn session_user(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                params![token],
                |row| Ok((row.get::<_, i64>(0)?.to_string(), row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };
        let expired = DateTime::parse_from_rfc3339(&expires_at)
            .map(|at| at.with_timezone(&Utc) <= now)
            .unwrap_or(true);
        if expired {
            conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            return Ok(None);
        }
        drop(conn);
        self.user_by_id(&user_id)
    }

    pub fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(removed > 0)
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT token, expires_at FROM sessions")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut stale = Vec::new();
        for row in rows {
            let (token, expires_at) = row?;
            let expired = DateTime::parse_from_rfc3339(&expires_at)
                .map(|at| at.with_timezone(&Utc) <= now)
                .unwrap_or(true);
            if expired {
                stale.push(token);
            }
        }
        drop(stmt);

        for token in &stale {
            conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        }
        Ok(stale.len())
    }

    pub fn list_products(&self) -> Result<Vec<LoanProduct>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{PRODUCT_COLUMNS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], map_product)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn product(&self, id: &str) -> Result<Option<LoanProduct>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("{PRODUCT_COLUMNS} WHERE id = ?1"),
                params![id],
                map_product,
            )
            .optional()?)
    }

    pub fn insert_product(&self, draft: &LoanProductDraft) -> Result<LoanProduct, StoreError> {
        insert_product(&self.conn()?, draft)
    }

    pub fn update_product(
        &self,
        id: &str,
        draft: &LoanProductDraft,
    ) -> Result<Option<LoanProduct>, StoreError> {
        let conn = self.conn()?;
        let business_types = serde_json::to_string(&draft.business_types)?;
        let changed = conn.execute(
            "UPDATE loan_products
             SET name = ?1, description = ?2, min_amount = ?3, max_amount = ?4,
                 interest_rate = ?5, term_length = ?6, is_active = ?7,
                 business_types = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                draft.name.trim(),
                draft.description.trim(),
                draft.min_amount,
                draft.max_amount,
                draft.interest_rate,
                draft.term_length,
                draft.is_active,
                business_types,
                now_string(),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        drop(conn);
        self.product(id)
    }

    pub fn set_product_active(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<Option<LoanProduct>, StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE loan_products SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active, now_string(), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        drop(conn);
        self.product(id)
    }

    pub fn delete_product(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM loan_products WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    pub fn insert_borrower(&self, borrower: &NewBorrower) -> Result<String, StoreError> {
        insert_borrower(&self.conn()?, borrower)
    }

    pub fn insert_loan(&self, loan: &NewLoan) -> Result<LoanSummary, StoreError> {
        insert_loan(&self.conn()?, loan)
    }

    pub fn borrower_id_for_user(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id FROM borrowers WHERE user_id = ?1 ORDER BY id ASC LIMIT 1",
                params![user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|id| id.to_string()))
    }

    pub fn borrower_owner(&self, borrower_id: &str) -> Result<Option<Option<String>>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT user_id FROM borrowers WHERE id = ?1",
                params![borrower_id],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .map(|owner| owner.map(|id| id.to_string())))
    }

    pub fn borrower_profile(
        &self,
        borrower_id: &str,
    ) -> Result<Option<BorrowerProfile>, StoreError> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                "SELECT id, name, business_name, email, phone, address
                 FROM borrowers WHERE id = ?1",
                params![borrower_id],
                |row| {
                    Ok(BorrowerProfile {
                        id: row.get::<_, i64>(0)?.to_string(),
                        name: row.get(1)?,
                        business_name: row.get(2)?,
                        email: row.get(3)?,
                        phone: row.get(4)?,
                        address: row.get(5)?,
                        loan_history: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut profile) = profile else {
            return Ok(None);
        };
        drop(conn);
        profile.loan_history = self.loans_for_borrower(borrower_id)?;
        Ok(Some(profile))
    }

    pub fn loans_for_borrower(&self, borrower_id: &str) -> Result<Vec<LoanSummary>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{LOAN_COLUMNS} WHERE borrower_id = ?1 ORDER BY origination_date DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![borrower_id], map_loan)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn all_loans(&self) -> Result<Vec<LoanSummary>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{LOAN_COLUMNS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], map_loan)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<LoanApplication, StoreError> {
        insert_application(&self.conn()?, application)
    }

    pub fn application(&self, id: &str) -> Result<Option<LoanApplication>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("{APPLICATION_COLUMNS} WHERE id = ?1"),
                params![id],
                map_application,
            )
            .optional()?)
    }

    /// Newest first. Every filter field that is set must match.
    pub fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<LoanApplication>, StoreError> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(status) = filter.status {
            values.push(status.as_str().to_string());
            clauses.push(format!("status = ?{}", values.len()));
        }
        if let Some(priority) = filter.priority {
            values.push(priority.as_str().to_string());
            clauses.push(format!("priority = ?{}", values.len()));
        }
        if let Some(borrower_id) = &filter.borrower_id {
            values.push(borrower_id.clone());
            clauses.push(format!("borrower_id = ?{}", values.len()));
        }

        let mut sql = APPLICATION_COLUMNS.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY application_date DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), map_application)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Applies a staff decision. Approving or rejecting stamps `decision_date`.
    pub fn update_application_status(
        &self,
        id: &str,
        update: &ApplicationStatusUpdate,
    ) -> Result<Option<LoanApplication>, StoreError> {
        let conn = self.conn()?;
        let now = now_string();
        let decided_at = update.status.is_decision().then(|| now.clone());
        let changed = conn.execute(
            "UPDATE loan_applications
             SET status = ?1,
                 priority = COALESCE(?2, priority),
                 risk_score = COALESCE(?3, risk_score),
                 analyst_notes = COALESCE(?4, analyst_notes),
                 decision_date = COALESCE(?5, decision_date),
                 updated_at = ?6
             WHERE id = ?7",
            params![
                update.status.as_str(),
                update.priority.map(ApplicationPriority::as_str),
                update.risk_score,
                update.analyst_notes,
                decided_at,
                now,
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        drop(conn);
        self.application(id)
    }
}

pub(crate) fn user_count(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

pub(crate) fn insert_user(conn: &Connection, user: &NewUser) -> Result<User, StoreError> {
    conn.execute(
        "INSERT INTO users (email, password_hash, role, name, organization, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.email,
            user.password_hash,
            user.role.as_str(),
            user.name,
            user.organization,
            user.is_active,
            now_string(),
        ],
    )
    .map_err(|err| match err {
        rusqlite::Error::SqliteFailure(failure, _) if is_unique_violation(&failure) => {
            StoreError::DuplicateEmail(user.email.clone())
        }
        other => StoreError::from(other),
    })?;
    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("{USER_COLUMNS} WHERE id = ?1"),
        params![id],
        map_user,
    )
    .map_err(StoreError::from)
}

fn is_unique_violation(failure: &rusqlite::ffi::Error) -> bool {
    failure.code == rusqlite::ErrorCode::ConstraintViolation
        && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
}

pub(crate) fn insert_product(
    conn: &Connection,
    draft: &LoanProductDraft,
) -> Result<LoanProduct, StoreError> {
    let business_types = serde_json::to_string(&draft.business_types)?;
    conn.execute(
        "INSERT INTO loan_products
            (name, description, min_amount, max_amount, interest_rate, term_length,
             is_active, business_types, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            draft.name.trim(),
            draft.description.trim(),
            draft.min_amount,
            draft.max_amount,
            draft.interest_rate,
            draft.term_length,
            draft.is_active,
            business_types,
            now_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("{PRODUCT_COLUMNS} WHERE id = ?1"),
        params![id],
        map_product,
    )
    .map_err(StoreError::from)
}

pub(crate) fn insert_borrower(
    conn: &Connection,
    borrower: &NewBorrower,
) -> Result<String, StoreError> {
    conn.execute(
        "INSERT INTO borrowers (user_id, name, business_name, email, phone, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            borrower.user_id,
            borrower.name,
            borrower.business_name,
            borrower.email,
            borrower.phone,
            borrower.address,
        ],
    )?;
    Ok(conn.last_insert_rowid().to_string())
}

pub(crate) fn insert_loan(conn: &Connection, loan: &NewLoan) -> Result<LoanSummary, StoreError> {
    conn.execute(
        "INSERT INTO loans
            (borrower_id, amount, status, origination_date, maturity_date, interest_rate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            loan.borrower_id,
            loan.amount,
            loan.status.as_str(),
            loan.origination_date,
            loan.maturity_date,
            loan.interest_rate,
        ],
    )?;
    Ok(LoanSummary {
        id: conn.last_insert_rowid().to_string(),
        amount: loan.amount,
        status: loan.status,
        origination_date: loan.origination_date.clone(),
        maturity_date: loan.maturity_date.clone(),
        interest_rate: loan.interest_rate,
    })
}

pub(crate) fn insert_application(
    conn: &Connection,
    application: &NewApplication,
) -> Result<LoanApplication, StoreError> {
    let request = &application.request;
    conn.execute(
        "INSERT INTO loan_applications
            (borrower_id, business_name, business_type, loan_amount, loan_purpose, status,
             priority, risk_score, application_date, decision_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            application.borrower_id,
            request.business_name.trim(),
            request.business_type.trim(),
            request.loan_amount,
            request.loan_purpose.trim(),
            application.status.as_str(),
            request.priority.as_str(),
            application.risk_score,
            application.application_date,
            application.decision_date,
            now_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("{APPLICATION_COLUMNS} WHERE id = ?1"),
        params![id],
        map_application,
    )
    .map_err(StoreError::from)
}

const USER_COLUMNS: &str = concat!(
    "SELECT id, email, role, name, organization, is_active, created_at, updated_at, ",
    "password_hash FROM users"
);
const PRODUCT_COLUMNS: &str = concat!(
    "SELECT id, name, description, min_amount, max_amount, interest_rate, term_length, ",
    "is_active, business_types, created_at, updated_at FROM loan_products"
);
const LOAN_COLUMNS: &str = concat!(
    "SELECT id, amount, status, origination_date, maturity_date, interest_rate ",
    "FROM loans"
);
const APPLICATION_COLUMNS: &str = concat!(
    "SELECT id, borrower_id, business_name, business_type, loan_amount, loan_purpose, ",
    "status, priority, risk_score, analyst_notes, application_date, decision_date, ",
    "created_at, updated_at FROM loan_applications"
);

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(2)?;
    let role = UserRole::parse(&role).ok_or_else(|| unknown_variant(2, "role", role))?;
    Ok(User {
        id: row.get::<_, i64>(0)?.to_string(),
        email: row.get(1)?,
        role,
        name: row.get(3)?,
        organization: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanProduct> {
    let business_types: String = row.get(8)?;
    let business_types = serde_json::from_str(&business_types).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(err))
    })?;
    Ok(LoanProduct {
        id: row.get::<_, i64>(0)?.to_string(),
        name: row.get(1)?,
        description: row.get(2)?,
        min_amount: row.get(3)?,
        max_amount: row.get(4)?,
        interest_rate: row.get(5)?,
        term_length: row.get(6)?,
        is_active: row.get(7)?,
        business_types,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn map_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanSummary> {
    let status: String = row.get(2)?;
    let status =
        LoanStatus::parse(&status).ok_or_else(|| unknown_variant(2, "loan status", status))?;
    Ok(LoanSummary {
        id: row.get::<_, i64>(0)?.to_string(),
        amount: row.get(1)?,
        status,
        origination_date: row.get(3)?,
        maturity_date: row.get(4)?,
        interest_rate: row.get(5)?,
    })
}

fn map_application(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanApplication> {
    let status: String = row.get(6)?;
    let status = ApplicationStatus::parse(&status)
        .ok_or_else(|| unknown_variant(6, "application status", status))?;
    let priority: String = row.get(7)?;
    let priority = ApplicationPriority::parse(&priority)
        .ok_or_else(|| unknown_variant(7, "application priority", priority))?;
    Ok(LoanApplication {
        id: row.get::<_, i64>(0)?.to_string(),
        borrower_id: row.get::<_, i64>(1)?.to_string(),
        business_name: row.get(2)?,
        business_type: row.get(3)?,
        loan_amount: row.get(4)?,
        loan_purpose: row.get(5)?,
        status,
        priority,
        risk_score: row.get(8)?,
        analyst_notes: row.get(9)?,
        application_date: row.get(10)?,
        decision_date: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn unknown_variant(column: usize, kind: &'static str, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(UnknownVariant { kind, value }),
    )
}

fn now_string() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("lending.db")).expect("open");
        (dir, store)
    }

    fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            role,
            name: "Test User".into(),
            organization: None,
            is_active: true,
        }
    }

    fn draft(name: &str) -> LoanProductDraft {
        LoanProductDraft {
            name: name.into(),
            description: "desc".into(),
            min_amount: 1_000.0,
            max_amount: 10_000.0,
            interest_rate: 7.0,
            term_length: 24,
            is_active: true,
            business_types: vec!["retail".into(), "food".into()],
        }
    }

    #[test]
    fn insert_and_lookup_user() {
        let (_dir, store) = open_temp();
        let user = store
            .insert_user(&new_user("mike@cdfi.example.org", UserRole::Analyst))
            .expect("insert");
        assert_eq!(user.role, UserRole::Analyst);

        let creds = store
            .credentials_by_email("mike@cdfi.example.org")
            .expect("lookup")
            .expect("present");
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash");
        assert_eq!(store.user_count().expect("count"), 1);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_dir, store) = open_temp();
        store
            .insert_user(&new_user("a@b.c", UserRole::Admin))
            .expect("first");
        let err = store
            .insert_user(&new_user("a@b.c", UserRole::Admin))
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[test]
    fn expired_sessions_do_not_resolve() {
        let (_dir, store) = open_temp();
        let user = store
            .insert_user(&new_user("a@b.c", UserRole::Borrower))
            .expect("insert");
        let now = Utc::now();
        store
            .insert_session("live", &user.id, now + chrono::Duration::minutes(5))
            .expect("live");
        store
            .insert_session("stale", &user.id, now - chrono::Duration::minutes(5))
            .expect("stale");

        assert!(store.session_user("live", now).expect("live").is_some());
        assert!(store.session_user("stale", now).expect("stale").is_none());
        assert!(store.delete_session("live").expect("delete"));
        assert!(store.session_user("live", now).expect("gone").is_none());
    }

    #[test]
    fn product_lifecycle() {
        let (_dir, store) = open_temp();
        let created = store.insert_product(&draft("Equipment")).expect("insert");
        assert_eq!(created.business_types.len(), 2);
        assert!(created.updated_at.is_none());

        let toggled = store
            .set_product_active(&created.id, false)
            .expect("toggle")
            .expect("exists");
        assert!(!toggled.is_active);
        assert!(toggled.updated_at.is_some());

        let updated = store
            .update_product(&created.id, &draft("Equipment Plus"))
            .expect("update")
            .expect("exists");
        assert_eq!(updated.name, "Equipment Plus");

        assert!(store.update_product("999", &draft("x")).expect("update").is_none());
        assert!(store.delete_product(&created.id).expect("delete"));
        assert!(store.list_products().expect("list").is_empty());
    }

    #[test]
    fn borrower_profile_includes_loan_history() {
        let (_dir, store) = open_temp();
        let borrower_id = store
            .insert_borrower(&NewBorrower {
                name: "Jessica Williams".into(),
                email: "jessica@smallbiz.com".into(),
                business_name: Some("Sunrise Bakery".into()),
                ..NewBorrower::default()
            })
            .expect("borrower");
        let history = [
            (LoanStatus::Paid, "2021-01-10"),
            (LoanStatus::Active, "2023-04-02"),
        ];
        for (status, date) in history {
            store
                .insert_loan(&NewLoan {
                    borrower_id: borrower_id.clone(),
                    amount: 25_000.0,
                    status,
                    origination_date: date.into(),
                    maturity_date: "2026-04-02".into(),
                    interest_rate: 4.5,
                })
                .expect("loan");
        }

        let profile = store
            .borrower_profile(&borrower_id)
            .expect("profile")
            .expect("exists");
        assert_eq!(profile.loan_history.len(), 2);
        assert_eq!(profile.loan_history[0].status, LoanStatus::Active);
        assert!(store.borrower_profile("404").expect("missing").is_none());
        assert_eq!(store.borrower_owner(&borrower_id).expect("owner"), Some(None));
    }

    #[test]
    fn duplicate_email_from_a_second_writer_maps_to_duplicate() {
        let (_dir, store) = open_temp();
        let other = store.clone();
        other
            .insert_user(&new_user("a@b.c", UserRole::Borrower))
            .expect("first writer");
        match store.insert_user(&new_user("a@b.c", UserRole::Analyst)) {
            Err(StoreError::DuplicateEmail(email)) => assert_eq!(email, "a@b.c"),
            other => panic!("expected duplicate email, got {other:?}"),
        }
        assert_eq!(store.user_count().expect("count"), 1);
    }

    #[test]
    fn failed_transaction_leaves_nothing_behind() {
        let (_dir, store) = open_temp();
        let result = store.transaction(|conn| {
            insert_user(conn, &new_user("a@b.c", UserRole::Admin))?;
            insert_product(conn, &draft("Equipment"))?;
            insert_user(conn, &new_user("a@b.c", UserRole::Admin))
        });
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.user_count().expect("count"), 0);
        assert!(store.list_products().expect("list").is_empty());
    }

    #[test]
    fn registering_a_borrower_links_a_profile() {
        let (_dir, store) = open_temp();
        let mut borrower = new_user("dana@shop.example", UserRole::Borrower);
        borrower.organization = Some("Dana's Deli".into());
        let user = store.register_user(&borrower).expect("register");

        let borrower_id = store
            .borrower_id_for_user(&user.id)
            .expect("link")
            .expect("linked");
        let profile = store
            .borrower_profile(&borrower_id)
            .expect("profile")
            .expect("exists");
        assert_eq!(profile.business_name.as_deref(), Some("Dana's Deli"));

        let analyst = store
            .register_user(&new_user("ana@cdfi.example.org", UserRole::Analyst))
            .expect("register");
        assert!(store
            .borrower_id_for_user(&analyst.id)
            .expect("link")
            .is_none());
    }

    fn application_request(amount: f64) -> NewApplicationRequest {
        NewApplicationRequest {
            business_name: "Sunrise Bakery".into(),
            business_type: "food_service".into(),
            loan_amount: amount,
            loan_purpose: "Second oven".into(),
            priority: ApplicationPriority::High,
        }
    }

    #[test]
    fn applications_filter_and_record_decisions() {
        let (_dir, store) = open_temp();
        let borrower_id = store
            .insert_borrower(&NewBorrower {
                name: "Jessica Williams".into(),
                email: "jessica@smallbiz.com".into(),
                ..NewBorrower::default()
            })
            .expect("borrower");
        let mut older = NewApplication::submitted(&borrower_id, application_request(10_000.0));
        older.application_date = "2024-01-05T09:00:00+00:00".into();
        let older = store.insert_application(&older).expect("older");
        let newer = store
            .insert_application(&NewApplication::submitted(
                &borrower_id,
                application_request(30_000.0),
            ))
            .expect("newer");
        assert_eq!(newer.status, ApplicationStatus::Pending);
        assert!(newer.decision_date.is_none());

        let all = store
            .list_applications(&ApplicationFilter::default())
            .expect("list");
        assert_eq!(
            all.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec![newer.id.as_str(), older.id.as_str()]
        );

        let reviewed = store
            .update_application_status(
                &older.id,
                &ApplicationStatusUpdate {
                    status: ApplicationStatus::UnderReview,
                    priority: None,
                    risk_score: Some(71.5),
                    analyst_notes: Some("Strong cash flow".into()),
                },
            )
            .expect("update")
            .expect("exists");
        assert_eq!(reviewed.risk_score, Some(71.5));
        assert!(reviewed.decision_date.is_none());

        let approved = store
            .update_application_status(
                &older.id,
                &ApplicationStatusUpdate {
                    status: ApplicationStatus::Approved,
                    priority: Some(ApplicationPriority::Low),
                    risk_score: None,
                    analyst_notes: None,
                },
            )
            .expect("update")
            .expect("exists");
        assert!(approved.decision_date.is_some());
        assert_eq!(approved.risk_score, Some(71.5));
        assert_eq!(approved.analyst_notes.as_deref(), Some("Strong cash flow"));
        assert_eq!(approved.priority, ApplicationPriority::Low);

        let pending = store
            .list_applications(&ApplicationFilter {
                status: Some(ApplicationStatus::Pending),
                ..ApplicationFilter::default()
            })
            .expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, newer.id);

        let elsewhere = store
            .list_applications(&ApplicationFilter {
                borrower_id: Some("404".into()),
                ..ApplicationFilter::default()
            })
            .expect("filtered");
        assert!(elsewhere.is_empty());
        assert!(store
            .update_application_status(
                "404",
                &ApplicationStatusUpdate {
                    status: ApplicationStatus::Rejected,
                    priority: None,
                    risk_score: None,
                    analyst_notes: None,
                },
            )
            .expect("update")
            .is_none());
    }
}
