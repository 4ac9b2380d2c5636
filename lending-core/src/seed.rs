use crate::auth::{hash_password, AuthError};
use crate::store::{self, NewApplication, NewBorrower, NewLoan, NewUser, Store, StoreError};
use lending_contracts::{
    ApplicationPriority, ApplicationStatus, LoanProductDraft, LoanStatus, NewApplicationRequest,
    UserRole,
};
use rusqlite::Connection;

pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

struct DemoUser {
    email: &'static str,
    role: UserRole,
    name: &'static str,
    organization: &'static str,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "sarah@withcaelo.ai",
        role: UserRole::Admin,
        name: "Sarah Chen",
        organization: "Caelo Inc.",
    },
    DemoUser {
        email: "mike@cdfi.example.org",
        role: UserRole::Analyst,
        name: "Mike Rodriguez",
        organization: "Community Capital Partners",
    },
    DemoUser {
        email: "jessica@smallbiz.com",
        role: UserRole::Borrower,
        name: "Jessica Williams",
        organization: "Sunrise Bakery",
    },
];

fn demo_products() -> Vec<LoanProductDraft> {
    vec![
        LoanProductDraft {
            name: "Small Business Equipment Loan".into(),
            description: "Financing for equipment and machinery purchases.".into(),
            min_amount: 5_000.0,
            max_amount: 100_000.0,
            interest_rate: 4.5,
            term_length: 36,
            is_active: true,
            business_types: vec!["retail".into(), "food_service".into(), "manufacturing".into()],
        },
        LoanProductDraft {
            name: "Working Capital Line".into(),
            description: "Short-term capital for inventory and payroll gaps.".into(),
            min_amount: 2_500.0,
            max_amount: 50_000.0,
            interest_rate: 7.25,
            term_length: 12,
            is_active: true,
            business_types: vec!["retail".into(), "services".into()],
        },
        LoanProductDraft {
            name: "Community Microloan".into(),
            description: "Starter loans for new neighborhood businesses.".into(),
            min_amount: 500.0,
            max_amount: 10_000.0,
            interest_rate: 3.0,
            term_length: 24,
            is_active: false,
            business_types: Vec::new(),
        },
    ]
}

/// Populates an empty store with demo accounts, products, loan history and
/// applications. Returns `false` without touching anything when users already
/// exist. Everything is written in one transaction, so a failure part way
/// leaves the store empty and the next start seeds again.
pub fn seed_demo_data(store: &Store) -> Result<bool, SeedError> {
    let hashes = DEMO_USERS
        .iter()
        .map(|_| hash_password(DEMO_PASSWORD))
        .collect::<Result<Vec<_>, _>>()?;

    let seeded = store.transaction(|conn| {
        if store::user_count(conn)? > 0 {
            return Ok(false);
        }
        seed_into(conn, hashes)?;
        Ok(true)
    })?;

    if seeded {
        tracing::info!(
            users = DEMO_USERS.len(),
            "seeded demo data; password for all demo accounts is '{DEMO_PASSWORD}'"
        );
    } else {
        tracing::info!("demo data already present, skipping seed");
    }
    Ok(seeded)
}

fn seed_into(conn: &Connection, hashes: Vec<String>) -> Result<(), StoreError> {
    let mut borrower_user = None;
    for (demo, password_hash) in DEMO_USERS.iter().zip(hashes) {
        let user = store::insert_user(
            conn,
            &NewUser {
                email: demo.email.into(),
                password_hash,
                role: demo.role,
                name: demo.name.into(),
                organization: Some(demo.organization.into()),
                is_active: true,
            },
        )?;
        if demo.role == UserRole::Borrower {
            borrower_user = Some(user.id);
        }
    }

    for product in demo_products() {
        store::insert_product(conn, &product)?;
    }

    let jessica = store::insert_borrower(
        conn,
        &NewBorrower {
            user_id: borrower_user,
            name: "Jessica Williams".into(),
            business_name: Some("Sunrise Bakery".into()),
            email: "jessica@smallbiz.com".into(),
            phone: Some("(555) 010-2030".into()),
            address: Some("12 Market Street, Oakland, CA".into()),
        },
    )?;
    let corner = store::insert_borrower(
        conn,
        &NewBorrower {
            user_id: None,
            name: "Luis Ortega".into(),
            business_name: Some("Corner Hardware".into()),
            email: "luis@cornerhardware.example".into(),
            phone: None,
            address: None,
        },
    )?;

    let loans = [
        (&jessica, 25_000.0, LoanStatus::Active, "2023-02-15", "2026-02-15", 4.5),
        (&jessica, 8_000.0, LoanStatus::Paid, "2020-06-01", "2022-06-01", 6.0),
        (&corner, 40_000.0, LoanStatus::Active, "2023-09-01", "2027-09-01", 7.25),
        (&corner, 12_000.0, LoanStatus::Default, "2021-03-10", "2023-03-10", 8.0),
        (&corner, 15_000.0, LoanStatus::Pending, "2024-01-20", "2027-01-20", 7.25),
    ];
    for (borrower_id, amount, status, originated, matures, rate) in loans {
        store::insert_loan(
            conn,
            &NewLoan {
                borrower_id: borrower_id.clone(),
                amount,
                status,
                origination_date: originated.into(),
                maturity_date: matures.into(),
                interest_rate: rate,
            },
        )?;
    }

    for application in demo_applications(&jessica, &corner) {
        store::insert_application(conn, &application)?;
    }
    Ok(())
}

fn demo_applications(jessica: &str, corner: &str) -> Vec<NewApplication> {
    let application = |borrower_id: &str,
                       business: &str,
                       kind: &str,
                       amount: f64,
                       purpose: &str,
                       priority: ApplicationPriority| NewApplication {
        borrower_id: borrower_id.into(),
        request: NewApplicationRequest {
            business_name: business.into(),
            business_type: kind.into(),
            loan_amount: amount,
            loan_purpose: purpose.into(),
            priority,
        },
        status: ApplicationStatus::Pending,
        risk_score: None,
        application_date: String::new(),
        decision_date: None,
    };

    let mut oven = application(
        jessica,
        "Sunrise Bakery",
        "food_service",
        30_000.0,
        "Second oven line for wholesale orders",
        ApplicationPriority::High,
    );
    oven.application_date = "2024-05-02T09:30:00+00:00".into();

    let mut inventory = application(
        corner,
        "Corner Hardware",
        "retail",
        45_000.0,
        "Seasonal inventory and a delivery van",
        ApplicationPriority::Medium,
    );
    inventory.status = ApplicationStatus::UnderReview;
    inventory.risk_score = Some(62.0);
    inventory.application_date = "2024-04-18T14:00:00+00:00".into();

    let mut signage = application(
        corner,
        "Corner Hardware",
        "retail",
        15_000.0,
        "Storefront signage and lighting",
        ApplicationPriority::Low,
    );
    signage.status = ApplicationStatus::Approved;
    signage.risk_score = Some(81.0);
    signage.application_date = "2024-01-08T10:15:00+00:00".into();
    signage.decision_date = Some("2024-01-19T16:45:00+00:00".into());

    vec![oven, inventory, signage]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    #[test]
    fn seeds_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("seed.db")).expect("open");

        assert!(seed_demo_data(&store).expect("seed"));
        assert!(!seed_demo_data(&store).expect("second seed"));
        assert_eq!(store.user_count().expect("count"), 3);
        assert_eq!(store.list_products().expect("products").len(), 3);

        let creds = store
            .credentials_by_email("jessica@smallbiz.com")
            .expect("lookup")
            .expect("present");
        assert!(verify_password(DEMO_PASSWORD, &creds.password_hash));

        let borrower_id = store
            .borrower_id_for_user(&creds.user.id)
            .expect("link")
            .expect("linked");
        let profile = store
            .borrower_profile(&borrower_id)
            .expect("profile")
            .expect("exists");
        assert_eq!(profile.loan_history.len(), 2);

        let applications = store
            .list_applications(&crate::store::ApplicationFilter::default())
            .expect("applications");
        assert_eq!(applications.len(), 3);
        assert_eq!(applications[0].borrower_id, borrower_id);
        assert_eq!(applications[0].status, ApplicationStatus::Pending);
    }

    #[test]
    fn failed_seed_rolls_back_and_can_be_retried() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seed.db");
        let store = Store::open(&path).expect("open");

        let conn = Connection::open(&path).expect("raw connection");
        conn.execute_batch(
            "CREATE TRIGGER block_loans BEFORE INSERT ON loans
             BEGIN SELECT RAISE(ABORT, 'loans are read-only'); END;",
        )
        .expect("trigger");

        assert!(matches!(
            seed_demo_data(&store),
            Err(SeedError::Store(StoreError::Sqlite(_)))
        ));
        assert_eq!(store.user_count().expect("count"), 0);
        assert!(store.list_products().expect("products").is_empty());

        conn.execute_batch("DROP TRIGGER block_loans;")
            .expect("drop trigger");
        assert!(seed_demo_data(&store).expect("retry"));
        assert_eq!(store.user_count().expect("count"), 3);
    }
}
