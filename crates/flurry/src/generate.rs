//! Synthetic credit-transaction record generation.
//!
//! Value pools and ranges mirror a realistic consumer-credit book: ten
//! credit products, ten spending categories, loans between 500 and 100k,
//! rates between 2.5% and 18%. The nested customer object is built as a
//! typed struct and serialized once into the record's opaque blob.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::value::RawValue;
use uuid::Uuid;

use drift_common::Record;

const CREDIT_PRODUCTS: [&str; 10] = [
    "Personal Loan",
    "Credit Card",
    "Auto Loan",
    "Mortgage",
    "Student Loan",
    "Business Loan",
    "Buy Now Pay Later",
    "Overdraft Facility",
    "Line of Credit",
    "Microfinance Loan",
];

const TRANSACTION_CATEGORIES: [&str; 10] = [
    "Groceries",
    "Restaurants",
    "Online Shopping",
    "Utilities",
    "Healthcare",
    "Entertainment",
    "Travel",
    "Insurance",
    "Education",
    "Other",
];

const PAYMENT_STATUSES: [&str; 3] = ["On Time", "Late", "Default"];

const EMPLOYMENT_STATUSES: [&str; 4] = ["Employed", "Unemployed", "Self-Employed", "Retired"];

const FIRST_NAMES: [&str; 12] = [
    "Ada", "Bruno", "Carmen", "Dmitri", "Elena", "Farid", "Grace", "Hector", "Imani", "Jonas",
    "Keiko", "Luis",
];

const LAST_NAMES: [&str; 12] = [
    "Alvarez", "Bennett", "Castillo", "Dufour", "Eriksen", "Fischer", "Gupta", "Hansen", "Ishida",
    "Jensen", "Kowalski", "Lindqvist",
];

const STREETS: [&str; 8] = [
    "Maple Avenue",
    "Oak Street",
    "Cedar Lane",
    "Birch Road",
    "Elm Drive",
    "Willow Court",
    "Pine Boulevard",
    "Aspen Way",
];

const CITIES: [(&str, &str); 8] = [
    ("Dover", "DE"),
    ("Madison", "WI"),
    ("Helena", "MT"),
    ("Salem", "OR"),
    ("Topeka", "KS"),
    ("Augusta", "ME"),
    ("Pierre", "SD"),
    ("Boise", "ID"),
];

/// Customer demographics, serialized into the record's opaque blob.
#[derive(Debug, Serialize)]
struct Address {
    street_address: String,
    city: String,
    state: String,
    postalcode: String,
}

#[derive(Debug, Serialize)]
struct Customer {
    name: String,
    dob: String,
    address: Address,
    phone: String,
    email: String,
    employment_status: String,
    annual_income: f64,
}

/// Generates randomized credit-transaction records.
pub struct RecordGenerator {
    rng: StdRng,
}

impl RecordGenerator {
    /// Create a generator, seeded for deterministic output when a seed is
    /// given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Produce the next record.
    pub fn next_record(&mut self) -> Result<Record, serde_json::Error> {
        let customer = self.customer();
        let customer = RawValue::from_string(serde_json::to_string(&customer)?)?;

        // One in ten accounts has no payment history yet.
        let last_payment_date = if self.rng.gen_bool(0.9) {
            let days_ago = self.rng.gen_range(0..730);
            Some(
                (Utc::now().date_naive() - Duration::days(days_ago))
                    .format("%Y-%m-%d")
                    .to_string(),
            )
        } else {
            None
        };

        Ok(Record {
            txid: Uuid::new_v4().to_string(),
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            credit_product: self.choose(&CREDIT_PRODUCTS).to_string(),
            loan_amount: self.money(500.0, 100_000.0),
            interest_rate: self.money(2.5, 18.0),
            tenor_months: self.rng.gen_range(6..=360),
            payment_status: self.choose(&PAYMENT_STATUSES).to_string(),
            days_past_due: self.rng.gen_range(0..=180),
            last_payment_date,
            monthly_transactions: self.rng.gen_range(5..=100),
            avg_transaction_amount: self.money(10.0, 500.0),
            common_category: self.choose(&TRANSACTION_CATEGORIES).to_string(),
            customer,
        })
    }

    fn customer(&mut self) -> Customer {
        let first = self.choose(&FIRST_NAMES);
        let last = self.choose(&LAST_NAMES);
        let (city, state) = CITIES[self.rng.gen_range(0..CITIES.len())];

        let age_days = self.rng.gen_range(18 * 365..=75 * 365);
        let dob = (Utc::now().date_naive() - Duration::days(age_days))
            .format("%Y-%m-%d")
            .to_string();

        Customer {
            name: format!("{first} {last}"),
            dob,
            address: Address {
                street_address: format!(
                    "{} {}",
                    self.rng.gen_range(1..=9999),
                    self.choose(&STREETS)
                ),
                city: city.to_string(),
                state: state.to_string(),
                postalcode: format!("{:05}", self.rng.gen_range(10000..=99999)),
            },
            phone: format!(
                "({}) 555-{:04}",
                self.rng.gen_range(200..=999),
                self.rng.gen_range(0..=9999)
            ),
            email: format!(
                "{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            employment_status: self.choose(&EMPLOYMENT_STATUSES).to_string(),
            annual_income: self.money(15_000.0, 200_000.0),
        }
    }

    fn choose<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.gen_range(0..pool.len())]
    }

    /// A uniform amount rounded to cents.
    fn money(&mut self, low: f64, high: f64) -> f64 {
        (self.rng.gen_range(low..high) * 100.0).round() / 100.0
    }
}
