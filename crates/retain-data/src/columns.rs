//! Raw column names as used by the training data set.

/// Customer identifier.
pub const CUSTOMER_ID: &str = "CustomerId";
/// Customer surname.
pub const SURNAME: &str = "Surname";
/// Credit score.
pub const CREDIT_SCORE: &str = "CreditScore";
/// Country of residence.
pub const GEOGRAPHY: &str = "Geography";
/// Gender.
pub const GENDER: &str = "Gender";
/// Age in years.
pub const AGE: &str = "Age";
/// Tenure in years.
pub const TENURE: &str = "Tenure";
/// Account balance.
pub const BALANCE: &str = "Balance";
/// Number of products held.
pub const NUM_PRODUCTS: &str = "NumOfProducts";
/// Credit card holder flag.
pub const HAS_CREDIT_CARD: &str = "HasCrCard";
/// Active member flag.
pub const IS_ACTIVE_MEMBER: &str = "IsActiveMember";
/// Estimated salary.
pub const ESTIMATED_SALARY: &str = "EstimatedSalary";
/// Training label (churned).
pub const LABEL: &str = "Exited";

/// Columns every raw batch must carry.
pub const REQUIRED: &[&str] = &[
    CREDIT_SCORE,
    GEOGRAPHY,
    GENDER,
    AGE,
    TENURE,
    BALANCE,
    NUM_PRODUCTS,
    HAS_CREDIT_CARD,
    IS_ACTIVE_MEMBER,
    ESTIMATED_SALARY,
];

/// Optional identifying columns.
pub const IDENTIFYING: &[&str] = &[CUSTOMER_ID, SURNAME];
