//! Role types for conversation participants and revision authors.

use serde::{Deserialize, Serialize};

/// Who spoke a dialogue turn or authored a revision.
///
/// # Examples
///
/// ```
/// use shotline_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "System");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Engine-initiated changes (self-healing, migrations)
    System,
    /// Changes made by a human operator
    User,
    /// Changes produced from a language-model reply
    Assistant,
}
