//! Declarative field validation.
//!
//! Rules are data: each [`FieldRule`] pairs a field path with an accessor and
//! the constraints that apply to it. [`validate`] runs a rule table and
//! collects every failure into one [`ValidationErrors`] report, so callers see
//! all broken fields at once rather than the first.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::User;

/// Minimum length of a user's name.
pub const NAME_MIN: usize = 3;
/// Maximum length of a user's name.
pub const NAME_MAX: usize = 255;
/// Minimum length of a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum length of a username.
pub const USERNAME_MAX: usize = 25;
/// Minimum length of a company name.
pub const COMPANY_NAME_MIN: usize = 3;
/// Maximum length of a company name.
pub const COMPANY_NAME_MAX: usize = 255;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static DECIMAL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // WHATWG "valid email address" grammar.
        let pattern = concat!(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
            r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
            r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        );
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn decimal_regex() -> &'static Regex {
    DECIMAL_RE.get_or_init(|| {
        // `\d` is Unicode-aware: any decimal digit script is accepted.
        Regex::new(r"^-?\d+(\.\d+)?$")
            .unwrap_or_else(|error| panic!("decimal regex failed to compile: {error}"))
    })
}

fn is_web_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https" | "ftp") && url.has_host())
        .unwrap_or(false)
}

/// A single constraint on a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Value must be present and not blank.
    Required,
    /// Character count must fall within `min..=max`.
    Length { min: usize, max: usize },
    /// Value must be an email address.
    Email,
    /// Value must be an absolute http, https or ftp URL.
    Url,
    /// Value must match `^-?\d+(\.\d+)?$`.
    Decimal,
}

impl Constraint {
    fn check(self, field: &str, value: &str) -> Option<String> {
        let failed = match self {
            Self::Required => value.trim().is_empty(),
            Self::Length { min, max } => {
                let length = value.chars().count();
                length < min || length > max
            }
            Self::Email => !email_regex().is_match(value),
            Self::Url => !is_web_url(value),
            Self::Decimal => !decimal_regex().is_match(value),
        };
        failed.then(|| self.message(field))
    }

    fn message(self, field: &str) -> String {
        match self {
            Self::Required => format!("{field} is required"),
            Self::Length { min, max } => {
                format!("{field} must be between {min} and {max} characters")
            }
            Self::Email => format!("{field} must be a valid email address"),
            Self::Url => format!("{field} must be a valid http, https or ftp URL"),
            Self::Decimal => format!("{field} must be a decimal number"),
        }
    }
}

/// What an accessor found for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// The enclosing object is absent, so no rule applies.
    NotApplicable,
    /// The field itself is absent.
    Missing,
    /// The field holds a value.
    Present(&'a str),
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

/// Constraints attached to one field path of `T`.
pub struct FieldRule<T> {
    field: &'static str,
    read: for<'a> fn(&'a T) -> FieldValue<'a>,
    constraints: &'static [Constraint],
}

impl<T> FieldRule<T> {
    /// Declare a rule for `field`.
    pub const fn new(
        field: &'static str,
        read: for<'a> fn(&'a T) -> FieldValue<'a>,
        constraints: &'static [Constraint],
    ) -> Self {
        Self {
            field,
            read,
            constraints,
        }
    }

    /// Field path the rule reports under.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Evaluate the rule, returning one message per failed constraint.
    ///
    /// A missing or blank required field reports only the required message.
    pub fn check(&self, target: &T) -> Vec<String> {
        let required = self.constraints.contains(&Constraint::Required);
        match (self.read)(target) {
            FieldValue::NotApplicable => Vec::new(),
            FieldValue::Missing if required => vec![Constraint::Required.message(self.field)],
            FieldValue::Missing => Vec::new(),
            FieldValue::Present(value) => {
                if let Some(message) = required
                    .then(|| Constraint::Required.check(self.field, value))
                    .flatten()
                {
                    return vec![message];
                }
                self.constraints
                    .iter()
                    .filter(|constraint| **constraint != Constraint::Required)
                    .filter_map(|constraint| constraint.check(self.field, value))
                    .collect()
            }
        }
    }
}

/// Aggregate report mapping field paths to their failure messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// True when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` has at least one failure.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Failure messages recorded for `field`.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Failed field paths in lexical order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn extend(&mut self, field: &str, messages: Vec<String>) {
        if !messages.is_empty() {
            self.0.entry(field.to_owned()).or_default().extend(messages);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields().collect::<Vec<_>>().join(", ");
        write!(f, "invalid fields: {fields}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Run every rule against `target`.
///
/// # Errors
/// Returns the aggregate report when any rule fails.
pub fn validate<T>(target: &T, rules: &[FieldRule<T>]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for rule in rules {
        errors.extend(rule.field(), rule.check(target));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn name(user: &User) -> FieldValue<'_> {
    user.name.as_deref().into()
}

fn username(user: &User) -> FieldValue<'_> {
    user.username.as_deref().into()
}

fn email(user: &User) -> FieldValue<'_> {
    user.email.as_deref().into()
}

fn website(user: &User) -> FieldValue<'_> {
    user.website.as_deref().into()
}

fn company_name(user: &User) -> FieldValue<'_> {
    user.company
        .as_ref()
        .map_or(FieldValue::NotApplicable, |company| company.name.as_deref().into())
}

fn geo_lat(user: &User) -> FieldValue<'_> {
    user.geo()
        .map_or(FieldValue::NotApplicable, |geo| geo.lat.as_deref().into())
}

fn geo_lng(user: &User) -> FieldValue<'_> {
    user.geo()
        .map_or(FieldValue::NotApplicable, |geo| geo.lng.as_deref().into())
}

/// Rule table for [`User`].
pub static USER_RULES: &[FieldRule<User>] = &[
    FieldRule::new(
        "name",
        name,
        &[
            Constraint::Required,
            Constraint::Length {
                min: NAME_MIN,
                max: NAME_MAX,
            },
        ],
    ),
    FieldRule::new(
        "username",
        username,
        &[
            Constraint::Required,
            Constraint::Length {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            },
        ],
    ),
    FieldRule::new("email", email, &[Constraint::Required, Constraint::Email]),
    FieldRule::new("website", website, &[Constraint::Url]),
    FieldRule::new(
        "company.name",
        company_name,
        &[
            Constraint::Required,
            Constraint::Length {
                min: COMPANY_NAME_MIN,
                max: COMPANY_NAME_MAX,
            },
        ],
    ),
    FieldRule::new(
        "address.geo.lat",
        geo_lat,
        &[Constraint::Required, Constraint::Decimal],
    ),
    FieldRule::new(
        "address.geo.lng",
        geo_lng,
        &[Constraint::Required, Constraint::Decimal],
    ),
];

/// Validate a user payload against [`USER_RULES`].
///
/// # Examples
/// ```
/// use user_api::domain::{User, validate_user};
///
/// let mut user = User::new("John Doe", "jd", "johndoe@example.com");
/// user.email = None;
/// let errors = validate_user(&user).expect_err("two fields fail");
/// assert!(errors.contains("email"));
/// assert!(errors.contains("username"));
/// ```
pub fn validate_user(user: &User) -> Result<(), ValidationErrors> {
    validate(user, USER_RULES)
}
