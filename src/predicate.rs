use std::fmt;
use std::ops::Not;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::PredicateError;
use crate::identity::Identity;

type TestFn = dyn Fn(&Identity) -> Result<bool, PredicateError> + Send + Sync;

/// A named, side-effect-free policy over an [`Identity`].
///
/// Predicates are values: they can be built once, tested on their own and
/// shared between gates. Built-in variants read the identity's role flags and
/// permissions; [`Predicate::custom`] and [`Predicate::fallible`] cover
/// anything else.
///
/// # Fail closed
///
/// [`evaluate`](Self::evaluate) never fails. An error or a panic raised
/// anywhere in the predicate tree makes the whole evaluation `false`, so a
/// broken policy can only deny. Combinators never stop early on a decided
/// value, so a failing child denies whatever position it was listed in.
///
/// # Examples
///
/// ```
/// use authgate::{Identity, Predicate, flags};
///
/// let editors = Predicate::Staff.or(Predicate::Superuser);
///
/// let bob = Identity::authenticated("bob").with_flag(flags::STAFF);
/// assert!(editors.evaluate(&bob));
/// assert!(!editors.evaluate(&Identity::anonymous()));
/// ```
#[derive(Clone)]
pub enum Predicate {
    /// The request carries a logged-in user.
    Authenticated,
    /// The `is_staff` flag is set.
    Staff,
    /// The `is_superuser` flag is set.
    Superuser,
    /// The `is_active` flag is set.
    Active,
    /// An arbitrary role flag is set.
    Flag(String),
    /// The user holds a permission (see [`Identity::has_perm`]).
    Permission(String),
    /// A named user-supplied test.
    Custom {
        /// Name used in logs
        name: String,
        /// The test itself
        test: Arc<TestFn>,
    },
    /// Every child holds.
    All(Vec<Predicate>),
    /// At least one child holds.
    Any(Vec<Predicate>),
    /// The child does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Shorthand for [`Predicate::Flag`].
    pub fn flag(name: impl Into<String>) -> Self {
        Predicate::Flag(name.into())
    }

    /// Shorthand for [`Predicate::Permission`].
    pub fn permission(perm: impl Into<String>) -> Self {
        Predicate::Permission(perm.into())
    }

    /// Requires every permission in `perms`.
    pub fn permissions<I, S>(perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::All(perms.into_iter().map(Predicate::permission).collect())
    }

    /// A named infallible test.
    ///
    /// ```
    /// use authgate::{Identity, Predicate};
    ///
    /// let is_bob = Predicate::custom("is_bob", |id| id.username() == "bob");
    /// assert!(is_bob.evaluate(&Identity::authenticated("bob")));
    /// ```
    pub fn custom<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Identity) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom {
            name: name.into(),
            test: Arc::new(move |identity: &Identity| -> Result<bool, PredicateError> {
                Ok(test(identity))
            }),
        }
    }

    /// A named test that may fail; failure counts as `false`.
    pub fn fallible<F, E>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Identity) -> Result<bool, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let name = name.into();
        let predicate = name.clone();
        Predicate::Custom {
            name,
            test: Arc::new(move |identity: &Identity| -> Result<bool, PredicateError> {
                test(identity).map_err(|e| PredicateError::Failed {
                    predicate: predicate.clone(),
                    message: e.to_string(),
                })
            }),
        }
    }

    /// Every predicate in `preds` holds. An empty list holds.
    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All(preds.into_iter().collect())
    }

    /// At least one predicate in `preds` holds. An empty list does not.
    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(preds.into_iter().collect())
    }

    /// Both `self` and `other` hold.
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::All(mut preds) => {
                preds.push(other);
                Predicate::All(preds)
            }
            first => Predicate::All(vec![first, other]),
        }
    }

    /// Either `self` or `other` holds.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Any(mut preds) => {
                preds.push(other);
                Predicate::Any(preds)
            }
            first => Predicate::Any(vec![first, other]),
        }
    }

    /// Evaluates the predicate, treating any failure as `false`.
    pub fn evaluate(&self, identity: &Identity) -> bool {
        match self.try_evaluate(identity) {
            Ok(admit) => admit,
            Err(err) => {
                tracing::warn!(
                    predicate = %err.predicate(),
                    user = %identity.username(),
                    error = %err,
                    "predicate failed, denying"
                );
                false
            }
        }
    }

    /// Evaluates the predicate, surfacing the first failure.
    pub fn try_evaluate(&self, identity: &Identity) -> Result<bool, PredicateError> {
        match self {
            Predicate::Authenticated => Ok(identity.is_authenticated()),
            Predicate::Staff => Ok(identity.is_staff()),
            Predicate::Superuser => Ok(identity.is_superuser()),
            Predicate::Active => Ok(identity.is_active()),
            Predicate::Flag(name) => Ok(identity.has_flag(name)),
            Predicate::Permission(perm) => Ok(identity.has_perm(perm)),
            Predicate::Custom { name, test } => {
                match panic::catch_unwind(AssertUnwindSafe(|| test(identity))) {
                    Ok(result) => result,
                    Err(payload) => Err(PredicateError::Panicked {
                        predicate: name.clone(),
                        message: panic_message(&*payload),
                    }),
                }
            }
            Predicate::All(preds) => {
                let mut admit = true;
                for pred in preds {
                    admit &= pred.try_evaluate(identity)?;
                }
                Ok(admit)
            }
            Predicate::Any(preds) => {
                let mut admit = false;
                for pred in preds {
                    admit |= pred.try_evaluate(identity)?;
                }
                Ok(admit)
            }
            Predicate::Not(inner) => Ok(!inner.try_evaluate(identity)?),
        }
    }

    /// A stable, human-readable rendering for logs.
    pub fn describe(&self) -> String {
        match self {
            Predicate::Authenticated => "authenticated".to_string(),
            Predicate::Staff => "staff".to_string(),
            Predicate::Superuser => "superuser".to_string(),
            Predicate::Active => "active".to_string(),
            Predicate::Flag(name) => format!("flag({})", name),
            Predicate::Permission(perm) => format!("perm({})", perm),
            Predicate::Custom { name, .. } => name.clone(),
            Predicate::All(preds) => join(preds, " and "),
            Predicate::Any(preds) => join(preds, " or "),
            Predicate::Not(inner) => format!("not {}", inner.describe()),
        }
    }
}

fn join(preds: &[Predicate], sep: &str) -> String {
    let parts: Vec<String> = preds.iter().map(Predicate::describe).collect();
    format!("({})", parts.join(sep))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        match self {
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.describe())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
