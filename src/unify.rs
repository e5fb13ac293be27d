use crate::term::{Bindings, Term};

/// Robinson unification over [`Term`]s with an optional occurs check.
///
/// Unification never mutates the bindings it is given. A successful call
/// returns a fresh copy extended with the new bindings, so a caller exploring
/// alternatives can simply drop the result of a failed branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unifier {
    occurs_check: bool,
}

impl Default for Unifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Unifier {
    /// Create a unifier; `occurs_check` rejects bindings such as `X = f(X)`
    #[must_use]
    pub fn new(occurs_check: bool) -> Self {
        Self { occurs_check }
    }

    /// Returns whether the occurs check is enabled
    #[must_use]
    pub fn occurs_check(&self) -> bool {
        self.occurs_check
    }

    /// Unify two terms under `bindings`.
    ///
    /// Returns the extended bindings, or `None` if the terms do not unify.
    #[must_use]
    pub fn unify(&self, left: &Term, right: &Term, bindings: &Bindings) -> Option<Bindings> {
        let mut extended = bindings.clone();
        self.unify_into(left, right, &mut extended)
            .then_some(extended)
    }

    /// Returns whether two terms unify under `bindings`, discarding the result
    #[must_use]
    pub fn can_unify(&self, left: &Term, right: &Term, bindings: &Bindings) -> bool {
        self.unify(left, right, bindings).is_some()
    }

    /// Unifies in place on a private working copy. On `false` the copy is garbage.
    fn unify_into(&self, left: &Term, right: &Term, bindings: &mut Bindings) -> bool {
        let left = bindings.walk(left).clone();
        let right = bindings.walk(right).clone();

        if left == right {
            return true;
        }

        match (&left, &right) {
            (Term::Variable(name), other) | (other, Term::Variable(name)) => {
                if self.occurs_check && occurs_in(name, other, bindings) {
                    return false;
                }
                bindings.bind(name.clone(), other.clone());
                true
            }
            (
                Term::Compound {
                    functor: f1,
                    args: args1,
                },
                Term::Compound {
                    functor: f2,
                    args: args2,
                },
            ) => {
                if f1 != f2 || args1.len() != args2.len() {
                    return false;
                }
                args1
                    .iter()
                    .zip(args2)
                    .all(|(a, b)| self.unify_into(a, b, bindings))
            }
            _ => false,
        }
    }
}

/// Does variable `name` occur in `term`, looking through bindings?
fn occurs_in(name: &str, term: &Term, bindings: &Bindings) -> bool {
    match bindings.walk(term) {
        Term::Variable(other) => other == name,
        Term::Atom(_) => false,
        Term::Compound { args, .. } => args.iter().any(|arg| occurs_in(name, arg, bindings)),
    }
}
