use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Functor of the binary conjunction term `(A, B)`.
pub const CONJUNCTION: &str = ",";

/// Functor of the built-in inequality `A \= B`.
pub const NOT_UNIFIABLE: &str = "\\=";

/// A Prolog term
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Term {
    /// A nullary constant (e.g., `tom`, `'hello world'`)
    Atom(String),
    /// A logic variable (e.g., `X`, `_Acc`); its value lives in [`Bindings`]
    Variable(String),
    /// A structure (e.g., `parent(tom, X)`); arity is `args.len()`
    Compound {
        /// The name of the structure
        functor: String,
        /// The ordered arguments
        args: Vec<Term>,
    },
}

impl Term {
    /// Create an atom
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    /// Create a variable
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Create a compound term
    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Compound {
            functor: functor.into(),
            args,
        }
    }

    /// Create the conjunction `(left, right)`
    #[must_use]
    pub fn and(left: Term, right: Term) -> Self {
        Term::compound(CONJUNCTION, vec![left, right])
    }

    /// Create the inequality goal `left \= right`
    #[must_use]
    pub fn not_unifiable(left: Term, right: Term) -> Self {
        Term::compound(NOT_UNIFIABLE, vec![left, right])
    }

    /// Folds goals into a right-nested conjunction: `[a, b, c]` becomes `(a, (b, c))`.
    ///
    /// Returns `None` when there are no goals.
    pub fn conjunction(goals: impl IntoIterator<Item = Term>) -> Option<Self> {
        let mut goals: Vec<Term> = goals.into_iter().collect();
        let last = goals.pop()?;
        Some(
            goals
                .into_iter()
                .rev()
                .fold(last, |rest, goal| Term::and(goal, rest)),
        )
    }

    /// Returns the arguments of this term if it is `functor/arity`
    #[must_use]
    pub fn as_operation(&self, name: &str, arity: usize) -> Option<&[Term]> {
        match self {
            Term::Compound { functor, args } if functor == name && args.len() == arity => {
                Some(args)
            }
            _ => None,
        }
    }

    /// Splits a right-nested conjunction back into its goals, left to right
    #[must_use]
    pub fn conjuncts(&self) -> Vec<&Term> {
        let mut goals = Vec::new();
        let mut current = self;
        while let Some([left, right]) = current.as_operation(CONJUNCTION, 2) {
            goals.push(left);
            current = right;
        }
        goals.push(current);
        goals
    }

    /// Returns true for variables
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// The `functor/arity` this term is indexed under.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`] for variables, which have no signature.
    pub fn signature(&self) -> Result<Signature> {
        match self {
            Term::Atom(name) => Ok(Signature::new(name.clone(), 0)),
            Term::Compound { functor, args } => Ok(Signature::new(functor.clone(), args.len())),
            Term::Variable(_) => Err(Error::NotCallable(self.clone())),
        }
    }

    /// Variable names in order of first occurrence, without duplicates
    #[must_use]
    pub fn variables(&self) -> SmallVec<[&str; 8]> {
        let mut names = SmallVec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut SmallVec<[&'a str; 8]>) {
        match self {
            Term::Atom(_) => {}
            Term::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Term::Compound { args, .. } => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
        }
    }

    /// Replaces every bound variable by the transitive dereference of its binding.
    ///
    /// Unbound variables are kept as they are. A variable that occurs inside its
    /// own value (only possible when unifying without the occurs check) is
    /// expanded once and left bare at the point where it recurs.
    #[must_use]
    pub fn substitute(&self, bindings: &Bindings) -> Term {
        let mut expanding = SmallVec::new();
        substitute_guarded(self, bindings, &mut expanding)
    }

    /// Appends `#suffix` to every variable name
    #[must_use]
    pub fn rename_variables(&self, suffix: usize) -> Term {
        match self {
            Term::Atom(_) => self.clone(),
            Term::Variable(name) => Term::Variable(format!("{name}#{suffix}")),
            Term::Compound { functor, args } => Term::Compound {
                functor: functor.clone(),
                args: args.iter().map(|arg| arg.rename_variables(suffix)).collect(),
            },
        }
    }
}

fn substitute_guarded<'a>(
    term: &'a Term,
    bindings: &'a Bindings,
    expanding: &mut SmallVec<[&'a str; 8]>,
) -> Term {
    match term {
        Term::Atom(_) => term.clone(),
        Term::Variable(name) => {
            if expanding.contains(&name.as_str()) {
                return term.clone();
            }
            match bindings.get(name) {
                Some(value) => {
                    expanding.push(name);
                    let resolved = substitute_guarded(value, bindings, expanding);
                    expanding.pop();
                    resolved
                }
                None => term.clone(),
            }
        }
        Term::Compound { functor, args } => Term::Compound {
            functor: functor.clone(),
            args: args
                .iter()
                .map(|arg| substitute_guarded(arg, bindings, expanding))
                .collect(),
        },
    }
}

fn is_plain_atom(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(first) if first.is_ascii_digit() => chars.all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_plain_atom(name) {
        return f.write_str(name);
    }
    f.write_str("'")?;
    for c in name.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            _ => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

fn write_argument(f: &mut fmt::Formatter<'_>, arg: &Term) -> fmt::Result {
    let is_operator = arg.as_operation(CONJUNCTION, 2).is_some()
        || arg.as_operation(NOT_UNIFIABLE, 2).is_some();
    if is_operator {
        write!(f, "({arg})")
    } else {
        write!(f, "{arg}")
    }
}

/// Writes a goal that sits in a comma-separated list
fn write_goal(f: &mut fmt::Formatter<'_>, goal: &Term) -> fmt::Result {
    if goal.as_operation(CONJUNCTION, 2).is_some() {
        write!(f, "({goal})")
    } else {
        write!(f, "{goal}")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => write_name(f, name),
            Term::Variable(name) => f.write_str(name),
            Term::Compound { functor, args } => {
                if let Some([left, right]) = self.as_operation(CONJUNCTION, 2) {
                    // `,` reads right-nested; a nested left side keeps its parentheses.
                    write_goal(f, left)?;
                    return write!(f, ", {right}");
                }
                if let Some([left, right]) = self.as_operation(NOT_UNIFIABLE, 2) {
                    write_argument(f, left)?;
                    f.write_str(" \\= ")?;
                    return write_argument(f, right);
                }
                write_name(f, functor)?;
                f.write_str("(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_argument(f, arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A predicate signature, `functor/arity`
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Signature {
    /// The functor name
    pub name: String,
    /// The number of arguments (0 for atoms)
    pub arity: usize,
}

impl Signature {
    /// Create a signature
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, &self.name)?;
        write!(f, "/{}", self.arity)
    }
}

/// A Prolog clause (e.g., `grandparent(X, Z) :- parent(X, Y), parent(Y, Z).`)
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Clause {
    /// The conclusion of the clause
    pub head: Term,
    /// The goals that must hold, left to right; empty for facts
    pub body: Vec<Term>,
}

impl Clause {
    /// Create a clause with an empty body
    #[must_use]
    pub fn fact(head: Term) -> Self {
        Self {
            head,
            body: Vec::new(),
        }
    }

    /// Create a clause with a body
    #[must_use]
    pub fn rule(head: Term, body: Vec<Term>) -> Self {
        Self { head, body }
    }

    /// Returns true if the body is empty
    #[must_use]
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// The signature of the head.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`] if the head is a variable.
    pub fn signature(&self) -> Result<Signature> {
        self.head.signature()
    }

    /// Appends `#suffix` to every variable of the head and body
    #[must_use]
    pub fn rename_variables(&self, suffix: usize) -> Clause {
        Clause {
            head: self.head.rename_variables(suffix),
            body: self
                .body
                .iter()
                .map(|goal| goal.rename_variables(suffix))
                .collect(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_goal(f, &self.head)?;
        for (i, goal) in self.body.iter().enumerate() {
            f.write_str(if i == 0 { " :- " } else { ", " })?;
            write_goal(f, goal)?;
        }
        f.write_str(".")
    }
}

/// Variable bindings accumulated along one branch of the search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Bindings {
    map: IndexMap<String, Term>,
}

impl Bindings {
    /// Create an empty set of bindings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no variable is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The direct binding of a variable, without following chains
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.map.get(name)
    }

    /// Binds `name` to `value`, replacing any previous binding
    pub fn bind(&mut self, name: impl Into<String>, value: Term) {
        self.map.insert(name.into(), value);
    }

    /// Follows variable-to-variable bindings until reaching a non-variable or an
    /// unbound variable.
    #[must_use]
    pub fn walk<'a>(&'a self, term: &'a Term) -> &'a Term {
        let mut current = term;
        // A chain longer than the map can only be a cycle.
        for _ in 0..=self.map.len() {
            match current {
                Term::Variable(name) => match self.map.get(name) {
                    Some(value) => current = value,
                    None => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Iterates over bindings in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.map.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Term)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Term);
    type IntoIter = indexmap::map::IntoIter<String, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, Term)]) -> Bindings {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Term::atom("tom"), Term::atom("tom"));
        assert_ne!(Term::atom("tom"), Term::var("tom"));
        assert_eq!(
            Term::compound("f", vec![Term::atom("a"), Term::var("X")]),
            Term::compound("f", vec![Term::atom("a"), Term::var("X")])
        );
        assert_ne!(
            Term::compound("f", vec![Term::atom("a")]),
            Term::compound("f", vec![Term::atom("a"), Term::atom("a")])
        );
        assert_ne!(Term::atom("f"), Term::compound("f", vec![]));
    }

    #[test]
    fn test_signature_of_atoms_and_compounds() {
        assert_eq!(Term::atom("halt").signature().unwrap(), Signature::new("halt", 0));
        let goal = Term::compound("parent", vec![Term::atom("tom"), Term::var("X")]);
        assert_eq!(goal.signature().unwrap(), Signature::new("parent", 2));
        assert_eq!(goal.signature().unwrap().to_string(), "parent/2");
    }

    #[test]
    fn test_signature_of_variable_is_an_error() {
        let err = Term::var("X").signature().unwrap_err();
        assert_eq!(err, Error::NotCallable(Term::var("X")));
    }

    #[test]
    fn test_substitute_follows_chains() {
        let b = bindings(&[("X", Term::var("Y")), ("Y", Term::atom("tom"))]);
        assert_eq!(Term::var("X").substitute(&b), Term::atom("tom"));

        let term = Term::compound("f", vec![Term::var("X"), Term::var("Z"), Term::atom("a")]);
        assert_eq!(
            term.substitute(&b),
            Term::compound("f", vec![Term::atom("tom"), Term::var("Z"), Term::atom("a")])
        );
    }

    #[test]
    fn test_substitute_leaves_atoms_alone() {
        let b = bindings(&[("X", Term::atom("tom"))]);
        assert_eq!(Term::atom("X").substitute(&b), Term::atom("X"));
    }

    #[test]
    fn test_substitute_is_idempotent() {
        let b = bindings(&[
            ("X", Term::compound("g", vec![Term::var("Y")])),
            ("Y", Term::atom("b")),
        ]);
        let term = Term::compound("f", vec![Term::var("X"), Term::var("W")]);
        let once = term.substitute(&b);
        assert_eq!(once.substitute(&b), once);
    }

    #[test]
    fn test_substitute_terminates_on_cyclic_binding() {
        let b = bindings(&[("X", Term::compound("f", vec![Term::var("X")]))]);
        assert_eq!(
            Term::var("X").substitute(&b),
            Term::compound("f", vec![Term::var("X")])
        );
    }

    #[test]
    fn test_walk_stops_at_unbound_variable() {
        let b = bindings(&[("X", Term::var("Y"))]);
        assert_eq!(b.walk(&Term::var("X")), &Term::var("Y"));
        assert_eq!(b.walk(&Term::var("Q")), &Term::var("Q"));
    }

    #[test]
    fn test_walk_does_not_descend_into_compounds() {
        let value = Term::compound("f", vec![Term::var("Y")]);
        let b = bindings(&[("X", value.clone()), ("Y", Term::atom("a"))]);
        assert_eq!(b.walk(&Term::var("X")), &value);
    }

    #[test]
    fn test_walk_terminates_on_variable_cycle() {
        let mut b = Bindings::new();
        b.bind("X", Term::var("Y"));
        b.bind("Y", Term::var("X"));
        assert!(b.walk(&Term::var("X")).is_variable());
    }

    #[test]
    fn test_variables_in_first_occurrence_order() {
        let term = Term::compound(
            "f",
            vec![
                Term::var("B"),
                Term::compound("g", vec![Term::var("A"), Term::var("B")]),
                Term::atom("c"),
            ],
        );
        assert_eq!(term.variables().as_slice(), &["B", "A"]);
    }

    #[test]
    fn test_conjunction_is_right_nested() {
        let goals = vec![Term::atom("a"), Term::atom("b"), Term::atom("c")];
        let conj = Term::conjunction(goals).unwrap();
        assert_eq!(
            conj,
            Term::and(Term::atom("a"), Term::and(Term::atom("b"), Term::atom("c")))
        );
        assert_eq!(
            conj.conjuncts(),
            vec![&Term::atom("a"), &Term::atom("b"), &Term::atom("c")]
        );
        assert!(Term::conjunction(Vec::new()).is_none());
    }

    #[test]
    fn test_rename_variables() {
        let clause = Clause::rule(
            Term::compound("p", vec![Term::var("X")]),
            vec![Term::compound("q", vec![Term::var("X"), Term::atom("a")])],
        );
        let renamed = clause.rename_variables(7);
        assert_eq!(renamed.head, Term::compound("p", vec![Term::var("X#7")]));
        assert_eq!(
            renamed.body[0],
            Term::compound("q", vec![Term::var("X#7"), Term::atom("a")])
        );
    }

    #[test]
    fn test_display() {
        let goal = Term::compound("parent", vec![Term::atom("tom"), Term::var("X")]);
        assert_eq!(goal.to_string(), "parent(tom, X)");
        assert_eq!(Term::atom("hello world").to_string(), "'hello world'");
        assert_eq!(Term::atom("it's").to_string(), "'it\\'s'");
        assert_eq!(Term::atom("42").to_string(), "42");
        assert_eq!(
            Term::not_unifiable(Term::var("X"), Term::var("Y")).to_string(),
            "X \\= Y"
        );
        assert_eq!(
            Term::compound("call", vec![Term::and(Term::atom("a"), Term::atom("b"))]).to_string(),
            "call((a, b))"
        );
        assert_eq!(Term::compound("f", vec![]).to_string(), "f()");
    }

    #[test]
    fn test_display_keeps_left_nested_conjunction_grouped() {
        let (a, b, c) = (Term::atom("a"), Term::atom("b"), Term::atom("c"));
        assert_eq!(
            Term::and(Term::and(a.clone(), b.clone()), c.clone()).to_string(),
            "(a, b), c"
        );
        assert_eq!(
            Term::and(a.clone(), Term::and(b.clone(), c.clone())).to_string(),
            "a, b, c"
        );

        let clause = Clause::rule(Term::atom("p"), vec![Term::and(a, b), c]);
        assert_eq!(clause.to_string(), "p :- (a, b), c.");
    }

    #[test]
    fn test_clause_display() {
        let rule = Clause::rule(
            Term::compound("grandparent", vec![Term::var("X"), Term::var("Z")]),
            vec![
                Term::compound("parent", vec![Term::var("X"), Term::var("Y")]),
                Term::compound("parent", vec![Term::var("Y"), Term::var("Z")]),
            ],
        );
        assert_eq!(
            rule.to_string(),
            "grandparent(X, Z) :- parent(X, Y), parent(Y, Z)."
        );
        assert_eq!(Clause::fact(Term::atom("sunny")).to_string(), "sunny.");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip_of_clause() {
        let clause = Clause::fact(Term::compound("parent", vec![Term::atom("tom"), Term::atom("bob")]));
        let json = serde_json::to_string(&clause).unwrap();
        let back: Clause = serde_json::from_str(&json).unwrap();
        assert_eq!(back, clause);
    }
}
