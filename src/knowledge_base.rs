use indexmap::IndexMap;

use crate::error::Result;
use crate::term::{Clause, Signature, Term};

/// Clause store, indexed by `functor/arity`.
///
/// Clauses are kept in insertion order. The index maps each signature to the
/// positions of its clauses, so the clauses of one predicate are always tried
/// in the order they were added regardless of what was interleaved between
/// them.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    clauses: Vec<Clause>,
    index: IndexMap<Signature, Vec<usize>>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause after all existing clauses
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`](crate::Error::NotCallable) if the head is a variable.
    pub fn add_clause(&mut self, clause: Clause) -> Result<()> {
        let signature = clause.signature()?;
        self.index
            .entry(signature)
            .or_default()
            .push(self.clauses.len());
        self.clauses.push(clause);
        Ok(())
    }

    /// Add clauses in order, stopping at the first invalid one
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`](crate::Error::NotCallable) if a head is a
    /// variable; the clauses before it stay added.
    pub fn add_clauses(&mut self, clauses: impl IntoIterator<Item = Clause>) -> Result<()> {
        clauses
            .into_iter()
            .try_for_each(|clause| self.add_clause(clause))
    }

    /// Clauses whose head has the same signature as `goal`, in insertion order.
    ///
    /// Unknown signatures yield nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`](crate::Error::NotCallable) if `goal` is a variable.
    pub fn matching_clauses(&self, goal: &Term) -> Result<impl Iterator<Item = &Clause> + '_> {
        let positions = self.positions(&goal.signature()?);
        Ok(positions
            .iter()
            .map(move |&position| &self.clauses[position]))
    }

    /// Positions (into [`clauses`](Self::clauses)) of the clauses for `signature`
    pub(crate) fn positions(&self, signature: &Signature) -> &[usize] {
        self.index
            .get(signature)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Remove every clause
    pub fn clear(&mut self) {
        self.clauses.clear();
        self.index.clear();
    }

    /// Number of stored clauses
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// All clauses in insertion order
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Known predicate signatures, in order of first definition
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.index.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fact(predicate: &str, args: &[&str]) -> Clause {
        Clause::fact(Term::compound(
            predicate,
            args.iter().map(|arg| Term::atom(*arg)).collect(),
        ))
    }

    #[test]
    fn test_empty_knowledge_base() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.clause_count(), 0);
        let goal = Term::compound("parent", vec![Term::var("X"), Term::var("Y")]);
        assert_eq!(kb.matching_clauses(&goal).unwrap().count(), 0);
    }

    #[test]
    fn test_matching_clauses_keep_insertion_order() {
        let mut kb = KnowledgeBase::new();
        kb.add_clause(fact("p", &["c1"])).unwrap();
        kb.add_clause(fact("q", &["x"])).unwrap();
        kb.add_clause(fact("p", &["c2"])).unwrap();
        kb.add_clause(fact("p", &["a", "b"])).unwrap();
        kb.add_clause(fact("q", &["y"])).unwrap();
        kb.add_clause(fact("p", &["c3"])).unwrap();

        let goal = Term::compound("p", vec![Term::var("X")]);
        let matching: Vec<&Clause> = kb.matching_clauses(&goal).unwrap().collect();
        assert_eq!(
            matching,
            vec![&fact("p", &["c1"]), &fact("p", &["c2"]), &fact("p", &["c3"])]
        );
        assert_eq!(kb.clause_count(), 6);
    }

    #[test]
    fn test_arity_distinguishes_predicates() {
        let mut kb = KnowledgeBase::new();
        kb.add_clause(fact("p", &["a"])).unwrap();
        kb.add_clause(fact("p", &["a", "b"])).unwrap();
        kb.add_clause(Clause::fact(Term::atom("p"))).unwrap();

        assert_eq!(kb.matching_clauses(&Term::atom("p")).unwrap().count(), 1);
        let binary = Term::compound("p", vec![Term::var("X"), Term::var("Y")]);
        assert_eq!(
            kb.matching_clauses(&binary).unwrap().next(),
            Some(&fact("p", &["a", "b"]))
        );
        assert_eq!(kb.signatures().count(), 3);
    }

    #[test]
    fn test_variable_goal_is_an_error() {
        let kb = KnowledgeBase::new();
        assert!(matches!(
            kb.matching_clauses(&Term::var("X")),
            Err(Error::NotCallable(_))
        ));
    }

    #[test]
    fn test_variable_head_is_rejected() {
        let mut kb = KnowledgeBase::new();
        let err = kb.add_clause(Clause::fact(Term::var("X"))).unwrap_err();
        assert_eq!(err, Error::NotCallable(Term::var("X")));
        assert_eq!(kb.clause_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut kb = KnowledgeBase::new();
        kb.add_clauses(vec![fact("p", &["a"]), fact("p", &["b"])])
            .unwrap();
        assert_eq!(kb.clause_count(), 2);

        kb.clear();
        assert_eq!(kb.clause_count(), 0);
        assert_eq!(kb.signatures().count(), 0);
        let goal = Term::compound("p", vec![Term::var("X")]);
        assert_eq!(kb.matching_clauses(&goal).unwrap().count(), 0);

        // Positions restart from zero after clearing.
        kb.add_clause(fact("p", &["c"])).unwrap();
        assert_eq!(
            kb.matching_clauses(&goal).unwrap().collect::<Vec<_>>(),
            vec![&fact("p", &["c"])]
        );
    }

    #[test]
    fn test_add_clauses_stops_at_variable_head() {
        let mut kb = KnowledgeBase::new();
        let result = kb.add_clauses(vec![
            fact("p", &["a"]),
            Clause::fact(Term::var("X")),
            fact("p", &["b"]),
        ]);
        assert_eq!(result, Err(Error::NotCallable(Term::var("X"))));
        assert_eq!(kb.clause_count(), 1, "clauses before the bad one stay added");
    }
}
