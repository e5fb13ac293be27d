use indexmap::IndexMap;
use log::{debug, trace};
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;
use std::slice;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::knowledge_base::KnowledgeBase;
use crate::term::{Bindings, Term, CONJUNCTION, NOT_UNIFIABLE};
use crate::unify::Unifier;

/// Suffix source for alpha-renaming; shared by every engine in the process.
static FRESH_SUFFIX: AtomicUsize = AtomicUsize::new(0);

fn fresh_suffix() -> usize {
    FRESH_SUFFIX.fetch_add(1, Ordering::Relaxed)
}

/// One answer to a query
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// Whether the goal was proven.
    ///
    /// [`Solutions`] only yields proven answers, so this is always `true`
    /// there; no answer is an empty stream. The flag keeps a serialized or
    /// hand-built `Solution` self-describing, and one with `success: false`
    /// displays as `false`.
    pub success: bool,
    /// Fully dereferenced values of the query variables that got bound,
    /// in order of first occurrence in the query. Variables whose name starts
    /// with `_` are not reported.
    pub bindings: IndexMap<String, Term>,
}

impl Solution {
    /// The value bound to a query variable
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            return f.write_str("false");
        }
        if self.bindings.is_empty() {
            return f.write_str("true");
        }
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

/// Goals still to prove on one branch. Branches that split off later share
/// the tail.
#[derive(Debug)]
struct GoalNode {
    goal: Term,
    depth: usize,
    next: Goals,
}

type Goals = Option<Rc<GoalNode>>;

fn push_goal(goal: Term, depth: usize, next: Goals) -> Goals {
    Some(Rc::new(GoalNode { goal, depth, next }))
}

/// A goal together with the clauses not yet tried for it
#[derive(Debug)]
struct ChoicePoint<'a> {
    goal: Term,
    depth: usize,
    rest: Goals,
    bindings: Bindings,
    candidates: slice::Iter<'a, usize>,
}

/// SLD resolution over a [`KnowledgeBase`]
///
/// ```rust
/// use microprolog::{Clause, KnowledgeBase, QueryEngine, Term};
///
/// let mut kb = KnowledgeBase::new();
/// kb.add_clause(Clause::fact(Term::compound(
///     "parent",
///     vec![Term::atom("tom"), Term::atom("bob")],
/// )))
/// .unwrap();
///
/// let engine = QueryEngine::new(&kb);
/// let goal = Term::compound("parent", vec![Term::atom("tom"), Term::var("X")]);
/// let solutions = engine.solve_all(&goal).unwrap();
/// assert_eq!(solutions[0].get("X"), Some(&Term::atom("bob")));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    kb: &'a KnowledgeBase,
    config: EngineConfig,
}

impl<'a> QueryEngine<'a> {
    /// Create an engine with the default configuration
    #[must_use]
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self::with_config(kb, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration
    #[must_use]
    pub fn with_config(kb: &'a KnowledgeBase, config: EngineConfig) -> Self {
        Self { kb, config }
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a lazy iterator over the solutions of `goal`.
    ///
    /// The knowledge base stays borrowed until the iterator is dropped, so it
    /// cannot change under an open search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`] if `goal` is a variable.
    pub fn solve(&self, goal: &Term) -> Result<Solutions<'a>> {
        goal.signature()?;
        debug!("solving {goal}");
        Ok(Solutions {
            kb: self.kb,
            unifier: self.config.unifier(),
            max_depth: self.config.max_depth,
            query_variables: goal
                .variables()
                .iter()
                .filter(|name| !name.starts_with('_'))
                .map(ToString::to_string)
                .collect(),
            stack: Vec::new(),
            pending: Some((push_goal(goal.clone(), 0, None), Bindings::new())),
            done: false,
        })
    }

    /// Collects every solution of `goal`.
    ///
    /// Does not return for goals with infinitely many solutions.
    ///
    /// # Errors
    ///
    /// Returns the first structural error met during the search.
    pub fn solve_all(&self, goal: &Term) -> Result<Vec<Solution>> {
        self.solve(goal)?.collect()
    }

    /// Returns whether `goal` has at least one solution
    ///
    /// # Errors
    ///
    /// Returns a structural error met before the first solution.
    pub fn ask(&self, goal: &Term) -> Result<bool> {
        Ok(self.solve(goal)?.next().transpose()?.is_some())
    }
}

/// Lazy stream of [`Solution`]s, resumed from the latest choice point on each
/// call to `next`.
///
/// After yielding an error the iterator is exhausted.
#[derive(Debug)]
pub struct Solutions<'a> {
    kb: &'a KnowledgeBase,
    unifier: Unifier,
    max_depth: Option<usize>,
    query_variables: Vec<String>,
    stack: Vec<ChoicePoint<'a>>,
    pending: Option<(Goals, Bindings)>,
    done: bool,
}

impl<'a> Solutions<'a> {
    /// Takes the next untried clause of the most recent choice point whose head
    /// unifies with the goal, popping exhausted choice points on the way.
    fn backtrack(&mut self) -> Option<(Goals, Bindings)> {
        while let Some(choice) = self.stack.last_mut() {
            let Some(&position) = choice.candidates.next() else {
                self.stack.pop();
                continue;
            };
            let clause = self.kb.clauses()[position].rename_variables(fresh_suffix());
            trace!("trying {} against {clause}", choice.goal);
            let Some(bindings) = self
                .unifier
                .unify(&choice.goal, &clause.head, &choice.bindings)
            else {
                continue;
            };
            let depth = choice.depth + 1;
            let goals = clause
                .body
                .into_iter()
                .rev()
                .fold(choice.rest.clone(), |next, goal| push_goal(goal, depth, next));
            return Some((goals, bindings));
        }
        None
    }

    /// Proves goals from the front of the list until the list is empty (a
    /// solution), a goal fails, or a goal opens a new choice point.
    fn advance(&mut self, mut goals: Goals, bindings: Bindings) -> Result<Option<Solution>> {
        loop {
            let Some(node) = goals else {
                return Ok(Some(self.solution(&bindings)));
            };
            if let Some(max_depth) = self.max_depth {
                if node.depth > max_depth {
                    return Err(Error::DepthLimitExceeded(max_depth));
                }
            }

            let goal = bindings.walk(&node.goal).clone();
            if goal.is_variable() {
                return Err(Error::NotCallable(goal.substitute(&bindings)));
            }

            if let Some([left, right]) = goal.as_operation(CONJUNCTION, 2) {
                let next = push_goal(right.clone(), node.depth, node.next.clone());
                goals = push_goal(left.clone(), node.depth, next);
                continue;
            }

            if let Some([left, right]) = goal.as_operation(NOT_UNIFIABLE, 2) {
                let left = left.substitute(&bindings);
                let right = right.substitute(&bindings);
                if self.unifier.can_unify(&left, &right, &Bindings::new()) {
                    return Ok(None);
                }
                goals = node.next.clone();
                continue;
            }

            let signature = goal.signature()?;
            let kb: &'a KnowledgeBase = self.kb;
            let candidates = kb.positions(&signature);
            if candidates.is_empty() {
                debug!("no clauses for {signature}");
                return Ok(None);
            }
            self.stack.push(ChoicePoint {
                goal,
                depth: node.depth,
                rest: node.next.clone(),
                bindings,
                candidates: candidates.iter(),
            });
            return Ok(None);
        }
    }

    fn solution(&self, bindings: &Bindings) -> Solution {
        let bindings = self
            .query_variables
            .iter()
            .filter_map(|name| {
                let variable = Term::Variable(name.clone());
                let value = variable.substitute(bindings);
                (value != variable).then(|| (name.clone(), value))
            })
            .collect();
        Solution {
            success: true,
            bindings,
        }
    }
}

impl Iterator for Solutions<'_> {
    type Item = Result<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let branch = self.pending.take().or_else(|| self.backtrack());
            let Some((goals, bindings)) = branch else {
                self.done = true;
                break;
            };
            match self.advance(goals, bindings) {
                Ok(Some(solution)) => {
                    trace!("solution: {solution}");
                    return Some(Ok(solution));
                }
                Ok(None) => {}
                Err(err) => {
                    self.done = true;
                    self.stack.clear();
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl FusedIterator for Solutions<'_> {}
